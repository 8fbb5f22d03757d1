use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::client::{CristinClient, ResultPages, RetryPolicy, DEFAULT_BASE_URL};
use crate::{init_tracing, normalize, read_id_list, report, PublicationRow, UNKNOWN_NAME};

/// Pause between per-record detail lookups. Politeness toward the API, not a
/// correctness mechanism.
const DETAIL_THROTTLE: Duration = Duration::from_millis(100);

fn current_year() -> i32 {
    Local::now().year()
}

#[derive(Args)]
pub struct PersonsArgs {
    /// File with one Cristin person ID per line
    #[arg(short, long, default_value = "cristin_ids.txt")]
    pub ids: PathBuf,

    /// Institution acronym the person IDs belong to
    #[arg(short = 'I', long, default_value = "nmbu")]
    pub institution: String,

    /// First year, inclusive
    #[arg(short, long, default_value = "2018")]
    pub start: i32,

    /// Last year, inclusive
    #[arg(short, long, default_value_t = current_year())]
    pub end: i32,

    /// Output CSV path
    #[arg(short, long, default_value = "cristin_publications.csv")]
    pub output: PathBuf,

    /// Cristin API base URL
    #[arg(short = 'u', long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,

    /// Skip per-record detail and contributor lookups
    #[arg(short, long)]
    pub lite: bool,
}

#[derive(Args)]
pub struct UnitArgs {
    /// Cristin unit ID, e.g. 192.11.0.0
    #[arg(long)]
    pub unit: String,

    /// First year, inclusive
    #[arg(short, long, default_value = "2015")]
    pub start: i32,

    /// Last year, inclusive
    #[arg(short, long, default_value_t = current_year())]
    pub end: i32,

    /// Output CSV path (default: timestamped filename)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Cristin API base URL
    #[arg(short = 'u', long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,

    /// Skip per-record detail and contributor lookups
    #[arg(short, long)]
    pub lite: bool,
}

pub fn run_persons(args: PersonsArgs) -> Result<()> {
    init_tracing();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_persons_async(args))
}

pub async fn run_persons_async(args: PersonsArgs) -> Result<()> {
    let contents = fs::read_to_string(&args.ids)
        .with_context(|| format!("Failed to read ID list {}", args.ids.display()))?;
    let ids = read_id_list(&contents);
    info!("Loaded {} identifiers from {}", ids.len(), args.ids.display());

    let client = CristinClient::new(&args.base_url, RetryPolicy::default(), args.timeout);

    let pb = ProgressBar::new(ids.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let opts = FetchOpts {
        start: args.start,
        end: args.end,
        lite: args.lite,
    };

    let mut rows = Vec::new();
    for id in &ids {
        let name = match client.person_name(&args.institution, id).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Name lookup failed for {}: {}", id, e);
                UNKNOWN_NAME.to_string()
            }
        };

        let mut pages = client.person_results(&args.institution, id, args.start, args.end);
        if let Err(e) = collect_rows(&client, &mut pages, id, &name, &opts, &mut rows).await {
            error!("Fetch failed for {}: {}", id, e);
        }
        pb.inc(1);
    }
    pb.finish();

    report_outcome(&rows, &args.output)
}

pub fn run_unit(args: UnitArgs) -> Result<()> {
    init_tracing();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_unit_async(args))
}

pub async fn run_unit_async(args: UnitArgs) -> Result<()> {
    info!(
        "Fetching publications for unit {} ({} to {})",
        args.unit, args.start, args.end
    );

    let client = CristinClient::new(&args.base_url, RetryPolicy::default(), args.timeout);

    let opts = FetchOpts {
        start: args.start,
        end: args.end,
        lite: args.lite,
    };

    let mut rows = Vec::new();
    let mut pages = client.unit_results(&args.unit);
    // The unit is the subject here; rows carry no person name.
    if let Err(e) = collect_rows(&client, &mut pages, &args.unit, "-", &opts, &mut rows).await {
        error!("Fetch failed for unit {}: {}", args.unit, e);
    }

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "unit_publications_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });
    report_outcome(&rows, &output)
}

struct FetchOpts {
    start: i32,
    end: i32,
    lite: bool,
}

/// Drain a page cursor into normalized rows. Records outside the year bounds
/// or with an unparsable year are dropped; a failed detail lookup drops that
/// record only. A page-level failure propagates and ends this subject's
/// sequence; the caller logs it and moves on.
async fn collect_rows(
    client: &CristinClient,
    pages: &mut ResultPages<'_>,
    identifier: &str,
    display_name: &str,
    opts: &FetchOpts,
    rows: &mut Vec<PublicationRow>,
) -> Result<()> {
    while let Some(page) = pages.next_page().await? {
        for record in &page {
            let Some(year) = normalize::year(record) else {
                continue;
            };
            if !(opts.start..=opts.end).contains(&year) {
                continue;
            }

            let row = if opts.lite {
                normalize::normalize_record(
                    record,
                    identifier,
                    display_name,
                    normalize::preview_contributors(record),
                )
            } else {
                let result_id = normalize::result_id(record);
                if result_id.is_empty() {
                    warn!("Record without result ID for {}, skipping", identifier);
                    continue;
                }

                let details = match client.result_details(&result_id).await {
                    Ok(details) => details,
                    Err(e) => {
                        warn!("Detail lookup failed for result {}: {}", result_id, e);
                        continue;
                    }
                };
                let contributors = match client.result_contributors(&result_id).await {
                    Ok(contributors) => normalize::contributor_names(&contributors),
                    Err(e) => {
                        warn!("Contributor lookup failed for result {}: {}", result_id, e);
                        Vec::new()
                    }
                };
                tokio::time::sleep(DETAIL_THROTTLE).await;

                normalize::normalize_record(&details, identifier, display_name, contributors)
            };

            if let Some(row) = row {
                rows.push(row);
            }
        }
    }
    Ok(())
}

fn report_outcome(rows: &[PublicationRow], output: &std::path::Path) -> Result<()> {
    match report::write_report(rows, output)? {
        Some(count) => info!("{} publications written to {}", count, output.display()),
        None => info!("No publications found, nothing written"),
    }
    Ok(())
}
