use anyhow::{Context, Result};
use clap::Args;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{init_tracing, PublicationRow};

/// Serialize rows to CSV, header first, insertion order preserved. An empty
/// table writes nothing at all and returns `None` so callers can report the
/// no-publications outcome instead of leaving a header-only file behind.
pub fn write_report(rows: &[PublicationRow], path: &Path) -> Result<Option<usize>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(Some(rows.len()))
}

pub fn read_report(path: &Path) -> Result<Vec<PublicationRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[derive(Args)]
pub struct SplitArgs {
    /// Combined report to split
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for the per-person files
    #[arg(short, long, default_value = "reports_per_person")]
    pub output: PathBuf,
}

pub fn run_split(args: SplitArgs) -> Result<()> {
    init_tracing();

    let written = split_by_person(&args.input, &args.output)?;
    if written.is_empty() {
        info!("No rows in {}, nothing written", args.input.display());
    } else {
        info!("{} files written to {}", written.len(), args.output.display());
    }
    Ok(())
}

/// Group a combined report by (Cristin ID, Name) in first-seen order and
/// write one file per person.
pub fn split_by_person(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let rows = read_report(input)?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<PublicationRow>> = HashMap::new();
    for row in rows {
        let key = (row.cristin_id.clone(), row.name.clone());
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    let mut written = Vec::new();
    for key in order {
        let path = output_dir.join(person_file_name(&key.0, &key.1));
        write_report(&groups[&key], &path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// `publications - Last, First.csv`, treating the final whitespace-separated
/// token as the surname. Path separators in names are replaced; a blank name
/// falls back to the identifier.
pub fn person_file_name(cristin_id: &str, name: &str) -> String {
    let sanitized = name.replace(['/', '\\'], "_");
    let parts: Vec<&str> = sanitized.split_whitespace().collect();

    match parts.split_last() {
        Some((last, first)) if !first.is_empty() => {
            format!("publications - {}, {}.csv", last, first.join(" "))
        }
        Some((last, _)) => format!("publications - {}.csv", last),
        None => format!("publications - {}.csv", cristin_id.replace(['/', '\\'], "_")),
    }
}
