use anyhow::Result;
use clap::Args;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{error, info, warn};

use crate::client::{CristinClient, RetryPolicy, DEFAULT_BASE_URL};
use crate::{init_tracing, normalize};

pub mod continent;

/// Category codes that count as peer reviewed for collaboration analysis.
pub const PEER_REVIEWED_CATEGORIES: &[&str] = &["ARTICLE", "ACADEMICREVIEW", "ARTICLEJOURNAL"];

#[derive(Args)]
pub struct CollabArgs {
    /// Cristin unit ID, e.g. 192.11.0.0
    #[arg(long)]
    pub unit: String,

    /// First year, inclusive
    #[arg(short, long, default_value = "2018")]
    pub start: i32,

    /// Last year, inclusive
    #[arg(short, long, default_value = "2024")]
    pub end: i32,

    /// Reference country code for the national/international split
    #[arg(short, long, default_value = "NO")]
    pub country: String,

    /// Cristin API base URL
    #[arg(short = 'u', long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaboration {
    NoExternal,
    National,
    International,
}

/// Bucket one publication from its resolved contributor affiliations.
///
/// No resolved external partner means no collaboration regardless of country
/// codes; national requires every resolved code to equal the reference
/// country; everything else is international.
pub fn classify(
    countries: &HashSet<String>,
    external_partners: &HashSet<String>,
    reference_country: &str,
) -> Collaboration {
    if external_partners.is_empty() {
        Collaboration::NoExternal
    } else if countries.len() == 1 && countries.contains(reference_country) {
        Collaboration::National
    } else {
        Collaboration::International
    }
}

#[derive(Debug, Default)]
pub struct CollaborationStats {
    pub no_external: u32,
    pub national: u32,
    pub international: u32,
    /// Country code -> result IDs, so a country is counted once per
    /// publication no matter how many contributors share it.
    country_publications: HashMap<String, HashSet<String>>,
    partner_counts: HashMap<String, u32>,
}

impl CollaborationStats {
    pub fn record(
        &mut self,
        result_id: &str,
        countries: &HashSet<String>,
        external_partners: &HashSet<String>,
        reference_country: &str,
    ) -> Collaboration {
        let bucket = classify(countries, external_partners, reference_country);
        match bucket {
            Collaboration::NoExternal => self.no_external += 1,
            Collaboration::National => self.national += 1,
            Collaboration::International => {
                self.international += 1;
                for code in countries {
                    self.country_publications
                        .entry(code.clone())
                        .or_default()
                        .insert(result_id.to_string());
                }
                for partner in external_partners {
                    *self.partner_counts.entry(partner.clone()).or_insert(0) += 1;
                }
            }
        }
        bucket
    }

    /// Publications per country code, deduplicated by result ID.
    pub fn country_counts(&self) -> BTreeMap<String, usize> {
        self.country_publications
            .iter()
            .map(|(code, results)| (code.clone(), results.len()))
            .collect()
    }

    pub fn distinct_partners(&self) -> usize {
        self.partner_counts.len()
    }

    /// Partner institutions by descending frequency, name as tiebreak.
    pub fn top_partners(&self, limit: usize) -> Vec<(String, u32)> {
        let mut partners: Vec<(String, u32)> = self
            .partner_counts
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        partners.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        partners.truncate(limit);
        partners
    }
}

#[derive(Debug, Default)]
struct ResolvedAffiliation {
    country: Option<String>,
    institution: Option<String>,
}

/// Resolve one affiliation to a country code and institution name. The unit
/// chain wins when it yields a country; otherwise the direct institution
/// reference is tried. Lookup failures resolve to nothing.
async fn resolve_affiliation(client: &CristinClient, affiliation: &Value) -> ResolvedAffiliation {
    let from_unit = resolve_unit_chain(client, affiliation.get("unit")).await;
    if from_unit.country.is_some() {
        return from_unit;
    }
    resolve_institution_chain(client, affiliation.get("institution")).await
}

async fn resolve_unit_chain(client: &CristinClient, unit: Option<&Value>) -> ResolvedAffiliation {
    let Some(url) = unit.and_then(|u| u.get("url")).and_then(Value::as_str) else {
        return ResolvedAffiliation::default();
    };

    let data = match client.get_json(url).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Unit lookup failed ({}): {}", url, e);
            return ResolvedAffiliation::default();
        }
    };

    let country = data
        .get("country")
        .and_then(Value::as_str)
        .map(String::from);

    let institution = match data.pointer("/institution/url").and_then(Value::as_str) {
        Some(inst_url) => match client.get_json(inst_url).await {
            Ok(inst) => inst.get("institution_name").and_then(normalize::localized),
            Err(e) => {
                warn!("Institution lookup failed ({}): {}", inst_url, e);
                None
            }
        },
        None => None,
    };

    ResolvedAffiliation {
        country,
        institution,
    }
}

async fn resolve_institution_chain(
    client: &CristinClient,
    institution: Option<&Value>,
) -> ResolvedAffiliation {
    let Some(url) = institution.and_then(|i| i.get("url")).and_then(Value::as_str) else {
        return ResolvedAffiliation::default();
    };

    let data = match client.get_json(url).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Institution lookup failed ({}): {}", url, e);
            return ResolvedAffiliation::default();
        }
    };

    ResolvedAffiliation {
        country: data
            .get("country_code")
            .and_then(Value::as_str)
            .map(String::from),
        institution: data.get("institution_name").and_then(normalize::localized),
    }
}

/// The unit's own institution name, used to keep the reference institution
/// out of the partner counts.
async fn reference_institution_name(client: &CristinClient, unit_id: &str) -> Option<String> {
    let unit = match client.unit(unit_id).await {
        Ok(unit) => unit,
        Err(e) => {
            warn!("Unit detail lookup failed for {}: {}", unit_id, e);
            return None;
        }
    };

    let inst_url = unit.pointer("/institution/url").and_then(Value::as_str)?;
    match client.get_json(inst_url).await {
        Ok(inst) => inst.get("institution_name").and_then(normalize::localized),
        Err(e) => {
            warn!("Institution lookup failed ({}): {}", inst_url, e);
            None
        }
    }
}

pub fn run(args: CollabArgs) -> Result<()> {
    init_tracing();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(args))
}

pub async fn run_async(args: CollabArgs) -> Result<()> {
    let client = CristinClient::new(&args.base_url, RetryPolicy::default(), args.timeout);

    let mut publications = Vec::new();
    let mut pages = client.unit_results(&args.unit);
    loop {
        match pages.next_page().await {
            Ok(Some(page)) => {
                for record in page {
                    let Some(year) = normalize::year(&record) else {
                        continue;
                    };
                    if !(args.start..=args.end).contains(&year) {
                        continue;
                    }
                    if PEER_REVIEWED_CATEGORIES
                        .contains(&normalize::category_code(&record).as_str())
                    {
                        publications.push(record);
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Fetch failed for unit {}: {}", args.unit, e);
                break;
            }
        }
    }

    info!("{} peer-reviewed publications found", publications.len());

    let reference_institution = reference_institution_name(&client, &args.unit).await;
    let stats = aggregate(&client, &publications, reference_institution.as_deref(), &args.country).await;

    print_summary(&stats);
    Ok(())
}

/// Resolve every contributor affiliation and classify each publication.
/// A failed contributor lookup skips that publication.
pub async fn aggregate(
    client: &CristinClient,
    publications: &[Value],
    reference_institution: Option<&str>,
    reference_country: &str,
) -> CollaborationStats {
    let mut stats = CollaborationStats::default();

    for publication in publications {
        let result_id = normalize::result_id(publication);
        if result_id.is_empty() {
            continue;
        }

        let contributors = match client.result_contributors(&result_id).await {
            Ok(contributors) => contributors,
            Err(e) => {
                warn!("Contributor lookup failed for result {}: {}", result_id, e);
                continue;
            }
        };

        let mut countries = HashSet::new();
        let mut external_partners = HashSet::new();

        for person in &contributors {
            let Some(Value::Array(affiliations)) = person.get("affiliations") else {
                continue;
            };
            for affiliation in affiliations {
                let resolved = resolve_affiliation(client, affiliation).await;
                // An institution name only counts when its chain also
                // yielded a country code.
                let Some(country) = resolved.country else {
                    continue;
                };
                countries.insert(country);
                if let Some(name) = resolved.institution {
                    if reference_institution != Some(name.as_str()) {
                        external_partners.insert(name);
                    }
                }
            }
        }

        stats.record(&result_id, &countries, &external_partners, reference_country);
    }

    stats
}

fn print_summary(stats: &CollaborationStats) {
    println!("\nCollaboration summary:");
    println!("No external partners: {}", stats.no_external);
    println!("National partners only: {}", stats.national);
    println!("International partners: {}", stats.international);
    println!("Distinct partner institutions: {}", stats.distinct_partners());

    println!("\nPublications per partner country:");
    for (code, count) in stats.country_counts() {
        println!("{}: {} articles", code, count);
    }

    println!("\nTop 10 partner institutions:");
    for (name, count) in stats.top_partners(10) {
        println!("{}: {}", name, count);
    }
}
