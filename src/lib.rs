use serde::{Deserialize, Serialize};

pub mod client;
pub mod collab;
pub mod fetch;
pub mod normalize;
pub mod report;

/// Sentinel for a record whose title map has no entry for its own
/// original-language code.
pub const UNTITLED: &str = "Untitled";

/// Sentinel for a publication venue no candidate field could resolve.
pub const UNKNOWN_VENUE: &str = "Unknown";

/// Sentinel for a missing NVI level.
pub const NO_NVI_LEVEL: &str = "-";

/// Sentinel used when a person-name lookup fails.
pub const UNKNOWN_NAME: &str = "Unknown name";

/// One normalized publication, flat and fully populated. Field order here is
/// the column order of every report this tool writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRow {
    #[serde(rename = "Cristin ID")]
    pub cristin_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Venue")]
    pub venue: String,
    #[serde(rename = "Venue source")]
    pub venue_source: String,
    #[serde(rename = "NVI level")]
    pub nvi_level: String,
    #[serde(rename = "Contributors")]
    pub contributors: String,
    #[serde(rename = "Result ID")]
    pub result_id: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// Install the tracing subscriber, honoring `RUST_LOG`. Safe to call more
/// than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Read a newline-delimited identifier list. Blank lines are skipped,
/// order is preserved, duplicates are kept as-is.
pub fn read_id_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
