//! Static country-code to continent table.
//!
//! The console summary reports collaboration per country code; the rollup
//! here is the extension point for a continent-level view and is not wired
//! into any output yet.

use std::collections::BTreeMap;

pub const UNKNOWN_CONTINENT: &str = "Unknown";

pub fn continent_for(code: &str) -> &'static str {
    match code {
        "DZ" | "AO" | "EG" | "ET" | "KE" | "NG" | "ZA" | "TZ" | "UG" | "ZM" | "ZW" => "Africa",
        "CN" | "IN" | "ID" | "JP" | "KR" | "MY" | "PH" | "SG" | "TH" | "VN" | "IL" | "IR"
        | "SA" => "Asia",
        "NO" | "SE" | "DK" | "FI" | "DE" | "FR" | "NL" | "BE" | "UK" | "CH" | "IT" | "ES"
        | "PT" | "PL" => "Europe",
        "US" | "CA" | "MX" => "North America",
        "AR" | "BR" | "CL" | "CO" | "PE" => "South America",
        "AU" | "NZ" => "Oceania",
        _ => UNKNOWN_CONTINENT,
    }
}

/// Sum per-country publication counts into continent buckets.
pub fn continent_rollup<'a, I>(country_counts: I) -> BTreeMap<&'static str, usize>
where
    I: IntoIterator<Item = (&'a str, usize)>,
{
    let mut rollup = BTreeMap::new();
    for (code, count) in country_counts {
        *rollup.entry(continent_for(code)).or_insert(0) += count;
    }
    rollup
}
