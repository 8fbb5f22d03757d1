//! Field extraction over raw Cristin records.
//!
//! Records are a tagged union across publication categories with no single
//! reliable field for title, venue, or NVI level. Everything here is a pure
//! function over `serde_json::Value` using optional access only; the venue is
//! resolved through an ordered candidate table so the priority order stays
//! data, not control flow.

use serde_json::Value;

use crate::{PublicationRow, NO_NVI_LEVEL, UNKNOWN_VENUE, UNTITLED};

/// Categories whose venue lives in the event sub-object.
const LECTURE_LIKE: &[&str] = &["LECTURE", "POPULARSCIENTIFICLECTURE", "POSTER", "OTHERPRES"];

/// Categories whose venue is a report/thesis series.
const DISSERTATION_LIKE: &[&str] = &["DRGRADAVH", "MASTERGRADSOPPG", "HOVEDFAGSOPPGAVE"];

/// Accept both shapes Cristin uses for names: a plain string, or a map of
/// language code to string.
pub fn localized(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Object(map) => {
            for lang in ["en", "nb", "nn"] {
                if let Some(name) = map.get(lang).and_then(Value::as_str) {
                    if let Some(name) = non_empty(name) {
                        return Some(name);
                    }
                }
            }
            map.values()
                .filter_map(Value::as_str)
                .find_map(non_empty)
        }
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Strings and numbers both occur for identifier-ish fields.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Title in the record's own declared original language, else the sentinel.
pub fn title(record: &Value) -> String {
    record
        .get("original_language")
        .and_then(Value::as_str)
        .and_then(|lang| record.pointer(&format!("/title/{}", lang)))
        .and_then(Value::as_str)
        .and_then(non_empty)
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// English display label for the category; empty when absent.
pub fn category_name(record: &Value) -> String {
    record
        .pointer("/category/name")
        .and_then(localized)
        .unwrap_or_default()
}

/// Machine category code, e.g. "ARTICLE"; empty when absent.
pub fn category_code(record: &Value) -> String {
    record
        .pointer("/category/code")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Publication year. `year_published` arrives as a number or a numeric
/// string; anything unparsable means the record carries no usable year.
pub fn year(record: &Value) -> Option<i32> {
    match record.get("year_published") {
        Some(Value::Number(n)) => n.as_i64().map(|y| y as i32),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

pub struct VenueCandidate {
    /// Audit label recorded in the row when this candidate wins.
    pub source: &'static str,
    /// Category codes this candidate applies to; `None` means all.
    categories: Option<&'static [&'static str]>,
    extract: fn(&Value) -> Option<String>,
}

/// Venue fallback chain, highest priority first. The order encodes which
/// categories use which sub-schema; changing report behavior means editing
/// this table, not the resolver.
pub const VENUE_CANDIDATES: &[VenueCandidate] = &[
    VenueCandidate {
        source: "journal",
        categories: None,
        extract: |r| r.pointer("/journal/name").and_then(localized),
    },
    VenueCandidate {
        source: "publisher",
        categories: None,
        extract: |r| r.pointer("/publisher/name").and_then(localized),
    },
    VenueCandidate {
        source: "event",
        categories: Some(LECTURE_LIKE),
        extract: |r| r.pointer("/event/name").and_then(localized),
    },
    VenueCandidate {
        source: "organizer",
        categories: Some(LECTURE_LIKE),
        extract: |r| r.pointer("/event/organizer").and_then(localized),
    },
    VenueCandidate {
        source: "series",
        categories: Some(DISSERTATION_LIKE),
        extract: |r| r.pointer("/series/name").and_then(localized),
    },
    VenueCandidate {
        source: "place",
        categories: None,
        extract: |r| r.get("place").and_then(localized),
    },
    VenueCandidate {
        source: "media type",
        categories: None,
        extract: |r| {
            let media = r.get("media_type")?;
            localized(media).or_else(|| media.get("name").and_then(localized))
        },
    },
    VenueCandidate {
        source: "channel",
        categories: None,
        extract: |r| r.pointer("/channel/title").and_then(localized),
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub name: String,
    /// Which candidate matched; `None` when the sentinel was assigned.
    pub source: Option<&'static str>,
}

/// First non-empty candidate wins; all-empty yields exactly the sentinel.
pub fn venue(record: &Value) -> Venue {
    let category = category_code(record);
    for candidate in VENUE_CANDIDATES {
        if let Some(allowed) = candidate.categories {
            if !allowed.contains(&category.as_str()) {
                continue;
            }
        }
        if let Some(name) = (candidate.extract)(record) {
            return Venue {
                name,
                source: Some(candidate.source),
            };
        }
    }
    Venue {
        name: UNKNOWN_VENUE.to_string(),
        source: None,
    }
}

/// NVI level from the journal, falling through to the journal's publisher.
/// Absence at any nesting level is expected and maps to "-".
pub fn nvi_level(record: &Value) -> String {
    record
        .pointer("/journal/nvi_level")
        .and_then(scalar_string)
        .or_else(|| {
            record
                .pointer("/journal/publisher/nvi_level")
                .and_then(scalar_string)
        })
        .unwrap_or_else(|| NO_NVI_LEVEL.to_string())
}

fn person_name(contributor: &Value) -> String {
    let first = contributor
        .get("first_name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let last = contributor
        .get("surname")
        .and_then(Value::as_str)
        .unwrap_or_default();
    format!("{} {}", first, last).trim().to_string()
}

/// Best-effort contributor names from the preview embedded in list responses.
pub fn preview_contributors(record: &Value) -> Vec<String> {
    match record.pointer("/contributors/preview") {
        Some(Value::Array(people)) => people.iter().map(person_name).collect(),
        _ => Vec::new(),
    }
}

/// Full contributor names, annotated with the Cristin person ID when present.
pub fn contributor_names(contributors: &[Value]) -> Vec<String> {
    contributors
        .iter()
        .map(|c| {
            let name = person_name(c);
            match c.get("cristin_person_id").and_then(scalar_string) {
                Some(id) => format!("{} (ID: {})", name, id),
                None => name,
            }
        })
        .collect()
}

pub fn result_id(record: &Value) -> String {
    record
        .get("cristin_result_id")
        .and_then(scalar_string)
        .unwrap_or_default()
}

pub fn result_url(record: &Value) -> String {
    record
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// One raw record to one flat row. Returns `None` when the year cannot be
/// parsed; such records are excluded, never an error.
pub fn normalize_record(
    record: &Value,
    identifier: &str,
    display_name: &str,
    contributors: Vec<String>,
) -> Option<PublicationRow> {
    let year = year(record)?;
    let venue = venue(record);

    Some(PublicationRow {
        cristin_id: identifier.to_string(),
        name: display_name.to_string(),
        title: title(record),
        year,
        category: category_name(record),
        venue: venue.name,
        venue_source: venue.source.unwrap_or_default().to_string(),
        nvi_level: nvi_level(record),
        contributors: contributors.join("; "),
        result_id: result_id(record),
        url: result_url(record),
    })
}
