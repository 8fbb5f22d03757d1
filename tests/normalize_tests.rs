use cristin_reports::normalize;
use cristin_reports::{read_id_list, NO_NVI_LEVEL, UNKNOWN_VENUE, UNTITLED};
use serde_json::json;

#[test]
fn test_title_uses_declared_original_language() {
    let record = json!({
        "original_language": "nb",
        "title": {
            "nb": "Om fisk",
            "en": "About fish"
        }
    });

    assert_eq!(normalize::title(&record), "Om fisk");
}

#[test]
fn test_title_missing_language_entry_is_untitled() {
    let record = json!({
        "original_language": "nb",
        "title": {
            "en": "About fish"
        }
    });

    assert_eq!(normalize::title(&record), UNTITLED);
}

#[test]
fn test_title_absent_is_untitled() {
    assert_eq!(normalize::title(&json!({})), UNTITLED);
}

#[test]
fn test_year_accepts_number_and_numeric_string() {
    assert_eq!(normalize::year(&json!({"year_published": 2021})), Some(2021));
    assert_eq!(
        normalize::year(&json!({"year_published": "2021"})),
        Some(2021)
    );
}

#[test]
fn test_year_unparsable_is_none() {
    assert_eq!(normalize::year(&json!({"year_published": "n/a"})), None);
    assert_eq!(normalize::year(&json!({"year_published": null})), None);
    assert_eq!(normalize::year(&json!({})), None);
}

#[test]
fn test_venue_prefers_journal_over_channel() {
    let record = json!({
        "journal": {"name": {"en": "Nature"}},
        "channel": {"title": "Some channel"}
    });

    let venue = normalize::venue(&record);
    assert_eq!(venue.name, "Nature");
    assert_eq!(venue.source, Some("journal"));
}

#[test]
fn test_venue_accepts_plain_string_names() {
    let record = json!({
        "journal": {"name": "Tidsskriftet"}
    });

    assert_eq!(normalize::venue(&record).name, "Tidsskriftet");
}

#[test]
fn test_venue_falls_back_to_publisher_then_place() {
    let record = json!({
        "publisher": {"name": {"nb": "Universitetsforlaget"}}
    });
    assert_eq!(normalize::venue(&record).source, Some("publisher"));

    let record = json!({"place": "Oslo"});
    let venue = normalize::venue(&record);
    assert_eq!(venue.name, "Oslo");
    assert_eq!(venue.source, Some("place"));
}

#[test]
fn test_venue_event_only_for_lecture_categories() {
    let lecture = json!({
        "category": {"code": "LECTURE"},
        "event": {"name": "Annual Fish Conference"}
    });
    let venue = normalize::venue(&lecture);
    assert_eq!(venue.name, "Annual Fish Conference");
    assert_eq!(venue.source, Some("event"));

    // Same sub-object, non-lecture category: the candidate does not apply.
    let article = json!({
        "category": {"code": "ARTICLE"},
        "event": {"name": "Annual Fish Conference"}
    });
    assert_eq!(normalize::venue(&article).name, UNKNOWN_VENUE);
}

#[test]
fn test_venue_series_for_dissertations() {
    let record = json!({
        "category": {"code": "DRGRADAVH"},
        "series": {"name": {"en": "PhD Theses at NMBU"}}
    });

    let venue = normalize::venue(&record);
    assert_eq!(venue.name, "PhD Theses at NMBU");
    assert_eq!(venue.source, Some("series"));
}

#[test]
fn test_venue_all_candidates_empty_is_exactly_unknown() {
    let record = json!({
        "category": {"code": "ARTICLE"},
        "journal": {"name": ""},
        "place": "   "
    });

    let venue = normalize::venue(&record);
    assert_eq!(venue.name, UNKNOWN_VENUE);
    assert_eq!(venue.source, None);
}

#[test]
fn test_venue_is_deterministic() {
    let record = json!({
        "journal": {"name": {"en": "Nature"}},
        "publisher": {"name": {"en": "Springer"}},
        "channel": {"title": "Channel"}
    });

    for _ in 0..10 {
        assert_eq!(normalize::venue(&record).name, "Nature");
    }
}

#[test]
fn test_nvi_level_direct_and_nested() {
    let direct = json!({"journal": {"nvi_level": "1"}});
    assert_eq!(normalize::nvi_level(&direct), "1");

    let nested = json!({"journal": {"publisher": {"nvi_level": 2}}});
    assert_eq!(normalize::nvi_level(&nested), "2");
}

#[test]
fn test_nvi_level_absent_at_any_level_is_dash() {
    assert_eq!(normalize::nvi_level(&json!({})), NO_NVI_LEVEL);
    assert_eq!(normalize::nvi_level(&json!({"journal": {}})), NO_NVI_LEVEL);
    // Journal present but in an unexpected shape.
    assert_eq!(
        normalize::nvi_level(&json!({"journal": "Nature"})),
        NO_NVI_LEVEL
    );
}

#[test]
fn test_preview_contributors() {
    let record = json!({
        "contributors": {
            "preview": [
                {"first_name": "Ola", "surname": "Nordmann"},
                {"surname": "Hansen"}
            ]
        }
    });

    assert_eq!(
        normalize::preview_contributors(&record),
        vec!["Ola Nordmann".to_string(), "Hansen".to_string()]
    );
}

#[test]
fn test_contributor_names_annotate_person_id() {
    let contributors = vec![
        json!({"first_name": "Ola", "surname": "Nordmann", "cristin_person_id": 12345}),
        json!({"first_name": "Kari", "surname": "Hansen"}),
    ];

    assert_eq!(
        normalize::contributor_names(&contributors),
        vec![
            "Ola Nordmann (ID: 12345)".to_string(),
            "Kari Hansen".to_string()
        ]
    );
}

#[test]
fn test_normalize_record_builds_full_row() {
    let record = json!({
        "cristin_result_id": 999,
        "original_language": "en",
        "title": {"en": "About fish"},
        "year_published": "2020",
        "category": {"code": "ARTICLE", "name": {"en": "Academic article"}},
        "journal": {"name": {"en": "Nature"}, "nvi_level": "2"},
        "url": "https://api.cristin.no/v2/results/999"
    });

    let row = normalize::normalize_record(&record, "123", "Ola Nordmann", vec![])
        .expect("parsable year");

    assert_eq!(row.cristin_id, "123");
    assert_eq!(row.name, "Ola Nordmann");
    assert_eq!(row.title, "About fish");
    assert_eq!(row.year, 2020);
    assert_eq!(row.category, "Academic article");
    assert_eq!(row.venue, "Nature");
    assert_eq!(row.venue_source, "journal");
    assert_eq!(row.nvi_level, "2");
    assert_eq!(row.contributors, "");
    assert_eq!(row.result_id, "999");
    assert_eq!(row.url, "https://api.cristin.no/v2/results/999");
}

#[test]
fn test_normalize_record_unparsable_year_is_excluded() {
    let record = json!({
        "title": {"en": "Undated"},
        "year_published": "unknown"
    });

    assert!(normalize::normalize_record(&record, "123", "X", vec![]).is_none());
}

#[test]
fn test_read_id_list_skips_blanks_keeps_order_and_duplicates() {
    let ids = read_id_list("123\n\n  \n456\n123\n");
    assert_eq!(ids, vec!["123", "456", "123"]);
}
