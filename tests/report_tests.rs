use cristin_reports::report::{person_file_name, read_report, split_by_person, write_report};
use cristin_reports::PublicationRow;
use tempfile::TempDir;

fn row(cristin_id: &str, name: &str, title: &str, year: i32) -> PublicationRow {
    PublicationRow {
        cristin_id: cristin_id.to_string(),
        name: name.to_string(),
        title: title.to_string(),
        year,
        category: "Academic article".to_string(),
        venue: "Nature".to_string(),
        venue_source: "journal".to_string(),
        nvi_level: "2".to_string(),
        contributors: "Ola Nordmann; Kari Hansen".to_string(),
        result_id: "999".to_string(),
        url: "https://api.cristin.no/v2/results/999".to_string(),
    }
}

#[test]
fn test_report_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("report.csv");

    let rows = vec![
        row("123", "Ola Nordmann", "First", 2020),
        row("123", "Ola Nordmann", "Second", 2021),
        row("456", "Kari Hansen", "Third", 2022),
    ];

    let written = write_report(&rows, &path).unwrap();
    assert_eq!(written, Some(3));

    let read_back = read_report(&path).unwrap();
    assert_eq!(read_back, rows);
}

#[test]
fn test_empty_report_writes_no_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("report.csv");

    let written = write_report(&[], &path).unwrap();

    assert_eq!(written, None);
    assert!(!path.exists());
}

#[test]
fn test_split_by_person_one_file_per_person() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("combined.csv");
    let output_dir = temp_dir.path().join("per_person");

    let rows = vec![
        row("123", "Ola Nordmann", "First", 2020),
        row("456", "Kari Hansen", "Second", 2021),
        row("123", "Ola Nordmann", "Third", 2022),
    ];
    write_report(&rows, &input).unwrap();

    let written = split_by_person(&input, &output_dir).unwrap();
    assert_eq!(written.len(), 2);

    // First-seen order is preserved.
    assert_eq!(
        written[0].file_name().unwrap().to_str().unwrap(),
        "publications - Nordmann, Ola.csv"
    );
    assert_eq!(
        written[1].file_name().unwrap().to_str().unwrap(),
        "publications - Hansen, Kari.csv"
    );

    let ola = read_report(&written[0]).unwrap();
    assert_eq!(ola.len(), 2);
    assert_eq!(ola[0].title, "First");
    assert_eq!(ola[1].title, "Third");

    let kari = read_report(&written[1]).unwrap();
    assert_eq!(kari.len(), 1);
}

#[test]
fn test_person_file_name_handles_odd_names() {
    assert_eq!(
        person_file_name("123", "Ola Gunnar Nordmann"),
        "publications - Nordmann, Ola Gunnar.csv"
    );
    assert_eq!(person_file_name("123", "Madonna"), "publications - Madonna.csv");
    assert_eq!(person_file_name("123", ""), "publications - 123.csv");
    // Path separators never reach the filesystem.
    assert_eq!(
        person_file_name("123", "A/B C\\D"),
        "publications - C_D, A_B.csv"
    );
}
