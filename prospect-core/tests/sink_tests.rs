// Tests for the record store and failure log

use chrono::Utc;
use prospect_core::sink::{FailureLog, RecordSink, SinkError};
use prospect_scraper::record::{Field, ProfileRecord};
use std::fs;
use tempfile::TempDir;

fn record(url: &str, name: Option<&str>) -> ProfileRecord {
    let mut record = ProfileRecord::new(url.to_string());
    record.push(Field::Name, name.map(String::from));
    record
}

// ============================================================================
// Record Store
// ============================================================================

#[test]
fn test_first_write_establishes_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profiles.csv");
    let mut sink = RecordSink::open(&path).unwrap();

    assert!(sink.columns().is_none());
    sink.append_record(&record("https://x/in/alice", Some("Alice")))
        .unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("url,name"));
    assert_eq!(lines.next(), Some("https://x/in/alice,Alice"));
}

#[test]
fn test_reopen_appends_without_second_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profiles.csv");

    {
        let mut sink = RecordSink::open(&path).unwrap();
        sink.append_record(&record("https://x/in/alice", Some("Alice")))
            .unwrap();
    }

    let mut sink = RecordSink::open(&path).unwrap();
    assert_eq!(
        sink.columns(),
        Some(&["url".to_string(), "name".to_string()][..])
    );
    sink.append_record(&record("https://x/in/bob", Some("Bob")))
        .unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.matches("url,name").count(), 1);
    assert_eq!(contents.lines().count(), 3);
}

#[test]
fn test_column_mismatch_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profiles.csv");
    let mut sink = RecordSink::open(&path).unwrap();

    sink.append_record(&record("https://x/in/alice", Some("Alice")))
        .unwrap();

    let mut wider = ProfileRecord::new("https://x/in/bob".to_string());
    wider.push(Field::Name, Some("Bob".to_string()));
    wider.push(Field::Country, None);

    let err = sink.append_record(&wider).unwrap_err();
    assert!(matches!(err, SinkError::ColumnMismatch { .. }));

    // The mismatching record must not have touched the file.
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[test]
fn test_header_stable_across_one_run() {
    let dir = TempDir::new().unwrap();
    let mut sink = RecordSink::open(&dir.path().join("profiles.csv")).unwrap();

    for i in 0..5 {
        sink.append_record(&record(&format!("https://x/in/user{}", i), None))
            .unwrap();
    }

    assert_eq!(
        sink.columns(),
        Some(&["url".to_string(), "name".to_string()][..])
    );
}

// ============================================================================
// Failure Log
// ============================================================================

#[test]
fn test_failure_log_created_with_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("error_log.csv");

    let _log = FailureLog::open(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.trim(), "timestamp,error");
}

#[test]
fn test_failure_log_appends_events() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("error_log.csv");
    let mut log = FailureLog::open(&path).unwrap();

    log.append(Utc::now(), "navigation to /in/bob failed")
        .unwrap();
    log.append(Utc::now(), "navigation to /in/bob failed")
        .unwrap();

    // No dedup: one row per event.
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 3);
    assert_eq!(log.appended(), 2);
}

#[test]
fn test_failure_log_reopen_keeps_single_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("error_log.csv");

    {
        let mut log = FailureLog::open(&path).unwrap();
        log.append(Utc::now(), "boom").unwrap();
    }

    let _log = FailureLog::open(&path).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.matches("timestamp,error").count(), 1);
}
