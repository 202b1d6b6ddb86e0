// Tests for end-of-session report rendering

use prospect_core::report::{SessionSummary, generate_session_report};
use std::path::PathBuf;

fn summary() -> SessionSummary {
    SessionSummary {
        profiles_visited: 42,
        ceiling: 1000,
        failures_logged: 3,
        store_path: PathBuf::from("profile_data/profiles.csv"),
    }
}

#[test]
fn test_report_contains_visit_counts() {
    let report = generate_session_report(&summary());

    assert!(report.contains("Profiles visited: 42"));
    assert!(report.contains("ceiling 1000"));
    assert!(report.contains("Failures logged:  3"));
}

#[test]
fn test_report_names_the_record_store() {
    let report = generate_session_report(&summary());

    assert!(report.contains("profile_data/profiles.csv"));
}

#[test]
fn test_report_is_framed_by_dividers() {
    let report = generate_session_report(&summary());

    assert!(report.starts_with("━"));
    assert!(report.trim_end().ends_with("━"));
}
