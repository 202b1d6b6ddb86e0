use std::path::PathBuf;

/// Outcome of one traversal session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub profiles_visited: usize,
    pub ceiling: usize,
    pub failures_logged: usize,
    pub store_path: PathBuf,
}

/// Render the end-of-session report shown to the user.
pub fn generate_session_report(summary: &SessionSummary) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Session summary:\n");
    report.push_str(&format!(
        "  Profiles visited: {} (ceiling {})\n",
        summary.profiles_visited, summary.ceiling
    ));
    report.push_str(&format!(
        "  Failures logged:  {}\n",
        summary.failures_logged
    ));
    report.push_str(&format!(
        "  Record store:     {}\n",
        summary.store_path.display()
    ));
    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report
}
