//! Combined dedup state: the durable cross-run visited set plus the
//! in-memory set of identifiers admitted this session.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct Ledger {
    path: PathBuf,
    visited: HashSet<String>,
    queued: HashSet<String>,
}

impl Ledger {
    /// Open the visited-identifier file, creating it if absent, and load
    /// the full history. The file is append-only from here on.
    pub fn open(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "")?;
        }

        let visited: HashSet<String> = fs::read_to_string(path)?
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        info!(
            "Loaded {} previously visited identifiers from {}",
            visited.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            visited,
            queued: HashSet::new(),
        })
    }

    /// Whether a candidate may be visited this run. Checks run in order:
    /// structural shape, own identity, this session's queue, history.
    /// Each guards its own invariant: never visit a non-profile resource,
    /// never visit yourself, never double-admit within a run, never
    /// re-approach a target across runs.
    pub fn is_admissible(&self, id: &str, self_id: Option<&str>) -> bool {
        is_profile_reference(id)
            && self_id != Some(id)
            && !self.queued.contains(id)
            && !self.visited.contains(id)
    }

    /// Admit a candidate for this session so later extraction rounds
    /// cannot enqueue it twice.
    pub fn enqueue(&mut self, id: &str) {
        self.queued.insert(id.to_string());
    }

    /// Durably record a completed visit. Idempotent: a repeated call for
    /// the same identifier writes nothing.
    pub fn mark_visited(&mut self, id: &str) -> io::Result<()> {
        if !self.visited.insert(id.to_string()) {
            debug!("{} already marked visited", id);
            return Ok(());
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", id)?;
        file.flush()
    }

    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Structural filter: a genuine profile reference, not a connections
/// list or skills page. The exclusions are substring heuristics carried
/// over from the site's URL shapes, not an exhaustive path grammar.
fn is_profile_reference(id: &str) -> bool {
    id.contains("/in/") && !id.contains("connections") && !id.contains("skills")
}
