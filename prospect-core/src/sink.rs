//! Append-only persistence: the incremental record store and the
//! failure log. Every append leaves the file flushed and valid so a
//! crash loses at most the in-flight row.

use chrono::{DateTime, Utc};
use prospect_scraper::record::ProfileRecord;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record columns {got:?} do not match established header {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, SinkError>;

/// Incrementally-growing CSV store of profile records.
///
/// The first record written establishes the header; reopening an
/// existing store adopts its header instead. A record with a different
/// column set afterwards is a caller error.
pub struct RecordSink {
    path: PathBuf,
    columns: Option<Vec<String>>,
}

impl RecordSink {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let columns = if path.exists() && fs::metadata(path)?.len() > 0 {
            let mut reader = csv::Reader::from_path(path)?;
            let header = reader.headers()?.iter().map(String::from).collect();
            Some(header)
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            columns,
        })
    }

    pub fn append_record(&mut self, record: &ProfileRecord) -> Result<()> {
        let columns: Vec<String> = record.columns().iter().map(|c| c.to_string()).collect();

        if let Some(established) = &self.columns
            && *established != columns
        {
            return Err(SinkError::ColumnMismatch {
                expected: established.clone(),
                got: columns,
            });
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if self.columns.is_none() {
            writer.write_record(&columns)?;
            self.columns = Some(columns);
        }
        writer.write_record(record.row())?;
        writer.flush()?;

        Ok(())
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Separate append-only log of per-target failures, one row per event.
pub struct FailureLog {
    path: PathBuf,
    appended: usize,
}

impl FailureLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !path.exists() || fs::metadata(path)?.len() == 0 {
            let file = OpenOptions::new().create(true).write(true).open(path)?;
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            writer.write_record(["timestamp", "error"])?;
            writer.flush()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            appended: 0,
        })
    }

    pub fn append(&mut self, timestamp: DateTime<Utc>, message: &str) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([timestamp.to_rfc3339().as_str(), message])?;
        writer.flush()?;

        self.appended += 1;
        Ok(())
    }

    /// Failures recorded by this process, not the historical total.
    pub fn appended(&self) -> usize {
        self.appended
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
