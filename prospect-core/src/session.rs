//! The traversal session: discover candidates from the rendered feed,
//! filter them through the ledger, visit each admissible target exactly
//! once, persist what was extracted, and keep going until the visit
//! ceiling is reached. One failing target never terminates the run.

use crate::config::Config;
use crate::ledger::Ledger;
use crate::report::SessionSummary;
use crate::sink::{FailureLog, RecordSink, SinkError};
use chrono::Utc;
use prospect_scraper::browser::{Driver, SCROLL_TO_BOTTOM};
use prospect_scraper::error::ScrapeError;
use prospect_scraper::extract::{self, LabelFilter};
use prospect_scraper::mapper;
use prospect_scraper::record::Field;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const VISITED_FILE: &str = "visited.txt";
pub const PROFILES_FILE: &str = "profiles.csv";
pub const ERROR_LOG_FILE: &str = "error_log.csv";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Reports (visited count, profile path) after each completed visit.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Bounded wait period; randomized within the window when min < max.
/// The rendering surface needs real time to settle after navigation and
/// lazy loading.
#[derive(Debug, Clone, Copy)]
pub struct DelayWindow {
    min: Duration,
    max: Duration,
}

impl DelayWindow {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn fixed(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    /// No waiting at all. Tests use this.
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub async fn wait(&self) {
        if self.max.is_zero() {
            return;
        }
        let ms = rand::rng().random_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

pub struct SessionOptions {
    pub max_profile_views: usize,
    pub lazy_load_rounds: usize,
    pub fields: Vec<Field>,
    pub label_filter: Option<LabelFilter>,
    pub base_url: String,
    pub visit_delay: DelayWindow,
    pub settle_delay: DelayWindow,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        let label_filter = config
            .view_specific_users
            .then(|| LabelFilter::new(config.specific_users_to_view.clone()));

        Self {
            max_profile_views: config.max_profile_views,
            lazy_load_rounds: config.lazy_load_rounds,
            fields: config.output_fields.clone(),
            label_filter,
            base_url: config.base_url.clone(),
            visit_delay: DelayWindow::new(Duration::from_secs(2), Duration::from_secs(3)),
            settle_delay: DelayWindow::fixed(Duration::from_secs(2)),
        }
    }
}

pub struct Session<D: Driver> {
    driver: D,
    ledger: Ledger,
    records: RecordSink,
    failures: FailureLog,
    options: SessionOptions,
    self_profile: Option<String>,
    visited_this_session: usize,
    progress_callback: Option<ProgressCallback>,
}

impl<D: Driver> Session<D> {
    /// Open (or create) the persisted state under `data_dir` and bind it
    /// to a driver for one session.
    pub fn open(driver: D, options: SessionOptions, data_dir: &Path) -> Result<Self> {
        let ledger = Ledger::open(&data_dir.join(VISITED_FILE))?;
        let records = RecordSink::open(&data_dir.join(PROFILES_FILE))?;
        let failures = FailureLog::open(&data_dir.join(ERROR_LOG_FILE))?;

        Ok(Self {
            driver,
            ledger,
            records,
            failures,
            options,
            self_profile: None,
            visited_this_session: 0,
            progress_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Pin the acting account's own identifier without going through the
    /// login flow.
    pub fn with_self_profile(mut self, id: &str) -> Self {
        self.self_profile = Some(id.to_string());
        self
    }

    /// Sign in and resolve the session's own profile identifier. A
    /// rejected credential or access error is fatal to the session.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let login_url = format!("{}/uas/login", self.options.base_url);
        self.driver.navigate(&login_url).await?;
        if !self.driver.locate("#username").await? {
            return Err(ScrapeError::Other("sign-in form not present".to_string()).into());
        }
        self.driver.send_text("#username", email).await?;
        self.driver.send_text("#password", password).await?;
        self.driver.submit("#password").await?;
        self.options.settle_delay.wait().await;

        self.driver.navigate(&self.feed_url()).await?;
        self.options.settle_delay.wait().await;

        let html = self.driver.current_document().await?;
        if let Some(reason) = extract::detect_auth_error(&html) {
            return Err(ScrapeError::Auth(reason.to_string()).into());
        }

        self.self_profile = extract::own_profile_url(&html);
        match &self.self_profile {
            Some(me) => info!("Resolved own profile: {}", me),
            None => warn!("Could not resolve own profile; self-exclusion disabled"),
        }

        Ok(())
    }

    /// Drive the session until the visit ceiling is reached. Failing
    /// rounds are logged and retried; only a broken failure log or an
    /// authentication error ends the session early.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        info!(
            "Starting traversal, ceiling {} profile views",
            self.options.max_profile_views
        );

        while self.visited_this_session < self.options.max_profile_views {
            if let Err(e) = self.discovery_round().await {
                if let SessionError::Scrape(ScrapeError::Auth(_)) = e {
                    return Err(e);
                }
                self.failures.append(Utc::now(), &e.to_string())?;
                warn!("Discovery round failed: {}", e);
                self.options.settle_delay.wait().await;
            }
        }

        info!(
            "Reached ceiling of {} profile views, shutting down gracefully",
            self.options.max_profile_views
        );
        Ok(self.summary())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            profiles_visited: self.visited_this_session,
            ceiling: self.options.max_profile_views,
            failures_logged: self.failures.appended(),
            store_path: self.records.path().to_path_buf(),
        }
    }

    pub fn visited_this_session(&self) -> usize {
        self.visited_this_session
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// One pass through Discover → Extract → Filter → Drain. An empty
    /// admissible set triggers additional content loading instead of
    /// re-extracting an unchanged document.
    async fn discovery_round(&mut self) -> Result<()> {
        self.driver.navigate(&self.feed_url()).await?;
        for _ in 0..self.options.lazy_load_rounds {
            self.scroll_and_settle().await?;
        }

        let html = self.driver.current_document().await?;
        let candidates = extract::extract_candidates(&html, self.options.label_filter.as_ref());
        debug!("Extracted {} candidates", candidates.len());

        let admissible: Vec<String> = candidates
            .into_iter()
            .filter(|id| self.ledger.is_admissible(id, self.self_profile.as_deref()))
            .collect();

        if admissible.is_empty() {
            debug!("No admissible candidates, loading more content");
            self.scroll_and_settle().await?;
            return Ok(());
        }

        for id in &admissible {
            self.ledger.enqueue(id);
        }

        for id in &admissible {
            // The ceiling is re-checked before every visit so a large
            // batch cannot overshoot it.
            if self.visited_this_session >= self.options.max_profile_views {
                return Ok(());
            }

            match self.visit_target(id).await {
                Ok(()) => {
                    self.ledger.mark_visited(id)?;
                    self.visited_this_session += 1;
                    if let Some(callback) = &self.progress_callback {
                        callback(self.visited_this_session, id.clone());
                    }
                }
                Err(e) => {
                    // Not marked visited: the target may be retried in a
                    // future run since it never durably completed.
                    self.failures.append(Utc::now(), &e.to_string())?;
                    warn!("Visit to {} failed: {}", id, e);
                }
            }
        }

        info!(
            "Visited {} unique profiles this session",
            self.visited_this_session
        );
        Ok(())
    }

    async fn visit_target(&mut self, id: &str) -> Result<()> {
        let url = format!("{}{}", self.options.base_url, id);
        info!("Visiting profile: {}", url);

        self.driver.navigate(&url).await?;
        self.options.visit_delay.wait().await;

        let html = self.driver.current_document().await?;
        let record = mapper::map_profile(&self.options.base_url, id, &html, &self.options.fields);
        self.records.append_record(&record)?;

        Ok(())
    }

    async fn scroll_and_settle(&mut self) -> Result<()> {
        self.driver.execute(SCROLL_TO_BOTTOM).await?;
        self.options.settle_delay.wait().await;
        Ok(())
    }

    fn feed_url(&self) -> String {
        format!("{}/feed/", self.options.base_url)
    }
}
