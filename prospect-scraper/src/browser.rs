use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Scrolls the viewport to the bottom so the page performs its lazy loading.
pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// The rendering surface the traversal loop drives.
///
/// Every operation may fail: pages time out, elements disappear between
/// renders. Callers decide which failures are fatal.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Current rendered markup of the page.
    async fn current_document(&self) -> Result<String>;

    async fn execute(&self, script: &str) -> Result<()>;

    /// Whether an element matching `selector` is present. The element
    /// handle never outlives a single action, so presence plus the
    /// selector-addressed actions below cover the interaction surface.
    async fn locate(&self, selector: &str) -> Result<bool>;

    async fn send_text(&self, selector: &str, text: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Submit the form the selected element belongs to.
    async fn submit(&self, selector: &str) -> Result<()>;
}

/// Headless Chrome implementation over chromiumoxide.
///
/// One browser, one page, reused for the whole session: the traversal is
/// strictly sequential and relaunching Chrome per navigation is wasteful.
pub struct ChromeDriver {
    _browser: Browser,
    page: Page,
    _handler: JoinHandle<()>,
}

impl ChromeDriver {
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(30))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        // Drain CDP events for the lifetime of the browser.
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        Ok(Self {
            _browser: browser,
            page,
            _handler: handle,
        })
    }
}

#[async_trait]
impl Driver for ChromeDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn current_document(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))
    }

    async fn execute(&self, script: &str) -> Result<()> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Script failed: {}", e)))?;
        Ok(())
    }

    async fn locate(&self, selector: &str) -> Result<bool> {
        Ok(self.page.find_element(selector).await.is_ok())
    }

    async fn send_text(&self, selector: &str, text: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Element {} not found: {}", selector, e)))?
            .type_str(text)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Typing into {} failed: {}", selector, e)))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Element {} not found: {}", selector, e)))?
            .click()
            .await
            .map_err(|e| ScrapeError::Browser(format!("Click on {} failed: {}", selector, e)))?;
        Ok(())
    }

    async fn submit(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Element {} not found: {}", selector, e)))?
            .press_key("Enter")
            .await
            .map_err(|e| ScrapeError::Browser(format!("Submit via {} failed: {}", selector, e)))?;
        Ok(())
    }
}
