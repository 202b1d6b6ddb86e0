pub mod browser;
pub mod error;
pub mod extract;
pub mod mapper;
pub mod record;

pub use browser::{ChromeDriver, Driver};
pub use error::ScrapeError;
pub use record::{Field, ProfileRecord, UNAVAILABLE};
