use anyhow::{Context, Result};
use prospect_scraper::record::{parse_fields, Field};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_FIELDS: &str = "url,name,connection_degree,country,email,phone";

/// Everything the session needs, resolved once at process start from the
/// environment (a `.env` file is honored) and passed in explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    // Credentials
    pub email: String,
    pub password: String,

    // Record shape
    pub output_fields: Vec<Field>,

    // Session limits
    pub max_profile_views: usize,
    pub lazy_load_rounds: usize,

    // Candidate filtering
    pub view_specific_users: bool,
    pub specific_users_to_view: Vec<String>,

    // Recognized but unused: connect actions are out of scope.
    pub jobs_to_connect_with: Vec<String>,

    // Diagnostics only
    pub verbose: bool,

    // Locations
    pub data_dir: PathBuf,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            email: std::env::var("EMAIL").context("EMAIL must be set")?,
            password: std::env::var("PASSWORD").context("PASSWORD must be set")?,
            output_fields: parse_fields(
                &std::env::var("OUTPUT_FIELDS")
                    .unwrap_or_else(|_| DEFAULT_OUTPUT_FIELDS.to_string()),
            ),
            max_profile_views: parse_count(
                std::env::var("MAX_PROFILE_VIEWS").ok(),
                1000,
                "MAX_PROFILE_VIEWS",
            )?,
            lazy_load_rounds: parse_count(
                std::env::var("LAZY_LOAD_ROUNDS").ok(),
                5,
                "LAZY_LOAD_ROUNDS",
            )?,
            view_specific_users: env_flag("VIEW_SPECIFIC_USERS"),
            specific_users_to_view: env_list("SPECIFIC_USERS_TO_VIEW"),
            jobs_to_connect_with: env_list("JOBS_TO_CONNECT_WITH"),
            verbose: env_flag("VERBOSE"),
            data_dir: PathBuf::from(
                std::env::var("PROFILE_DATA_DIR").unwrap_or_else(|_| "profile_data".to_string()),
            ),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "https://www.linkedin.com".to_string()),
        })
    }
}

/// Absent means the default; present but unparsable is a configuration
/// error, never a silent fallback.
fn parse_count(value: Option<String>, default: usize, name: &str) -> Result<usize> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} must be an integer", name)),
        None => Ok(default),
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
