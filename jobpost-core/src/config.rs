use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::logo::{DEFAULT_LOGO_ENDPOINT, DEFAULT_LOGO_TIMEOUT};

/// Runtime configuration loaded from environment variables (and `.env`).
/// Every setting is optional; unset values use the defaults below.
#[derive(Debug, Clone)]
pub struct Config {
    pub templates_dir: Option<PathBuf>,
    pub bold_font: Option<PathBuf>,
    pub regular_font: Option<PathBuf>,
    pub logo_endpoint: String,
    pub logo_timeout: Duration,
    /// Skip HTTP entirely and always use the placeholder logo.
    pub offline: bool,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: None,
            bold_font: None,
            regular_font: None,
            logo_endpoint: DEFAULT_LOGO_ENDPOINT.to_string(),
            logo_timeout: DEFAULT_LOGO_TIMEOUT,
            offline: false,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let logo_timeout = match lookup("JOBPOST_LOGO_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("JOBPOST_LOGO_TIMEOUT_SECS must be whole seconds, got '{raw}'"))?,
            ),
            None => defaults.logo_timeout,
        };

        Ok(Config {
            templates_dir: lookup("JOBPOST_TEMPLATES_DIR").map(PathBuf::from),
            bold_font: lookup("JOBPOST_FONT_BOLD").map(PathBuf::from),
            regular_font: lookup("JOBPOST_FONT_REGULAR").map(PathBuf::from),
            logo_endpoint: lookup("JOBPOST_LOGO_ENDPOINT").unwrap_or(defaults.logo_endpoint),
            logo_timeout,
            offline: lookup("JOBPOST_OFFLINE").map_or(false, |v| parse_flag(&v)),
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
