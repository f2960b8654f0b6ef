// src/config.rs
use anyhow::{Context, Result};
use log::warn;
use std::env;

pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://finance.yahoo.com";
pub const DEFAULT_PORT: u16 = 3030;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fmp_api_key: String,
    pub fmp_base_url: String,
    pub yahoo_base_url: String,
    pub port: u16,
}

impl AppConfig {
    /// Reads the configuration from the environment. Call `dotenv().ok()` first
    /// if a `.env` file should be honored.
    pub fn from_env() -> Result<Self> {
        let fmp_api_key = env::var("FMP_API_KEY").context("FMP_API_KEY must be set")?;

        let fmp_base_url = env::var("FMP_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_FMP_BASE_URL.to_string());
        let yahoo_base_url = env::var("YAHOO_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_YAHOO_BASE_URL.to_string());

        let port = match env::var("PORT") {
            Ok(port_str) => port_str
                .parse()
                .with_context(|| format!("PORT must be a number, got {port_str:?}"))?,
            Err(_) => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        Ok(AppConfig {
            fmp_api_key,
            fmp_base_url: trim_base(fmp_base_url),
            yahoo_base_url: trim_base(yahoo_base_url),
            port,
        })
    }

    /// Configuration pointing both upstream sources at the same base URL.
    /// Used by the integration tests against a local mock server.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Self {
        AppConfig {
            fmp_api_key: api_key.into(),
            fmp_base_url: trim_base(base_url.to_string()),
            yahoo_base_url: trim_base(base_url.to_string()),
            port: DEFAULT_PORT,
        }
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
