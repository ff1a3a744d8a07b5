//! Configuration for the spreadsheet binding.

use std::collections::HashMap;

use sheets_feed::{Credentials, ServiceAccount};
use url::Url;

use crate::error::{Result, SheetsError};

/// Root of the spreadsheet feeds.
pub const DEFAULT_BASE_URL: &str = "https://spreadsheets.google.com/feeds";

/// Largest number of cell entries submitted in one batch request.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Map keys understood by [`SheetsConfig::from_map`].
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access-token";
    pub const SERVICE_ACCOUNT_KEY: &str = "service-account-key";
    pub const SERVICE_ACCOUNT_KEY_FILE: &str = "service-account-key-file";
    pub const BASE_URL: &str = "base-url";
    pub const BATCH_SIZE: &str = "batch-size";
}

/// Configuration for a [`SheetsService`](crate::SheetsService).
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub credentials: Credentials,
    /// Root of the feed tree. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// Cells per batch request when writing tables. Default: 10,000.
    pub batch_size: usize,
}

impl SheetsConfig {
    /// Configuration with default endpoint and batch size.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Build a configuration from string key/value pairs.
    ///
    /// Exactly one credential source is used, in order of preference:
    /// `access-token`, `service-account-key` (inline JSON),
    /// `service-account-key-file`.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let credentials = if let Some(token) = map.get(keys::ACCESS_TOKEN) {
            Credentials::AccessToken(token.clone())
        } else if let Some(json) = map.get(keys::SERVICE_ACCOUNT_KEY) {
            Credentials::ServiceAccount(ServiceAccount::from_json(json)?)
        } else if let Some(path) = map.get(keys::SERVICE_ACCOUNT_KEY_FILE) {
            Credentials::ServiceAccount(ServiceAccount::from_file(path)?)
        } else {
            return Err(SheetsError::Config(format!(
                "no credentials: set one of {}, {} or {}",
                keys::ACCESS_TOKEN,
                keys::SERVICE_ACCOUNT_KEY,
                keys::SERVICE_ACCOUNT_KEY_FILE
            )));
        };

        let mut config = Self::new(credentials);
        if let Some(base_url) = map.get(keys::BASE_URL) {
            config.base_url = base_url.clone();
        }
        if let Some(size) = map.get(keys::BATCH_SIZE) {
            config.batch_size = size.parse().map_err(|_| {
                SheetsError::Config(format!("{} is not a number: {size:?}", keys::BATCH_SIZE))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| SheetsError::Config(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        if self.batch_size == 0 {
            return Err(SheetsError::Config("batch size must be at least 1".into()));
        }
        Ok(())
    }

    /// Absolute URL of a feed path below the base URL.
    pub fn feed_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
