//! Service factory: turns configuration into an authenticated session.

use sheets_feed::{FeedConnection, ReqwestTransport, Transport};

use crate::config::SheetsConfig;
use crate::error::Result;

/// An authenticated session with the spreadsheet service.
///
/// Construction resolves credentials once; every operation then borrows the
/// same session. Build one per account and reuse it.
#[derive(Debug)]
pub struct SheetsService<T = ReqwestTransport> {
    conn: FeedConnection<T>,
    config: SheetsConfig,
}

impl SheetsService<ReqwestTransport> {
    /// Authenticate over HTTPS using the configured credentials.
    pub async fn connect(config: SheetsConfig) -> Result<Self> {
        Self::connect_with(ReqwestTransport::new(), config).await
    }
}

impl<T: Transport> SheetsService<T> {
    /// Authenticate over a caller-supplied transport.
    pub async fn connect_with(transport: T, config: SheetsConfig) -> Result<Self> {
        config.validate()?;
        let conn = FeedConnection::authenticate(transport, &config.credentials).await?;
        tracing::info!("Connected to spreadsheet service at {}", config.base_url);
        Ok(Self { conn, config })
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: FeedConnection<T>, config: SheetsConfig) -> Self {
        Self { conn, config }
    }

    pub fn connection(&self) -> &FeedConnection<T> {
        &self.conn
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }
}
