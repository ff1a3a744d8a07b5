//! Spreadsheet lookup.

use sheets_feed::{SpreadsheetEntry, Transport};

use crate::error::{exactly_one, LookupError, Result};
use crate::service::SheetsService;

const SPREADSHEETS_PATH: &str = "spreadsheets/private/full";

impl<T: Transport> SheetsService<T> {
    /// All spreadsheets visible to the authenticated account.
    pub async fn spreadsheets(&self) -> Result<Vec<SpreadsheetEntry>> {
        let url = self.config().feed_url(SPREADSHEETS_PATH);
        let feed = self.connection().get_feed::<SpreadsheetEntry>(&url, &[]).await?;
        Ok(feed.entries)
    }

    /// Fetch a spreadsheet directly by its document key.
    pub async fn spreadsheet_by_key(&self, key: &str) -> Result<SpreadsheetEntry> {
        let url = format!("{}/{key}", self.config().feed_url(SPREADSHEETS_PATH));
        self.connection()
            .get_entry(&url)
            .await?
            .ok_or_else(|| LookupError::NoEntry.into())
    }

    /// Find the single spreadsheet whose title equals `title` exactly.
    pub async fn spreadsheet_by_title(&self, title: &str) -> Result<SpreadsheetEntry> {
        let url = self.config().feed_url(SPREADSHEETS_PATH);
        let feed = self
            .connection()
            .get_feed::<SpreadsheetEntry>(&url, &[("title", title), ("title-exact", "true")])
            .await?;
        let matches = feed
            .entries
            .into_iter()
            .filter(|s| s.title == title)
            .collect();
        exactly_one(
            matches,
            LookupError::NoSpreadsheet,
            LookupError::MoreThanOneSpreadsheet,
        )
    }
}
