//! Row access through the list feed.
//!
//! The list feed treats row 1 as a header and exposes every following row as
//! a map from normalized header (see [`column_key`]) to value.

use std::collections::BTreeMap;

use sheets_feed::entry::list_entry_xml;
pub use sheets_feed::entry::column_key;
use sheets_feed::{ListEntry, Transport, WorksheetEntry};

use crate::error::{Result, SheetsError};
use crate::service::SheetsService;

impl<T: Transport> SheetsService<T> {
    /// All data rows below the header.
    pub async fn rows(&self, worksheet: &WorksheetEntry) -> Result<Vec<ListEntry>> {
        let feed = self
            .connection()
            .get_feed::<ListEntry>(worksheet.list_feed_url()?, &[])
            .await?;
        Ok(feed.entries)
    }

    /// Append a row after the last data row.
    ///
    /// Headers that do not normalize to a usable key fail before anything
    /// is sent.
    pub async fn insert_row(
        &self,
        worksheet: &WorksheetEntry,
        values: &BTreeMap<String, String>,
    ) -> Result<ListEntry> {
        let row: ListEntry = self
            .connection()
            .insert(worksheet.list_feed_url()?, list_entry_xml(values)?)
            .await?
            .ok_or(SheetsError::EmptyResponse("insert row"))?;
        tracing::debug!("Inserted row {} into {}", row.id, worksheet.worksheet_id());
        Ok(row)
    }
}
