//! Worksheet locator, creator and mutator.

use sheets_feed::entry::{worksheet_insert_xml, worksheet_update_xml};
use sheets_feed::{SpreadsheetEntry, Transport, WorksheetEntry};

use crate::error::{exactly_one, LookupError, Result, SheetsError};
use crate::service::SheetsService;

impl<T: Transport> SheetsService<T> {
    /// All worksheets of a spreadsheet, in tab order.
    pub async fn worksheets(&self, spreadsheet: &SpreadsheetEntry) -> Result<Vec<WorksheetEntry>> {
        let url = spreadsheet.worksheets_feed_url()?;
        let feed = self.connection().get_feed::<WorksheetEntry>(url, &[]).await?;
        Ok(feed.entries)
    }

    /// Add a worksheet with the given dimensions and title.
    pub async fn create_worksheet(
        &self,
        spreadsheet: &SpreadsheetEntry,
        row_count: u32,
        col_count: u32,
        title: &str,
    ) -> Result<WorksheetEntry> {
        let url = spreadsheet.worksheets_feed_url()?;
        let body = worksheet_insert_xml(title, row_count, col_count);
        let created: WorksheetEntry = self
            .connection()
            .insert(url, body)
            .await?
            .ok_or(SheetsError::EmptyResponse("create worksheet"))?;
        tracing::info!(
            "Created worksheet {:?} ({row_count}x{col_count}) in {}",
            title,
            spreadsheet.key()
        );
        Ok(created)
    }

    /// Set the row count and return the refreshed worksheet.
    pub async fn update_row_count(
        &self,
        mut worksheet: WorksheetEntry,
        row_count: u32,
    ) -> Result<WorksheetEntry> {
        worksheet.row_count = row_count;
        self.save_worksheet(&worksheet).await
    }

    /// Set the column count and return the refreshed worksheet.
    pub async fn update_col_count(
        &self,
        mut worksheet: WorksheetEntry,
        col_count: u32,
    ) -> Result<WorksheetEntry> {
        worksheet.col_count = col_count;
        self.save_worksheet(&worksheet).await
    }

    /// Set the title and return the refreshed worksheet.
    pub async fn rename_worksheet(
        &self,
        mut worksheet: WorksheetEntry,
        title: &str,
    ) -> Result<WorksheetEntry> {
        worksheet.title = title.to_string();
        self.save_worksheet(&worksheet).await
    }

    /// Set row count, column count and title in one update.
    pub async fn update_worksheet(
        &self,
        mut worksheet: WorksheetEntry,
        row_count: u32,
        col_count: u32,
        title: &str,
    ) -> Result<WorksheetEntry> {
        worksheet.row_count = row_count;
        worksheet.col_count = col_count;
        worksheet.title = title.to_string();
        self.save_worksheet(&worksheet).await
    }

    async fn save_worksheet(&self, worksheet: &WorksheetEntry) -> Result<WorksheetEntry> {
        let edit_url = worksheet.edit_url()?;
        let updated: WorksheetEntry = self
            .connection()
            .update(
                edit_url,
                worksheet_update_xml(worksheet),
                worksheet.etag.as_deref(),
            )
            .await?
            .ok_or(SheetsError::EmptyResponse("update worksheet"))?;
        tracing::info!(
            "Updated worksheet {} to {:?} ({}x{})",
            updated.worksheet_id(),
            updated.title,
            updated.row_count,
            updated.col_count
        );
        Ok(updated)
    }

    /// Remove a worksheet from its spreadsheet.
    pub async fn delete_worksheet(&self, worksheet: &WorksheetEntry) -> Result<()> {
        self.connection()
            .delete(worksheet.edit_url()?, worksheet.etag.as_deref())
            .await?;
        tracing::info!("Deleted worksheet {}", worksheet.worksheet_id());
        Ok(())
    }

    /// Fetch a worksheet directly by its identifier (e.g. `od6`).
    pub async fn worksheet_by_id(
        &self,
        spreadsheet: &SpreadsheetEntry,
        id: &str,
    ) -> Result<WorksheetEntry> {
        let url = format!("{}/{id}", spreadsheet.worksheets_feed_url()?);
        self.connection()
            .get_entry(&url)
            .await?
            .ok_or_else(|| LookupError::NoEntry.into())
    }

    /// Find the single worksheet whose title equals `title` exactly.
    ///
    /// Duplicate titles are reported, never resolved; use
    /// [`worksheet_by_id`](Self::worksheet_by_id) to disambiguate.
    pub async fn worksheet_by_title(
        &self,
        spreadsheet: &SpreadsheetEntry,
        title: &str,
    ) -> Result<WorksheetEntry> {
        let url = spreadsheet.worksheets_feed_url()?;
        let feed = self
            .connection()
            .get_feed::<WorksheetEntry>(url, &[("title", title), ("title-exact", "true")])
            .await?;
        let matches = feed
            .entries
            .into_iter()
            .filter(|ws| ws.title == title)
            .collect();
        exactly_one(
            matches,
            LookupError::NoWorksheet,
            LookupError::MoreThanOneWorksheet,
        )
    }
}
