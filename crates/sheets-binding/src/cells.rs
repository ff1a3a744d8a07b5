//! Cell reads and batched cell writes.
//!
//! Writes go through the cells feed's batch endpoint: the endpoint is
//! discovered with one read of the cells feed, then each chunk of at most
//! `batch_size` updates is submitted as one unconditional (`If-Match: *`)
//! batch request. A failed request fails its whole chunk; per-entry failures
//! inside a successful request are reported back to the caller.

use sheets_feed::batch::build_cell_batch;
use sheets_feed::entry::cell_update_xml;
use sheets_feed::{BatchResult, CellEntry, CellUpdate, Transport, WorksheetEntry};

use crate::error::{exactly_one, LookupError, Result, SheetsError};
use crate::service::SheetsService;

/// Outcome of [`SheetsService::write_table`].
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// The worksheet after any resize.
    pub worksheet: WorksheetEntry,
    pub batches: usize,
    pub cells: usize,
    /// Entries the service rejected inside otherwise successful batches.
    pub failures: Vec<BatchResult>,
}

/// Split updates into consecutive chunks of at most `size` entries.
pub fn chunk_updates(updates: &[CellUpdate], size: usize) -> std::slice::Chunks<'_, CellUpdate> {
    updates.chunks(size.max(1))
}

/// Lay out a header and data rows as cell updates: the header on row 1,
/// data from row 2, columns from 1. Header cells come first.
pub fn table_updates<S: AsRef<str>>(header: &[S], rows: &[Vec<String>]) -> Vec<CellUpdate> {
    let mut updates = Vec::with_capacity(header.len() + rows.iter().map(Vec::len).sum::<usize>());
    for (c, name) in header.iter().enumerate() {
        updates.push(CellUpdate::new(1, c as u32 + 1, name.as_ref()));
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            updates.push(CellUpdate::new(r as u32 + 2, c as u32 + 1, value.clone()));
        }
    }
    updates
}

fn check_address(row: u32, col: u32) -> Result<()> {
    if row == 0 || col == 0 {
        return Err(SheetsError::InvalidCell { row, col });
    }
    Ok(())
}

impl<T: Transport> SheetsService<T> {
    /// Fetch one cell. Cells that were never written are reported as
    /// [`LookupError::NoCell`].
    pub async fn cell(&self, worksheet: &WorksheetEntry, row: u32, col: u32) -> Result<CellEntry> {
        check_address(row, col)?;
        let (row_s, col_s) = (row.to_string(), col.to_string());
        let feed = self
            .connection()
            .get_feed::<CellEntry>(
                worksheet.cells_feed_url()?,
                &[
                    ("min-row", row_s.as_str()),
                    ("max-row", row_s.as_str()),
                    ("min-col", col_s.as_str()),
                    ("max-col", col_s.as_str()),
                ],
            )
            .await?;
        let matches = feed
            .entries
            .into_iter()
            .filter(|c| c.row == row && c.col == col)
            .collect();
        exactly_one(matches, LookupError::NoCell, LookupError::MoreThanOneCell)
    }

    /// Overwrite a single cell.
    pub async fn update_cell(
        &self,
        worksheet: &WorksheetEntry,
        row: u32,
        col: u32,
        value: &str,
    ) -> Result<CellEntry> {
        check_address(row, col)?;
        let cells_url = worksheet.cells_feed_url()?;
        let edit_url = format!("{cells_url}/R{row}C{col}");
        let cell: CellEntry = self
            .connection()
            .update(&edit_url, cell_update_xml(cells_url, row, col, value), None)
            .await?
            .ok_or(SheetsError::EmptyResponse("update cell"))?;
        Ok(cell)
    }

    async fn discover_batch_url(&self, cells_url: &str) -> Result<String> {
        let feed = self
            .connection()
            .get_feed::<CellEntry>(cells_url, &[("max-results", "1")])
            .await?;
        Ok(feed.batch_url()?.to_string())
    }

    async fn submit_batch(
        &self,
        batch_url: &str,
        cells_url: &str,
        chunk: &[CellUpdate],
    ) -> Result<Vec<BatchResult>> {
        let results = self
            .connection()
            .batch(batch_url, build_cell_batch(cells_url, chunk))
            .await?;
        for failed in results.iter().filter(|r| !r.is_success()) {
            tracing::warn!(
                "Batch entry {} failed: {} {}",
                failed.batch_id,
                failed.status_code,
                failed.reason
            );
        }
        Ok(results)
    }

    /// Write a set of cells in one batch request.
    ///
    /// Callers with more than `batch_size` updates should split them with
    /// [`chunk_updates`] or use [`write_table`](Self::write_table).
    pub async fn batch_update_cells(
        &self,
        worksheet: &WorksheetEntry,
        updates: &[CellUpdate],
    ) -> Result<Vec<BatchResult>> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }
        for update in updates {
            check_address(update.row, update.col)?;
        }
        let cells_url = worksheet.cells_feed_url()?;
        let batch_url = self.discover_batch_url(cells_url).await?;
        self.submit_batch(&batch_url, cells_url, updates).await
    }

    /// Write a header row and data rows starting at A1.
    ///
    /// The worksheet is grown first if it is too small to hold the table.
    /// Updates are submitted in chunks of `batch_size`, widened to the header
    /// length when the header alone is longer, so the first chunk always
    /// holds the whole header.
    pub async fn write_table<S: AsRef<str>>(
        &self,
        worksheet: WorksheetEntry,
        header: &[S],
        rows: &[Vec<String>],
    ) -> Result<WriteSummary> {
        let updates = table_updates(header, rows);
        let needed_rows = rows.len() as u32 + 1;
        let needed_cols = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0) as u32;

        let worksheet = if worksheet.row_count < needed_rows || worksheet.col_count < needed_cols {
            let row_count = worksheet.row_count.max(needed_rows);
            let col_count = worksheet.col_count.max(needed_cols);
            let title = worksheet.title.clone();
            self.update_worksheet(worksheet, row_count, col_count, &title)
                .await?
        } else {
            worksheet
        };

        let mut summary = WriteSummary {
            worksheet,
            batches: 0,
            cells: updates.len(),
            failures: Vec::new(),
        };
        if updates.is_empty() {
            return Ok(summary);
        }

        let cells_url = summary.worksheet.cells_feed_url()?.to_string();
        let batch_url = self.discover_batch_url(&cells_url).await?;
        let chunk_size = self.config().batch_size.max(header.len());
        for chunk in chunk_updates(&updates, chunk_size) {
            let results = self.submit_batch(&batch_url, &cells_url, chunk).await?;
            summary.batches += 1;
            summary
                .failures
                .extend(results.into_iter().filter(|r| !r.is_success()));
        }

        tracing::info!(
            "Wrote {} cells to worksheet {} in {} batch(es)",
            summary.cells,
            summary.worksheet.worksheet_id(),
            summary.batches
        );
        Ok(summary)
    }

    /// Read every non-empty cell into a row-major grid of displayed values.
    ///
    /// The grid extends to the last row and column holding a value; gaps
    /// are empty strings.
    pub async fn read_table(&self, worksheet: &WorksheetEntry) -> Result<Vec<Vec<String>>> {
        let feed = self
            .connection()
            .get_feed::<CellEntry>(worksheet.cells_feed_url()?, &[])
            .await?;

        let rows = feed.entries.iter().map(|c| c.row).max().unwrap_or(0) as usize;
        let cols = feed.entries.iter().map(|c| c.col).max().unwrap_or(0) as usize;
        let mut grid = vec![vec![String::new(); cols]; rows];
        for cell in feed.entries {
            if cell.row == 0 || cell.col == 0 {
                continue;
            }
            grid[cell.row as usize - 1][cell.col as usize - 1] = cell.value;
        }
        Ok(grid)
    }
}
