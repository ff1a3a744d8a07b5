//! High-level binding for a remote spreadsheet service.
//!
//! Maps configuration and simple calls onto the service's document model:
//! authenticate, find spreadsheets and worksheets by key, identifier or exact
//! title, create and resize worksheets, and write cells in batches.
//!
//! # Architecture
//!
//! ```text
//! Your code
//!     └── SheetsService (this crate)
//!           └── FeedConnection (sheets-feed crate)
//!                 └── HTTPS to the spreadsheet feeds
//! ```
//!
//! Lookups that find nothing, or more than one candidate, fail with
//! [`SheetsError::Lookup`] carrying a [`LookupError`] reason. Writes whose
//! response carries no entry fail with [`SheetsError::EmptyResponse`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use sheets_binding::{LookupError, SheetsConfig, SheetsService};
//!
//! # async fn example() -> sheets_binding::Result<()> {
//! let mut settings = HashMap::new();
//! settings.insert("service-account-key-file".to_string(), "key.json".to_string());
//! let service = SheetsService::connect(SheetsConfig::from_map(&settings)?).await?;
//!
//! let doc = service.spreadsheet_by_title("Timesheets").await?;
//! let sheet = match service.worksheet_by_title(&doc, "March").await {
//!     Ok(sheet) => sheet,
//!     Err(e) if e.lookup() == Some(LookupError::NoWorksheet) => {
//!         service.create_worksheet(&doc, 100, 4, "March").await?
//!     }
//!     Err(e) => return Err(e),
//! };
//!
//! let rows = vec![vec!["alice".to_string(), "12".to_string()]];
//! service.write_table(sheet, &["name", "hours"], &rows).await?;
//! # Ok(())
//! # }
//! ```

pub mod cells;
pub mod config;
pub mod error;
pub mod rows;
pub mod service;
pub mod spreadsheet;
pub mod worksheet;

pub use cells::{chunk_updates, table_updates, WriteSummary};
pub use config::SheetsConfig;
pub use error::{LookupError, Result, SheetsError};
pub use service::SheetsService;

pub use sheets_feed::{
    BatchResult, CellEntry, CellUpdate, Credentials, ListEntry, SpreadsheetEntry, WorksheetEntry,
};
