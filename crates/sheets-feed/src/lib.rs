//! Client for the Atom feeds of a remote spreadsheet service.
//!
//! The service models documents as a tree of feeds (spreadsheets, worksheets,
//! cells, list rows). Every operation is a single authenticated HTTP request
//! against one of those feeds.
//!
//! # Architecture
//!
//! - **Transport** (`transport.rs`): the HTTP seam; `reqwest` in production
//! - **XML** (`xml.rs`): element tree over `quick-xml` events
//! - **Entries** (`entry.rs`): typed feed entries and request documents
//! - **Batch** (`batch.rs`): batch feed encoding and per-entry results
//! - **Auth** (`auth.rs`): bearer tokens and service account JWT exchange
//!
//! `connection.rs` ties them together in `FeedConnection`.
//!
//! # Example
//!
//! ```rust,no_run
//! use sheets_feed::{Credentials, FeedConnection, ReqwestTransport, WorksheetEntry};
//!
//! # async fn example() -> sheets_feed::Result<()> {
//! let credentials = Credentials::AccessToken("ya29.token".into());
//! let conn = FeedConnection::authenticate(ReqwestTransport::new(), &credentials).await?;
//! let feed = conn
//!     .get_feed::<WorksheetEntry>(
//!         "https://spreadsheets.google.com/feeds/worksheets/KEY/private/full",
//!         &[],
//!     )
//!     .await?;
//! for ws in &feed.entries {
//!     println!("{} ({}x{})", ws.title, ws.row_count, ws.col_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod batch;
pub mod connection;
pub mod entry;
pub mod error;
pub mod transport;
pub mod xml;

pub use auth::{Credentials, ServiceAccount};
pub use batch::{BatchOperation, BatchResult, CellUpdate};
pub use connection::FeedConnection;
pub use entry::{CellEntry, Feed, FeedEntry, Link, ListEntry, SpreadsheetEntry, WorksheetEntry};
pub use error::{FeedError, Result};
pub use transport::{FeedResponse, ReqwestTransport, Transport};
