//! Batch submissions against the cells feed.
//!
//! A batch bundles many cell operations into one POST. Each entry carries a
//! client-chosen `batch:id` (we use `R<row>C<col>`) and a `batch:operation`;
//! the response echoes the id with a per-entry `batch:status`.

use std::fmt;

use crate::entry::{ATOM_NS, BATCH_NS, GS_NS};
use crate::error::{FeedError, Result};
use crate::xml::{escape, escape_attr, XmlElement};

/// Operation type of a batch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Query,
    Insert,
    Update,
    Delete,
}

impl BatchOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchOperation::Query => "query",
            BatchOperation::Insert => "insert",
            BatchOperation::Update => "update",
            BatchOperation::Delete => "delete",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "query" => Some(BatchOperation::Query),
            "insert" => Some(BatchOperation::Insert),
            "update" => Some(BatchOperation::Update),
            "delete" => Some(BatchOperation::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value to write into one cell. Rows and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub row: u32,
    pub col: u32,
    pub value: String,
}

impl CellUpdate {
    pub fn new(row: u32, col: u32, value: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: value.into(),
        }
    }

    /// Synthetic batch id, `R<row>C<col>`.
    pub fn batch_id(&self) -> String {
        format!("R{}C{}", self.row, self.col)
    }
}

/// Build the batch feed document for a set of cell updates.
///
/// Every entry is an `update` addressed at `<cells feed>/R<row>C<col>`.
pub fn build_cell_batch(cells_feed_url: &str, updates: &[CellUpdate]) -> String {
    let feed_url = escape(cells_feed_url);
    let mut content = format!(
        r#"<feed xmlns="{ATOM_NS}" xmlns:batch="{BATCH_NS}" xmlns:gs="{GS_NS}">
  <id>{feed_url}</id>"#
    );

    for update in updates {
        let batch_id = update.batch_id();
        content.push_str(&format!(
            r#"
  <entry>
    <batch:id>{batch_id}</batch:id>
    <batch:operation type="{}"/>
    <id>{feed_url}/{batch_id}</id>
    <link rel="edit" type="application/atom+xml" href="{feed_url}/{batch_id}"/>
    <gs:cell row="{}" col="{}" inputValue="{}"/>
  </entry>"#,
            BatchOperation::Update,
            update.row,
            update.col,
            escape_attr(&update.value)
        ));
    }

    content.push_str("\n</feed>");
    content
}

/// Per-entry outcome reported in a batch response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub batch_id: String,
    pub operation: Option<BatchOperation>,
    pub status_code: u16,
    pub reason: String,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Decode the per-entry statuses from a batch response feed.
pub fn parse_batch_response(input: &[u8]) -> Result<Vec<BatchResult>> {
    let root = XmlElement::parse(input)?;
    if root.local_name() != "feed" {
        return Err(FeedError::Malformed(format!(
            "expected batch <feed>, found <{}>",
            root.name
        )));
    }

    root.children_named("entry")
        .map(|entry| -> Result<BatchResult> {
            let status = entry
                .child("status")
                .ok_or_else(|| FeedError::Malformed("batch entry is missing <batch:status>".into()))?;
            let code = status.attr("code").unwrap_or_default();
            let status_code: u16 = code.parse().map_err(|_| {
                FeedError::Malformed(format!("batch status code is not a number: {code:?}"))
            })?;
            Ok(BatchResult {
                batch_id: entry
                    .children
                    .iter()
                    .find(|c| c.local_name() == "id" && c.prefix() == Some("batch"))
                    .map(|c| c.text.trim().to_string())
                    .unwrap_or_default(),
                operation: entry
                    .child("operation")
                    .and_then(|op| op.attr("type"))
                    .and_then(BatchOperation::from_wire),
                status_code,
                reason: status.attr("reason").unwrap_or_default().to_string(),
            })
        })
        .collect()
}
