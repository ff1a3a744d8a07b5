//! Typed feed entries and request documents.
//!
//! The service exposes a tree of Atom feeds:
//!
//! ```text
//! spreadsheets feed
//!   └── spreadsheet entry ── worksheets feed
//!         └── worksheet entry ── cells feed  (one entry per non-empty cell)
//!                              └── list feed (one entry per data row)
//! ```
//!
//! Entries never own their children; they carry the link relations needed
//! to reach them.

use std::collections::BTreeMap;

use crate::error::{FeedError, Result};
use crate::xml::{escape, escape_attr, is_ncname, XmlElement};

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const GS_NS: &str = "http://schemas.google.com/spreadsheets/2006";
pub const GSX_NS: &str = "http://schemas.google.com/spreadsheets/2006/extended";
pub const GD_NS: &str = "http://schemas.google.com/g/2005";
pub const BATCH_NS: &str = "http://schemas.google.com/gdata/batch";

/// Link relation names used by the spreadsheet feeds.
pub mod rel {
    pub const WORKSHEETS_FEED: &str = "http://schemas.google.com/spreadsheets/2006#worksheetsfeed";
    pub const CELLS_FEED: &str = "http://schemas.google.com/spreadsheets/2006#cellsfeed";
    pub const LIST_FEED: &str = "http://schemas.google.com/spreadsheets/2006#listfeed";
    pub const FEED: &str = "http://schemas.google.com/g/2005#feed";
    pub const POST: &str = "http://schemas.google.com/g/2005#post";
    pub const BATCH: &str = "http://schemas.google.com/g/2005#batch";
    pub const EDIT: &str = "edit";
    pub const SELF: &str = "self";
}

/// An Atom `<link>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub rel: String,
    pub href: String,
    pub content_type: Option<String>,
}

fn parse_links(element: &XmlElement) -> Vec<Link> {
    element
        .children_named("link")
        .filter_map(|link| {
            Some(Link {
                rel: link.attr("rel")?.to_string(),
                href: link.attr("href")?.to_string(),
                content_type: link.attr("type").map(str::to_string),
            })
        })
        .collect()
}

fn find_link<'a>(links: &'a [Link], relation: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|l| l.rel == relation)
        .map(|l| l.href.as_str())
}

fn require_link<'a>(links: &'a [Link], relation: &str) -> Result<&'a str> {
    find_link(links, relation).ok_or_else(|| FeedError::MissingLink(relation.to_string()))
}

fn last_segment(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}

fn required_text(element: &XmlElement, local: &str) -> Result<String> {
    element
        .child_text(local)
        .map(|t| t.trim().to_string())
        .ok_or_else(|| {
            FeedError::Malformed(format!("<{}> is missing <{local}>", element.local_name()))
        })
}

fn parse_count(element: &XmlElement, local: &str) -> Result<u32> {
    let text = required_text(element, local)?;
    text.parse()
        .map_err(|_| FeedError::Malformed(format!("<{local}> is not a count: {text:?}")))
}

fn parse_index(raw: Option<&str>, what: &str) -> Result<u32> {
    let raw = raw.ok_or_else(|| FeedError::Malformed(format!("cell is missing {what}")))?;
    raw.parse()
        .map_err(|_| FeedError::Malformed(format!("cell {what} is not a number: {raw:?}")))
}

/// An entry type that can be decoded from an Atom `<entry>` element.
pub trait FeedEntry: Sized {
    fn from_element(element: &XmlElement) -> Result<Self>;

    /// Decode a standalone entry document.
    fn parse(input: &[u8]) -> Result<Self> {
        let root = XmlElement::parse(input)?;
        if root.local_name() != "entry" {
            return Err(FeedError::Malformed(format!(
                "expected <entry>, found <{}>",
                root.name
            )));
        }
        Self::from_element(&root)
    }
}

/// A feed: a titled collection of entries plus its own links.
#[derive(Debug, Clone)]
pub struct Feed<E> {
    pub title: String,
    pub entries: Vec<E>,
    pub links: Vec<Link>,
}

impl<E: FeedEntry> Feed<E> {
    pub fn parse(input: &[u8]) -> Result<Self> {
        let root = XmlElement::parse(input)?;
        if root.local_name() != "feed" {
            return Err(FeedError::Malformed(format!(
                "expected <feed>, found <{}>",
                root.name
            )));
        }
        let entries = root
            .children_named("entry")
            .map(E::from_element)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            title: root.child_text("title").unwrap_or_default().to_string(),
            entries,
            links: parse_links(&root),
        })
    }
}

impl<E> Feed<E> {
    /// Endpoint accepting batch submissions for this feed.
    pub fn batch_url(&self) -> Result<&str> {
        require_link(&self.links, rel::BATCH)
    }

    /// Endpoint accepting inserts for this feed.
    pub fn post_url(&self) -> Result<&str> {
        require_link(&self.links, rel::POST)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A spreadsheet document visible to the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetEntry {
    pub id: String,
    pub title: String,
    pub etag: Option<String>,
    pub links: Vec<Link>,
}

impl SpreadsheetEntry {
    /// The document key (last segment of the entry id).
    pub fn key(&self) -> &str {
        last_segment(&self.id)
    }

    pub fn worksheets_feed_url(&self) -> Result<&str> {
        require_link(&self.links, rel::WORKSHEETS_FEED)
    }
}

impl FeedEntry for SpreadsheetEntry {
    fn from_element(element: &XmlElement) -> Result<Self> {
        Ok(Self {
            id: required_text(element, "id")?,
            title: element.child_text("title").unwrap_or_default().to_string(),
            etag: element.attr("etag").map(str::to_string),
            links: parse_links(element),
        })
    }
}

/// One worksheet (tab) of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetEntry {
    pub id: String,
    pub title: String,
    pub row_count: u32,
    pub col_count: u32,
    pub etag: Option<String>,
    pub links: Vec<Link>,
}

impl WorksheetEntry {
    /// The worksheet identifier within its spreadsheet (e.g. `od6`).
    pub fn worksheet_id(&self) -> &str {
        last_segment(&self.id)
    }

    pub fn cells_feed_url(&self) -> Result<&str> {
        require_link(&self.links, rel::CELLS_FEED)
    }

    pub fn list_feed_url(&self) -> Result<&str> {
        require_link(&self.links, rel::LIST_FEED)
    }

    pub fn edit_url(&self) -> Result<&str> {
        require_link(&self.links, rel::EDIT)
    }
}

impl FeedEntry for WorksheetEntry {
    fn from_element(element: &XmlElement) -> Result<Self> {
        Ok(Self {
            id: required_text(element, "id")?,
            title: element.child_text("title").unwrap_or_default().to_string(),
            row_count: parse_count(element, "rowCount")?,
            col_count: parse_count(element, "colCount")?,
            etag: element.attr("etag").map(str::to_string),
            links: parse_links(element),
        })
    }
}

/// A single cell from the cells feed. Rows and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEntry {
    pub id: String,
    pub row: u32,
    pub col: u32,
    /// What the user typed, formulas included.
    pub input_value: String,
    /// The displayed (computed) value.
    pub value: String,
    pub etag: Option<String>,
    pub links: Vec<Link>,
}

impl CellEntry {
    pub fn batch_id(&self) -> String {
        format!("R{}C{}", self.row, self.col)
    }

    pub fn edit_url(&self) -> Result<&str> {
        require_link(&self.links, rel::EDIT)
    }
}

impl FeedEntry for CellEntry {
    fn from_element(element: &XmlElement) -> Result<Self> {
        let cell = element
            .child("cell")
            .ok_or_else(|| FeedError::Malformed("cell entry is missing <gs:cell>".into()))?;
        Ok(Self {
            id: required_text(element, "id")?,
            row: parse_index(cell.attr("row"), "row")?,
            col: parse_index(cell.attr("col"), "col")?,
            input_value: cell.attr("inputValue").unwrap_or_default().to_string(),
            value: cell.text.clone(),
            etag: element.attr("etag").map(str::to_string),
            links: parse_links(element),
        })
    }
}

/// A data row from the list feed, keyed by normalized column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    pub title: String,
    pub values: BTreeMap<String, String>,
    pub etag: Option<String>,
    pub links: Vec<Link>,
}

impl FeedEntry for ListEntry {
    fn from_element(element: &XmlElement) -> Result<Self> {
        let values = element
            .children
            .iter()
            .filter(|c| c.prefix() == Some("gsx"))
            .map(|c| (c.local_name().to_string(), c.text.clone()))
            .collect();
        Ok(Self {
            id: required_text(element, "id")?,
            title: element.child_text("title").unwrap_or_default().to_string(),
            values,
            etag: element.attr("etag").map(str::to_string),
            links: parse_links(element),
        })
    }
}

/// Normalize a header cell into the key the list feed uses for it:
/// lowercase, with everything except letters, digits, `-` and `.` removed.
pub fn column_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '.')
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// Request documents
// ============================================================================

/// Body for inserting a new worksheet into a worksheets feed.
pub fn worksheet_insert_xml(title: &str, row_count: u32, col_count: u32) -> String {
    format!(
        r#"<entry xmlns="{ATOM_NS}" xmlns:gs="{GS_NS}">
  <title>{}</title>
  <gs:rowCount>{row_count}</gs:rowCount>
  <gs:colCount>{col_count}</gs:colCount>
</entry>"#,
        escape(title)
    )
}

/// Body for replacing a worksheet's title and dimensions.
pub fn worksheet_update_xml(worksheet: &WorksheetEntry) -> String {
    format!(
        r#"<entry xmlns="{ATOM_NS}" xmlns:gs="{GS_NS}">
  <id>{}</id>
  <title>{}</title>
  <gs:rowCount>{}</gs:rowCount>
  <gs:colCount>{}</gs:colCount>
</entry>"#,
        escape(&worksheet.id),
        escape(&worksheet.title),
        worksheet.row_count,
        worksheet.col_count
    )
}

/// Body for a single-cell write against a cells feed.
pub fn cell_update_xml(cells_feed_url: &str, row: u32, col: u32, value: &str) -> String {
    format!(
        r#"<entry xmlns="{ATOM_NS}" xmlns:gs="{GS_NS}">
  <id>{}/R{row}C{col}</id>
  <link rel="edit" type="application/atom+xml" href="{}/R{row}C{col}"/>
  <gs:cell row="{row}" col="{col}" inputValue="{}"/>
</entry>"#,
        escape(cells_feed_url),
        escape(cells_feed_url),
        escape_attr(value)
    )
}

/// Body for appending a row to a list feed.
///
/// Fails when a column header does not normalize to a usable element name,
/// e.g. `"($)"` (nothing left) or `"2024"` (starts with a digit).
pub fn list_entry_xml(values: &BTreeMap<String, String>) -> Result<String> {
    let mut content = format!(r#"<entry xmlns="{ATOM_NS}" xmlns:gsx="{GSX_NS}">"#);
    for (column, value) in values {
        let key = column_key(column);
        if !is_ncname(&key) {
            return Err(FeedError::Malformed(format!(
                "column {column:?} has no valid list feed key (normalized to {key:?})"
            )));
        }
        content.push_str(&format!("\n  <gsx:{key}>{}</gsx:{key}>", escape(value)));
    }
    content.push_str("\n</entry>");
    Ok(content)
}
