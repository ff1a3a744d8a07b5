//! Fake spreadsheet service and feed fixtures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::{Method, Request, StatusCode};
use sheets_binding::{Credentials, SheetsConfig, SheetsService, SpreadsheetEntry, WorksheetEntry};
use sheets_feed::entry::{rel, Link};
use sheets_feed::xml::{escape, XmlElement};
use sheets_feed::{FeedEntry, FeedResponse, Result, Transport};

pub const HOST: &str = "https://sheets.test";
pub const BASE: &str = "https://sheets.test/feeds";
pub const KEY: &str = "key1";
pub const TOKEN: &str = "ya29.test-token";

/// A request as the fake saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub if_match: Option<String>,
    pub gdata_version: Option<String>,
    pub body: Option<String>,
}

impl SeenRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_xml(&self) -> XmlElement {
        XmlElement::parse(self.body.as_deref().unwrap_or_default().as_bytes()).unwrap()
    }
}

#[derive(Debug, Default)]
struct State {
    routes: HashMap<(Method, String), (StatusCode, String)>,
    seen: Vec<SeenRequest>,
}

/// In-memory stand-in for the remote service. Unrouted requests get a 404.
#[derive(Debug, Clone, Default)]
pub struct FakeService {
    state: Arc<Mutex<State>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, method: Method, path: &str, status: StatusCode, body: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert((method, path.to_string()), (status, body.into()));
    }

    pub fn ok(&self, method: Method, path: &str, body: impl Into<String>) {
        self.route(method, path, StatusCode::OK, body);
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.lock().unwrap().seen.clone()
    }

    pub fn requests_for(&self, method: &Method, path: &str) -> Vec<SeenRequest> {
        self.requests()
            .into_iter()
            .filter(|r| &r.method == method && r.path == path)
            .collect()
    }
}

fn header(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl Transport for FakeService {
    async fn send(&self, request: Request) -> Result<FeedResponse> {
        let seen = SeenRequest {
            method: request.method().clone(),
            path: request.url().path().to_string(),
            query: request
                .url()
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            authorization: header(&request, "authorization"),
            if_match: header(&request, "if-match"),
            gdata_version: header(&request, "gdata-version"),
            body: request
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| String::from_utf8_lossy(b).into_owned()),
        };

        let mut state = self.state.lock().unwrap();
        let response = match state.routes.get(&(seen.method.clone(), seen.path.clone())) {
            Some((status, body)) => FeedResponse::new(*status, body.clone()),
            None => FeedResponse::new(StatusCode::NOT_FOUND, "Not found"),
        };
        state.seen.push(seen);
        Ok(response)
    }
}

pub fn config() -> SheetsConfig {
    let mut config = SheetsConfig::new(Credentials::AccessToken(TOKEN.to_string()));
    config.base_url = BASE.to_string();
    config
}

pub async fn service(fake: &FakeService) -> SheetsService<FakeService> {
    SheetsService::connect_with(fake.clone(), config()).await.unwrap()
}

// ============================================================================
// Paths
// ============================================================================

pub fn spreadsheets_path() -> String {
    "/feeds/spreadsheets/private/full".to_string()
}

pub fn worksheets_path() -> String {
    format!("/feeds/worksheets/{KEY}/private/full")
}

pub fn edit_path(ws: &str) -> String {
    format!("{}/{ws}/v1", worksheets_path())
}

pub fn cells_path(ws: &str) -> String {
    format!("/feeds/cells/{KEY}/{ws}/private/full")
}

pub fn batch_path(ws: &str) -> String {
    format!("{}/batch", cells_path(ws))
}

pub fn list_path(ws: &str) -> String {
    format!("/feeds/list/{KEY}/{ws}/private/full")
}

pub fn url(path: &str) -> String {
    format!("{HOST}{path}")
}

// ============================================================================
// Documents
// ============================================================================

pub fn spreadsheet() -> SpreadsheetEntry {
    SpreadsheetEntry {
        id: format!("{BASE}/spreadsheets/private/full/{KEY}"),
        title: "Budget".to_string(),
        etag: None,
        links: vec![Link {
            rel: rel::WORKSHEETS_FEED.to_string(),
            href: url(&worksheets_path()),
            content_type: Some("application/atom+xml".to_string()),
        }],
    }
}

pub fn spreadsheet_xml(key: &str, title: &str) -> String {
    let title = escape(title);
    format!(
        r#"<entry>
    <id>{BASE}/spreadsheets/private/full/{key}</id>
    <title type="text">{title}</title>
    <link rel="{}" type="application/atom+xml" href="{HOST}/feeds/worksheets/{key}/private/full"/>
  </entry>"#,
        rel::WORKSHEETS_FEED
    )
}

pub fn worksheet_xml(ws: &str, title: &str, rows: u32, cols: u32) -> String {
    let title = escape(title);
    format!(
        r#"<entry gd:etag="W/&quot;{ws}-v1&quot;">
    <id>{HOST}{}/{ws}</id>
    <title type="text">{title}</title>
    <link rel="{}" type="application/atom+xml" href="{}"/>
    <link rel="{}" type="application/atom+xml" href="{}"/>
    <link rel="edit" type="application/atom+xml" href="{}"/>
    <gs:rowCount>{rows}</gs:rowCount>
    <gs:colCount>{cols}</gs:colCount>
  </entry>"#,
        worksheets_path(),
        rel::CELLS_FEED,
        url(&cells_path(ws)),
        rel::LIST_FEED,
        url(&list_path(ws)),
        url(&edit_path(ws)),
    )
}

pub fn worksheet(ws: &str, title: &str, rows: u32, cols: u32) -> WorksheetEntry {
    WorksheetEntry::parse(worksheet_xml(ws, title, rows, cols).as_bytes()).unwrap()
}

pub fn cell_xml(ws: &str, row: u32, col: u32, input: &str, value: &str) -> String {
    format!(
        r#"<entry>
    <id>{}/R{row}C{col}</id>
    <link rel="edit" type="application/atom+xml" href="{}/R{row}C{col}/1"/>
    <gs:cell row="{row}" col="{col}" inputValue="{input}">{value}</gs:cell>
  </entry>"#,
        url(&cells_path(ws)),
        url(&cells_path(ws)),
    )
}

pub fn feed_xml(entries: &[String]) -> String {
    feed_with_links(&[], entries)
}

pub fn feed_with_links(links: &[(&str, String)], entries: &[String]) -> String {
    let mut doc = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gs="http://schemas.google.com/spreadsheets/2006" xmlns:gsx="http://schemas.google.com/spreadsheets/2006/extended" xmlns:gd="http://schemas.google.com/g/2005" xmlns:batch="http://schemas.google.com/gdata/batch">
  <title>fixture</title>"#,
    );
    for (relation, href) in links {
        doc.push_str(&format!(
            "\n  <link rel=\"{relation}\" type=\"application/atom+xml\" href=\"{href}\"/>"
        ));
    }
    for entry in entries {
        doc.push_str("\n  ");
        doc.push_str(entry);
    }
    doc.push_str("\n</feed>");
    doc
}

/// Cells feed carrying the batch link, as the service returns it.
pub fn cells_feed_xml(ws: &str, entries: &[String]) -> String {
    feed_with_links(
        &[
            (rel::POST, url(&cells_path(ws))),
            (rel::BATCH, url(&batch_path(ws))),
        ],
        entries,
    )
}

pub fn batch_response_xml(statuses: &[(&str, u16)]) -> String {
    let entries: Vec<String> = statuses
        .iter()
        .map(|(id, code)| {
            let reason = if *code == 200 { "Success" } else { "Conflict" };
            format!(
                r#"<entry>
    <batch:id>{id}</batch:id>
    <batch:operation type="update"/>
    <batch:status code="{code}" reason="{reason}"/>
  </entry>"#
            )
        })
        .collect();
    feed_xml(&entries)
}

/// `(batch id, gs:cell row, gs:cell col)` for each entry of a batch body.
pub fn batch_entries(body: &XmlElement) -> Vec<(String, u32, u32)> {
    body.children_named("entry")
        .map(|entry| {
            let batch_id = entry
                .children
                .iter()
                .find(|c| c.name == "batch:id")
                .map(|c| c.text.clone())
                .unwrap();
            let cell = entry.child("cell").unwrap();
            (
                batch_id,
                cell.attr("row").unwrap().parse().unwrap(),
                cell.attr("col").unwrap().parse().unwrap(),
            )
        })
        .collect()
}
