//! YouTrack Cloud and YouTrack Server.
//!
//! Recognized page URLs:
//! - issue page: `…/issue/<KEY>`, optionally followed by `/<slug>`
//! - issue opened on an agile board: `…/agiles/<BOARD>/<SPRINT>?issue=<KEY>`
//!
//! The ticket itself is read from the instance's REST API at `<base>/api`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::Html;
use serde::de::IgnoredAny;
use serde::Deserialize;

use super::Adapter;
use crate::client::{ClientFactory, RequestOptions};
use crate::model::ticket::TicketRecord;
use crate::util::dom::has_element;

/// Custom element present on every YouTrack page.
const PAGE_MARKER: &str = "yt-page-loader";

const ISSUE_FIELDS: &[&str] = &[
    "idReadable",
    "summary",
    "description",
    "fields(name,value(name))",
];

static ISSUE_PAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>.+)/issue/(?P<id>[A-Z]+-[0-9]+)(?P<slug>/[^/]+)?$")
        .expect("valid issue page pattern")
});

static AGILE_BOARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>.+)/agiles/(?P<board>[0-9]+-[0-9]+)/(?P<sprint>[0-9]+-[0-9]+|current)$")
        .expect("valid agile board pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YouTrackMatch {
    /// Instance root, including any path prefix.
    pub base: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YouTrackIssue {
    id_readable: String,
    summary: Option<String>,
    description: Option<String>,
    #[serde(default)]
    fields: Option<Vec<IssueField>>,
}

#[derive(Debug, Deserialize)]
struct IssueField {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<FieldValue>,
}

// Multi-value and simple custom fields carry arrays or scalars here.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Named { name: Option<String> },
    Other(IgnoredAny),
}

impl IssueField {
    fn value_name(&self) -> Option<&str> {
        match &self.value {
            Some(FieldValue::Named { name }) => name.as_deref(),
            Some(FieldValue::Other(IgnoredAny)) | None => None,
        }
    }
}

/// URL with query and fragment dropped, for path-shape matching.
fn strip_volatile(url: &Url) -> String {
    let mut u = url.clone();
    u.set_fragment(None);
    u.set_query(None);
    u.to_string()
}

pub fn analyze(url: &Url) -> Option<YouTrackMatch> {
    let path = strip_volatile(url);

    if let Some(caps) = ISSUE_PAGE.captures(&path) {
        return Some(YouTrackMatch {
            base: caps["base"].to_string(),
            id: caps["id"].to_string(),
        });
    }

    // The board path names no issue; the open one is in `?issue=`.
    let caps = AGILE_BOARD.captures(&path)?;
    let id = url
        .query_pairs()
        .find(|(key, _)| key == "issue")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())?;

    Some(YouTrackMatch {
        base: caps["base"].to_string(),
        id,
    })
}

fn normalize(base: &str, issue: YouTrackIssue) -> TicketRecord {
    let kind = issue
        .fields
        .iter()
        .flatten()
        .find(|field| field.name.as_deref() == Some("Type"))
        .and_then(IssueField::value_name)
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase);

    let title = issue
        .summary
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| issue.id_readable.clone());

    TicketRecord {
        url: format!("{base}/issue/{}", issue.id_readable),
        title,
        description: issue.description.filter(|d| !d.is_empty()),
        kind,
        id: issue.id_readable,
    }
}

pub fn is_youtrack_page(document: &Html) -> bool {
    has_element(PAGE_MARKER, document)
}

pub struct YouTrackAdapter {
    clients: Arc<dyn ClientFactory>,
}

impl YouTrackAdapter {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self { clients }
    }
}

#[async_trait(?Send)]
impl Adapter for YouTrackAdapter {
    fn name(&self) -> &str {
        "YouTrack"
    }

    async fn scan(&self, url: &Url, document: &Html) -> Result<Vec<TicketRecord>> {
        if !is_youtrack_page(document) {
            log::debug!("{url}: no YouTrack page marker");
            return Ok(vec![]);
        }

        let Some(info) = analyze(url) else {
            log::debug!("{url}: not a YouTrack issue URL");
            return Ok(vec![]);
        };

        let api = self
            .clients
            .bind(&format!("{}/api", info.base))
            .context("Failed to create YouTrack API client")?;

        let options = RequestOptions::new().search_param("fields", ISSUE_FIELDS.join(","));
        let path = format!("issues/{}", urlencoding::encode(&info.id));

        log::debug!("Fetching YouTrack issue {} from {}", info.id, info.base);
        let body = api
            .get(&path, &options)
            .await
            .with_context(|| format!("YouTrack API request for {} failed", info.id))?;

        let issue: YouTrackIssue = serde_json::from_value(body)
            .with_context(|| format!("Failed to parse YouTrack issue {}", info.id))?;

        Ok(vec![normalize(&info.base, issue)])
    }
}
