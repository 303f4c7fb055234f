use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

use crate::config::HttpConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API base {base:?}: {reason}")]
    InvalidBase { base: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} responded with {status}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },
    #[error("malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-request options. Search params are sent in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub search_params: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.search_params.push((key.into(), value.into()));
        self
    }
}

/// JSON client bound to one API base. `path` is resolved relative to it.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, path: &str, options: &RequestOptions) -> Result<Value, ClientError>;
}

pub trait ClientFactory: Send + Sync {
    fn bind(&self, base: &str) -> Result<Arc<dyn ApiClient>, ClientError>;
}

pub struct HttpClientFactory {
    http: reqwest::Client,
}

impl HttpClientFactory {
    pub fn new(config: &HttpConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http })
    }

    /// Plain GET returning the body as text, for loading pages.
    pub async fn fetch_text(&self, url: &Url) -> Result<String, ClientError> {
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                url: url.to_string(),
                body: text,
            });
        }
        Ok(text)
    }
}

impl ClientFactory for HttpClientFactory {
    fn bind(&self, base: &str) -> Result<Arc<dyn ApiClient>, ClientError> {
        Url::parse(base).map_err(|e| ClientError::InvalidBase {
            base: base.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Arc::new(HttpClient {
            http: self.http.clone(),
            base: base.trim_end_matches('/').to_string(),
        }))
    }
}

pub struct HttpClient {
    http: reqwest::Client,
    base: String,
}

impl HttpClient {
    fn endpoint(&self, path: &str) -> String {
        join_path(&self.base, path)
    }
}

fn join_path(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl ApiClient for HttpClient {
    async fn get(&self, path: &str, options: &RequestOptions) -> Result<Value, ClientError> {
        let url = self.endpoint(path);
        log::debug!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .query(&options.search_params)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status { status, url, body });
        }

        serde_json::from_str(&body).map_err(|source| ClientError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_path_avoids_duplicate_slashes() {
        assert_eq!(
            join_path("https://h/api", "issues/TT-0"),
            "https://h/api/issues/TT-0"
        );
        assert_eq!(
            join_path("https://h/api/", "/issues/TT-0"),
            "https://h/api/issues/TT-0"
        );
    }

    #[test]
    fn search_params_keep_order() {
        let options = RequestOptions::new()
            .search_param("fields", "idReadable")
            .search_param("top", "1");
        assert_eq!(
            options.search_params,
            vec![
                ("fields".to_string(), "idReadable".to_string()),
                ("top".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn bind_rejects_relative_base() {
        let factory = HttpClientFactory::new(&HttpConfig::default()).unwrap();
        let err = factory.bind("not a url/api").err().unwrap();
        assert!(matches!(err, ClientError::InvalidBase { .. }));
    }

    #[test]
    fn bind_accepts_prefixed_base() {
        let factory = HttpClientFactory::new(&HttpConfig::default()).unwrap();
        assert!(factory.bind("https://example.com/youtrack/api").is_ok());
    }
}
