use crate::config::Config;
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Overrides the fetcher's default timeout
    pub timeout: Option<Duration>,
    /// Stop reading the body after this many bytes
    pub max_body_bytes: Option<usize>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            body: None,
            timeout: None,
            max_body_bytes: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn referer(self, referer: Option<&str>) -> Self {
        match referer {
            Some(r) if !r.is_empty() => self.header("Referer", r),
            _ => self,
        }
    }

    /// Sets a `application/x-www-form-urlencoded` body.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.body = Some(encoded);
        self.header("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn limit(mut self, bytes: usize) -> Self {
        self.max_body_bytes = Some(bytes);
        self
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Final URL after redirects
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn looks_like_html(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .map(|t| t.contains("text/html"))
            .unwrap_or(false);
        let head = self.body.trim_start();
        by_type || head.starts_with("<!DOCTYPE") || head.starts_with("<html")
    }
}

/// Performs one HTTP exchange. Non-success statuses are returned, not raised;
/// only transport failures become [`ScrapeError::Network`]. No retries.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    accept_language: String,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout: config.fetch_timeout(),
            accept_language: config.accept_language.clone(),
        })
    }

    /// Origins reject bare requests, so fall back to the target's own origin.
    fn default_referer(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        Some(format!("{}/", parsed.origin().ascii_serialization()))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        debug!("{:?} {}", request.method, request.url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        builder = builder
            .timeout(request.timeout.unwrap_or(self.timeout))
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", self.accept_language.as_str());

        if !request.has_header("Referer") {
            if let Some(referer) = Self::default_referer(&request.url) {
                builder = builder.header("Referer", referer);
            }
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ScrapeError::network(&request.url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = match request.max_body_bytes {
            Some(limit) => {
                let mut collected = Vec::new();
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| ScrapeError::network(&request.url, e))?;
                    collected.extend_from_slice(&chunk);
                    if collected.len() >= limit {
                        collected.truncate(limit);
                        break;
                    }
                }
                collected
            }
            None => response
                .bytes()
                .await
                .map_err(|e| ScrapeError::network(&request.url, e))?
                .to_vec(),
        };

        debug!("{} -> HTTP {} ({} bytes)", request.url, status, bytes.len());

        Ok(FetchResponse {
            status,
            url: final_url,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// In-memory [`Fetcher`] serving canned responses keyed by URL.
///
/// Every request is recorded, so callers can assert which URLs were hit and in
/// what order. Unknown URLs fail with a network error.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.insert(url.into(), (200, body.into()));
        self
    }

    pub fn route_status(mut self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.routes.insert(url.into(), (status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        let (status, body) = self
            .routes
            .get(&request.url)
            .cloned()
            .ok_or_else(|| ScrapeError::network(&request.url, "connection refused"))?;

        let head = body.trim_start();
        let content_type = if head.starts_with("#EXTM3U") {
            "application/vnd.apple.mpegurl"
        } else if head.starts_with('{') || head.starts_with('[') {
            "application/json"
        } else if head.starts_with('<') {
            "text/html; charset=utf-8"
        } else {
            "application/octet-stream"
        };

        Ok(FetchResponse {
            status,
            url: request.url,
            content_type: Some(content_type.to_string()),
            body,
        })
    }
}
