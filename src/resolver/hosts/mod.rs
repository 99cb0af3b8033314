mod filemoon;
mod fireplayer;

pub use filemoon::Filemoon;
pub use fireplayer::{FirePlayer, HOSTS as FIREPLAYER_HOSTS};

use crate::core::{Fetcher, StreamCandidate};
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use url::Url;

static EMBED_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^/(?:e|v|f|d|embed|embed-[^/]+|player|video)(?:/|$)|/embed[/-]").expect("static regex")
});

/// A per-host extractor for a third-party video player site.
#[async_trait]
pub trait EmbedHost: Send + Sync {
    fn name(&self) -> &'static str;
    fn matches(&self, url: &Url) -> bool;
    async fn extract(&self, url: &Url, referer: Option<&str>) -> Result<Vec<StreamCandidate>>;
}

pub struct EmbedHosts {
    hosts: Vec<Box<dyn EmbedHost>>,
}

impl EmbedHosts {
    pub fn new() -> Self {
        Self { hosts: Vec::new() }
    }

    pub fn with_defaults(fetcher: Arc<dyn Fetcher>) -> Self {
        let mut hosts = Self::new();
        hosts.register(Box::new(Filemoon::new(fetcher.clone())));
        hosts.register(Box::new(FirePlayer::new(fetcher)));
        hosts
    }

    pub fn register(&mut self, host: Box<dyn EmbedHost>) {
        self.hosts.push(host);
    }

    pub fn find(&self, url: &Url) -> Option<&dyn EmbedHost> {
        self.hosts.iter().find(|h| h.matches(url)).map(|h| h.as_ref())
    }

    pub fn is_known(&self, url: &Url) -> bool {
        self.find(url).is_some()
    }
}

impl Default for EmbedHosts {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the path has the shape of a player embed (`/e/<id>`, `/embed/...`).
pub fn looks_like_embed(url: &Url) -> bool {
    EMBED_PATH.is_match(url.path())
}

/// Host suffix match that respects label boundaries.
pub(crate) fn host_matches(url: &Url, suffixes: &[&str]) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    suffixes
        .iter()
        .any(|s| host == *s || host.ends_with(&format!(".{}", s)))
}
