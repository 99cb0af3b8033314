use crate::core::{Document, FetchRequest, Fetcher, StreamCandidate};
use crate::error::Result;
use crate::resolver::hosts::{host_matches, EmbedHost};
use crate::resolver::patterns;
use crate::utils::absolutize;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Hosts running the FirePlayer/VidStack embed (`embedplay.upns.*` and mirrors).
pub const HOSTS: &[&str] = &["upns.ink", "upns.pro", "upn.one", "playembedapi.site"];

/// Reads the embed page itself; the page usually only bootstraps the player,
/// so the JSON endpoint is left to the API probe strategy.
pub struct FirePlayer {
    fetcher: Arc<dyn Fetcher>,
}

impl FirePlayer {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    fn sources(html: &str, base: &Url) -> Vec<String> {
        let Ok(doc) = Document::parse(html) else {
            return Vec::new();
        };
        doc.select("video[src], video source[src], source[src]")
            .iter()
            .filter_map(|el| el.attr("src"))
            .filter_map(|src| absolutize(base, src))
            .filter(|src| patterns::is_media_url(src))
            .collect()
    }
}

#[async_trait]
impl EmbedHost for FirePlayer {
    fn name(&self) -> &'static str {
        "FirePlayer"
    }

    fn matches(&self, url: &Url) -> bool {
        host_matches(url, HOSTS)
    }

    async fn extract(&self, url: &Url, referer: Option<&str>) -> Result<Vec<StreamCandidate>> {
        let page = self
            .fetcher
            .fetch(FetchRequest::get(url.as_str()).referer(referer))
            .await?;
        if !page.is_success() {
            debug!("FirePlayer: HTTP {} for {}", page.status, url);
            return Ok(Vec::new());
        }

        let mut found = Self::sources(&page.body, url);
        if found.is_empty() {
            found = patterns::find_manifests(&page.body);
        }

        let language = patterns::infer_language(url.as_str());
        Ok(found
            .into_iter()
            .map(|media| {
                StreamCandidate::new(media, "FirePlayer")
                    .with_referer(Some(url.as_str()))
                    .with_language(language.clone())
            })
            .collect())
    }
}
