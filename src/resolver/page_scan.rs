use crate::core::{Document, FetchRequest, Fetcher, StreamCandidate};
use crate::error::Result;
use crate::resolver::hosts::{looks_like_embed, EmbedHosts};
use crate::resolver::{patterns, PlaybackRef, ResolutionStrategy};
use crate::utils::absolutize;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Fetches the referenced page and scans its markup for media, falling back
/// to iframes that point at known embed hosts.
pub struct PageScan {
    fetcher: Arc<dyn Fetcher>,
    hosts: Arc<EmbedHosts>,
}

struct PageFindings {
    media: Vec<String>,
    frames: Vec<Url>,
}

impl PageScan {
    pub fn new(fetcher: Arc<dyn Fetcher>, hosts: Arc<EmbedHosts>) -> Self {
        Self { fetcher, hosts }
    }

    fn scan(&self, html: &str, base: &Url) -> PageFindings {
        let mut media: Vec<String> = Vec::new();
        let mut frames: Vec<Url> = Vec::new();

        if let Ok(doc) = Document::parse(html) {
            media.extend(
                doc.select("video[src], video source[src], source[src]")
                    .iter()
                    .filter_map(|el| el.attr("src"))
                    .filter_map(|src| absolutize(base, src))
                    .filter(|src| patterns::is_media_url(src) && !patterns::is_ad(src)),
            );
            frames.extend(
                doc.select("iframe")
                    .iter()
                    .filter_map(|el| el.attr("src").or_else(|| el.attr("data-src")))
                    .filter_map(|src| absolutize(base, src))
                    .filter_map(|src| Url::parse(&src).ok())
                    .filter(|url| self.hosts.is_known(url)),
            );
        }

        if media.is_empty() {
            media = patterns::find_manifests(html);
        }
        let mut seen = HashSet::new();
        media.retain(|m| seen.insert(m.clone()));
        PageFindings { media, frames }
    }
}

#[async_trait]
impl ResolutionStrategy for PageScan {
    fn name(&self) -> &'static str {
        "page-scan"
    }

    /// Embed-player addresses belong to embed delegation.
    fn accepts(&self, reference: &PlaybackRef) -> bool {
        reference
            .url()
            .map(|url| !self.hosts.is_known(url) && !looks_like_embed(url))
            .unwrap_or(false)
    }

    async fn try_resolve(&self, reference: &PlaybackRef) -> Result<Vec<StreamCandidate>> {
        let Some(url) = reference.url() else {
            return Ok(Vec::new());
        };

        let page = self
            .fetcher
            .fetch(FetchRequest::get(url.as_str()).referer(reference.referer()))
            .await?;
        if !page.is_success() {
            debug!("page-scan: HTTP {} for {}", page.status, url);
            return Ok(Vec::new());
        }

        let base = Url::parse(&page.url).unwrap_or_else(|_| url.clone());
        let findings = self.scan(&page.body, &base);
        let language = patterns::infer_language(reference.as_str());

        if !findings.media.is_empty() {
            return Ok(findings
                .media
                .into_iter()
                .map(|media| {
                    StreamCandidate::new(media, self.name())
                        .with_referer(Some(base.as_str()))
                        .with_language(language.clone())
                })
                .collect());
        }

        for frame in &findings.frames {
            let Some(host) = self.hosts.find(frame) else { continue };
            debug!("page-scan: following {} iframe {}", host.name(), frame);
            match host.extract(frame, Some(base.as_str())).await {
                Ok(found) if !found.is_empty() => return Ok(found),
                Ok(_) => {}
                Err(e) => debug!("page-scan: {} failed: {}", host.name(), e),
            }
        }

        Ok(Vec::new())
    }
}
