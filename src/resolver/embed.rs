use crate::core::StreamCandidate;
use crate::error::Result;
use crate::resolver::hosts::{looks_like_embed, EmbedHosts};
use crate::resolver::{PlaybackRef, ResolutionStrategy};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Hands embed-player addresses to the matching per-host extractor.
///
/// Accepts known hosts and anything shaped like an embed; an unknown host
/// is attempted but yields nothing.
pub struct EmbedDelegation {
    hosts: Arc<EmbedHosts>,
}

impl EmbedDelegation {
    pub fn new(hosts: Arc<EmbedHosts>) -> Self {
        Self { hosts }
    }
}

#[async_trait]
impl ResolutionStrategy for EmbedDelegation {
    fn name(&self) -> &'static str {
        "embed"
    }

    fn accepts(&self, reference: &PlaybackRef) -> bool {
        reference
            .url()
            .map(|url| self.hosts.is_known(url) || looks_like_embed(url))
            .unwrap_or(false)
    }

    async fn try_resolve(&self, reference: &PlaybackRef) -> Result<Vec<StreamCandidate>> {
        let Some(url) = reference.url() else {
            return Ok(Vec::new());
        };
        match self.hosts.find(url) {
            Some(host) => {
                debug!("delegating {} to {}", url, host.name());
                host.extract(url, reference.referer()).await
            }
            None => {
                debug!("no extractor for embed host {}", url.host_str().unwrap_or("?"));
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptedFetcher;

    fn delegation(fetcher: Arc<ScriptedFetcher>) -> EmbedDelegation {
        EmbedDelegation::new(Arc::new(EmbedHosts::with_defaults(fetcher)))
    }

    #[tokio::test]
    async fn test_unknown_embed_host_yields_nothing() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let embed = delegation(fetcher.clone());
        let reference = PlaybackRef::new("https://embedhost.example/e/12345", None);

        assert!(embed.accepts(&reference));
        assert!(embed.try_resolve(&reference).await.unwrap().is_empty());
        assert!(fetcher.requested_urls().is_empty());
    }

    #[tokio::test]
    async fn test_known_host_is_delegated() {
        let fetcher = Arc::new(
            ScriptedFetcher::new().route("https://filemoon.sx/e/abc", r#"<script>file: "https://cdn.example/abc/index.m3u8"</script>"#),
        );
        let embed = delegation(fetcher);
        let reference = PlaybackRef::new("https://filemoon.sx/e/abc", Some("https://site.example/"));

        let found = embed.try_resolve(&reference).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, "Filemoon");
        assert!(!embed.accepts(&PlaybackRef::new("https://site.example/filme/x", None)));
    }
}
