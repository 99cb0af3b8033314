//! Turns a playback reference into verified stream candidates by trying an
//! ordered list of strategies until one yields a playable source.

pub mod api;
pub mod direct;
pub mod embed;
pub mod hls;
pub mod hosts;
pub mod page_scan;
pub mod patterns;
pub mod verify;

pub use api::ApiProbe;
pub use direct::DirectMedia;
pub use embed::EmbedDelegation;
pub use hosts::{EmbedHost, EmbedHosts};
pub use page_scan::PageScan;

use crate::config::Config;
use crate::core::{Fetcher, MediaType, StreamCandidate};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// A playback token as handed over by a detail page or episode.
#[derive(Debug, Clone)]
pub struct PlaybackRef {
    raw: String,
    url: Option<Url>,
    referer: Option<String>,
}

impl PlaybackRef {
    pub fn new(raw: &str, referer: Option<&str>) -> Self {
        let trimmed = raw.trim();
        let raw = match trimmed.strip_prefix("//") {
            Some(rest) => format!("https://{}", rest),
            None => trimmed.to_string(),
        };
        let url = Url::parse(&raw)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"));
        Self {
            raw,
            url,
            referer: referer.filter(|r| !r.is_empty()).map(str::to_string),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The reference as an http(s) address, if it is one.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }
}

/// One way of getting from a reference to media.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap applicability test; no I/O.
    fn accepts(&self, reference: &PlaybackRef) -> bool;

    async fn try_resolve(&self, reference: &PlaybackRef) -> Result<Vec<StreamCandidate>>;
}

/// Outcome of one resolution. Empty `candidates` means nothing playable was found.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub reference: String,
    pub candidates: Vec<StreamCandidate>,
    /// Strategies that were tried, in order
    pub attempted: Vec<&'static str>,
    pub timed_out: bool,
}

impl Resolution {
    pub fn is_playable(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Highest quality candidate, preferring HLS on ties.
    pub fn best(&self) -> Option<&StreamCandidate> {
        self.candidates.iter().max_by_key(|c| {
            let kind = match c.media_type {
                MediaType::Hls => 1,
                MediaType::ProgressiveVideo => 0,
            };
            (c.quality, kind)
        })
    }
}

pub struct LinkResolver {
    fetcher: Arc<dyn Fetcher>,
    strategies: Vec<Box<dyn ResolutionStrategy>>,
    budget: Duration,
    verify: bool,
}

impl LinkResolver {
    /// Builds the default chain: direct media, embed hosts, page scan, player API.
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &Config) -> Self {
        let hosts = Arc::new(EmbedHosts::with_defaults(fetcher.clone()));
        let strategies: Vec<Box<dyn ResolutionStrategy>> = vec![
            Box::new(DirectMedia),
            Box::new(EmbedDelegation::new(hosts.clone())),
            Box::new(PageScan::new(fetcher.clone(), hosts)),
            Box::new(ApiProbe::new(fetcher.clone())),
        ];
        Self::with_strategies(fetcher, strategies, config)
    }

    pub fn with_strategies(
        fetcher: Arc<dyn Fetcher>,
        strategies: Vec<Box<dyn ResolutionStrategy>>,
        config: &Config,
    ) -> Self {
        Self {
            fetcher,
            strategies,
            budget: config.resolve_budget(),
            verify: config.verify_streams,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolves `raw` within the configured budget. Never fails; strategy
    /// errors are logged and the next strategy is tried.
    pub async fn resolve(&self, raw: &str, referer: Option<&str>) -> Resolution {
        let reference = PlaybackRef::new(raw, referer);
        let mut attempted: Vec<&'static str> = Vec::new();

        let outcome = tokio::time::timeout(self.budget, self.search(&reference, &mut attempted)).await;
        let (candidates, timed_out) = match outcome {
            Ok(candidates) => (candidates, false),
            Err(_) => {
                warn!("resolution of {} exceeded {:?}", reference.as_str(), self.budget);
                (Vec::new(), true)
            }
        };

        if candidates.is_empty() {
            warn!("no playable source for {} (tried: {:?})", reference.as_str(), attempted);
        } else {
            info!("{} playable source(s) for {}", candidates.len(), reference.as_str());
        }

        Resolution {
            reference: reference.as_str().to_string(),
            candidates,
            attempted,
            timed_out,
        }
    }

    async fn search(&self, reference: &PlaybackRef, attempted: &mut Vec<&'static str>) -> Vec<StreamCandidate> {
        for strategy in self.strategies.iter().filter(|s| s.accepts(reference)) {
            attempted.push(strategy.name());
            debug!("trying {} on {}", strategy.name(), reference.as_str());

            let found = match strategy.try_resolve(reference).await {
                Ok(found) => found,
                Err(e) => {
                    debug!("{} failed: {}", strategy.name(), e);
                    continue;
                }
            };
            if found.is_empty() {
                continue;
            }

            let found = if self.verify {
                verify::verify_candidates(self.fetcher.as_ref(), found).await
            } else {
                found
            };
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Quality, ScriptedFetcher};
    use crate::error::ScrapeError;

    struct Fixed {
        name: &'static str,
        outcome: std::result::Result<Vec<&'static str>, ()>,
    }

    #[async_trait]
    impl ResolutionStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn accepts(&self, _reference: &PlaybackRef) -> bool {
            true
        }

        async fn try_resolve(&self, _reference: &PlaybackRef) -> Result<Vec<StreamCandidate>> {
            match &self.outcome {
                Ok(urls) => Ok(urls.iter().map(|u| StreamCandidate::new(*u, self.name)).collect()),
                Err(()) => Err(ScrapeError::network("https://x.example/", "boom")),
            }
        }
    }

    fn fixed(name: &'static str, outcome: std::result::Result<Vec<&'static str>, ()>) -> Box<dyn ResolutionStrategy> {
        Box::new(Fixed { name, outcome })
    }

    fn unverified() -> Config {
        Config {
            verify_streams: false,
            ..Config::default()
        }
    }

    #[test]
    fn test_playback_ref_forms() {
        let r = PlaybackRef::new(" //filemoon.in/e/abc ", Some(""));
        assert_eq!(r.as_str(), "https://filemoon.in/e/abc");
        assert!(r.url().is_some());
        assert!(r.referer().is_none());

        let token = PlaybackRef::new("12345", None);
        assert!(token.url().is_none());
        assert!(PlaybackRef::new("javascript:void(0)", None).url().is_none());
    }

    #[tokio::test]
    async fn test_first_productive_strategy_wins() {
        let resolver = LinkResolver::with_strategies(
            Arc::new(ScriptedFetcher::new()),
            vec![
                fixed("a", Ok(vec![])),
                fixed("b", Err(())),
                fixed("c", Ok(vec!["https://cdn.example/c.m3u8"])),
                fixed("d", Ok(vec!["https://cdn.example/d.m3u8"])),
            ],
            &unverified(),
        );

        let resolution = resolver.resolve("https://site.example/x", None).await;
        assert_eq!(resolution.attempted, vec!["a", "b", "c"]);
        assert_eq!(resolution.candidates.len(), 1);
        assert_eq!(resolution.candidates[0].source, "c");
        assert!(!resolution.timed_out);
    }

    #[tokio::test]
    async fn test_unverifiable_candidates_fall_through() {
        let fetcher = ScriptedFetcher::new()
            .route("https://cdn.example/dead.m3u8", "<html>expired</html>")
            .route("https://cdn.example/live.m3u8", "#EXTM3U\n#EXTINF:4,\n0.ts\n");
        let resolver = LinkResolver::with_strategies(
            Arc::new(fetcher),
            vec![
                fixed("first", Ok(vec!["https://cdn.example/dead.m3u8"])),
                fixed("second", Ok(vec!["https://cdn.example/live.m3u8"])),
            ],
            &Config::default(),
        );

        let resolution = resolver.resolve("https://site.example/x", None).await;
        assert_eq!(resolution.attempted, vec!["first", "second"]);
        assert_eq!(resolution.candidates[0].url, "https://cdn.example/live.m3u8");
    }

    #[test]
    fn test_best_prefers_quality_then_hls() {
        let resolution = Resolution {
            reference: "r".to_string(),
            candidates: vec![
                StreamCandidate::new("https://cdn.example/720p.mp4", "t"),
                StreamCandidate::new("https://cdn.example/1080p.mp4", "t"),
                StreamCandidate::new("https://cdn.example/1080p/index.m3u8", "t"),
            ],
            attempted: vec![],
            timed_out: false,
        };
        let best = resolution.best().unwrap();
        assert_eq!(best.quality, Quality::P1080);
        assert_eq!(best.media_type, MediaType::Hls);
    }

    #[test]
    fn test_default_chain_order() {
        let resolver = LinkResolver::new(Arc::new(ScriptedFetcher::new()), &Config::default());
        assert_eq!(resolver.strategy_names(), vec!["direct", "embed", "page-scan", "api"]);
    }
}
