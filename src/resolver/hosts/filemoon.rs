use crate::core::{FetchRequest, Fetcher, StreamCandidate};
use crate::error::Result;
use crate::resolver::hosts::{host_matches, EmbedHost};
use crate::resolver::patterns;
use crate::utils::absolutize;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;
use url::Url;

const HOSTS: &[&str] = &["filemoon.in", "filemoon.sx", "filemoon.to", "fembed.sx", "fembed.com"];
const PLAYER_ORIGIN: &str = "https://filemoon.in";

static VIDEO_ID: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"/e/([A-Za-z0-9]+)", r"/v/([A-Za-z0-9]+)", r"embed/([A-Za-z0-9]+)"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Filemoon and its Fembed aliases: the embed page wraps the real player in a
/// nested iframe whose script carries the HLS manifest.
pub struct Filemoon {
    fetcher: Arc<dyn Fetcher>,
}

impl Filemoon {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn video_id(url: &Url) -> Option<String> {
        let path = url.path();
        VIDEO_ID
            .iter()
            .find_map(|re| re.captures(path).map(|c| c[1].to_string()))
            .or_else(|| {
                url.path_segments()?
                    .filter(|s| !s.is_empty())
                    .last()
                    .map(|s| s.split('-').next().unwrap_or(s).to_string())
            })
            .filter(|id| !id.is_empty())
    }

    fn player_url(url: &Url, id: &str) -> String {
        if host_matches(url, &["fembed.sx", "fembed.com"]) {
            format!("{}/e/{}", PLAYER_ORIGIN, id)
        } else {
            url.to_string()
        }
    }

    fn request(url: &str, referer: &str) -> FetchRequest {
        FetchRequest::get(url)
            .referer(Some(referer))
            .header("Origin", "https://fembed.sx")
            .header("Upgrade-Insecure-Requests", "1")
    }

    fn candidate(manifest: String, referer: &str, language: Option<String>) -> StreamCandidate {
        StreamCandidate::new(manifest, "Filemoon")
            .with_referer(Some(referer))
            .with_language(language)
    }
}

#[async_trait]
impl EmbedHost for Filemoon {
    fn name(&self) -> &'static str {
        "Filemoon"
    }

    fn matches(&self, url: &Url) -> bool {
        host_matches(url, HOSTS)
    }

    async fn extract(&self, url: &Url, referer: Option<&str>) -> Result<Vec<StreamCandidate>> {
        let Some(id) = Self::video_id(url) else {
            debug!("Filemoon: no video id in {}", url);
            return Ok(Vec::new());
        };
        let language = patterns::infer_language(url.as_str());
        let player_url = Self::player_url(url, &id);
        let page = self
            .fetcher
            .fetch(Self::request(&player_url, referer.unwrap_or("https://fembed.sx/")))
            .await?;
        if !page.is_success() {
            debug!("Filemoon: HTTP {} for {}", page.status, player_url);
            return Ok(Vec::new());
        }

        let page_base = Url::parse(&page.url).unwrap_or_else(|_| url.clone());
        if let Some(iframe_url) = patterns::iframe_sources(&page.body)
            .first()
            .and_then(|src| absolutize(&page_base, src))
        {
            debug!("Filemoon: following nested iframe {}", iframe_url);
            match self.fetcher.fetch(Self::request(&iframe_url, &player_url)).await {
                Ok(inner) if inner.is_success() => {
                    if let Some(manifest) = patterns::find_hls(&inner.body) {
                        return Ok(vec![Self::candidate(manifest, &iframe_url, language)]);
                    }
                }
                Ok(inner) => debug!("Filemoon: iframe HTTP {}", inner.status),
                Err(e) => debug!("Filemoon: iframe fetch failed: {}", e),
            }
        }

        Ok(patterns::find_hls(&page.body)
            .map(|manifest| vec![Self::candidate(manifest, &player_url, language)])
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptedFetcher;

    #[test]
    fn test_video_id_formats() {
        let id = |s: &str| Filemoon::video_id(&Url::parse(s).unwrap());
        assert_eq!(id("https://filemoon.in/e/1421").as_deref(), Some("1421"));
        assert_eq!(id("https://fembed.sx/v/abc123").as_deref(), Some("abc123"));
        assert_eq!(id("https://filemoon.sx/embed/xyz").as_deref(), Some("xyz"));
        assert_eq!(id("https://filemoon.sx/d/qwe-filme-hd?x=1").as_deref(), Some("qwe"));
    }

    #[tokio::test]
    async fn test_fembed_is_rewritten_and_iframe_followed() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .route(
                    "https://filemoon.in/e/1421",
                    r#"<html><body><iframe src="//player.filemoon.in/p/1421"></iframe></body></html>"#,
                )
                .route(
                    "https://player.filemoon.in/p/1421",
                    r#"<script>jwplayer("v").setup({sources:[{file:"https://cdn.example/hls/1421/master.m3u8"}]});</script>"#,
                ),
        );
        let host = Filemoon::new(fetcher.clone());
        let url = Url::parse("https://fembed.sx/e/1421").unwrap();

        let candidates = host.extract(&url, Some("https://sf.example/")).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://cdn.example/hls/1421/master.m3u8");
        assert_eq!(candidates[0].referer.as_deref(), Some("https://player.filemoon.in/p/1421"));

        let requests = fetcher.requests();
        assert_eq!(requests[0].url, "https://filemoon.in/e/1421");
        assert!(requests[0]
            .headers
            .iter()
            .any(|(k, v)| k == "Referer" && v == "https://sf.example/"));
    }

    #[tokio::test]
    async fn test_manifest_directly_on_page() {
        let fetcher = Arc::new(ScriptedFetcher::new().route(
            "https://filemoon.sx/e/abc",
            r#"<script>var hls: "https://cdn.example/abc/index.m3u8";</script>"#,
        ));
        let host = Filemoon::new(fetcher);
        let url = Url::parse("https://filemoon.sx/e/abc").unwrap();
        let candidates = host.extract(&url, None).await.unwrap();
        assert_eq!(candidates[0].referer.as_deref(), Some("https://filemoon.sx/e/abc"));
    }
}
