use crate::core::{FetchRequest, Fetcher, Quality, StreamCandidate};
use crate::error::Result;
use crate::resolver::hosts::{host_matches, FIREPLAYER_HOSTS};
use crate::resolver::{patterns, PlaybackRef, ResolutionStrategy};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Asks the player backend for its sources through the JSON endpoint the
/// embed page would call from script.
pub struct ApiProbe {
    fetcher: Arc<dyn Fetcher>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub file: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// The response shapes seen from player backends.
#[derive(Debug, Clone)]
pub enum ApiResponse {
    FirePlayer {
        video_source: Option<String>,
        secured_link: Option<String>,
        hls: bool,
    },
    Sources(Vec<SourceEntry>),
    /// Anything else; scanned as text
    Unstructured(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Shape {
    Sources {
        sources: Vec<SourceEntry>,
    },
    FirePlayer {
        #[serde(rename = "videoSource")]
        video_source: Option<String>,
        #[serde(rename = "securedLink")]
        secured_link: Option<String>,
        #[serde(default)]
        hls: bool,
    },
}

impl ApiResponse {
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Shape>(body) {
            Ok(Shape::Sources { sources }) => ApiResponse::Sources(sources),
            Ok(Shape::FirePlayer {
                video_source,
                secured_link,
                hls,
            }) if video_source.is_some() || secured_link.is_some() => ApiResponse::FirePlayer {
                video_source,
                secured_link,
                hls,
            },
            _ => ApiResponse::Unstructured(body.to_string()),
        }
    }

    /// Media addresses in preference order, paired with any quality label.
    pub fn media(&self) -> Vec<(String, Option<String>)> {
        match self {
            ApiResponse::FirePlayer {
                video_source,
                secured_link,
                ..
            } => video_source
                .iter()
                .chain(secured_link.iter())
                .map(|u| patterns::unescape(u))
                .filter(|u| u.starts_with("http"))
                .map(|u| (u, None))
                .collect(),
            ApiResponse::Sources(sources) => sources
                .iter()
                .map(|s| (patterns::unescape(&s.file), s.label.clone()))
                .filter(|(u, _)| u.starts_with("http"))
                .collect(),
            ApiResponse::Unstructured(text) => patterns::find_manifests(text).into_iter().map(|u| (u, None)).collect(),
        }
    }
}

impl ApiProbe {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Video hash from `#hash` or the last path segment.
    fn video_hash(url: &Url) -> Option<String> {
        if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
            return Some(fragment.to_string());
        }
        url.path_segments()?
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string)
    }

    fn endpoint(url: &Url, hash: &str) -> String {
        format!(
            "{}/player/index.php?data={}&do=getVideo",
            url.origin().ascii_serialization(),
            urlencoding::encode(hash)
        )
    }
}

#[async_trait]
impl ResolutionStrategy for ApiProbe {
    fn name(&self) -> &'static str {
        "api"
    }

    fn accepts(&self, reference: &PlaybackRef) -> bool {
        reference
            .url()
            .map(|url| host_matches(url, FIREPLAYER_HOSTS))
            .unwrap_or(false)
    }

    async fn try_resolve(&self, reference: &PlaybackRef) -> Result<Vec<StreamCandidate>> {
        let Some(url) = reference.url() else {
            return Ok(Vec::new());
        };
        let Some(hash) = Self::video_hash(url) else {
            debug!("api: no video hash in {}", url);
            return Ok(Vec::new());
        };

        let endpoint = Self::endpoint(url, &hash);
        let request = FetchRequest::post(&endpoint)
            .form(&[("hash", hash.as_str()), ("r", reference.referer().unwrap_or(""))])
            .header("X-Requested-With", "XMLHttpRequest")
            .referer(Some(url.as_str()));
        let response = self.fetcher.fetch(request).await?;
        if !response.is_success() {
            debug!("api: HTTP {} from {}", response.status, endpoint);
            return Ok(Vec::new());
        }

        let language = patterns::infer_language(reference.as_str());
        Ok(ApiResponse::parse(&response.body)
            .media()
            .into_iter()
            .filter(|(u, _)| !patterns::is_ad(u))
            .map(|(media, label)| {
                StreamCandidate::new(media, self.name())
                    .with_quality(label.as_deref().map(Quality::from_label).unwrap_or(Quality::Unknown))
                    .with_referer(Some(url.as_str()))
                    .with_language(language.clone())
            })
            .collect())
    }
}
