use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

static LABEL_HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{3,4})p\b").expect("static regex"));
static LABEL_DIMENSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{3,4}\s*x\s*(\d{3,4})\b").expect("static regex"));
static LABEL_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").expect("static regex"));

/// What a catalog item or detail page describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
    Anime,
}

impl ContentKind {
    pub fn is_episodic(self) -> bool {
        !matches!(self, ContentKind::Movie)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "series",
            ContentKind::Anime => "anime",
        };
        f.write_str(label)
    }
}

/// A lightweight listing record produced from a catalog or search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    /// Canonical detail-page address
    pub url: String,
    pub poster_url: Option<String>,
    pub year: Option<i32>,
    pub kind: ContentKind,
}

/// A fully loaded detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub title: String,
    pub url: String,
    pub kind: ContentKind,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub plot: Option<String>,
    pub tags: BTreeSet<String>,
    pub cast: Vec<String>,
    pub year: Option<i32>,
    pub duration_minutes: Option<u32>,
    pub trailer_url: Option<String>,
    /// Playback reference for movies; series carry theirs per episode
    pub playback_ref: Option<String>,
    pub episodes: Vec<EpisodeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season_number: u32,
    pub episode_number: u32,
    pub title: Option<String>,
    /// Opaque token consumed by the link resolver: a URL, an embed id or `id#hash`
    pub playback_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "hls")]
    Hls,
    #[serde(rename = "video")]
    ProgressiveVideo,
}

impl MediaType {
    pub fn from_url(url: &str) -> Self {
        if url.to_ascii_lowercase().contains(".m3u8") {
            MediaType::Hls
        } else {
            MediaType::ProgressiveVideo
        }
    }
}

/// Best-effort vertical resolution class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "2160p")]
    P2160,
}

impl Quality {
    /// Maps a pixel height to the nearest class at or below it.
    pub fn from_height(height: u32) -> Self {
        match height {
            h if h >= 2160 => Quality::P2160,
            h if h >= 1080 => Quality::P1080,
            h if h >= 720 => Quality::P720,
            h if h >= 480 => Quality::P480,
            h if h >= 360 => Quality::P360,
            _ => Quality::Unknown,
        }
    }

    /// Infers quality from markers such as `720p` or `/1080/` in a URL.
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        let table = [
            (Quality::P2160, ["2160p", "/2160/", "/4k/"]),
            (Quality::P1080, ["1080p", "/1080/", "fullhd"]),
            (Quality::P720, ["720p", "/720/", "_720"]),
            (Quality::P480, ["480p", "/480/", "_480"]),
            (Quality::P360, ["360p", "/360/", "_360"]),
        ];

        table
            .iter()
            .find(|(_, markers)| markers.iter().any(|m| lower.contains(m)))
            .map(|(quality, _)| *quality)
            .unwrap_or(Quality::Unknown)
    }

    /// Reads `720p`, `1280x720` or a bare height such as `1080`.
    pub fn from_label(label: &str) -> Self {
        let height = LABEL_HEIGHT
            .captures(label)
            .or_else(|| LABEL_DIMENSIONS.captures(label))
            .or_else(|| LABEL_NUMBER.captures(label))
            .and_then(|caps| caps[1].parse::<u32>().ok());
        match height {
            Some(height) => Quality::from_height(height),
            None => Quality::from_url(label),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quality::Unknown => "unknown",
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::P2160 => "2160p",
        };
        f.write_str(label)
    }
}

/// A playable stream handed to the host player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCandidate {
    pub url: String,
    pub media_type: MediaType,
    pub quality: Quality,
    pub referer: Option<String>,
    pub language_label: Option<String>,
    /// Strategy or embed host that produced the candidate
    pub source: String,
}

impl StreamCandidate {
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            media_type: MediaType::from_url(&url),
            quality: Quality::from_url(&url),
            url,
            referer: None,
            language_label: None,
            source: source.into(),
        }
    }

    pub fn with_referer(mut self, referer: Option<&str>) -> Self {
        self.referer = referer.map(str::to_string);
        self
    }

    pub fn with_language(mut self, label: Option<String>) -> Self {
        self.language_label = label;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        if quality != Quality::Unknown {
            self.quality = quality;
        }
        self
    }
}

/// A labelled listing source offered to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    pub url: String,
}
