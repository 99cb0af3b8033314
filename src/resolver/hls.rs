use crate::core::Quality;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RESOLUTION=(\d+)x(\d+)").expect("static regex"));
static BANDWIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[,:])BANDWIDTH=(\d+)").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub url: String,
    pub quality: Quality,
    pub bandwidth: Option<u64>,
}

pub fn is_playlist(body: &str) -> bool {
    body.trim_start_matches('\u{feff}').trim_start().starts_with("#EXTM3U")
}

/// Lists the variant streams of a master playlist, resolving relative URIs
/// against the playlist address. Media playlists yield no variants.
pub fn master_variants(body: &str, playlist_url: &str) -> Vec<Variant> {
    let base = Url::parse(playlist_url).ok();
    let mut variants = Vec::new();
    let mut lines = body.lines().map(str::trim);

    while let Some(line) = lines.next() {
        let Some(attributes) = line.strip_prefix("#EXT-X-STREAM-INF:") else {
            continue;
        };
        let Some(uri) = lines.by_ref().find(|l| !l.is_empty() && !l.starts_with('#')) else {
            break;
        };

        let url = match &base {
            Some(base) => base.join(uri).map(|u| u.to_string()).unwrap_or_else(|_| uri.to_string()),
            None => uri.to_string(),
        };
        let quality = RESOLUTION
            .captures(attributes)
            .and_then(|c| c[2].parse::<u32>().ok())
            .map(Quality::from_height)
            .unwrap_or_else(|| Quality::from_url(&url));
        let bandwidth = BANDWIDTH.captures(attributes).and_then(|c| c[1].parse().ok());

        variants.push(Variant { url, quality, bandwidth });
    }

    variants
}
