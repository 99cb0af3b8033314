//! Manifest discovery patterns, ordered from most specific to loosest.

use regex::Regex;
use std::sync::LazyLock;

/// Each pattern captures the candidate URL in group 1.
const MANIFEST_PATTERNS: &[(&str, &str)] = &[
    (
        "jwplayer-video",
        r#"<video[^>]+class=["'][^"']*jw[^"']*["'][^>]+src=["'](https?://[^"']+\.(?:mp4|m3u8)[^"']*)["']"#,
    ),
    ("player-file", r#"file\s*:\s*["']([^"']+\.m3u8[^"']*)["']"#),
    ("player-src", r#"src\s*:\s*["']([^"']+\.m3u8[^"']*)["']"#),
    ("player-hls", r#"hls\s*:\s*["']([^"']+\.m3u8[^"']*)["']"#),
    ("quoted-m3u8", r#"["'](https?://[^"']+\.m3u8[^"']*)["']"#),
    ("bare-m3u8", r#"(https?://[^\s"'<>\\]+\.m3u8[^\s"'<>\\]*)"#),
    ("player-file-mp4", r#"file\s*:\s*["'](https?://[^"']+\.mp4[^"']*)["']"#),
    ("bare-mp4", r#"(https?://[^\s"'<>\\]+\.mp4[^\s"'<>\\]*)"#),
];

static COMPILED: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    MANIFEST_PATTERNS
        .iter()
        .filter_map(|(name, pattern)| Regex::new(pattern).ok().map(|re| (*name, re)))
        .collect()
});

static IFRAME_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<iframe[^>]+(?:data-)?src=["']([^"']+)["']"#).expect("static regex")
});

const AD_MARKERS: &[&str] = &["banner", "/ads/", "//ads.", ".ads.", "doubleclick", "/vast"];
const MEDIA_EXTENSIONS: &[&str] = &[".m3u8", ".mp4"];

/// Whether `text` points at a media file rather than a page.
pub fn is_media_url(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or("");
    (lower.starts_with("http://") || lower.starts_with("https://"))
        && MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext) || path.contains(&format!("{}/", ext)))
}

pub fn is_ad(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    AD_MARKERS.iter().any(|m| lower.contains(m))
}

/// Undoes the escaping found in inline JSON and HTML attributes.
pub fn unescape(text: &str) -> String {
    text.replace("\\/", "/")
        .replace("\\u0026", "&")
        .replace("&amp;", "&")
}

/// Scans text for manifest URLs, trying each pattern in order and returning
/// the matches of the first pattern that yields any non-ad URL.
pub fn find_manifests(text: &str) -> Vec<String> {
    let text = unescape(text);
    for (name, re) in COMPILED.iter() {
        let mut found: Vec<String> = Vec::new();
        for caps in re.captures_iter(&text) {
            let Some(m) = caps.get(1) else { continue };
            let url = m.as_str().trim().to_string();
            if !url.starts_with("http") || is_ad(&url) || found.contains(&url) {
                continue;
            }
            found.push(url);
        }
        if !found.is_empty() {
            tracing::debug!("pattern '{}' matched {} url(s)", name, found.len());
            return found;
        }
    }
    Vec::new()
}

/// First HLS manifest in text, using only the m3u8 patterns.
pub fn find_hls(text: &str) -> Option<String> {
    find_manifests(text).into_iter().find(|u| u.contains(".m3u8"))
}

/// Iframe sources found by a raw regex scan (for fragments that are not full documents).
pub fn iframe_sources(html: &str) -> Vec<String> {
    IFRAME_SRC
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| unescape(m.as_str())))
        .filter(|src| !src.is_empty() && !is_ad(src))
        .collect()
}

/// Audio language hint from reference text (Portuguese site conventions).
pub fn infer_language(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.iter().any(|t| matches!(*t, "dub" | "dublado" | "dublagem")) {
        Some("Dublado".to_string())
    } else if tokens.iter().any(|t| matches!(*t, "leg" | "legendado" | "legenda")) {
        Some("Legendado".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_pattern_wins_over_loose() {
        let html = r#"<script>var player = { file: "https://cdn.example/hls/720/index.m3u8" };
            var other = "https://cdn.example/preview.mp4";</script>"#;
        assert_eq!(find_manifests(html), vec!["https://cdn.example/hls/720/index.m3u8"]);
    }

    #[test]
    fn test_unescapes_json_slashes() {
        let body = r#"{"videoSource":"https:\/\/cdn.example\/v\/master.m3u8?t=1&e=2"}"#;
        assert_eq!(find_hls(body).as_deref(), Some("https://cdn.example/v/master.m3u8?t=1&e=2"));
    }

    #[test]
    fn test_skips_ads_and_falls_back_to_mp4() {
        let html = r#"<a href="https://ads.example/banner.m3u8">x</a>
            <video src="https://cdn.example/filmes/movie_long_name_for_testing.mp4"></video>"#;
        assert_eq!(
            find_manifests(html),
            vec!["https://cdn.example/filmes/movie_long_name_for_testing.mp4"]
        );
    }

    #[test]
    fn test_jw_video_element() {
        let html = r#"<video class="jw-video jw-reset" preload="none" src="https://cdn.example/a/1080p.mp4?x=1"></video>"#;
        assert_eq!(find_manifests(html), vec!["https://cdn.example/a/1080p.mp4?x=1"]);
    }

    #[test]
    fn test_nothing_found() {
        assert!(find_manifests("<html><body>sem vídeo</body></html>").is_empty());
    }

    #[test]
    fn test_is_media_url() {
        assert!(is_media_url("https://cdn.example/v/index.m3u8?token=1"));
        assert!(is_media_url("https://cdn.example/v/movie.MP4"));
        assert!(!is_media_url("https://site.example/filme/mp4-special"));
        assert!(!is_media_url("index.m3u8"));
    }

    #[test]
    fn test_iframe_sources() {
        let html = r#"<iframe width="100%" src="//filemoon.in/e/abc"></iframe><iframe data-src="https://x.example/p"></iframe>"#;
        assert_eq!(iframe_sources(html), vec!["//filemoon.in/e/abc", "https://x.example/p"]);
    }

    #[test]
    fn test_infer_language() {
        assert_eq!(infer_language("https://x.example/v/dublado/1").as_deref(), Some("Dublado"));
        assert_eq!(infer_language("Episódio 1 - LEG").as_deref(), Some("Legendado"));
        assert_eq!(infer_language("https://x.example/legal"), None);
    }
}
