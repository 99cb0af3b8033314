use crate::core::ContentKind;
use regex::Regex;
use std::sync::LazyLock;

static TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\((\d{4})\)\s*$").expect("static regex"));
static HOURS_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*h\D*?(\d+)\s*m").expect("static regex"));
static HOURS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\d+)\s*h(oras?|rs?)?\s*$").expect("static regex"));
static MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*m").expect("static regex"));
static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:\d+D)?T(?:(\d+)H)?(?:(\d+)M)?(?:\d+S)?$").expect("static regex")
});
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("static regex"));

/// Splits a display title of the form `"Name (YYYY)"`.
pub fn split_title_year(display: &str) -> (String, Option<i32>) {
    let display = display.trim();
    match TRAILING_YEAR.captures(display) {
        Some(caps) if !caps[1].trim().is_empty() => {
            (caps[1].trim().to_string(), caps[2].parse().ok())
        }
        _ => (display.to_string(), None),
    }
}

/// First plausible four-digit year in free text.
pub fn find_year(text: &str) -> Option<i32> {
    YEAR.captures(text).and_then(|c| c[1].parse().ok())
}

/// Classifies content by URL path segments and badge text.
/// Anime markers win over series markers; everything else is a movie.
pub fn classify_kind(url: &str, badge: Option<&str>, title: &str) -> ContentKind {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|_| url.to_ascii_lowercase());
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let badge = badge.map(str::to_lowercase).unwrap_or_default();

    let has_segment = |names: &[&str]| segments.iter().any(|s| names.contains(s));

    if has_segment(&["anime", "animes"]) || badge.contains("anime") {
        return ContentKind::Anime;
    }

    let title = title.to_lowercase();
    if has_segment(&["serie", "series", "tv", "novela", "novelas"])
        || badge.contains("série")
        || badge.contains("serie")
        || title.contains("temporada")
    {
        return ContentKind::Series;
    }

    ContentKind::Movie
}

/// Parses `"1h 30m"`, `"95 min"`, `"2h"` or ISO-8601 `"PT1H30M"` into minutes.
pub fn parse_duration(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DURATION.captures(text) {
        let hours: u32 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let minutes: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        return to_minutes(hours, minutes).filter(|m| *m > 0);
    }

    if let Some(caps) = HOURS_MINUTES.captures(text) {
        let hours: u32 = caps[1].parse().ok()?;
        let minutes: u32 = caps[2].parse().ok()?;
        return to_minutes(hours, minutes);
    }

    if let Some(caps) = HOURS_ONLY.captures(text) {
        return caps[1].parse::<u32>().ok().and_then(|h| to_minutes(h, 0));
    }

    MINUTES.captures(text).and_then(|c| c[1].parse().ok())
}

/// `None` when the scraped figures do not fit.
fn to_minutes(hours: u32, minutes: u32) -> Option<u32> {
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Strips a `" - Site"` or `" | Site"` suffix from a `<title>` value.
pub fn clean_page_title(title: &str, site_name: &str) -> String {
    let site = site_name.to_lowercase();
    let mut cleaned = title.trim();
    for separator in [" | ", " - ", " – "] {
        if let Some((head, tail)) = cleaned.rsplit_once(separator) {
            if tail.to_lowercase().contains(&site) {
                cleaned = head.trim();
            }
        }
    }
    for prefix in ["Assistir ", "assistir "] {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim();
        }
    }
    cleaned.to_string()
}
