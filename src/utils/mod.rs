use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TMDB_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/t/p/(w\d+|h\d+)/").expect("static regex"));

/// Resolves `href` against `base`, handling protocol-relative links.
/// Returns `None` for blank, fragment-only and `javascript:` links.
pub fn absolutize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// Same as [`absolutize`] but for references that may be opaque tokens:
/// only values that look like paths or URLs are joined.
pub fn absolutize_ref(base: &Url, token: &str) -> String {
    let token = token.trim();
    if token.starts_with("http://")
        || token.starts_with("https://")
        || token.starts_with("//")
        || token.starts_with('/')
    {
        absolutize(base, token).unwrap_or_else(|| token.to_string())
    } else {
        token.to_string()
    }
}

/// Swaps TMDB thumbnail size segments for the original image.
pub fn upgrade_poster(url: &str) -> String {
    TMDB_SIZE.replace(url, "/t/p/original/").into_owned()
}

pub fn first_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

pub fn same_site(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(x), Some(y)) => x.trim_start_matches("www.") == y.trim_start_matches("www."),
        _ => false,
    }
}
