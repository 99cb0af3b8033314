use crate::core::{FetchRequest, Fetcher, MediaType, StreamCandidate};
use crate::resolver::hls;
use futures::future::join_all;
use tracing::debug;

const PLAYLIST_PROBE_BYTES: usize = 256 * 1024;
const VIDEO_PROBE_BYTES: usize = 2048;

/// Probes each candidate and keeps only those that actually serve media.
/// Master playlists are replaced by their variants.
pub async fn verify_candidates(fetcher: &dyn Fetcher, candidates: Vec<StreamCandidate>) -> Vec<StreamCandidate> {
    let probes = candidates.into_iter().map(|candidate| probe(fetcher, candidate));
    let mut verified: Vec<StreamCandidate> = Vec::new();
    for group in join_all(probes).await {
        for candidate in group {
            if !verified.iter().any(|c| c.url == candidate.url) {
                verified.push(candidate);
            }
        }
    }
    verified
}

async fn probe(fetcher: &dyn Fetcher, candidate: StreamCandidate) -> Vec<StreamCandidate> {
    let request = FetchRequest::get(&candidate.url).referer(candidate.referer.as_deref());
    let request = match candidate.media_type {
        MediaType::Hls => request.limit(PLAYLIST_PROBE_BYTES),
        MediaType::ProgressiveVideo => request.header("Range", "bytes=0-1").limit(VIDEO_PROBE_BYTES),
    };

    let response = match fetcher.fetch(request).await {
        Ok(response) => response,
        Err(e) => {
            debug!("dropping {}: {}", candidate.url, e);
            return Vec::new();
        }
    };

    if !response.is_success() {
        debug!("dropping {}: HTTP {}", candidate.url, response.status);
        return Vec::new();
    }

    match candidate.media_type {
        MediaType::Hls => {
            if !hls::is_playlist(&response.body) {
                debug!("dropping {}: not a playlist", candidate.url);
                return Vec::new();
            }
            let variants = hls::master_variants(&response.body, &response.url);
            if variants.is_empty() {
                return vec![candidate];
            }
            variants
                .into_iter()
                .map(|variant| StreamCandidate {
                    url: variant.url,
                    media_type: MediaType::Hls,
                    quality: variant.quality,
                    ..candidate.clone()
                })
                .collect()
        }
        MediaType::ProgressiveVideo => {
            if response.looks_like_html() {
                debug!("dropping {}: served a page, not video", candidate.url);
                return Vec::new();
            }
            vec![candidate]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Quality, ScriptedFetcher};

    #[tokio::test]
    async fn test_keeps_only_serving_candidates() {
        let fetcher = ScriptedFetcher::new()
            .route("https://cdn.example/ok.m3u8", "#EXTM3U\n#EXTINF:10,\na.ts\n")
            .route("https://cdn.example/page.m3u8", "<html>blocked</html>")
            .route_status("https://cdn.example/gone.mp4", 404, "")
            .route("https://cdn.example/ok.mp4", "\u{0}\u{0}\u{0}\u{18}ftypmp42");

        let candidates = vec![
            StreamCandidate::new("https://cdn.example/ok.m3u8", "test"),
            StreamCandidate::new("https://cdn.example/page.m3u8", "test"),
            StreamCandidate::new("https://cdn.example/gone.mp4", "test"),
            StreamCandidate::new("https://cdn.example/ok.mp4", "test"),
            StreamCandidate::new("https://cdn.example/unreachable.mp4", "test"),
        ];

        let verified = verify_candidates(&fetcher, candidates).await;
        let urls: Vec<&str> = verified.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://cdn.example/ok.m3u8", "https://cdn.example/ok.mp4"]);
    }

    #[tokio::test]
    async fn test_master_playlist_expands_to_variants() {
        let master = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1,RESOLUTION=1920x1080\nhd/index.m3u8\n";
        let fetcher = ScriptedFetcher::new().route("https://cdn.example/v/master.m3u8", master);

        let candidate = StreamCandidate::new("https://cdn.example/v/master.m3u8", "filemoon")
            .with_referer(Some("https://filemoon.in/e/1"));
        let verified = verify_candidates(&fetcher, vec![candidate]).await;

        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].url, "https://cdn.example/v/hd/index.m3u8");
        assert_eq!(verified[0].quality, Quality::P1080);
        assert_eq!(verified[0].referer.as_deref(), Some("https://filemoon.in/e/1"));
        assert_eq!(verified[0].source, "filemoon");
    }
}
