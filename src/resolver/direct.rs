use crate::core::StreamCandidate;
use crate::error::Result;
use crate::resolver::{patterns, PlaybackRef, ResolutionStrategy};
use async_trait::async_trait;

/// The reference already is a media file address.
pub struct DirectMedia;

#[async_trait]
impl ResolutionStrategy for DirectMedia {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn accepts(&self, reference: &PlaybackRef) -> bool {
        reference.url().is_some() && patterns::is_media_url(reference.as_str())
    }

    async fn try_resolve(&self, reference: &PlaybackRef) -> Result<Vec<StreamCandidate>> {
        let candidate = StreamCandidate::new(reference.as_str(), self.name())
            .with_referer(reference.referer())
            .with_language(patterns::infer_language(reference.as_str()));
        Ok(vec![candidate])
    }
}
