//! The built-in sites, each a [`SiteProfile`] driven by the generic extractors.

pub mod profile;
pub mod superflix;
pub mod ultracine;
pub mod vizer;

pub use profile::SiteProfile;

use crate::config::Config;
use crate::core::{CatalogEntry, Category, DetailRecord, FetchRequest, Fetcher, Provider, ProviderRegistry};
use crate::error::{Result, ScrapeError};
use crate::extract::{CatalogExtractor, DetailExtractor};
use crate::resolver::{LinkResolver, Resolution};
use crate::utils::same_site;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// A site backed by a profile, a fetcher and a shared link resolver.
pub struct SiteProvider {
    profile: SiteProfile,
    fetcher: Arc<dyn Fetcher>,
    resolver: Arc<LinkResolver>,
}

impl SiteProvider {
    pub fn new(profile: SiteProfile, fetcher: Arc<dyn Fetcher>, resolver: Arc<LinkResolver>) -> Self {
        Self {
            profile,
            fetcher,
            resolver,
        }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    fn referer(&self) -> String {
        format!("{}/", self.profile.base_url)
    }

    fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|source| ScrapeError::InvalidUrl {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches a listing page and reads its entries; error statuses read as an empty page.
    async fn listing(&self, page_url: &str) -> Result<Vec<CatalogEntry>> {
        let url = Self::parse_url(page_url)?;
        let response = self
            .fetcher
            .fetch(FetchRequest::get(page_url).referer(Some(&self.referer())))
            .await?;
        if !response.is_success() {
            warn!("{}: HTTP {} for {}", self.profile.name, response.status, page_url);
            return Ok(Vec::new());
        }

        let entries = CatalogExtractor::new(&self.profile).extract(&response.body, &url)?;
        info!("{}: {} entries from {}", self.profile.name, entries.len(), page_url);
        Ok(entries)
    }
}

#[async_trait]
impl Provider for SiteProvider {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn base_url(&self) -> &str {
        &self.profile.base_url
    }

    fn categories(&self) -> Vec<Category> {
        self.profile.category_list()
    }

    fn suitable(&self, url: &Url) -> bool {
        Url::parse(&self.profile.base_url)
            .map(|base| same_site(&base, url))
            .unwrap_or(false)
    }

    async fn list_catalog(&self, category_url: &str, page: u32) -> Result<Vec<CatalogEntry>> {
        self.listing(&self.profile.page_url(category_url, page)).await
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.listing(&self.profile.search_url(query)).await
    }

    async fn load_detail(&self, url: &str) -> Result<DetailRecord> {
        let page_url = Self::parse_url(url)?;
        let response = self
            .fetcher
            .fetch(FetchRequest::get(url).referer(Some(&self.referer())))
            .await?;
        if !response.is_success() {
            return Err(ScrapeError::NotFound(format!("HTTP {} for {}", response.status, url)));
        }

        let extractor = DetailExtractor::new(&self.profile);
        let mut page = extractor.extract(&response.body, &page_url)?;

        if let Some(frame) = page.episode_frame.take() {
            debug!("{}: loading episode list from {}", self.profile.name, frame);
            match self.fetcher.fetch(FetchRequest::get(&frame).referer(Some(url))).await {
                Ok(inner) if inner.is_success() => {
                    let frame_url = Self::parse_url(&frame)?;
                    page.record.episodes = extractor.episodes(&inner.body, &frame_url).unwrap_or_default();
                }
                Ok(inner) => warn!("{}: episode frame HTTP {}", self.profile.name, inner.status),
                Err(e) => warn!("{}: episode frame unavailable: {}", self.profile.name, e),
            }
        }

        info!(
            "{}: '{}' ({}, {} episodes)",
            self.profile.name,
            page.record.title,
            page.record.kind,
            page.record.episodes.len()
        );
        Ok(page.record)
    }

    async fn resolve_links(&self, playback_ref: &str) -> Resolution {
        let token = self.profile.episode_ref(playback_ref.trim());
        self.resolver.resolve(&token, Some(&self.referer())).await
    }
}

/// Built-in profiles with any configured base URL overrides applied.
pub fn builtin_profiles(config: &Config) -> Vec<SiteProfile> {
    [superflix::profile(), ultracine::profile(), vizer::profile()]
        .into_iter()
        .map(|profile| match config.base_url_for(&profile.name) {
            Some(base) => profile.with_base_url(base),
            None => profile,
        })
        .collect()
}

/// Registers every built-in site against one fetcher and one shared resolver.
pub fn builtin_registry(config: &Config, fetcher: Arc<dyn Fetcher>) -> ProviderRegistry {
    let resolver = Arc::new(LinkResolver::new(fetcher.clone(), config));
    let mut registry = ProviderRegistry::new();
    for profile in builtin_profiles(config) {
        registry.register(Box::new(SiteProvider::new(profile, fetcher.clone(), resolver.clone())));
    }
    registry
}
