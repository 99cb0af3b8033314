use crate::core::{CatalogEntry, Category, DetailRecord};
use crate::error::{Result, ScrapeError};
use crate::resolver::Resolution;
use async_trait::async_trait;
use url::Url;

/// The operations a site exposes to the host application.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
    fn base_url(&self) -> &str;
    fn categories(&self) -> Vec<Category>;
    fn suitable(&self, url: &Url) -> bool;

    async fn list_catalog(&self, category_url: &str, page: u32) -> Result<Vec<CatalogEntry>>;
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>>;
    async fn load_detail(&self, url: &str) -> Result<DetailRecord>;

    /// Never fails: an empty [`Resolution`] means no playable source was found.
    async fn resolve_links(&self, playback_ref: &str) -> Resolution;
}

pub struct ProviderRegistry {
    pub providers: Vec<Box<dyn Provider>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn register(&mut self, provider: Box<dyn Provider>) {
        self.providers.push(provider);
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn get(&self, name: &str) -> Result<&dyn Provider> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .map(|p| p.as_ref())
            .ok_or_else(|| ScrapeError::UnknownSite(name.to_string()))
    }

    /// Finds the provider whose site serves `url`.
    pub fn for_url(&self, url: &str) -> Result<&dyn Provider> {
        let parsed = Url::parse(url).map_err(|source| ScrapeError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        self.providers
            .iter()
            .find(|p| p.suitable(&parsed))
            .map(|p| p.as_ref())
            .ok_or_else(|| ScrapeError::UnknownSite(parsed.host_str().unwrap_or(url).to_string()))
    }
}
