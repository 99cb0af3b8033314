use crate::core::{CatalogEntry, Document, Element};
use crate::error::Result;
use crate::extract::title::{classify_kind, find_year, split_title_year};
use crate::sites::profile::{read_first_in, SiteProfile};
use crate::utils::{absolutize, upgrade_poster};
use tracing::debug;
use url::Url;

/// Maps listing pages (category or search results) into [`CatalogEntry`] values.
pub struct CatalogExtractor<'a> {
    profile: &'a SiteProfile,
}

impl<'a> CatalogExtractor<'a> {
    pub fn new(profile: &'a SiteProfile) -> Self {
        Self { profile }
    }

    /// Items lacking a title or link are skipped; a page with no usable items
    /// yields an empty list rather than an error.
    pub fn extract(&self, html: &str, page_url: &Url) -> Result<Vec<CatalogEntry>> {
        let doc = Document::parse(html)?;
        let items = doc.select(&self.profile.catalog.item);
        debug!("{}: {} listing items on {}", self.profile.name, items.len(), page_url);

        let mut entries: Vec<CatalogEntry> = Vec::new();
        for item in &items {
            match self.entry(item, page_url) {
                Some(entry) => {
                    if !entries.iter().any(|e| e.url == entry.url) {
                        entries.push(entry);
                    }
                }
                None => debug!("skipping listing item without title or link"),
            }
        }
        Ok(entries)
    }

    fn entry(&self, item: &Element<'_>, page_url: &Url) -> Option<CatalogEntry> {
        let selectors = &self.profile.catalog;

        let display = read_first_in(&selectors.title, item)?;
        let href = read_first_in(&selectors.link, item)?;
        let url = absolutize(page_url, &href)?;

        let (title, title_year) = split_title_year(&display);
        if title.is_empty() {
            return None;
        }

        let year = title_year.or_else(|| {
            selectors
                .year
                .as_ref()
                .and_then(|source| source.read_in(item))
                .and_then(|text| find_year(&text))
        });

        let poster_url = read_first_in(&selectors.poster, item)
            .and_then(|src| absolutize(page_url, &src))
            .map(|src| upgrade_poster(&src));

        let badge = selectors.badge.as_ref().and_then(|source| source.read_in(item));
        let kind = classify_kind(&url, badge.as_deref(), &title);

        Some(CatalogEntry {
            title,
            url,
            poster_url,
            year,
            kind,
        })
    }
}
