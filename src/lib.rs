pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod extract;
pub mod resolver;
pub mod sites;
pub mod utils;

pub use config::Config;
pub use crate::core::{
    CatalogEntry, Category, ContentKind, DetailRecord, EpisodeRef, Fetcher, HttpFetcher, Provider,
    ProviderRegistry, StreamCandidate,
};
pub use error::{Result, ScrapeError};
pub use resolver::{LinkResolver, Resolution};
pub use sites::{builtin_registry, SiteProvider};
