pub mod document;
pub mod fetcher;
pub mod metadata;
pub mod provider;

pub use document::{Document, Element};
pub use fetcher::{FetchRequest, FetchResponse, Fetcher, HttpFetcher, Method, ScriptedFetcher};
pub use metadata::{
    CatalogEntry, Category, ContentKind, DetailRecord, EpisodeRef, MediaType, Quality,
    StreamCandidate,
};
pub use provider::{Provider, ProviderRegistry};
