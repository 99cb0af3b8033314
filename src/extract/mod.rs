//! Page readers that turn fetched markup into catalog and detail records.

pub mod catalog;
pub mod detail;
pub mod jsonld;
pub mod title;

pub use catalog::CatalogExtractor;
pub use detail::{DetailExtractor, DetailPage};
