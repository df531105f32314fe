/// External collaborator ports
///
/// The resolver, identifier lookup and stream aggregator only ever talk to
/// these traits. Concrete adapters (TMDB for the catalog, Gemini for the
/// token stream) are constructed once in `main` and shared behind `Arc`.
use futures::stream::BoxStream;

use crate::{
    error::AppResult,
    models::{CatalogEntry, ExternalIds, Kind},
};

pub mod gemini;
pub mod tmdb;

/// Ordered, append-only text fragments from the generative model
///
/// Exhaustion is the end-of-stream signal; an `Err` item is a transport
/// failure and ends the session.
pub type TokenStream = BoxStream<'static, AppResult<String>>;

/// Filters for the catalog's discovery endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverFilter {
    pub kind: Kind,
    pub year: i32,
    pub country: Option<String>,
    pub language: Option<String>,
}

/// Free-text and filtered search over the media catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Search movies and series together; entries carry a kind tag
    async fn search_multi(&self, query: &str) -> AppResult<Vec<CatalogEntry>>;

    /// Search one kind's catalog constrained to a year; entries lack a kind tag
    async fn search_typed(&self, kind: Kind, query: &str, year: i32)
        -> AppResult<Vec<CatalogEntry>>;

    /// Browse by year, country and language; entries lack a kind tag
    async fn discover(&self, filter: &DiscoverFilter) -> AppResult<Vec<CatalogEntry>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Cross-reference identifier lookup for a catalog entry
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExternalIdLookup: Send + Sync {
    async fn external_ids(&self, catalog_id: u64, kind: Kind) -> AppResult<ExternalIds>;
}

/// Generative model producing recommendation text token by token
#[async_trait::async_trait]
pub trait RecommendationModel: Send + Sync {
    async fn stream_recommendations(&self, prompt: &str) -> AppResult<TokenStream>;

    fn name(&self) -> &'static str;
}
