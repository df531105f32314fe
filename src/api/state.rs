use std::sync::Arc;

use crate::services::{
    providers::{CatalogSearch, ExternalIdLookup, RecommendationModel},
    AggregatorConfig, CandidateResolver, EnhancementService, IdentifierLookup, ResolverConfig,
};

/// Shared application state
///
/// Holds only injected ports and immutable configuration; nothing is cached
/// between requests.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogSearch>,
    pub model: Arc<dyn RecommendationModel>,
    pub enhancement: EnhancementService,
    pub aggregator: AggregatorConfig,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogSearch>,
        lookup: Arc<dyn ExternalIdLookup>,
        model: Arc<dyn RecommendationModel>,
        resolver: ResolverConfig,
        aggregator: AggregatorConfig,
    ) -> Self {
        let enhancement = EnhancementService::new(
            Arc::new(CandidateResolver::new(catalog.clone(), resolver)),
            Arc::new(IdentifierLookup::new(lookup)),
        );

        Self {
            catalog,
            model,
            enhancement,
            aggregator,
        }
    }
}
