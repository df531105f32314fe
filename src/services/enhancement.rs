use std::sync::Arc;

use crate::{
    models::{Recommendation, ResolvedRecord, Target},
    services::{identifiers::IdentifierLookup, resolver::CandidateResolver},
};

/// Attaches catalog metadata and IMDb links to model recommendations
#[derive(Clone)]
pub struct EnhancementService {
    resolver: Arc<CandidateResolver>,
    identifiers: Arc<IdentifierLookup>,
}

impl EnhancementService {
    pub fn new(resolver: Arc<CandidateResolver>, identifiers: Arc<IdentifierLookup>) -> Self {
        Self {
            resolver,
            identifiers,
        }
    }

    /// Resolves one recommendation; never fails
    ///
    /// Records that cannot form a valid target, or that have no catalog
    /// match, come back unresolved with their original fields.
    pub async fn enhance(&self, recommendation: Recommendation) -> ResolvedRecord {
        let target = match Target::try_from(&recommendation) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(error = %e, title = %recommendation.title, "Skipping enhancement");
                return ResolvedRecord::unresolved(recommendation);
            }
        };

        let Some(entry) = self.resolver.resolve(&target).await else {
            tracing::info!(title = %target.title(), year = target.year(), "No catalog match");
            return ResolvedRecord::unresolved(recommendation);
        };

        let kind = entry.kind().unwrap_or(target.kind());
        let imdb_id = self
            .identifiers
            .lookup(entry.id, kind)
            .await
            .map(|cross_ref| cross_ref.id);

        ResolvedRecord::resolved(recommendation, &entry, imdb_id)
    }

    /// Enhances records concurrently, returning them in input order
    pub async fn enhance_batch(&self, recommendations: Vec<Recommendation>) -> Vec<ResolvedRecord> {
        tracing::info!(record_count = recommendations.len(), "Enhancing recommendation batch");

        let mut tasks = Vec::new();

        for recommendation in recommendations {
            let service = self.clone();
            let fallback = recommendation.clone();
            let task = tokio::spawn(async move { service.enhance(recommendation).await });
            tasks.push((task, fallback));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (task, fallback) in tasks {
            match task.await {
                Ok(record) => results.push(record),
                Err(e) => {
                    tracing::error!(error = %e, title = %fallback.title, "Enhancement task failed");
                    results.push(ResolvedRecord::unresolved(fallback));
                }
            }
        }

        let matched = results.iter().filter(|r| r.is_matched()).count();
        tracing::info!(matched, total = results.len(), "Enhancement batch complete");

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{CatalogEntry, ExternalIds, Kind};
    use crate::services::providers::{MockCatalogSearch, MockExternalIdLookup};
    use crate::services::resolver::ResolverConfig;

    fn recommendation(title: &str, year: i32, kind: Kind) -> Recommendation {
        Recommendation {
            title: title.to_string(),
            year,
            kind,
            brief_reasoning: "Fits the mood.".to_string(),
            country: None,
            original_language: None,
        }
    }

    fn entry(id: u64, title: &str, date: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            title: Some(title.to_string()),
            release_date: Some(date.to_string()),
            poster_path: Some(format!("/{}.jpg", id)),
            vote_average: Some(7.9),
            vote_count: Some(5000),
            ..Default::default()
        }
    }

    /// Catalog that knows "Arrival" (2016) and "Heat" (1995) by typed search only
    fn catalog() -> MockCatalogSearch {
        let mut catalog = MockCatalogSearch::new();
        catalog.expect_search_multi().returning(|_| Ok(vec![]));
        catalog.expect_search_typed().returning(|_, query, _| {
            Ok(match query {
                "Arrival" => vec![entry(329865, "Arrival", "2016-11-11")],
                "Heat" => vec![entry(949, "Heat", "1995-12-15")],
                _ => vec![],
            })
        });
        catalog.expect_discover().returning(|_| Ok(vec![]));
        catalog.expect_name().return_const("mock");
        catalog
    }

    fn service(catalog: MockCatalogSearch, lookup: MockExternalIdLookup) -> EnhancementService {
        EnhancementService::new(
            Arc::new(CandidateResolver::new(Arc::new(catalog), ResolverConfig::default())),
            Arc::new(IdentifierLookup::new(Arc::new(lookup))),
        )
    }

    #[tokio::test]
    async fn test_enhance_attaches_catalog_fields() {
        let mut lookup = MockExternalIdLookup::new();
        lookup
            .expect_external_ids()
            .withf(|id, kind| *id == 329865 && *kind == Kind::Film)
            .times(1)
            .returning(|_, _| Ok(ExternalIds { imdb_id: Some("tt2543164".to_string()) }));

        let record = service(catalog(), lookup)
            .enhance(recommendation("Arrival", 2016, Kind::Film))
            .await;

        assert!(record.enhanced);
        assert_eq!(record.tmdb_id, Some(329865));
        assert_eq!(record.poster_path.as_deref(), Some("/329865.jpg"));
        assert_eq!(record.imdb_url.as_deref(), Some("https://www.imdb.com/title/tt2543164/"));
        assert_eq!(record.recommendation.brief_reasoning, "Fits the mood.");
    }

    #[tokio::test]
    async fn test_lookup_failure_keeps_catalog_match() {
        let mut lookup = MockExternalIdLookup::new();
        lookup
            .expect_external_ids()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));

        let record = service(catalog(), lookup)
            .enhance(recommendation("Arrival", 2016, Kind::Film))
            .await;

        assert!(record.is_matched());
        assert_eq!(record.imdb_id, None);
        assert_eq!(record.imdb_url, None);
    }

    #[tokio::test]
    async fn test_unmatched_record_passes_through() {
        let mut lookup = MockExternalIdLookup::new();
        lookup.expect_external_ids().never();

        let original = recommendation("Nothing Like This", 2001, Kind::Film);
        let record = service(catalog(), lookup).enhance(original.clone()).await;

        assert!(record.enhanced);
        assert!(!record.is_matched());
        assert_eq!(record.recommendation, original);
    }

    #[tokio::test]
    async fn test_invalid_target_skips_catalog() {
        let mut catalog = MockCatalogSearch::new();
        catalog.expect_search_multi().never();
        catalog.expect_search_typed().never();
        catalog.expect_discover().never();

        let record = service(catalog, MockExternalIdLookup::new())
            .enhance(recommendation("   ", 2001, Kind::Film))
            .await;

        assert!(record.enhanced);
        assert!(!record.is_matched());
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let mut lookup = MockExternalIdLookup::new();
        lookup
            .expect_external_ids()
            .returning(|id, _| Ok(ExternalIds { imdb_id: Some(format!("tt{}", id)) }));

        let records = service(catalog(), lookup)
            .enhance_batch(vec![
                recommendation("Heat", 1995, Kind::Film),
                recommendation("Unknown", 2010, Kind::Series),
                recommendation("Arrival", 2016, Kind::Film),
            ])
            .await;

        let ids: Vec<Option<u64>> = records.iter().map(|r| r.tmdb_id).collect();
        assert_eq!(ids, vec![Some(949), None, Some(329865)]);
        assert_eq!(records[0].imdb_id.as_deref(), Some("tt949"));
        assert!(records.iter().all(|r| r.enhanced));
    }
}
