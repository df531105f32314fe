//! Candidate resolution against the media catalog
//!
//! A target is searched three ways: a broad multi-kind search, a search
//! scoped to the target's kind and year, and (when the target carries a
//! country or language hint) a discovery query. Every accepted result is
//! scored, merged by catalog id keeping the best score, and ranked.
//!
//! Strategy failures never fail the resolution: a strategy that errors
//! simply contributes no candidates.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{CatalogEntry, Kind, Provenance, ScoredCandidate, Target},
    services::{
        providers::{CatalogSearch, DiscoverFilter},
        scoring::{score, ScoreWeights},
    },
};

/// Scoring weights plus per-strategy inclusion bars
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub weights: ScoreWeights,
    /// Broad and typed results must score strictly above this
    pub min_accept_score: u32,
    /// Discovery results are pre-filtered, so they clear a lower bar
    pub min_discovery_score: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            min_accept_score: 20,
            min_discovery_score: 15,
        }
    }
}

pub struct CandidateResolver {
    catalog: Arc<dyn CatalogSearch>,
    config: ResolverConfig,
}

impl CandidateResolver {
    pub fn new(catalog: Arc<dyn CatalogSearch>, config: ResolverConfig) -> Self {
        Self { catalog, config }
    }

    /// Best catalog entry for `target`, or `None` when nothing clears the bar
    #[instrument(skip(self, target), fields(title = %target.title(), year = target.year()))]
    pub async fn resolve(&self, target: &Target) -> Option<CatalogEntry> {
        let ranked = self.rank(target).await;

        match ranked.into_iter().next() {
            Some(best) => {
                tracing::info!(
                    matched = best.entry.display_name().unwrap_or_default(),
                    catalog_id = best.entry.id,
                    score = best.score,
                    reason = best.provenance.as_str(),
                    "Best catalog match selected"
                );
                Some(best.entry)
            }
            None => {
                tracing::info!(provider = self.catalog.name(), "No catalog match found");
                None
            }
        }
    }

    /// All accepted candidates, deduplicated by id and ranked best first
    pub async fn rank(&self, target: &Target) -> Vec<ScoredCandidate> {
        let (broad, typed, discovery) = tokio::join!(
            self.broad_strategy(target),
            self.typed_strategy(target),
            self.discovery_strategy(target),
        );

        merge_candidates(broad.into_iter().chain(typed).chain(discovery))
    }

    async fn broad_strategy(&self, target: &Target) -> Vec<ScoredCandidate> {
        let entries = self.catalog.search_multi(target.title()).await;
        self.accept(
            entries,
            None,
            target,
            Provenance::Broad,
            self.config.min_accept_score,
        )
    }

    async fn typed_strategy(&self, target: &Target) -> Vec<ScoredCandidate> {
        let entries = self
            .catalog
            .search_typed(target.kind(), target.title(), target.year())
            .await;
        self.accept(
            entries,
            Some(target.kind()),
            target,
            Provenance::Typed,
            self.config.min_accept_score,
        )
    }

    async fn discovery_strategy(&self, target: &Target) -> Vec<ScoredCandidate> {
        if target.country().is_none() && target.language().is_none() {
            return Vec::new();
        }

        let filter = DiscoverFilter {
            kind: target.kind(),
            year: target.year(),
            country: target.country().map(str::to_string),
            language: target.language().map(str::to_string),
        };

        let entries = self.catalog.discover(&filter).await;
        self.accept(
            entries,
            Some(target.kind()),
            target,
            Provenance::Discovery,
            self.config.min_discovery_score,
        )
    }

    /// Scores one strategy's results, keeping those strictly above `min_score`
    ///
    /// `backfill` supplies the kind for endpoints whose results are untagged.
    fn accept(
        &self,
        entries: AppResult<Vec<CatalogEntry>>,
        backfill: Option<Kind>,
        target: &Target,
        provenance: Provenance,
        min_score: u32,
    ) -> Vec<ScoredCandidate> {
        let entries = match entries {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    strategy = provenance.as_str(),
                    provider = self.catalog.name(),
                    "Search strategy failed, treating as empty"
                );
                return Vec::new();
            }
        };

        let total = entries.len();
        let accepted: Vec<ScoredCandidate> = entries
            .into_iter()
            .filter_map(|mut entry| {
                if let Some(kind) = backfill {
                    entry.backfill_kind(kind);
                }
                let score = score(&entry, target, &self.config.weights);
                (score > min_score).then_some(ScoredCandidate {
                    entry,
                    score,
                    provenance,
                })
            })
            .collect();

        tracing::debug!(
            strategy = provenance.as_str(),
            results = total,
            accepted = accepted.len(),
            "Search strategy scored"
        );

        accepted
    }
}

/// Deduplicates by catalog id keeping the highest score, then ranks
///
/// Ties keep encounter order, so earlier strategies win over later ones.
pub fn merge_candidates(
    candidates: impl IntoIterator<Item = ScoredCandidate>,
) -> Vec<ScoredCandidate> {
    let mut best: HashMap<u64, (usize, ScoredCandidate)> = HashMap::new();

    for (seq, candidate) in candidates.into_iter().enumerate() {
        match best.get(&candidate.entry.id) {
            Some((_, existing)) if existing.score >= candidate.score => {}
            _ => {
                best.insert(candidate.entry.id, (seq, candidate));
            }
        }
    }

    let mut merged: Vec<(usize, ScoredCandidate)> = best.into_values().collect();
    merged.sort_by(|(seq_a, a), (seq_b, b)| b.score.cmp(&a.score).then(seq_a.cmp(seq_b)));
    merged.into_iter().map(|(_, candidate)| candidate).collect()
}
