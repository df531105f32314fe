use crate::{error::AppResult, models::Suggestion, services::providers::CatalogSearch};
use std::sync::Arc;

const MIN_QUERY_CHARS: usize = 2;
const MAX_SUGGESTIONS: usize = 8;
const MIN_VOTE_COUNT: u64 = 10;

/// Autocomplete suggestions for a seed title input
///
/// Only movies and series with a display name and more than a handful of
/// ratings are offered, so people and obscure entries never show up.
pub async fn suggest(catalog: Arc<dyn CatalogSearch>, query: &str) -> AppResult<Vec<Suggestion>> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }

    let entries = catalog.search_multi(query).await?;

    let suggestions: Vec<Suggestion> = entries
        .into_iter()
        .filter(|e| matches!(e.media_type.as_deref(), Some("movie") | Some("tv")))
        .filter(|e| e.vote_count.is_some_and(|votes| votes > MIN_VOTE_COUNT))
        .filter_map(Suggestion::from_entry)
        .take(MAX_SUGGESTIONS)
        .collect();

    tracing::debug!(query = %query, suggestions = suggestions.len(), "Autocomplete search");

    Ok(suggestions)
}
