use std::sync::Arc;

use crate::{
    models::{recommendation::imdb_url, Kind},
    services::providers::ExternalIdLookup,
};

/// IMDb id and its deep link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    pub id: String,
    pub url: String,
}

/// Resolves catalog entries to IMDb identifiers
///
/// One call per entry with no retry. Any failure, or a response without a
/// usable id, yields `None`; errors never reach the caller.
pub struct IdentifierLookup {
    lookup: Arc<dyn ExternalIdLookup>,
}

impl IdentifierLookup {
    pub fn new(lookup: Arc<dyn ExternalIdLookup>) -> Self {
        Self { lookup }
    }

    pub async fn lookup(&self, catalog_id: u64, kind: Kind) -> Option<CrossReference> {
        let ids = match self.lookup.external_ids(catalog_id, kind).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    catalog_id = catalog_id,
                    kind = %kind,
                    "External id lookup failed"
                );
                return None;
            }
        };

        let id = ids.imdb_id.filter(|id| !id.trim().is_empty())?;
        let url = imdb_url(&id);
        Some(CrossReference { id, url })
    }
}
