use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Kind;

/// One search result from the TMDB catalog
///
/// Movie results populate `title`/`release_date`, series results populate
/// `name`/`first_air_date`. `media_type` is only present on multi-search
/// results and is back-filled for the typed endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    pub origin_country: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
}

impl CatalogEntry {
    /// Movie-style title, falling back to the series-style name
    pub fn display_name(&self) -> Option<&str> {
        populated(&self.title).or_else(|| populated(&self.name))
    }

    /// Year taken from whichever date field is populated
    pub fn release_year(&self) -> Option<i32> {
        let date = populated(&self.release_date).or_else(|| populated(&self.first_air_date))?;

        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| d.year())
            .ok()
            .or_else(|| date.get(..4).and_then(|y| y.parse().ok()))
    }

    /// Explicit kind tag, else inferred from which display field is set
    pub fn kind(&self) -> Option<Kind> {
        if let Some(kind) = self.media_type.as_deref().and_then(Kind::from_catalog_type) {
            return Some(kind);
        }

        match (populated(&self.title), populated(&self.name)) {
            (Some(_), None) => Some(Kind::Film),
            (None, Some(_)) => Some(Kind::Series),
            _ => None,
        }
    }

    /// Tags an entry from a kind-scoped endpoint with that endpoint's type
    pub fn backfill_kind(&mut self, kind: Kind) {
        self.media_type = Some(kind.catalog_type().to_string());
    }
}

fn populated(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Search strategy that produced a candidate, listed in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provenance {
    Broad,
    Typed,
    Discovery,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Broad => "multi-search",
            Provenance::Typed => "specific-search",
            Provenance::Discovery => "discover",
        }
    }
}

/// Catalog entry with the score it earned against one target
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub entry: CatalogEntry,
    pub score: u32,
    pub provenance: Provenance,
}

/// Cross-reference identifiers attached to a catalog entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExternalIds {
    pub imdb_id: Option<String>,
}

/// Autocomplete suggestion for the seed title inputs
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Suggestion {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub display_title: String,
    pub display_year: Option<i32>,
}

impl Suggestion {
    pub fn from_entry(entry: CatalogEntry) -> Option<Self> {
        let display_title = entry.display_name()?.to_string();
        let display_year = entry.release_year();
        Some(Self {
            entry,
            display_title,
            display_year,
        })
    }
}
