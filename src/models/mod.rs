use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

pub mod catalog;
pub mod events;
pub mod recommendation;
pub mod session;

pub use catalog::{CatalogEntry, ExternalIds, Provenance, ScoredCandidate, Suggestion};
pub use events::{RecordFields, StreamEvent, WireEvent};
pub use recommendation::{Recommendation, RecommendationInput, ResolvedRecord};
pub use session::{AggregateState, RecordSlot, SLOT_COUNT};

/// Film or series classification, serialized the way the model writes it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Kind {
    #[serde(rename = "Movie", alias = "movie", alias = "Film", alias = "film")]
    Film,
    #[serde(
        rename = "TV Show",
        alias = "tv",
        alias = "TV Series",
        alias = "Series",
        alias = "series"
    )]
    Series,
}

impl Kind {
    /// Catalog segment for this kind ("movie" or "tv")
    pub fn catalog_type(&self) -> &'static str {
        match self {
            Kind::Film => "movie",
            Kind::Series => "tv",
        }
    }

    pub fn from_catalog_type(media_type: &str) -> Option<Kind> {
        match media_type {
            "movie" => Some(Kind::Film),
            "tv" => Some(Kind::Series),
            _ => None,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Film => write!(f, "Movie"),
            Kind::Series => write!(f, "TV Show"),
        }
    }
}

/// Query profile resolved against the catalog
///
/// Built once per candidate and never mutated afterwards. Blank optional
/// hints are normalized to `None` so they never count as a match signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    title: String,
    year: i32,
    kind: Kind,
    country: Option<String>,
    language: Option<String>,
}

impl Target {
    /// Creates a target, rejecting a blank title or a non-positive year
    pub fn new(title: impl Into<String>, year: i32, kind: Kind) -> AppResult<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Target title is required".to_string()));
        }
        if year <= 0 {
            return Err(AppError::InvalidInput(format!(
                "Target year must be positive, got {}",
                year
            )));
        }

        Ok(Self {
            title,
            year,
            kind,
            country: None,
            language: None,
        })
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = non_blank(country);
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = non_blank(language);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl TryFrom<&Recommendation> for Target {
    type Error = AppError;

    fn try_from(rec: &Recommendation) -> AppResult<Self> {
        Ok(Target::new(rec.title.clone(), rec.year, rec.kind)?
            .with_country(rec.country.clone())
            .with_language(rec.original_language.clone()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
