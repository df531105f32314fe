use serde::{Deserialize, Serialize};

use super::{CatalogEntry, Kind};

const IMDB_TITLE_URL: &str = "https://www.imdb.com/title";

/// Three seed titles the user enjoyed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendationInput {
    #[serde(default)]
    pub title1: String,
    #[serde(default)]
    pub title2: String,
    #[serde(default)]
    pub title3: String,
}

impl RecommendationInput {
    pub fn titles(&self) -> [&str; 3] {
        [
            self.title1.trim(),
            self.title2.trim(),
            self.title3.trim(),
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.titles().iter().all(|t| !t.is_empty())
    }
}

/// One recommendation as written by the generative model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: Kind,
    #[serde(default)]
    pub brief_reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
}

/// Recommendation after a catalog enhancement attempt
///
/// `enhanced` is set whether or not a catalog match was found; the catalog
/// fields are only populated on a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedRecord {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_url: Option<String>,
    pub enhanced: bool,
}

impl ResolvedRecord {
    /// Attempted but unmatched: original fields pass through
    pub fn unresolved(recommendation: Recommendation) -> Self {
        Self {
            recommendation,
            tmdb_id: None,
            poster_path: None,
            backdrop_path: None,
            vote_average: None,
            vote_count: None,
            imdb_id: None,
            imdb_url: None,
            enhanced: true,
        }
    }

    pub fn resolved(
        recommendation: Recommendation,
        entry: &CatalogEntry,
        imdb_id: Option<String>,
    ) -> Self {
        let imdb_url = imdb_id.as_deref().map(imdb_url);
        Self {
            recommendation,
            tmdb_id: Some(entry.id),
            poster_path: entry.poster_path.clone(),
            backdrop_path: entry.backdrop_path.clone(),
            vote_average: entry.vote_average,
            vote_count: entry.vote_count,
            imdb_id,
            imdb_url,
            enhanced: true,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.tmdb_id.is_some()
    }
}

/// Deep link for an IMDb title id
pub fn imdb_url(imdb_id: &str) -> String {
    format!("{}/{}/", IMDB_TITLE_URL, imdb_id)
}
