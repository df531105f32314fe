//! Match scoring between a catalog entry and a target profile
//!
//! Independent additive signals; no signal can subtract. Scores are only
//! meaningful relative to each other within a single resolution.

use crate::models::{CatalogEntry, Target};

/// Weights and thresholds for each scoring signal
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    pub exact_title: u32,
    pub partial_title: u32,
    pub same_year: u32,
    pub one_year_off: u32,
    pub two_years_off: u32,
    pub five_years_off: u32,
    pub kind_match: u32,
    pub country_match: u32,
    pub language_match: u32,
    pub high_rating: u32,
    pub popular: u32,
    /// Ratings strictly above this earn `high_rating`
    pub rating_threshold: f64,
    /// Popularity strictly above this earns `popular`
    pub popularity_threshold: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            exact_title: 50,
            partial_title: 30,
            same_year: 40,
            one_year_off: 30,
            two_years_off: 15,
            five_years_off: 5,
            kind_match: 25,
            country_match: 20,
            language_match: 15,
            high_rating: 10,
            popular: 5,
            rating_threshold: 7.0,
            popularity_threshold: 20.0,
        }
    }
}

/// Scores how well `entry` matches `target`
pub fn score(entry: &CatalogEntry, target: &Target, weights: &ScoreWeights) -> u32 {
    title_score(entry, target, weights)
        + year_score(entry, target, weights)
        + kind_score(entry, target, weights)
        + origin_score(entry, target, weights)
        + popularity_score(entry, weights)
}

fn title_score(entry: &CatalogEntry, target: &Target, weights: &ScoreWeights) -> u32 {
    let candidate = entry.display_name().unwrap_or_default().to_lowercase();
    let wanted = target.title().to_lowercase();

    if candidate == wanted {
        weights.exact_title
    } else if candidate.contains(&wanted) || wanted.contains(&candidate) {
        weights.partial_title
    } else {
        0
    }
}

fn year_score(entry: &CatalogEntry, target: &Target, weights: &ScoreWeights) -> u32 {
    let Some(year) = entry.release_year() else {
        return 0;
    };

    match (year - target.year()).unsigned_abs() {
        0 => weights.same_year,
        1 => weights.one_year_off,
        2 => weights.two_years_off,
        3..=5 => weights.five_years_off,
        _ => 0,
    }
}

fn kind_score(entry: &CatalogEntry, target: &Target, weights: &ScoreWeights) -> u32 {
    if entry.kind() == Some(target.kind()) {
        weights.kind_match
    } else {
        0
    }
}

fn origin_score(entry: &CatalogEntry, target: &Target, weights: &ScoreWeights) -> u32 {
    let mut total = 0;

    if let Some(country) = target.country() {
        if entry.origin_country.iter().any(|c| c == country) {
            total += weights.country_match;
        }
    }

    if let Some(language) = target.language() {
        if entry.original_language.as_deref() == Some(language) {
            total += weights.language_match;
        }
    }

    total
}

fn popularity_score(entry: &CatalogEntry, weights: &ScoreWeights) -> u32 {
    let mut total = 0;

    if entry.vote_average.is_some_and(|r| r > weights.rating_threshold) {
        total += weights.high_rating;
    }
    if entry.popularity.is_some_and(|p| p > weights.popularity_threshold) {
        total += weights.popular;
    }

    total
}
