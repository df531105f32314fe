use serde::Deserialize;
use std::time::Duration;

use crate::services::{
    aggregator::{AggregatorConfig, RevealGranularity},
    resolver::ResolverConfig,
    scoring::ScoreWeights,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Google Generative Language API key
    pub google_api_key: String,

    /// Generative Language API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Model used to generate recommendations
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// How rationale text is revealed to clients (char, word or field)
    #[serde(default)]
    pub reveal_granularity: RevealGranularity,

    /// Pause between revealed fragments, in milliseconds
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,

    /// Longest wait for the next model chunk before the session fails
    #[serde(default = "default_chunk_timeout_secs")]
    pub chunk_timeout_secs: u64,

    /// Minimum score for broad and typed search results
    #[serde(default = "default_min_accept_score")]
    pub min_accept_score: u32,

    /// Minimum score for discovery results
    #[serde(default = "default_min_discovery_score")]
    pub min_discovery_score: u32,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_reveal_delay_ms() -> u64 {
    8
}

fn default_chunk_timeout_secs() -> u64 {
    30
}

fn default_min_accept_score() -> u32 {
    20
}

fn default_min_discovery_score() -> u32 {
    15
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Only the accept bars come from the environment; score weights keep their defaults
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            weights: ScoreWeights::default(),
            min_accept_score: self.min_accept_score,
            min_discovery_score: self.min_discovery_score,
        }
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            granularity: self.reveal_granularity,
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
            chunk_timeout: Duration::from_secs(self.chunk_timeout_secs),
            ..AggregatorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            ("TMDB_API_KEY".to_string(), "tmdb".to_string()),
            ("GOOGLE_API_KEY".to_string(), "google".to_string()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        vars
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(vars(&[])).unwrap();
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.port, 3000);
        assert_eq!(config.reveal_granularity, RevealGranularity::Char);
        assert_eq!(config.min_accept_score, 20);
        assert_eq!(config.min_discovery_score, 15);
    }

    #[test]
    fn test_overrides_flow_into_service_configs() {
        let config: Config = envy::from_iter(vars(&[
            ("REVEAL_GRANULARITY", "word"),
            ("REVEAL_DELAY_MS", "0"),
            ("CHUNK_TIMEOUT_SECS", "5"),
            ("MIN_ACCEPT_SCORE", "30"),
        ]))
        .unwrap();

        let aggregator = config.aggregator_config();
        assert_eq!(aggregator.granularity, RevealGranularity::Word);
        assert_eq!(aggregator.reveal_delay, Duration::ZERO);
        assert_eq!(aggregator.chunk_timeout, Duration::from_secs(5));

        let resolver = config.resolver_config();
        assert_eq!(resolver.min_accept_score, 30);
        assert_eq!(resolver.min_discovery_score, 15);
        assert_eq!(resolver.weights, ScoreWeights::default());
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = envy::from_iter::<_, Config>(vec![(
            "TMDB_API_KEY".to_string(),
            "tmdb".to_string(),
        )]);
        assert!(result.is_err());
    }
}
