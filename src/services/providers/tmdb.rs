/// TMDB API provider
///
/// Implements both catalog search and external id lookup against TMDB v3.
///
/// API Flow:
/// 1. Broad search: /search/multi → movies, series and people, tagged with `media_type`
/// 2. Typed search: /search/{movie|tv}?year= → untagged entries of one kind
/// 3. Discovery: /discover/{movie|tv} → untagged entries filtered by year/country/language
/// 4. Cross reference: /{movie|tv}/{id}/external_ids → IMDb id
use crate::{
    error::{AppError, AppResult},
    models::{CatalogEntry, ExternalIds, Kind},
    services::providers::{CatalogSearch, DiscoverFilter, ExternalIdLookup},
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Issues an authenticated GET and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn get_results(&self, path: &str, params: &[(&str, String)]) -> AppResult<Vec<CatalogEntry>> {
        let body: serde_json::Value = self.get_json(path, params).await?;
        let entries = parse_results(&body)?;

        tracing::debug!(
            path = %path,
            results = entries.len(),
            provider = "tmdb",
            "Catalog request completed"
        );

        Ok(entries)
    }
}

/// Extracts the `results` array, skipping entries that fail to decode
fn parse_results(body: &serde_json::Value) -> AppResult<Vec<CatalogEntry>> {
    let results = body["results"]
        .as_array()
        .ok_or_else(|| AppError::ExternalApi("Invalid TMDB response format".to_string()))?;

    Ok(results
        .iter()
        .filter_map(|result| serde_json::from_value::<CatalogEntry>(result.clone()).ok())
        .collect())
}

fn discover_params(filter: &DiscoverFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![("primary_release_year", filter.year.to_string())];
    if let Some(language) = &filter.language {
        params.push(("with_original_language", language.clone()));
    }
    if let Some(country) = &filter.country {
        params.push(("with_origin_country", country.clone()));
    }
    params
}

#[async_trait::async_trait]
impl CatalogSearch for TmdbProvider {
    async fn search_multi(&self, query: &str) -> AppResult<Vec<CatalogEntry>> {
        self.get_results("/search/multi", &[("query", query.to_string())])
            .await
    }

    async fn search_typed(
        &self,
        kind: Kind,
        query: &str,
        year: i32,
    ) -> AppResult<Vec<CatalogEntry>> {
        let path = format!("/search/{}", kind.catalog_type());
        self.get_results(
            &path,
            &[("query", query.to_string()), ("year", year.to_string())],
        )
        .await
    }

    async fn discover(&self, filter: &DiscoverFilter) -> AppResult<Vec<CatalogEntry>> {
        let path = format!("/discover/{}", filter.kind.catalog_type());
        self.get_results(&path, &discover_params(filter)).await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[async_trait::async_trait]
impl ExternalIdLookup for TmdbProvider {
    async fn external_ids(&self, catalog_id: u64, kind: Kind) -> AppResult<ExternalIds> {
        let path = format!("/{}/{}/external_ids", kind.catalog_type(), catalog_id);
        self.get_json(&path, &[]).await
    }
}
