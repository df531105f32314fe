use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
    services::title_search,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// GET /api/search?q= - autocomplete for the seed title inputs
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Value>> {
    let results = title_search::suggest(state.catalog.clone(), &params.q).await?;
    Ok(Json(json!({ "results": results })))
}

/// POST /api/enhance - attach catalog data to already generated records
///
/// Records that are not recognisable recommendations are returned as sent.
/// Everything else comes back marked `enhanced`, matched or not, in the
/// order it was received.
pub async fn enhance(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    let items = body
        .get("recommendations")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::InvalidInput("Invalid recommendations data".to_string()))?;

    let parsed: Vec<Option<Recommendation>> = items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).ok())
        .collect();

    let mut enhanced = state
        .enhancement
        .enhance_batch(parsed.iter().flatten().cloned().collect())
        .await
        .into_iter();

    let mut recommendations = Vec::with_capacity(items.len());
    for (item, recommendation) in items.iter().zip(&parsed) {
        let record = match recommendation {
            Some(_) => enhanced.next(),
            None => None,
        };
        let value = match record {
            Some(record) => serde_json::to_value(record)?,
            None => mark_titled(item),
        };
        recommendations.push(value);
    }

    Ok(Json(json!({ "recommendations": recommendations })))
}

/// Items that carry a title count as enhanced even when they fail to decode
fn mark_titled(item: &Value) -> Value {
    let mut item = item.clone();
    let titled = item
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|title| !title.trim().is_empty());
    if let (true, Value::Object(map)) = (titled, &mut item) {
        map.insert("enhanced".to_string(), Value::Bool(true));
    }
    item
}
