/// Google Gemini provider
///
/// Streams generated text through `:streamGenerateContent?alt=sse`. The
/// response body is a server-sent event stream whose `data:` lines each carry
/// a partial `GenerateContentResponse`; every text part is yielded as one
/// token fragment.
use crate::{
    error::{AppError, AppResult},
    services::providers::{RecommendationModel, TokenStream},
};
use futures::StreamExt;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

/// Text carried by one SSE line, if it is a `data:` line with text parts
fn text_from_event_line(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    let response: GenerateContentResponse = match serde_json::from_str(payload) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping undecodable Gemini event");
            return None;
        }
    };

    let text: String = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect();

    (!text.is_empty()).then_some(text)
}

#[async_trait::async_trait]
impl RecommendationModel for GeminiProvider {
    async fn stream_recommendations(&self, prompt: &str) -> AppResult<TokenStream> {
        let url = format!(
            "{}/models/{}:streamGenerateContent",
            self.api_url, self.model
        );

        let response = self
            .http_client
            .post(&url)
            .query(&[("alt", "sse"), ("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Gemini request failed");
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        tracing::info!(model = %self.model, provider = "gemini", "Model stream opened");

        let mut bytes = Box::pin(response.bytes_stream());
        let stream = async_stream::try_stream! {
            // Lines are split on raw bytes so multi-byte characters never straddle a decode
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| AppError::Stream(e.to_string()))?;
                buffer.extend_from_slice(&chunk);

                while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    if let Some(text) = text_from_event_line(String::from_utf8_lossy(&line).trim_end()) {
                        yield text;
                    }
                }
            }

            if let Some(text) = text_from_event_line(String::from_utf8_lossy(&buffer).trim_end()) {
                yield text;
            }
        };

        Ok(stream.boxed())
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
