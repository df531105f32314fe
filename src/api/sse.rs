//! Server-Sent Events for progressive recommendations
//!
//! Every aggregator event is forwarded as one SSE message whose data is the
//! `{ type, index?, data }` wire object. Each completed record is handed to
//! the enhancement service in the background; its result follows as a
//! `record-enhanced` event, possibly after `stream-complete`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::{
    error::{AppError, AppResult},
    models::{RecordFields, RecommendationInput, ResolvedRecord, StreamEvent},
    services::{prompts::recommendation_prompt, StreamAggregator},
};

use super::AppState;

/// POST /api/recommendations - stream recommendations for three seed titles
///
/// Validation and opening the model stream happen before the response
/// starts, so those failures are ordinary JSON errors. Once streaming,
/// failures arrive as `stream-error` events.
pub async fn stream_recommendations(
    State(state): State<AppState>,
    Json(input): Json<RecommendationInput>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if !input.is_complete() {
        return Err(AppError::InvalidInput(
            "All three movie/show titles are required".to_string(),
        ));
    }

    let [first, second, third] = input.titles();
    info!(first, second, third, model = state.model.name(), "Starting recommendation stream");

    let tokens = state
        .model
        .stream_recommendations(&recommendation_prompt(&input))
        .await?;
    let mut events = StreamAggregator::new(state.aggregator.clone()).aggregate(tokens);
    let enhancement = state.enhancement.clone();

    let stream = async_stream::stream! {
        // Dropping the set when the client goes away aborts pending lookups
        let mut enhancing = JoinSet::new();
        let mut records: HashMap<usize, (RecordFields, String)> = HashMap::new();
        let mut upstream_done = false;

        loop {
            let step = tokio::select! {
                next = events.next(), if !upstream_done => Step::Upstream(next),
                Some(joined) = enhancing.join_next(), if !enhancing.is_empty() => Step::Enhanced(joined),
                else => break,
            };

            let event = match step {
                Step::Upstream(None) => {
                    upstream_done = true;
                    continue;
                }
                Step::Upstream(Some(event)) => event,
                Step::Enhanced(Ok((index, record))) => {
                    debug!(index, matched = record.is_matched(), "Record enhanced");
                    StreamEvent::RecordEnhanced { index, record: Box::new(record) }
                }
                Step::Enhanced(Err(e)) => {
                    warn!(error = %e, "Enhancement task failed");
                    continue;
                }
            };

            match &event {
                StreamEvent::RecordFound { index, fields } => {
                    records.insert(*index, (fields.clone(), String::new()));
                }
                StreamEvent::FieldDelta { index, fragment } => {
                    if let Some((_, rationale)) = records.get_mut(index) {
                        rationale.push_str(fragment);
                    }
                }
                StreamEvent::RecordComplete { index } => {
                    if let Some((fields, rationale)) = records.remove(index) {
                        let index = *index;
                        let service = enhancement.clone();
                        let recommendation = fields.into_recommendation(rationale);
                        enhancing.spawn(async move { (index, service.enhance(recommendation).await) });
                    }
                }
                _ => {}
            }

            if let Some(message) = to_sse_event(&event) {
                yield Ok(message);
            }
        }

        info!("Recommendation stream finished");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

enum Step {
    Upstream(Option<StreamEvent>),
    Enhanced(Result<(usize, ResolvedRecord), JoinError>),
}

fn to_sse_event(event: &StreamEvent) -> Option<Event> {
    match serde_json::to_string(&event.to_wire()) {
        Ok(data) => Some(Event::default().event(event.event_type()).data(data)),
        Err(e) => {
            warn!(event_type = event.event_type(), error = %e, "Failed to serialize event");
            None
        }
    }
}
