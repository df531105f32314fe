//! Incremental record extraction from a live model stream
//!
//! The model writes free-form prose followed by a JSON document of
//! recommendations. Records are surfaced as soon as each one is complete in
//! the accumulated text instead of waiting for the full response.
//!
//! [`RecordScanner`] owns the text buffer and the phase machine
//! (`Preamble` → `InStructuredBlock` → `Done`). On every chunk it re-scans
//! the whole block from the first `{`, because a record's fields can straddle
//! chunk boundaries. [`StreamAggregator`] drives a scanner from a token stream
//! and turns the records it finds into [`StreamEvent`]s.

use std::collections::HashSet;
use std::ops::Range;
use std::time::Duration;

use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::{
    error::AppError,
    models::{Kind, RecordFields, Recommendation, StreamEvent, SLOT_COUNT},
    services::providers::TokenStream,
};

/// Keys of one structured record, in the order the model is asked to write them
const RECORD_FIELDS: [&str; 6] = [
    "title",
    "year",
    "type",
    "brief_reasoning",
    "country",
    "original_language",
];

/// How rationale text is split into `field-delta` events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealGranularity {
    #[default]
    Char,
    Word,
    Field,
}

impl RevealGranularity {
    /// Splits `text` into fragments whose concatenation is `text`
    pub fn fragments(&self, text: &str) -> Vec<String> {
        match self {
            RevealGranularity::Char => text.chars().map(String::from).collect(),
            RevealGranularity::Word => text
                .split_inclusive(char::is_whitespace)
                .map(str::to_string)
                .collect(),
            RevealGranularity::Field if text.is_empty() => Vec::new(),
            RevealGranularity::Field => vec![text.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    pub granularity: RevealGranularity,
    /// Pause after each revealed fragment
    pub reveal_delay: Duration,
    /// Longest wait for the next chunk before the session fails
    pub chunk_timeout: Duration,
    pub max_records: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            granularity: RevealGranularity::Char,
            reveal_delay: Duration::from_millis(8),
            chunk_timeout: Duration::from_secs(30),
            max_records: SLOT_COUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Preamble,
    InStructuredBlock,
    Done,
}

/// Restartable scanner over the accumulated model output
#[derive(Debug)]
pub struct RecordScanner {
    buffer: String,
    phase: ScanPhase,
    block_start: usize,
    seen: HashSet<(String, String)>,
    emitted: usize,
    max_records: usize,
}

impl RecordScanner {
    pub fn new(max_records: usize) -> Self {
        Self {
            buffer: String::new(),
            phase: ScanPhase::Preamble,
            block_start: 0,
            seen: HashSet::new(),
            emitted: 0,
            max_records,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn is_done(&self) -> bool {
        self.phase == ScanPhase::Done
    }

    /// Appends a chunk and returns records completed since the last call
    pub fn feed(&mut self, chunk: &str) -> Vec<Recommendation> {
        if self.is_done() {
            return Vec::new();
        }
        self.buffer.push_str(chunk);

        if self.phase == ScanPhase::Preamble {
            match self.buffer.find('{') {
                Some(start) => {
                    self.block_start = start;
                    self.phase = ScanPhase::InStructuredBlock;
                }
                None => return Vec::new(),
            }
        }

        let block = &self.buffer[self.block_start..];
        let candidates: Vec<Recommendation> = complete_objects(block)
            .into_iter()
            .filter_map(|range| parse_ordered_record(&block[range]))
            .collect();

        self.admit(candidates)
    }

    /// Final forgiving parse of the whole block once the stream has ended
    pub fn finish(&mut self) -> Vec<Recommendation> {
        if self.is_done() {
            return Vec::new();
        }
        let candidates = match self.phase {
            ScanPhase::InStructuredBlock => parse_document(&self.buffer[self.block_start..]),
            _ => Vec::new(),
        };

        let records = self.admit(candidates);
        self.phase = ScanPhase::Done;
        records
    }

    /// Keeps unseen (title, year) pairs up to the record cap
    fn admit(&mut self, candidates: Vec<Recommendation>) -> Vec<Recommendation> {
        let mut admitted = Vec::new();

        for record in candidates {
            if self.emitted >= self.max_records {
                break;
            }
            if self.seen.insert((record.title.clone(), record.year.to_string())) {
                self.emitted += 1;
                admitted.push(record);
            }
        }

        if self.emitted >= self.max_records {
            self.phase = ScanPhase::Done;
        }
        admitted
    }
}

/// Byte ranges of brace-balanced objects, in the order they close
///
/// Braces inside string literals are ignored; an unmatched `}` is skipped.
fn complete_objects(text: &str) -> Vec<Range<usize>> {
    let mut objects = Vec::new();
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    objects.push(start..i + 1);
                }
            }
            _ => {}
        }
    }

    objects
}

#[derive(Deserialize)]
struct OrderedRecord {
    title: String,
    year: i32,
    #[serde(rename = "type")]
    kind: Kind,
    brief_reasoning: String,
    country: String,
    original_language: String,
}

/// Parses one object that carries all six record keys consecutively, in order
fn parse_ordered_record(text: &str) -> Option<Recommendation> {
    let map: Map<String, Value> = serde_json::from_str(text).ok()?;
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    if !keys.windows(RECORD_FIELDS.len()).any(|w| w == RECORD_FIELDS) {
        return None;
    }

    let record: OrderedRecord = serde_json::from_value(Value::Object(map)).ok()?;
    if record.title.trim().is_empty() {
        return None;
    }

    Some(Recommendation {
        title: record.title,
        year: record.year,
        kind: record.kind,
        brief_reasoning: record.brief_reasoning,
        country: Some(record.country).filter(|c| !c.is_empty()),
        original_language: Some(record.original_language).filter(|l| !l.is_empty()),
    })
}

#[derive(Deserialize)]
struct LenientRecord {
    title: String,
    #[serde(deserialize_with = "year_from_number_or_text")]
    year: i32,
    #[serde(rename = "type")]
    kind: Kind,
    #[serde(default)]
    brief_reasoning: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    original_language: Option<String>,
}

fn year_from_number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| D::Error::custom("year out of range")),
        Value::String(s) => s.trim().parse().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("unexpected year value: {}", other))),
    }
}

/// Parses the block as one `{"recommendations": [...]}` document (or a bare array)
///
/// Key order is not enforced and country/language may be absent. Prose
/// before the document can contain stray braces, so every `{` or `[` is
/// tried as a start until one opens a usable document.
fn parse_document(block: &str) -> Vec<Recommendation> {
    let Some(end) = block.rfind(['}', ']']) else {
        return Vec::new();
    };
    let body = &block[..=end];

    let items = body
        .match_indices(['{', '['])
        .find_map(|(start, _)| document_items(&body[start..]));

    let Some(items) = items else {
        tracing::debug!("Final parse of structured block found no document");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<LenientRecord>(item).ok())
        .filter(|r| !r.title.trim().is_empty())
        .map(|r| Recommendation {
            title: r.title,
            year: r.year,
            kind: r.kind,
            brief_reasoning: r.brief_reasoning,
            country: r.country.filter(|c| !c.is_empty()),
            original_language: r.original_language.filter(|l| !l.is_empty()),
        })
        .collect()
}

/// Record items of a document starting at the beginning of `text`
fn document_items(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str(text).ok()? {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("recommendations")? {
            Value::Array(items) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Turns a live token stream into session lifecycle events
pub struct StreamAggregator {
    config: AggregatorConfig,
}

impl StreamAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Consumes `tokens`, yielding events until completion or error
    ///
    /// Dropping the returned stream cancels the session and the upstream.
    pub fn aggregate(&self, mut tokens: TokenStream) -> BoxStream<'static, StreamEvent> {
        let config = self.config.clone();

        async_stream::stream! {
            let mut scanner = RecordScanner::new(config.max_records);
            yield StreamEvent::Start;

            loop {
                let chunk = match tokio::time::timeout(config.chunk_timeout, tokens.next()).await {
                    Ok(Some(Ok(chunk))) => chunk,
                    Ok(None) => break,
                    Ok(Some(Err(e))) => {
                        tracing::error!(error = %e, emitted = scanner.emitted(), "Model stream failed");
                        yield StreamEvent::StreamError { message: e.to_string() };
                        return;
                    }
                    Err(_) => {
                        tracing::error!(
                            timeout_secs = config.chunk_timeout.as_secs_f64(),
                            emitted = scanner.emitted(),
                            "Timed out waiting for model output"
                        );
                        let error = AppError::Timeout("waiting for model output".to_string());
                        yield StreamEvent::StreamError { message: error.to_string() };
                        return;
                    }
                };

                let first = scanner.emitted();
                for (offset, record) in scanner.feed(&chunk).into_iter().enumerate() {
                    let index = first + offset;
                    tracing::info!(index, title = %record.title, year = record.year, "Record found in stream");

                    yield StreamEvent::RecordFound { index, fields: RecordFields::from(&record) };
                    for fragment in config.granularity.fragments(&record.brief_reasoning) {
                        yield StreamEvent::FieldDelta { index, fragment };
                        if !config.reveal_delay.is_zero() {
                            tokio::time::sleep(config.reveal_delay).await;
                        }
                    }
                    yield StreamEvent::RecordComplete { index };
                }

                if scanner.is_done() {
                    tracing::info!(records = scanner.emitted(), "All records received, closing model stream");
                    yield StreamEvent::StreamComplete { records: scanner.emitted() };
                    return;
                }
            }

            let first = scanner.emitted();
            let remaining = scanner.finish();
            if !remaining.is_empty() {
                tracing::info!(records = remaining.len(), "Recovered records from final parse");
            }
            for (offset, record) in remaining.into_iter().enumerate() {
                let index = first + offset;
                yield StreamEvent::RecordFound { index, fields: RecordFields::from(&record) };
                if !record.brief_reasoning.is_empty() {
                    yield StreamEvent::FieldDelta { index, fragment: record.brief_reasoning };
                }
                yield StreamEvent::RecordComplete { index };
            }

            tracing::info!(records = scanner.emitted(), "Model stream complete");
            yield StreamEvent::StreamComplete { records: scanner.emitted() };
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reducer::reduce_all;

    fn record_json(title: &str, year: i32) -> String {
        format!(
            r#"{{"title":"{}","year":{},"type":"Movie","brief_reasoning":"Because {}.","country":"US","original_language":"en"}}"#,
            title, year, title
        )
    }

    fn document(records: &[(&str, i32)]) -> String {
        let body: Vec<String> = records.iter().map(|(t, y)| record_json(t, *y)).collect();
        format!(r#"{{"recommendations":[{}]}}"#, body.join(","))
    }

    fn tokens(chunks: Vec<&str>) -> TokenStream {
        let items: Vec<crate::error::AppResult<String>> =
            chunks.into_iter().map(|c| Ok(c.to_string())).collect();
        futures::stream::iter(items).boxed()
    }

    fn fast_config() -> AggregatorConfig {
        AggregatorConfig {
            reveal_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    async fn collect(config: AggregatorConfig, tokens: TokenStream) -> Vec<StreamEvent> {
        StreamAggregator::new(config).aggregate(tokens).collect().await
    }

    fn found_indices(events: &[StreamEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::RecordFound { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    fn complete_count(events: &[StreamEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, StreamEvent::RecordComplete { .. }))
            .count()
    }

    #[test]
    fn test_granularity_fragments_reassemble() {
        let text = "Slow burn, big payoff.";
        for granularity in [
            RevealGranularity::Char,
            RevealGranularity::Word,
            RevealGranularity::Field,
        ] {
            assert_eq!(granularity.fragments(text).concat(), text);
        }
        assert_eq!(RevealGranularity::Word.fragments(text).len(), 4);
        assert!(RevealGranularity::Field.fragments("").is_empty());
    }

    #[test]
    fn test_complete_objects_ignores_braces_in_strings() {
        let text = r#"{"a":{"b":"}{"},"c":"\"{"}"#;
        let objects = complete_objects(text);
        assert_eq!(objects.len(), 2);
        assert_eq!(&text[objects[0].clone()], r#"{"b":"}{"}"#);
        assert_eq!(objects[1], 0..text.len());
    }

    #[test]
    fn test_ordered_record_requires_field_order() {
        assert!(parse_ordered_record(&record_json("Heat", 1995)).is_some());

        let shuffled = r#"{"year":1995,"title":"Heat","type":"Movie","brief_reasoning":"x","country":"US","original_language":"en"}"#;
        assert!(parse_ordered_record(shuffled).is_none());

        let missing_language = r#"{"title":"Heat","year":1995,"type":"Movie","brief_reasoning":"x","country":"US"}"#;
        assert!(parse_ordered_record(missing_language).is_none());
    }

    #[test]
    fn test_scanner_stays_in_preamble_until_brace() {
        let mut scanner = RecordScanner::new(5);
        assert!(scanner.feed("Let me think about what these share...").is_empty());
        assert_eq!(scanner.phase(), ScanPhase::Preamble);

        scanner.feed("```json\n{\"recommendations\": [");
        assert_eq!(scanner.phase(), ScanPhase::InStructuredBlock);
    }

    #[test]
    fn test_scanner_waits_for_record_split_mid_field() {
        let text = document(&[("Heat", 1995)]);
        let (a, rest) = text.split_at(30);
        let (b, c) = rest.split_at(40);

        let mut scanner = RecordScanner::new(5);
        assert!(scanner.feed(a).is_empty());
        assert!(scanner.feed(b).is_empty());
        let records = scanner.feed(c);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Heat");
        assert_eq!(records[0].country.as_deref(), Some("US"));
    }

    #[test]
    fn test_scanner_never_repeats_a_record() {
        let mut scanner = RecordScanner::new(5);
        assert_eq!(scanner.feed(&record_json("Heat", 1995)).len(), 1);
        assert!(scanner.feed(&record_json("Heat", 1995)).is_empty());
        assert_eq!(scanner.feed(&record_json("Heat", 2020)).len(), 1);
        assert_eq!(scanner.emitted(), 2);
    }

    #[test]
    fn test_scanner_stops_at_cap() {
        let mut scanner = RecordScanner::new(2);
        let text = document(&[("A", 2001), ("B", 2002), ("C", 2003)]);
        let records = scanner.feed(&text);
        assert_eq!(records.len(), 2);
        assert!(scanner.is_done());
        assert!(scanner.feed(&record_json("D", 2004)).is_empty());
        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn test_finish_accepts_loose_records() {
        let mut scanner = RecordScanner::new(5);
        let text = r#"Here you go:
```json
{"recommendations":[
  {"title":"Heat","year":1995,"type":"Movie","brief_reasoning":"a","country":"US","original_language":"en"},
  {"type":"TV Show","title":"Dark","year":"2017","brief_reasoning":"b"}
]}
```"#;
        assert_eq!(scanner.feed(text).len(), 1);

        let recovered = scanner.finish();
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].title, "Dark");
        assert_eq!(recovered[0].year, 2017);
        assert_eq!(recovered[0].kind, Kind::Series);
        assert_eq!(recovered[0].country, None);
        assert!(scanner.is_done());
    }

    #[test]
    fn test_finish_skips_braces_in_prose() {
        let mut scanner = RecordScanner::new(5);
        let text = "I'll group them by {mood}. Here:\n{\"recommendations\":[{\"title\":\"Dark\",\"year\":\"2017\",\"type\":\"TV Show\",\"brief_reasoning\":\"b\"}]}";
        assert!(scanner.feed(text).is_empty());

        let recovered = scanner.finish();
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].title, "Dark");
        assert_eq!(recovered[0].year, 2017);
    }

    #[test]
    fn test_finish_on_truncated_block_recovers_nothing() {
        let mut scanner = RecordScanner::new(5);
        scanner.feed(r#"{"recommendations":[{"title":"Heat","year":19"#);
        assert!(scanner.finish().is_empty());
        assert_eq!(scanner.emitted(), 0);
    }

    #[tokio::test]
    async fn test_split_record_emits_one_sequence() {
        let text = document(&[("X", 2020)]);
        let (a, rest) = text.split_at(25);
        let (b, c) = rest.split_at(20);

        let events = collect(fast_config(), tokens(vec![a, b, c])).await;

        assert_eq!(events[0], StreamEvent::Start);
        assert!(matches!(&events[1], StreamEvent::RecordFound { index: 0, fields } if fields.title == "X"));

        let deltas: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::FieldDelta { index: 0, fragment } => Some(fragment.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, "Because X.");
        assert_eq!(
            events.iter().filter(|e| matches!(e, StreamEvent::FieldDelta { .. })).count(),
            "Because X.".chars().count()
        );
        assert_eq!(complete_count(&events), 1);
        assert_eq!(
            events.last(),
            Some(&StreamEvent::StreamComplete { records: 1 })
        );
    }

    #[tokio::test]
    async fn test_no_record_event_before_record_is_complete() {
        let text = document(&[("X", 2020)]);
        let cut = text.find("\"original_language\"").unwrap();
        let (head, tail) = text.split_at(cut);

        let mut stream = StreamAggregator::new(fast_config()).aggregate(tokens(vec![head, tail]));
        assert_eq!(stream.next().await, Some(StreamEvent::Start));
        // Next event can only come after the tail chunk is consumed
        assert!(matches!(stream.next().await, Some(StreamEvent::RecordFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_pair_across_chunks_completes_once() {
        let first = record_json("Heat", 1995);
        let events = collect(
            fast_config(),
            tokens(vec!["{\"recommendations\":[", first.as_str(), ",", first.as_str(), "]}"]),
        )
        .await;

        assert_eq!(found_indices(&events), vec![0]);
        assert_eq!(complete_count(&events), 1);
    }

    #[tokio::test]
    async fn test_slot_indices_strictly_increase() {
        let text = document(&[("A", 2001), ("B", 2002), ("C", 2003), ("D", 2004)]);
        let chunks: Vec<&str> = text
            .as_bytes()
            .chunks(17)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect();

        let events = collect(fast_config(), tokens(chunks)).await;
        assert_eq!(found_indices(&events), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_early_stop_after_five_records() {
        let five = document(&[("A", 2001), ("B", 2002), ("C", 2003), ("D", 2004), ("E", 2005)]);
        let extra = record_json("F", 2006);

        let events = collect(fast_config(), tokens(vec![five.as_str(), extra.as_str()])).await;

        assert_eq!(found_indices(&events), vec![0, 1, 2, 3, 4]);
        assert_eq!(events.last(), Some(&StreamEvent::StreamComplete { records: 5 }));
        let complete_at = events
            .iter()
            .position(|e| matches!(e, StreamEvent::StreamComplete { .. }))
            .unwrap();
        assert_eq!(complete_at, events.len() - 1);
    }

    #[tokio::test]
    async fn test_fallback_emits_remaining_records_in_bulk() {
        let loose = r#"{"title":"D","year":2004,"type":"Movie","brief_reasoning":"dee"},{"title":"E","year":2005,"type":"TV Show","brief_reasoning":"eee"}"#;
        let strict = [record_json("A", 2001), record_json("B", 2002), record_json("C", 2003)].join(",");
        let head = format!(r#"{{"recommendations":[{},"#, strict);
        let tail = format!("{}]}}", loose);

        let events = collect(fast_config(), tokens(vec![head.as_str(), tail.as_str()])).await;

        assert_eq!(found_indices(&events), vec![0, 1, 2, 3, 4]);

        let bulk_deltas: Vec<&StreamEvent> = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::FieldDelta { index: 3 | 4, .. }))
            .collect();
        assert_eq!(
            bulk_deltas,
            vec![
                &StreamEvent::FieldDelta { index: 3, fragment: "dee".to_string() },
                &StreamEvent::FieldDelta { index: 4, fragment: "eee".to_string() },
            ]
        );
        assert_eq!(events.last(), Some(&StreamEvent::StreamComplete { records: 5 }));
    }

    #[tokio::test]
    async fn test_short_completion_is_not_an_error() {
        let text = document(&[("A", 2001), ("B", 2002)]);
        let events = collect(fast_config(), tokens(vec![text.as_str()])).await;

        assert!(!events.iter().any(|e| matches!(e, StreamEvent::StreamError { .. })));
        assert_eq!(events.last(), Some(&StreamEvent::StreamComplete { records: 2 }));
    }

    #[tokio::test]
    async fn test_prose_only_stream_completes_empty() {
        let events = collect(fast_config(), tokens(vec!["I could not think of anything."])).await;
        assert_eq!(
            events,
            vec![StreamEvent::Start, StreamEvent::StreamComplete { records: 0 }]
        );
    }

    #[tokio::test]
    async fn test_transport_error_preserves_emitted_records() {
        let first = format!(r#"{{"recommendations":[{},"#, record_json("Heat", 1995));
        let items: Vec<crate::error::AppResult<String>> = vec![
            Ok(first),
            Err(AppError::Stream("connection reset".to_string())),
            Ok(record_json("Never", 2000)),
        ];

        let events = collect(fast_config(), futures::stream::iter(items).boxed()).await;

        assert!(matches!(
            events.last(),
            Some(StreamEvent::StreamError { message }) if message.contains("connection reset")
        ));
        assert_eq!(found_indices(&events), vec![0]);

        let state = reduce_all(&events);
        let slot = state.slot(0).unwrap();
        assert_eq!(slot.fields.title, "Heat");
        assert_eq!(slot.brief_reasoning, "Because Heat.");
        assert!(!slot.is_streaming);
        assert!(state.error.is_some());
        assert!(!state.is_complete);
    }

    #[tokio::test]
    async fn test_stalled_stream_times_out() {
        let config = AggregatorConfig {
            chunk_timeout: Duration::from_millis(20),
            ..fast_config()
        };
        let stalled = futures::stream::pending::<crate::error::AppResult<String>>().boxed();

        let events = collect(config, stalled).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], StreamEvent::StreamError { message } if message.contains("Timed out")));
    }

    #[tokio::test]
    async fn test_word_granularity_reveal() {
        let config = AggregatorConfig {
            granularity: RevealGranularity::Word,
            ..fast_config()
        };
        let events = collect(config, tokens(vec![document(&[("Big Fish", 2003)]).as_str()])).await;

        let fragments: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::FieldDelta { fragment, .. } => Some(fragment.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fragments, vec!["Because ", "Big ", "Fish."]);
    }
}
