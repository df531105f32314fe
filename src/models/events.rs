use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{Kind, Recommendation, ResolvedRecord};

/// Identifying fields of a record, i.e. everything except the rationale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordFields {
    pub title: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
}

impl RecordFields {
    pub fn into_recommendation(self, brief_reasoning: String) -> Recommendation {
        Recommendation {
            title: self.title,
            year: self.year,
            kind: self.kind,
            brief_reasoning,
            country: self.country,
            original_language: self.original_language,
        }
    }
}

impl From<&Recommendation> for RecordFields {
    fn from(rec: &Recommendation) -> Self {
        Self {
            title: rec.title.clone(),
            year: rec.year,
            kind: rec.kind,
            country: rec.country.clone(),
            original_language: rec.original_language.clone(),
        }
    }
}

/// Lifecycle event of one streaming session, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Start,
    RecordPending { index: usize },
    RecordFound { index: usize, fields: RecordFields },
    FieldDelta { index: usize, fragment: String },
    RecordComplete { index: usize },
    RecordEnhanced { index: usize, record: Box<ResolvedRecord> },
    StreamComplete { records: usize },
    StreamError { message: String },
}

/// `{ type, index?, data }` object sent to UI consumers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub data: Value,
}

impl StreamEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            StreamEvent::Start => "start",
            StreamEvent::RecordPending { .. } => "record-pending",
            StreamEvent::RecordFound { .. } => "record-found",
            StreamEvent::FieldDelta { .. } => "field-delta",
            StreamEvent::RecordComplete { .. } => "record-complete",
            StreamEvent::RecordEnhanced { .. } => "record-enhanced",
            StreamEvent::StreamComplete { .. } => "stream-complete",
            StreamEvent::StreamError { .. } => "stream-error",
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            StreamEvent::RecordPending { index }
            | StreamEvent::RecordFound { index, .. }
            | StreamEvent::FieldDelta { index, .. }
            | StreamEvent::RecordComplete { index }
            | StreamEvent::RecordEnhanced { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn to_wire(&self) -> WireEvent {
        let data = match self {
            StreamEvent::Start | StreamEvent::RecordPending { .. } => Value::Null,
            StreamEvent::RecordComplete { .. } => Value::Null,
            StreamEvent::RecordFound { fields, .. } => {
                serde_json::to_value(fields).unwrap_or(Value::Null)
            }
            StreamEvent::FieldDelta { fragment, .. } => Value::String(fragment.clone()),
            StreamEvent::RecordEnhanced { record, .. } => {
                serde_json::to_value(record.as_ref()).unwrap_or(Value::Null)
            }
            StreamEvent::StreamComplete { records } => json!({ "records": records }),
            StreamEvent::StreamError { message } => Value::String(message.clone()),
        };

        WireEvent {
            event_type: self.event_type().to_string(),
            index: self.index(),
            data,
        }
    }

    /// Decodes a wire event; unknown or malformed events decode to `None`
    pub fn from_wire(wire: WireEvent) -> Option<StreamEvent> {
        let index = wire.index;
        match wire.event_type.as_str() {
            "start" => Some(StreamEvent::Start),
            "record-pending" => Some(StreamEvent::RecordPending { index: index? }),
            "record-found" => Some(StreamEvent::RecordFound {
                index: index?,
                fields: serde_json::from_value(wire.data).ok()?,
            }),
            "field-delta" => Some(StreamEvent::FieldDelta {
                index: index?,
                fragment: wire.data.as_str()?.to_string(),
            }),
            "record-complete" => Some(StreamEvent::RecordComplete { index: index? }),
            "record-enhanced" => Some(StreamEvent::RecordEnhanced {
                index: index?,
                record: Box::new(serde_json::from_value(wire.data).ok()?),
            }),
            "stream-complete" => Some(StreamEvent::StreamComplete {
                records: wire.data["records"].as_u64().unwrap_or_default() as usize,
            }),
            "stream-error" => Some(StreamEvent::StreamError {
                message: wire.data.as_str().unwrap_or("Streaming failed").to_string(),
            }),
            _ => None,
        }
    }
}
