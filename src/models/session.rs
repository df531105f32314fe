use serde::Serialize;

use super::{Kind, RecordFields, ResolvedRecord};

/// Number of recommendations a session is expected to produce
pub const SLOT_COUNT: usize = 5;

/// One position in the recommendation slate
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordSlot {
    pub fields: RecordFields,
    /// Frozen rationale, set when the record completes
    pub brief_reasoning: String,
    /// Rationale revealed so far while the record is streaming
    pub streaming_text: String,
    pub is_streaming: bool,
    /// Announced but no fields received yet
    pub is_placeholder: bool,
    pub enhancement_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<ResolvedRecord>,
}

impl RecordSlot {
    pub fn placeholder() -> Self {
        Self {
            fields: RecordFields {
                title: String::new(),
                year: 0,
                kind: Kind::Film,
                country: None,
                original_language: None,
            },
            brief_reasoning: String::new(),
            streaming_text: String::new(),
            is_streaming: true,
            is_placeholder: true,
            enhancement_complete: false,
            enhanced: None,
        }
    }

    pub fn found(fields: RecordFields) -> Self {
        Self {
            fields,
            is_placeholder: false,
            ..Self::placeholder()
        }
    }
}

/// UI-observable state of one streaming session
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AggregateState {
    pub slots: [Option<RecordSlot>; SLOT_COUNT],
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, index: usize) -> Option<&RecordSlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Slots holding an identified record, in slot order
    pub fn records(&self) -> impl Iterator<Item = (usize, &RecordSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (i, s)))
            .filter(|(_, slot)| !slot.is_placeholder)
    }
}
