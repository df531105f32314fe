//! Pure fold of session events into UI-observable state
//!
//! `reduce` is total: every event against every prior state yields a state.
//! Events naming a slot outside the slate, or a slot that does not exist yet,
//! leave the state unchanged.

use crate::models::{AggregateState, RecordSlot, StreamEvent, WireEvent, SLOT_COUNT};

pub fn reduce(mut state: AggregateState, event: &StreamEvent) -> AggregateState {
    if let Some(index) = event.index() {
        if index >= SLOT_COUNT {
            return state;
        }
    }

    match event {
        StreamEvent::Start => {}
        // Slots still empty at completion stay empty
        StreamEvent::RecordPending { index } | StreamEvent::RecordFound { index, .. }
            if state.is_complete && state.slots[*index].is_none() => {}
        StreamEvent::RecordPending { index } => {
            state.slots[*index] = Some(RecordSlot::placeholder());
        }
        StreamEvent::RecordFound { index, fields } => {
            state.slots[*index] = Some(RecordSlot::found(fields.clone()));
        }
        // A completed slot's rationale is frozen
        StreamEvent::FieldDelta { index, fragment } => {
            if let Some(slot) = state.slots[*index].as_mut().filter(|s| s.is_streaming) {
                slot.streaming_text.push_str(fragment);
            }
        }
        StreamEvent::RecordComplete { index } => {
            if let Some(slot) = state.slots[*index].as_mut().filter(|s| s.is_streaming) {
                if !slot.streaming_text.is_empty() {
                    slot.brief_reasoning = std::mem::take(&mut slot.streaming_text);
                }
                slot.is_streaming = false;
            }
        }
        StreamEvent::RecordEnhanced { index, record } => {
            // Written by slot index; enhancements may land in any order
            if let Some(slot) = state.slots[*index].as_mut() {
                slot.enhanced = Some(record.as_ref().clone());
                slot.enhancement_complete = true;
            }
        }
        StreamEvent::StreamComplete { .. } => {
            for slot in state.slots.iter_mut() {
                if slot.as_ref().is_some_and(|s| s.is_placeholder) {
                    *slot = None;
                }
            }
            state.is_complete = true;
        }
        StreamEvent::StreamError { message } => {
            state.error = Some(message.clone());
        }
    }

    state
}

/// Folds a wire event; unknown event types are no-ops
pub fn reduce_wire(state: AggregateState, wire: WireEvent) -> AggregateState {
    match StreamEvent::from_wire(wire) {
        Some(event) => reduce(state, &event),
        None => state,
    }
}

pub fn reduce_all<'a>(events: impl IntoIterator<Item = &'a StreamEvent>) -> AggregateState {
    events.into_iter().fold(AggregateState::new(), reduce)
}
