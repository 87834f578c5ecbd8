use super::types::AppEvent;
use serde_json::{json, Value};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history payload is not an object with a `history` array")]
    MalformedDocument,
}

/// Outcome of loading a persisted history: how many events were accepted and
/// which entries had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub loaded: usize,
    /// (index in the payload, reason) for every rejected entry.
    pub skipped: Vec<(usize, String)>,
}

/// FIFO of pending events plus the ordered history of everything that passed
/// through. The history holds only serialisable events and is the source of
/// truth for replay.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<AppEvent>,
    history: Vec<AppEvent>,
    history_index: Option<usize>,
    replaying: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for processing. Serialisable events are also appended
    /// to the history, unless a replay is in progress (replay must not grow
    /// the very history it is reading).
    pub fn post_event(&mut self, event: AppEvent) {
        if !self.replaying && event.is_serialisable() {
            self.history.push(event.clone());
        }
        self.pending.push_back(event);
    }

    /// Remove and return the oldest pending event.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty; popping an empty queue is a programming
    /// error, callers gate on [`EventQueue::empty`].
    pub fn pop(&mut self) -> AppEvent {
        self.pending
            .pop_front()
            .expect("pop from an empty event queue")
    }

    pub fn empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn history(&self) -> &[AppEvent] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Serialise the history as `{"history": [{tag, data}, ...]}`. Fields of
    /// non-serialisable variants are never written.
    pub fn serialize_history(&self) -> Value {
        let events: Vec<Value> = self
            .history
            .iter()
            .filter(|e| e.is_serialisable())
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect();
        json!({ "history": events })
    }

    /// Replace the history with the contents of a persisted payload.
    ///
    /// Individual entries that fail validation are skipped and summarised in
    /// the report; the rest of the history is still loaded.
    pub fn deserialize_history(&mut self, payload: &Value) -> Result<ReplayReport, HistoryError> {
        let entries = payload
            .get("history")
            .and_then(Value::as_array)
            .ok_or(HistoryError::MalformedDocument)?;

        let mut report = ReplayReport::default();
        let mut history = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match serde_json::from_value::<AppEvent>(entry.clone()) {
                Ok(event) if event.is_serialisable() => history.push(event),
                Ok(event) => {
                    warn!(index, ?event, "non-serialisable event in persisted history");
                    report
                        .skipped
                        .push((index, "non-serialisable event".to_string()));
                }
                Err(err) => {
                    warn!(index, %err, "skipping malformed history entry");
                    report.skipped.push((index, err.to_string()));
                }
            }
        }
        report.loaded = history.len();
        self.history = history;
        self.history_index = None;
        Ok(report)
    }

    /// Rewind the replay cursor to the start of the history.
    pub fn reset_history_index(&mut self) {
        self.history_index = Some(0);
    }

    /// The next recorded event, advancing the cursor; `None` once exhausted
    /// or if the cursor was never reset.
    pub fn next_history_event(&mut self) -> Option<AppEvent> {
        let index = self.history_index?;
        let event = self.history.get(index)?.clone();
        self.history_index = Some(index + 1);
        Some(event)
    }

    /// Enter replay: posted events stop being recorded.
    pub(crate) fn begin_replay(&mut self) {
        self.replaying = true;
    }

    /// Leave replay; anything still pending was a side effect of replayed
    /// events and is dropped, since its cause is already in the history.
    pub(crate) fn end_replay(&mut self) {
        self.replaying = false;
        self.pending.clear();
    }
}
