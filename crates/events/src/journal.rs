use crate::error::EventsError;
use crate::messages::BacktestEvent;
use serde::{Deserialize, Serialize};

/// Append-only, chronological record of a run's events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventJournal {
    events: Vec<BacktestEvent>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BacktestEvent) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &BacktestEvent> {
        self.events.iter()
    }

    pub fn events(&self) -> &[BacktestEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of rejected orders in the journal.
    pub fn rejections(&self) -> usize {
        self.iter()
            .filter(|event| matches!(event, BacktestEvent::Rejected(_)))
            .count()
    }

    /// Serializes the whole journal as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String, EventsError> {
        serde_json::to_string_pretty(self).map_err(|e| EventsError::Serialization(e.to_string()))
    }
}
