//! Timed events and the optimistic override layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A timed event on a single day. Supplied by the host data source; the UI
/// never persists these itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub id: String,
    pub day: NaiveDate,
    pub start_minutes: i32,
    pub duration_minutes: i32,
    pub title: String,
}

impl TimedEvent {
    pub fn end_minutes(&self) -> i32 {
        self.start_minutes + self.duration_minutes
    }
}

/// A partial update to an event's time, used both for commit callbacks and
/// for optimistic overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    pub start_minutes: Option<i32>,
    pub duration_minutes: Option<i32>,
}

impl EventPatch {
    pub fn start(minutes: i32) -> Self {
        Self {
            start_minutes: Some(minutes),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_minutes.is_none() && self.duration_minutes.is_none()
    }

    /// Whether the authoritative event already reflects this patch.
    pub fn matches(&self, event: &TimedEvent) -> bool {
        self.start_minutes.is_none_or(|m| m == event.start_minutes)
            && self
                .duration_minutes
                .is_none_or(|m| m == event.duration_minutes)
    }
}

/// Optimistic per-event overrides that shadow authoritative data until it
/// catches up. A read-through layer: displays go through
/// [`effective_start`](Self::effective_start) /
/// [`effective_duration`](Self::effective_duration), and
/// [`reconcile`](Self::reconcile) drops entries the moment the authoritative
/// event matches them or disappears, so committed drags never snap back.
#[derive(Debug, Default)]
pub struct OverrideStore {
    pending: HashMap<String, EventPatch>,
}

impl OverrideStore {
    pub fn set(&mut self, id: &str, patch: EventPatch) {
        if patch.is_empty() {
            self.pending.remove(id);
        } else {
            self.pending.insert(id.to_owned(), patch);
        }
    }

    pub fn clear(&mut self, id: &str) {
        self.pending.remove(id);
    }

    pub fn get(&self, id: &str) -> Option<EventPatch> {
        self.pending.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn effective_start(&self, event: &TimedEvent) -> i32 {
        self.pending
            .get(&event.id)
            .and_then(|p| p.start_minutes)
            .unwrap_or(event.start_minutes)
    }

    pub fn effective_duration(&self, event: &TimedEvent) -> i32 {
        self.pending
            .get(&event.id)
            .and_then(|p| p.duration_minutes)
            .unwrap_or(event.duration_minutes)
    }

    /// Drop overrides whose event now matches them or no longer exists.
    pub fn reconcile(&mut self, events: &[TimedEvent]) {
        self.pending.retain(|id, patch| {
            match events.iter().find(|e| &e.id == id) {
                Some(event) => !patch.matches(event),
                None => false,
            }
        });
    }
}
