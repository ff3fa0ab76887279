//! In-memory state history.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::RawEvent;
use crate::error::Result;
use crate::port::outbound::history::{StateHistory, StateQuery};

/// [`StateHistory`] over a fixed list of events.
///
/// Behaves like the SQLite adapter: sentinel states are excluded, rows
/// come back newest first and the limit is applied last. Every call is
/// counted so tests can assert that validation happened before querying.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    events: Vec<RawEvent>,
    queries: AtomicUsize,
}

impl InMemoryHistory {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of queries served so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl StateHistory for InMemoryHistory {
    fn entity_ids(&self) -> Result<Vec<String>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.entity.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        Ok(ranked.into_iter().map(|(id, _)| id.to_string()).collect())
    }

    fn fetch_states(&self, query: &StateQuery) -> Result<Vec<RawEvent>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let mut events: Vec<RawEvent> = self
            .events
            .iter()
            .filter(|event| !event.is_sentinel() && query.matches(&event.entity))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = query.limit {
            events.truncate(limit);
        }
        Ok(events)
    }
}
