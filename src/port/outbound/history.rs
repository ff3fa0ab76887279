//! Read-side recorder history port.

use crate::domain::RawEvent;
use crate::error::Result;

/// Row limit applied when the caller does not choose one.
pub const DEFAULT_LIMIT: usize = 50_000;

/// Which entities a query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitySelection {
    All,
    /// Every entity whose id starts with `"{domain}."`.
    Domain(String),
    /// An explicit list of entity ids.
    Entities(Vec<String>),
}

/// Parameters of a state fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateQuery {
    pub selection: EntitySelection,
    /// Maximum rows to return; `None` is unbounded.
    pub limit: Option<usize>,
}

impl StateQuery {
    #[must_use]
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            selection: EntitySelection::Domain(domain.into()),
            limit: Some(DEFAULT_LIMIT),
        }
    }

    #[must_use]
    pub fn entities(entities: Vec<String>) -> Self {
        Self {
            selection: EntitySelection::Entities(entities),
            limit: Some(DEFAULT_LIMIT),
        }
    }

    #[must_use]
    pub fn all() -> Self {
        Self {
            selection: EntitySelection::All,
            limit: Some(DEFAULT_LIMIT),
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// True if `entity` falls inside the selection.
    #[must_use]
    pub fn matches(&self, entity: &str) -> bool {
        match &self.selection {
            EntitySelection::All => true,
            EntitySelection::Domain(domain) => entity
                .strip_prefix(domain.as_str())
                .is_some_and(|rest| rest.starts_with('.')),
            EntitySelection::Entities(entities) => entities.iter().any(|e| e == entity),
        }
    }
}

/// Read-only access to recorded entity states.
///
/// Implementations exclude sentinel states and return the newest rows
/// first, truncated to the query limit.
pub trait StateHistory {
    /// Distinct entity ids with recorded states, most active first.
    fn entity_ids(&self) -> Result<Vec<String>>;

    /// States matching `query`.
    fn fetch_states(&self, query: &StateQuery) -> Result<Vec<RawEvent>>;
}

impl<T: StateHistory + ?Sized> StateHistory for &T {
    fn entity_ids(&self) -> Result<Vec<String>> {
        (**self).entity_ids()
    }

    fn fetch_states(&self, query: &StateQuery) -> Result<Vec<RawEvent>> {
        (**self).fetch_states(query)
    }
}
