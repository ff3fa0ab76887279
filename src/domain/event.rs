//! Raw recorder events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::coerce::extract_attribute;

/// Domain of numeric sensors.
pub const SENSOR_DOMAIN: &str = "sensor";

/// Domain of on/off sensors.
pub const BINARY_SENSOR_DOMAIN: &str = "binary_sensor";

/// States the recorder writes when an entity has no real value.
pub const SENTINEL_STATES: [&str; 2] = ["unknown", "unavailable"];

/// Return the domain part of an entity id (`sensor` for `sensor.temp`).
///
/// Ids without a `.` are returned unchanged.
#[must_use]
pub fn entity_domain(entity_id: &str) -> &str {
    entity_id
        .split_once('.')
        .map_or(entity_id, |(domain, _)| domain)
}

/// A single state change as fetched from the recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub domain: String,
    pub entity: String,
    pub state: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub attributes: Option<Value>,
}

impl RawEvent {
    /// Build an event, deriving the domain from the entity id.
    pub fn new(
        entity: impl Into<String>,
        state: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let entity = entity.into();
        Self {
            domain: entity_domain(&entity).to_string(),
            entity,
            state,
            timestamp,
            attributes: None,
        }
    }

    /// Attach the attribute blob recorded with this state.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Option<Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// True when the state is absent or one of [`SENTINEL_STATES`].
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        match self.state.as_deref() {
            None => true,
            Some(state) => SENTINEL_STATES.contains(&state),
        }
    }
}

/// Display metadata for an entity, taken from its latest attribute blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityAttributes {
    pub entity: String,
    pub friendly_name: String,
    pub device_class: String,
    pub unit_of_measurement: String,
}

impl EntityAttributes {
    /// Extract metadata from an event, using the entity id when unnamed.
    #[must_use]
    pub fn from_event(event: &RawEvent) -> Self {
        let attributes = event.attributes.as_ref();
        Self {
            entity: event.entity.clone(),
            friendly_name: extract_attribute(attributes, "friendly_name", &event.entity),
            device_class: extract_attribute(attributes, "device_class", ""),
            unit_of_measurement: extract_attribute(attributes, "unit_of_measurement", ""),
        }
    }
}
