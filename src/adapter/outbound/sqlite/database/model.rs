//! Database row types for Diesel ORM.

use diesel::prelude::*;

use crate::domain::coerce::parse_attributes;
use crate::domain::time::from_epoch_seconds;
use crate::domain::RawEvent;

/// One recorded state joined with its entity id and attribute blob.
///
/// Field order matches the select clause of the state query.
#[derive(Queryable, Debug, Clone, PartialEq)]
pub struct StateRow {
    pub entity_id: Option<String>,
    pub state: Option<String>,
    pub last_updated_ts: Option<f64>,
    pub shared_attrs: Option<String>,
}

impl StateRow {
    /// Convert into a domain event.
    ///
    /// Rows without an entity id or a usable timestamp are dropped.
    #[must_use]
    pub fn into_event(self) -> Option<RawEvent> {
        let entity = self.entity_id?;
        let timestamp = from_epoch_seconds(self.last_updated_ts?)?;
        let attributes = self.shared_attrs.as_deref().and_then(parse_attributes);
        Some(RawEvent::new(entity, self.state, timestamp).with_attributes(attributes))
    }
}

/// Entity id with the number of states recorded for it.
#[derive(QueryableByName, Debug, Clone, PartialEq, Eq)]
pub struct EntityCountRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub entity_id: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub row_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> StateRow {
        StateRow {
            entity_id: Some("sensor.temp".into()),
            state: Some("21.5".into()),
            last_updated_ts: Some(1_700_000_000.25),
            shared_attrs: Some(r#"{"unit_of_measurement": "°C"}"#.into()),
        }
    }

    #[test]
    fn row_converts_to_event() {
        let event = row().into_event().unwrap();
        assert_eq!(event.domain, "sensor");
        assert_eq!(event.entity, "sensor.temp");
        assert_eq!(event.state.as_deref(), Some("21.5"));
        assert_eq!(event.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(event.timestamp.timestamp_subsec_millis(), 250);
        assert_eq!(event.attributes, Some(json!({"unit_of_measurement": "°C"})));
    }

    #[test]
    fn rows_without_entity_or_timestamp_are_dropped() {
        let mut orphan = row();
        orphan.entity_id = None;
        assert!(orphan.into_event().is_none());

        let mut undated = row();
        undated.last_updated_ts = None;
        assert!(undated.into_event().is_none());
    }

    #[test]
    fn malformed_attributes_become_none() {
        let mut broken = row();
        broken.shared_attrs = Some("{".into());
        assert!(broken.into_event().unwrap().attributes.is_none());
    }
}
