//! Home Assistant recorder tables read by the SQLite adapter.
//!
//! Only the columns this crate queries are declared.

diesel::table! {
    states (state_id) {
        state_id -> Integer,
        metadata_id -> Nullable<Integer>,
        state -> Nullable<Text>,
        attributes_id -> Nullable<Integer>,
        last_updated_ts -> Nullable<Double>,
    }
}

diesel::table! {
    states_meta (metadata_id) {
        metadata_id -> Integer,
        entity_id -> Nullable<Text>,
    }
}

diesel::table! {
    state_attributes (attributes_id) {
        attributes_id -> Integer,
        shared_attrs -> Nullable<Text>,
    }
}

diesel::joinable!(states -> states_meta (metadata_id));
diesel::joinable!(states -> state_attributes (attributes_id));

diesel::allow_tables_to_appear_in_same_query!(states, states_meta, state_attributes);
