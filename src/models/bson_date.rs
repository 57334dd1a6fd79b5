//! Serde adapters that store chrono timestamps as native BSON dates, so MongoDB compares
//! and sorts them by time instead of as RFC 3339 strings. BSON dates hold milliseconds.

use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod optional {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value
            .map(|at| bson::DateTime::from_millis(at.timestamp_millis()))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let stored = Option::<bson::DateTime>::deserialize(deserializer)?;
        stored
            .map(|at| {
                DateTime::from_timestamp_millis(at.timestamp_millis()).ok_or_else(|| {
                    serde::de::Error::custom(format!("date out of range: {}", at))
                })
            })
            .transpose()
    }
}
