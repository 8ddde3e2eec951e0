//! Dojo domain model.
//!
//! # Responsibility
//! - Define the location record members can optionally belong to.
//!
//! # Invariants
//! - `id` is stable and never reused for another dojo.
//! - `created_at` is set once at creation and never mutated.

use super::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a dojo record.
pub type DojoId = Uuid;

/// Location entity that members can optionally belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dojo {
    pub id: DojoId,
    /// Display name. Not unique, not validated.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Unix epoch milliseconds at insertion time.
    pub created_at: i64,
}

impl Dojo {
    /// Creates a new dojo with a generated ID, stamped with the current time.
    pub fn new(name: impl Into<String>, location: Option<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, location, now_epoch_ms())
    }

    /// Creates a dojo with caller-provided identity and timestamp.
    ///
    /// Used by read paths that rebuild records from storage.
    pub fn with_id(
        id: DojoId,
        name: impl Into<String>,
        location: Option<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Dojo;

    #[test]
    fn new_dojo_serializes_with_camel_case_fields() {
        let dojo = Dojo::new("Hombu", Some("Tokyo".to_string()));
        let value = serde_json::to_value(&dojo).expect("dojo should serialize");

        assert_eq!(value["name"], "Hombu");
        assert_eq!(value["location"], "Tokyo");
        assert_eq!(value["createdAt"], dojo.created_at);
        assert_eq!(value["id"], dojo.id.to_string());
    }

    #[test]
    fn missing_location_is_omitted() {
        let dojo = Dojo::new("Garage", None);
        let value = serde_json::to_value(&dojo).expect("dojo should serialize");
        assert!(value.get("location").is_none());
    }
}
