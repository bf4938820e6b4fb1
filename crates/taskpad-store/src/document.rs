//! Stored documents: schemaless JSON fields plus store-assigned metadata.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// A single document in a collection.
///
/// The shape of `fields` is enforced only by the writing code; the store
/// itself is schemaless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Store-assigned identifier, unique within the store.
    pub id: Uuid,
    /// Store-assigned creation timestamp, monotonic per store.
    pub created_at: DateTime<Utc>,
    /// User-supplied fields. Always a JSON object.
    pub fields: Value,
}

impl Document {
    /// Look up a top-level field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Deserialize the fields into a typed shape.
    pub fn fields_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.fields.clone()).map_err(StoreError::Serde)
    }
}
