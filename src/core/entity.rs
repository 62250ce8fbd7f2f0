//! Entity trait shared by every stored record type

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// Base trait for all stored records.
///
/// Records serialize with their storage field names (`_id`, `createdAt`, ...).
/// That JSON form is what storage backends persist, what the search and sort
/// logic inspects, and, after [`to_public_json`](Entity::to_public_json),
/// what clients see.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The plural resource name used in URLs and collection names (e.g. "recipes")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g. "recipe")
    fn resource_name_singular() -> &'static str;

    /// Field matched by the `search` query parameter
    fn search_field() -> &'static str;

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Stamp a new modification time
    fn touch(&mut self);

    /// JSON representation safe to return to clients
    ///
    /// Override to strip secrets.
    fn to_public_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Get the value of a specific field by its serialized name
    fn field_value(&self, field: &str) -> Option<Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove(field),
            _ => None,
        }
    }
}

/// How a single record is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    ById(Uuid),
    /// Exact match on a serialized string field
    ByField(String, String),
}

impl Lookup {
    pub fn by_field(field: &str, value: impl Into<String>) -> Self {
        Lookup::ByField(field.to_string(), value.into())
    }

    /// Whether `entity` satisfies this lookup
    pub fn matches<T: Entity>(&self, entity: &T) -> bool {
        match self {
            Lookup::ById(id) => entity.id() == *id,
            Lookup::ByField(field, value) => {
                matches!(entity.field_value(field), Some(Value::String(s)) if s == *value)
            }
        }
    }
}
