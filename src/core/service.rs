//! Service traits for persistence and record fetching

use crate::core::entity::{Entity, Lookup};
use crate::core::query::QueryOptions;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Service trait for managing stored records
///
/// Implementations provide CRUD operations for a specific entity type.
/// Callers are agnostic to the underlying storage mechanism.
#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    /// Insert a new record
    async fn create(&self, entity: T) -> Result<T>;

    /// List records: search filter, then sort, then skip/limit
    async fn find(&self, options: &QueryOptions) -> Result<Vec<T>>;

    /// Locate one record
    async fn find_one(&self, lookup: &Lookup) -> Result<Option<T>>;

    /// Count records matching an optional search term
    async fn count(&self, search: Option<&str>) -> Result<u64>;

    /// Replace a record, returning the stored value or `None` if it is missing
    async fn update(&self, id: &Uuid, entity: T) -> Result<Option<T>>;

    /// Remove a record, returning it if it existed
    async fn delete(&self, id: &Uuid) -> Result<Option<T>>;
}

/// Record-fetch capability used when expanding references
///
/// Implementations are keyed by plural resource name and return records as
/// public JSON, so the expander never needs to know the concrete type.
#[async_trait]
pub trait EntityFetcher: Send + Sync {
    /// Plural name of the resource this fetcher resolves (e.g. "users")
    fn resource_name(&self) -> &str;

    /// Fetch one record reduced to `_id` plus `fields`
    ///
    /// An empty `fields` list returns every public field. An id that cannot
    /// name a record yields `Ok(None)`.
    async fn fetch_projected(&self, id: &str, fields: &[String]) -> Result<Option<Value>>;
}

/// Adapts any [`DataService`] into an [`EntityFetcher`]
pub struct ServiceFetcher<T: Entity> {
    service: Arc<dyn DataService<T>>,
}

impl<T: Entity> ServiceFetcher<T> {
    pub fn new(service: Arc<dyn DataService<T>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<T: Entity> EntityFetcher for ServiceFetcher<T> {
    fn resource_name(&self) -> &str {
        T::resource_name()
    }

    async fn fetch_projected(&self, id: &str, fields: &[String]) -> Result<Option<Value>> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let Some(entity) = self.service.find_one(&Lookup::ById(id)).await? else {
            return Ok(None);
        };

        Ok(Some(select_fields(entity.to_public_json(), fields)))
    }
}

/// Keep `_id` plus `fields`; an empty list keeps everything
pub fn select_fields(record: Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return record;
    }
    match record {
        Value::Object(mut map) => {
            let mut selected = Map::new();
            if let Some(id) = map.remove("_id") {
                selected.insert("_id".to_string(), id);
            }
            for field in fields {
                if let Some(value) = map.remove(field) {
                    selected.insert(field.clone(), value);
                }
            }
            Value::Object(selected)
        }
        other => other,
    }
}
