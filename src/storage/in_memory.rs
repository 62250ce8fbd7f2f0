//! In-memory implementation of DataService for testing and development

use crate::core::entity::{Entity, Lookup};
use crate::core::error::StorageError;
use crate::core::query::{QueryOptions, SortDirection};
use crate::core::service::DataService;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::DateTime;
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory data service implementation
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// insertion order is the natural listing order.
#[derive(Clone)]
pub struct InMemoryDataService<T> {
    entities: Arc<RwLock<IndexMap<Uuid, T>>>,
}

impl<T> InMemoryDataService<T> {
    pub fn new() -> Self {
        Self {
            entities: Arc::new(RwLock::new(IndexMap::new())),
        }
    }
}

impl<T> Default for InMemoryDataService<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn storage_error(message: String) -> anyhow::Error {
    StorageError::QueryError {
        backend: "in_memory".to_string(),
        message,
    }
    .into()
}

/// Case-insensitive pattern; an invalid regex is matched literally
fn search_pattern(term: &str) -> Result<Regex> {
    RegexBuilder::new(term)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
        })
        .map_err(|e| anyhow!("Invalid search term: {}", e))
}

fn matches_search<T: Entity>(entity: &T, pattern: Option<&Regex>) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };
    matches!(
        entity.field_value(T::search_field()),
        Some(Value::String(s)) if pattern.is_match(&s)
    )
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string
pub(crate) fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            // timestamps compare chronologically
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

impl<T: Entity> InMemoryDataService<T> {
    fn matching(&self, search: Option<&str>) -> Result<Vec<T>> {
        let pattern = search.map(search_pattern).transpose()?;
        let entities = self
            .entities
            .read()
            .map_err(|e| storage_error(format!("Failed to acquire read lock: {}", e)))?;

        Ok(entities
            .values()
            .filter(|entity| matches_search(*entity, pattern.as_ref()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<T: Entity> DataService<T> for InMemoryDataService<T> {
    async fn create(&self, entity: T) -> Result<T> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| storage_error(format!("Failed to acquire write lock: {}", e)))?;

        if entities.contains_key(&entity.id()) {
            return Err(storage_error(format!("Duplicate id: {}", entity.id())));
        }
        entities.insert(entity.id(), entity.clone());

        Ok(entity)
    }

    async fn find(&self, options: &QueryOptions) -> Result<Vec<T>> {
        let mut found = self.matching(options.search.as_deref())?;

        if let Some(sort) = &options.sort {
            let mut keyed: Vec<(Value, T)> = found
                .into_iter()
                .map(|entity| (entity.field_value(&sort.field).unwrap_or(Value::Null), entity))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| match sort.direction {
                SortDirection::Asc => compare_json(a, b),
                SortDirection::Desc => compare_json(b, a),
            });
            found = keyed.into_iter().map(|(_, entity)| entity).collect();
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(found.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_one(&self, lookup: &Lookup) -> Result<Option<T>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| storage_error(format!("Failed to acquire read lock: {}", e)))?;

        Ok(match lookup {
            Lookup::ById(id) => entities.get(id).cloned(),
            Lookup::ByField(..) => entities.values().find(|e| lookup.matches(*e)).cloned(),
        })
    }

    async fn count(&self, search: Option<&str>) -> Result<u64> {
        Ok(self.matching(search)?.len() as u64)
    }

    async fn update(&self, id: &Uuid, entity: T) -> Result<Option<T>> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| storage_error(format!("Failed to acquire write lock: {}", e)))?;

        match entities.get_mut(id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<T>> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| storage_error(format!("Failed to acquire write lock: {}", e)))?;

        Ok(entities.shift_remove(id))
    }
}
