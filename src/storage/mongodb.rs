//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoDataService<T>` backed by a `mongodb::Database`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag.
//!
//! # Storage model
//!
//! Each `MongoDataService<T>` operates on a collection named after
//! `T::resource_name()` ("ingredients", "recipes", "users").
//!
//! # Serialization strategy
//!
//! Records are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. UUIDs are stored as strings and
//! `createdAt`/`updatedAt` as BSON dates, so sorting on them is chronological.
//! Records already serialize their id as `_id`.
//!
//! Driver failures surface as [`StorageError`] inside the `anyhow` chain.

use crate::core::entity::{Entity, Lookup};
use crate::core::error::StorageError;
use crate::core::query::QueryOptions;
use crate::core::service::DataService;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::{Client, Database};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document
fn json_to_document(json: serde_json::Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    match bson_val {
        Bson::Document(d) => Ok(d),
        _ => Err(anyhow!("Expected BSON document, got non-object")),
    }
}

/// Convert a BSON Document back into a serde_json::Value
fn document_to_json(doc: Document) -> serde_json::Value {
    Bson::Document(doc).into_relaxed_extjson()
}

/// Fields stored as BSON dates rather than RFC 3339 strings
const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

fn strings_to_dates(doc: &mut Document) {
    for field in TIMESTAMP_FIELDS {
        let Some(Bson::String(raw)) = doc.get(field) else {
            continue;
        };
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            let millis = parsed.with_timezone(&Utc).timestamp_millis();
            doc.insert(field, Bson::DateTime(bson::DateTime::from_millis(millis)));
        }
    }
}

fn dates_to_strings(doc: &mut Document) {
    for field in TIMESTAMP_FIELDS {
        let Some(Bson::DateTime(date)) = doc.get(field) else {
            continue;
        };
        if let Some(parsed) = DateTime::<Utc>::from_timestamp_millis(date.timestamp_millis()) {
            doc.insert(field, Bson::String(parsed.to_rfc3339()));
        }
    }
}

fn connection_error(err: impl std::fmt::Display) -> anyhow::Error {
    StorageError::ConnectionError {
        backend: "mongodb".to_string(),
        message: err.to_string(),
    }
    .into()
}

fn query_error(context: &str, err: mongodb::error::Error) -> anyhow::Error {
    StorageError::QueryError {
        backend: "mongodb".to_string(),
        message: format!("{}: {}", context, err),
    }
    .into()
}

/// Convert a UUID to its BSON string representation for queries.
fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

/// Case-insensitive `$regex` filter on `field`
///
/// Terms that are not valid patterns are matched literally, like the
/// in-memory backend does.
fn search_filter(field: &str, search: Option<&str>) -> Document {
    match search {
        Some(term) => {
            let pattern = if regex::Regex::new(term).is_ok() {
                term.to_string()
            } else {
                regex::escape(term)
            };
            doc! { field: { "$regex": pattern, "$options": "i" } }
        }
        None => doc! {},
    }
}

fn lookup_filter(lookup: &Lookup) -> Document {
    match lookup {
        Lookup::ById(id) => doc! { "_id": uuid_bson(id) },
        Lookup::ByField(field, value) => doc! { field.as_str(): value.as_str() },
    }
}

/// Open a database handle and check the server answers
pub async fn connect(uri: &str, database: &str) -> Result<Database> {
    let client = Client::with_uri_str(uri).await.map_err(connection_error)?;
    let database = client.database(database);
    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| connection_error(format!("ping failed: {}", e)))?;
    Ok(database)
}

// ---------------------------------------------------------------------------
// MongoDataService<T>
// ---------------------------------------------------------------------------

/// Generic data storage service backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// let db = recipe_api::storage::mongodb::connect("mongodb://localhost:27017", "recipes").await?;
/// let service = MongoDataService::<Recipe>::new(db);
/// let recipe = service.create(recipe).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoDataService<T> {
    database: Database,
    _marker: std::marker::PhantomData<T>,
}

impl<T> MongoDataService<T> {
    /// Create a new `MongoDataService` with the given database handle.
    pub fn new(database: Database) -> Self {
        Self {
            database,
            _marker: std::marker::PhantomData,
        }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl<T: Entity> MongoDataService<T> {
    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(T::resource_name())
    }

    fn entity_to_document(entity: &T) -> Result<Document> {
        let json = serde_json::to_value(entity)
            .map_err(|e| anyhow!("Failed to serialize entity: {}", e))?;
        let mut doc = json_to_document(json)?;
        strings_to_dates(&mut doc);
        Ok(doc)
    }

    fn document_to_entity(mut doc: Document) -> Result<T> {
        dates_to_strings(&mut doc);
        let json = document_to_json(doc);
        serde_json::from_value(json)
            .map_err(|e| anyhow!("Failed to deserialize entity from document: {}", e))
    }
}

#[async_trait]
impl<T: Entity> DataService<T> for MongoDataService<T> {
    async fn create(&self, entity: T) -> Result<T> {
        let doc = Self::entity_to_document(&entity)?;

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| query_error("Failed to create entity", e))?;

        Ok(entity)
    }

    async fn find(&self, options: &QueryOptions) -> Result<Vec<T>> {
        let filter = search_filter(T::search_field(), options.search.as_deref());

        let mut find = self.collection().find(filter);
        if let Some(sort) = &options.sort {
            find = find.sort(doc! { sort.field.as_str(): sort.direction.as_i32() });
        }
        if let Some(skip) = options.skip {
            find = find.skip(skip);
        }
        if let Some(limit) = options.limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let cursor = find
            .await
            .map_err(|e| query_error("Failed to list entities", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| query_error("Failed to collect entities", e))?;

        docs.into_iter().map(Self::document_to_entity).collect()
    }

    async fn find_one(&self, lookup: &Lookup) -> Result<Option<T>> {
        let doc = self
            .collection()
            .find_one(lookup_filter(lookup))
            .await
            .map_err(|e| query_error("Failed to get entity", e))?;

        doc.map(Self::document_to_entity).transpose()
    }

    async fn count(&self, search: Option<&str>) -> Result<u64> {
        self.collection()
            .count_documents(search_filter(T::search_field(), search))
            .await
            .map_err(|e| query_error("Failed to count entities", e))
    }

    async fn update(&self, id: &Uuid, entity: T) -> Result<Option<T>> {
        let doc = Self::entity_to_document(&entity)?;

        let result = self
            .collection()
            .replace_one(doc! { "_id": uuid_bson(id) }, doc)
            .await
            .map_err(|e| query_error("Failed to update entity", e))?;

        if result.matched_count == 0 {
            return Ok(None);
        }
        Ok(Some(entity))
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<T>> {
        let removed = self
            .collection()
            .find_one_and_delete(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| query_error("Failed to delete entity", e))?;

        removed.map(Self::document_to_entity).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_to_document_preserves_fields() {
        let input = json!({"_id": "abc", "name": "test", "age": 42});
        let doc = json_to_document(input).unwrap();

        assert_eq!(doc.get_str("_id").unwrap(), "abc");
        assert_eq!(doc.get_str("name").unwrap(), "test");
        assert_eq!(doc.get_i64("age").unwrap(), 42);
    }

    #[test]
    fn json_to_document_non_object_returns_error() {
        let result = json_to_document(json!("string"));
        assert!(result.is_err());
    }

    #[test]
    fn document_round_trip_keeps_nested_arrays() {
        let input = json!({"_id": "r1", "ingredients": [{"ingredient": "i1", "quantity": "2"}]});
        let doc = json_to_document(input.clone()).unwrap();
        assert_eq!(document_to_json(doc), input);
    }

    #[test]
    fn search_filter_is_case_insensitive_regex() {
        let filter = search_filter("title", Some("soup"));
        let inner = filter.get_document("title").unwrap();
        assert_eq!(inner.get_str("$regex").unwrap(), "soup");
        assert_eq!(inner.get_str("$options").unwrap(), "i");

        assert!(search_filter("title", None).is_empty());
    }

    #[test]
    fn search_filter_escapes_invalid_patterns() {
        let filter = search_filter("name", Some("(egg"));
        let inner = filter.get_document("name").unwrap();
        assert_eq!(inner.get_str("$regex").unwrap(), "\\(egg");
    }

    #[test]
    fn timestamps_are_stored_as_dates() {
        use crate::entities::Ingredient;

        let mut egg = Ingredient::new("Egg", "Hen egg", Default::default());
        egg.created_at = "2024-01-01T10:00:00Z".parse().unwrap();
        egg.updated_at = "2024-01-01T10:00:00.500Z".parse().unwrap();

        let doc = MongoDataService::<Ingredient>::entity_to_document(&egg).unwrap();
        let created = doc.get_datetime("createdAt").unwrap();
        let updated = doc.get_datetime("updatedAt").unwrap();
        assert!(created < updated);

        let back = MongoDataService::<Ingredient>::document_to_entity(doc).unwrap();
        assert_eq!(back, egg);
    }

    #[test]
    fn driver_failures_are_storage_errors() {
        let err = connection_error("connection refused");
        match err.downcast_ref::<StorageError>() {
            Some(StorageError::ConnectionError { backend, message }) => {
                assert_eq!(backend, "mongodb");
                assert_eq!(message, "connection refused");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn lookup_filter_by_field() {
        let filter = lookup_filter(&Lookup::by_field("email", "ann@example.com"));
        assert_eq!(filter.get_str("email").unwrap(), "ann@example.com");
    }
}
