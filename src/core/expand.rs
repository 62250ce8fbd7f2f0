//! Reference expansion
//!
//! Records store references to other records as raw ids (a recipe's
//! `creator`, each `ingredients[].ingredient`). The `expand` query parameter
//! asks for some of them to be replaced by the referenced record, reduced to
//! a field subset:
//!
//! ```text
//! ?expand=creator=name,email&expand=ingredients=name
//! ```
//!
//! Resolved objects get a `links` attribute pointing at their own resource
//! path. References that cannot be resolved stay as raw ids.

use crate::core::entity::{Entity, Lookup};
use crate::core::error::{ApiError, ApiResult, EntityError};
use crate::core::query::QueryParams;
use crate::core::service::{DataService, EntityFetcher};
use futures::future::try_join_all;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Requested expansions: field name to the sub-fields to keep
///
/// An empty sub-field list keeps every public field of the referenced record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSpec(IndexMap<String, Vec<String>>);

impl ExpansionSpec {
    /// Parse `field=a,b&other=c`; empty or absent input is an empty spec
    pub fn parse(raw: Option<&str>) -> Self {
        let mut spec = Self::default();
        if let Some(raw) = raw {
            spec.merge_str(raw);
        }
        spec
    }

    /// Merge several `expand` values
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut spec = Self::default();
        for raw in values {
            spec.merge_str(raw);
        }
        spec
    }

    /// Every `expand` value of a request
    pub fn from_query(params: &QueryParams) -> Self {
        Self::from_values(params.values("expand"))
    }

    fn merge_str(&mut self, raw: &str) {
        for segment in raw.trim().split('&') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (field, subfields) = match segment.split_once('=') {
                Some((field, subfields)) => (field.trim(), subfields),
                None => (segment, ""),
            };
            if field.is_empty() {
                continue;
            }
            let entry = self.0.entry(field.to_string()).or_default();
            for sub in subfields.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if !entry.iter().any(|existing| existing == sub) {
                    entry.push(sub.to_string());
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Where a reference lives inside a record
#[derive(Debug, Clone, PartialEq, Eq)]
enum RefLocation {
    /// `record[field]` is an id
    Field(String),
    /// `record[list][*][field]` is an id
    ListEntry { list: String, field: String },
}

/// A reference field the expander knows how to resolve
#[derive(Debug, Clone)]
pub struct Relation {
    /// Spec keys that request this relation
    keys: Vec<String>,
    location: RefLocation,
    /// Plural resource name of the referenced records
    target: String,
}

impl Relation {
    /// A top-level reference such as `creator -> users`
    pub fn reference(field: &str, target: &str) -> Self {
        Self {
            keys: vec![field.to_string()],
            location: RefLocation::Field(field.to_string()),
            target: target.to_string(),
        }
    }

    /// A reference inside list entries such as `ingredients[].ingredient -> ingredients`
    ///
    /// Requested as either `list` or `list.field`.
    pub fn nested(list: &str, field: &str, target: &str) -> Self {
        Self {
            keys: vec![list.to_string(), format!("{}.{}", list, field)],
            location: RefLocation::ListEntry {
                list: list.to_string(),
                field: field.to_string(),
            },
            target: target.to_string(),
        }
    }

    fn requested<'a>(&self, spec: &'a ExpansionSpec) -> Option<&'a [String]> {
        self.keys.iter().find_map(|key| spec.get(key))
    }
}

/// Resolves reference fields into embedded, self-linked objects
#[derive(Clone, Default)]
pub struct RelationExpander {
    relations: Vec<Relation>,
    fetchers: HashMap<String, Arc<dyn EntityFetcher>>,
}

impl RelationExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn EntityFetcher>) -> Self {
        self.fetchers
            .insert(fetcher.resource_name().to_string(), fetcher);
        self
    }

    /// Return a copy of `record` with the requested references resolved
    pub async fn expand(&self, record: &Value, spec: &ExpansionSpec) -> ApiResult<Value> {
        let mut expanded = record.clone();
        if spec.is_empty() {
            return Ok(expanded);
        }

        for relation in &self.relations {
            let Some(fields) = relation.requested(spec) else {
                continue;
            };
            let fetcher = self.fetcher(&relation.target)?;

            match &relation.location {
                RefLocation::Field(field) => {
                    let Some(id) = expanded.get(field).and_then(reference_id) else {
                        continue;
                    };
                    if let Some(resolved) = resolve(fetcher, &relation.target, &id, fields).await? {
                        expanded[field.as_str()] = resolved;
                    }
                }
                RefLocation::ListEntry { list, field } => {
                    let Some(entries) = expanded.get_mut(list).and_then(Value::as_array_mut) else {
                        continue;
                    };
                    let lookups = entries.iter().map(|entry| {
                        let id = entry.get(field).and_then(reference_id);
                        async move {
                            match id {
                                Some(id) => resolve(fetcher, &relation.target, &id, fields).await,
                                None => Ok(None),
                            }
                        }
                    });
                    let resolved = try_join_all(lookups).await?;

                    for (entry, resolved) in entries.iter_mut().zip(resolved) {
                        if let (Some(resolved), Some(obj)) = (resolved, entry.as_object_mut()) {
                            obj.insert(field.clone(), resolved);
                        }
                    }
                }
            }
        }

        Ok(expanded)
    }

    /// Expand several records concurrently, keeping their order
    pub async fn expand_all(&self, records: &[Value], spec: &ExpansionSpec) -> ApiResult<Vec<Value>> {
        if spec.is_empty() {
            return Ok(records.to_vec());
        }
        try_join_all(records.iter().map(|record| self.expand(record, spec))).await
    }

    fn fetcher(&self, target: &str) -> ApiResult<&dyn EntityFetcher> {
        self.fetchers
            .get(target)
            .map(|f| f.as_ref())
            .ok_or_else(|| ApiError::Internal(format!("no fetcher registered for '{}'", target)))
    }
}

/// Load a primary record and expand it; a missing record is `NotFound`
pub async fn find_and_expand<T: Entity>(
    service: &dyn DataService<T>,
    id: Uuid,
    spec: &ExpansionSpec,
    expander: &RelationExpander,
) -> ApiResult<Value> {
    let entity = service
        .find_one(&Lookup::ById(id))
        .await?
        .ok_or_else(|| EntityError::not_found(T::resource_name_singular(), id))?;

    expander.expand(&entity.to_public_json(), spec).await
}

fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        _ => None,
    }
}

async fn resolve(
    fetcher: &dyn EntityFetcher,
    target: &str,
    id: &str,
    fields: &[String],
) -> anyhow::Result<Option<Value>> {
    let Some(mut resolved) = fetcher.fetch_projected(id, fields).await? else {
        tracing::debug!(target_resource = target, id, "reference left unresolved");
        return Ok(None);
    };
    if let Some(obj) = resolved.as_object_mut() {
        obj.insert(
            "links".to_string(),
            Value::String(format!("/{}/{}", target, id)),
        );
    }
    Ok(Some(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::service::select_fields;
    use async_trait::async_trait;
    use serde_json::json;

    struct MapFetcher {
        name: &'static str,
        records: HashMap<String, Value>,
    }

    impl MapFetcher {
        fn new(name: &'static str, records: Vec<Value>) -> Arc<dyn EntityFetcher> {
            let records = records
                .into_iter()
                .map(|r| (r["_id"].as_str().unwrap().to_string(), r))
                .collect();
            Arc::new(Self { name, records })
        }
    }

    #[async_trait]
    impl EntityFetcher for MapFetcher {
        fn resource_name(&self) -> &str {
            self.name
        }

        async fn fetch_projected(&self, id: &str, fields: &[String]) -> anyhow::Result<Option<Value>> {
            Ok(self
                .records
                .get(id)
                .cloned()
                .map(|record| select_fields(record, fields)))
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl EntityFetcher for FailingFetcher {
        fn resource_name(&self) -> &str {
            "users"
        }

        async fn fetch_projected(&self, _id: &str, _fields: &[String]) -> anyhow::Result<Option<Value>> {
            anyhow::bail!("connection reset")
        }
    }

    fn recipe_expander() -> RelationExpander {
        RelationExpander::new()
            .with_relation(Relation::reference("creator", "users"))
            .with_relation(Relation::nested("ingredients", "ingredient", "ingredients"))
            .with_fetcher(MapFetcher::new(
                "users",
                vec![json!({"_id": "u1", "name": "Ann", "email": "ann@example.com"})],
            ))
            .with_fetcher(MapFetcher::new(
                "ingredients",
                vec![
                    json!({"_id": "i1", "name": "Egg", "category": "Protein"}),
                    json!({"_id": "i2", "name": "Flour", "category": "Grain"}),
                ],
            ))
    }

    fn recipe() -> Value {
        json!({
            "_id": "r1",
            "title": "Pancakes",
            "creator": "u1",
            "ingredients": [
                {"ingredient": "i1", "quantity": "2"},
                {"ingredient": "i2", "quantity": "200g"},
                {"ingredient": "missing", "quantity": "1"}
            ]
        })
    }

    #[test]
    fn test_parse_spec() {
        let spec = ExpansionSpec::parse(Some("creator=name,email&ingredients=name"));
        assert_eq!(
            spec.get("creator"),
            Some(&["name".to_string(), "email".to_string()][..])
        );
        assert_eq!(spec.get("ingredients"), Some(&["name".to_string()][..]));
    }

    #[test]
    fn test_parse_empty_and_absent() {
        assert!(ExpansionSpec::parse(None).is_empty());
        assert!(ExpansionSpec::parse(Some("")).is_empty());
        assert!(ExpansionSpec::parse(Some(" & ")).is_empty());
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let spec = ExpansionSpec::parse(Some("creator=name=x"));
        assert_eq!(spec.get("creator"), Some(&["name=x".to_string()][..]));
    }

    #[test]
    fn test_parse_bare_field_means_all_fields() {
        let spec = ExpansionSpec::parse(Some("creator"));
        assert_eq!(spec.get("creator"), Some(&[][..]));
    }

    #[test]
    fn test_repeated_expand_values_merge() {
        let params = QueryParams::from_query_str("expand=creator%3Dname&expand=creator%3Demail&expand=ingredients");
        let spec = ExpansionSpec::from_query(&params);
        assert_eq!(
            spec.get("creator"),
            Some(&["name".to_string(), "email".to_string()][..])
        );
        assert_eq!(spec.fields().collect::<Vec<_>>(), vec!["creator", "ingredients"]);
    }

    #[tokio::test]
    async fn test_expand_creator() {
        let spec = ExpansionSpec::parse(Some("creator=name"));
        let expanded = recipe_expander().expand(&recipe(), &spec).await.unwrap();
        assert_eq!(
            expanded["creator"],
            json!({"_id": "u1", "name": "Ann", "links": "/users/u1"})
        );
        // untouched reference stays raw
        assert_eq!(expanded["ingredients"][0]["ingredient"], "i1");
    }

    #[tokio::test]
    async fn test_empty_spec_leaves_raw_ids() {
        let original = recipe();
        let expanded = recipe_expander()
            .expand(&original, &ExpansionSpec::default())
            .await
            .unwrap();
        assert_eq!(expanded, original);
        assert_eq!(expanded["creator"], "u1");
    }

    #[tokio::test]
    async fn test_expand_nested_list_entries() {
        let spec = ExpansionSpec::parse(Some("ingredients=name"));
        let expanded = recipe_expander().expand(&recipe(), &spec).await.unwrap();
        let entries = expanded["ingredients"].as_array().unwrap();

        assert_eq!(
            entries[0]["ingredient"],
            json!({"_id": "i1", "name": "Egg", "links": "/ingredients/i1"})
        );
        assert_eq!(entries[1]["ingredient"]["name"], "Flour");
        assert_eq!(entries[1]["quantity"], "200g");
        // unresolvable reference passes through
        assert_eq!(entries[2]["ingredient"], "missing");
        assert_eq!(expanded["creator"], "u1");
    }

    #[tokio::test]
    async fn test_dotted_key_requests_nested_relation() {
        let spec = ExpansionSpec::parse(Some("ingredients.ingredient=category"));
        let expanded = recipe_expander().expand(&recipe(), &spec).await.unwrap();
        assert_eq!(
            expanded["ingredients"][0]["ingredient"],
            json!({"_id": "i1", "category": "Protein", "links": "/ingredients/i1"})
        );
    }

    #[tokio::test]
    async fn test_expand_does_not_mutate_input() {
        let original = recipe();
        let snapshot = original.clone();
        let spec = ExpansionSpec::parse(Some("creator&ingredients"));
        let expanded = recipe_expander().expand(&original, &spec).await.unwrap();
        assert_eq!(original, snapshot);
        assert_eq!(expanded["title"], "Pancakes");
        assert_eq!(expanded["creator"]["email"], "ann@example.com");
    }

    #[tokio::test]
    async fn test_unknown_spec_keys_are_ignored() {
        let spec = ExpansionSpec::parse(Some("owner=name"));
        let expanded = recipe_expander().expand(&recipe(), &spec).await.unwrap();
        assert_eq!(expanded, recipe());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let expander = RelationExpander::new()
            .with_relation(Relation::reference("creator", "users"))
            .with_fetcher(Arc::new(FailingFetcher));
        let spec = ExpansionSpec::parse(Some("creator=name"));
        let err = expander.expand(&recipe(), &spec).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_expand_all_keeps_order() {
        let mut second = recipe();
        second["_id"] = json!("r2");
        let spec = ExpansionSpec::parse(Some("creator=name"));
        let expanded = recipe_expander()
            .expand_all(&[recipe(), second], &spec)
            .await
            .unwrap();
        assert_eq!(expanded[0]["_id"], "r1");
        assert_eq!(expanded[1]["_id"], "r2");
        assert_eq!(expanded[1]["creator"]["links"], "/users/u1");
    }
}
