//! Field projection of collection items

use crate::core::error::{ApiError, ApiResult};
use serde_json::{Map, Value};

/// Reduces records to a field subset and attaches `link = path/id`
#[derive(Debug, Clone)]
pub struct ItemProjector {
    selection: Vec<String>,
    path: String,
}

impl ItemProjector {
    pub fn new<S: Into<String>>(selection: impl IntoIterator<Item = S>, path: &str) -> Self {
        Self {
            selection: selection.into_iter().map(Into::into).collect(),
            path: path.trim_end_matches('/').to_string(),
        }
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Project every item; the inputs are left untouched
    pub fn project(&self, items: &[Value]) -> ApiResult<Vec<Value>> {
        items.iter().map(|item| self.project_one(item)).collect()
    }

    pub fn project_one(&self, item: &Value) -> ApiResult<Value> {
        let record = item
            .as_object()
            .ok_or_else(|| ApiError::invalid_argument("items must be objects"))?;

        let id = record_id(record)
            .ok_or_else(|| ApiError::invalid_argument("item has neither `id` nor `_id`"))?;

        let mut projected = Map::new();
        for field in &self.selection {
            if let Some(value) = record.get(field) {
                projected.insert(field.clone(), value.clone());
            }
        }
        projected.insert(
            "link".to_string(),
            Value::String(format!("{}/{}", self.path, id)),
        );

        Ok(Value::Object(projected))
    }
}

/// Untyped entry point for callers holding raw JSON
///
/// `items` and `selection` must both be arrays; `selection` must hold strings.
pub fn project_value(items: &Value, selection: &Value, path: &str) -> ApiResult<Vec<Value>> {
    let items = items
        .as_array()
        .ok_or_else(|| ApiError::invalid_argument("`items` must be an array"))?;
    let selection = selection
        .as_array()
        .ok_or_else(|| ApiError::invalid_argument("`selection` must be an array"))?
        .iter()
        .map(|field| {
            field
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ApiError::invalid_argument("`selection` entries must be strings"))
        })
        .collect::<ApiResult<Vec<String>>>()?;

    ItemProjector::new(selection, path).project(items)
}

fn record_id(record: &Map<String, Value>) -> Option<String> {
    ["id", "_id"]
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
