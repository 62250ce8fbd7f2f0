//! Declarative payload schemas

use crate::core::error::FieldValidationError;
use serde_json::{Map, Value};
use std::sync::Arc;

type Validator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type Filter = Arc<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;

/// Rules for one field of a payload
#[derive(Clone)]
pub struct FieldRule {
    field: String,
    required: Option<String>,
    filters: Vec<Filter>,
    validators: Vec<Validator>,
    items: Option<ValidationSchema>,
}

impl FieldRule {
    /// A field that must be present; `message` is reported when it is not
    pub fn required(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            required: Some(message.to_string()),
            filters: Vec::new(),
            validators: Vec::new(),
            items: None,
        }
    }

    pub fn optional(field: &str) -> Self {
        Self {
            field: field.to_string(),
            required: None,
            filters: Vec::new(),
            validators: Vec::new(),
            items: None,
        }
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn validate<V>(mut self, validator: V) -> Self
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Every element of the array must be an object satisfying `schema`
    pub fn each_object(mut self, schema: ValidationSchema) -> Self {
        self.items = Some(schema);
        self
    }

    fn apply(&self, value: Value) -> Result<Value, FieldValidationError> {
        let field = self.field.as_str();
        let error = |message: String| FieldValidationError {
            field: field.to_string(),
            message,
        };

        let mut value = value;
        for filter in &self.filters {
            value = filter(field, value).map_err(|e| error(e.to_string()))?;
        }
        for validator in &self.validators {
            validator(field, &value).map_err(error)?;
        }

        if let Some(schema) = &self.items {
            if let Value::Array(items) = value {
                let mut checked = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let item = schema.validate_and_filter(item).map_err(|errors| {
                        let first = errors.into_iter().next();
                        FieldValidationError {
                            field: format!(
                                "{}[{}].{}",
                                field,
                                index,
                                first.as_ref().map(|e| e.field.as_str()).unwrap_or("")
                            ),
                            message: first.map(|e| e.message).unwrap_or_default(),
                        }
                    })?;
                    checked.push(item);
                }
                value = Value::Array(checked);
            }
        }

        Ok(value)
    }
}

/// Ordered set of field rules for one payload shape
///
/// Fields without a rule are rejected.
#[derive(Clone, Default)]
pub struct ValidationSchema {
    rules: Vec<FieldRule>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Check `payload` and return it with filters applied
    ///
    /// Each field reports at most one error; all failing fields are reported.
    pub fn validate_and_filter(&self, payload: Value) -> Result<Value, Vec<FieldValidationError>> {
        let Value::Object(mut input) = payload else {
            return Err(vec![FieldValidationError {
                field: "body".to_string(),
                message: "\"value\" must be of type object".to_string(),
            }]);
        };

        let mut errors = Vec::new();
        let mut output = Map::new();

        for rule in &self.rules {
            match input.remove(&rule.field) {
                None | Some(Value::Null) => {
                    if let Some(message) = &rule.required {
                        errors.push(FieldValidationError {
                            field: rule.field.clone(),
                            message: message.clone(),
                        });
                    }
                }
                Some(value) => match rule.apply(value) {
                    Ok(value) => {
                        output.insert(rule.field.clone(), value);
                    }
                    Err(error) => errors.push(error),
                },
            }
        }

        for unknown in input.keys() {
            errors.push(FieldValidationError {
                field: unknown.clone(),
                message: format!("\"{}\" is not allowed", unknown),
            });
        }

        if errors.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(errors)
        }
    }
}
