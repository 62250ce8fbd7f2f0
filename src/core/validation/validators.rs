//! Reusable field validators
//!
//! Each validator checks one property and returns the client-facing message
//! on failure. Validators that do not apply to a value's type let it pass so
//! that [`string`] or [`array`] can report the type error once.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use uuid::Uuid;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Validator: value must be a string
pub fn string() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_string() {
            Ok(())
        } else {
            Err(format!("\"{}\" must be a string", field))
        }
    }
}

/// Validator: value must be an array
pub fn array() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_array() {
            Ok(())
        } else {
            Err(format!("\"{}\" must be an array", field))
        }
    }
}

/// Validator: string must not be empty
pub fn non_empty(
    message: &str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone + use<> {
    let message = message.to_string();
    move |_: &str, value: &Value| match value.as_str() {
        Some("") => Err(message.clone()),
        _ => Ok(()),
    }
}

/// Validator: string must have at least `min` characters
pub fn min_length(
    min: usize,
    message: &str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone + use<> {
    let message = message.to_string();
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if s.chars().count() < min => Err(message.clone()),
        _ => Ok(()),
    }
}

/// Validator: string must have at most `max` characters
pub fn max_length(max: usize) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if s.chars().count() > max => Err(format!(
            "\"{}\" must not exceed {} characters",
            field, max
        )),
        _ => Ok(()),
    }
}

/// Validator: string must look like an email address
pub fn email(
    message: &str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone + use<> {
    let message = message.to_string();
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if !EMAIL_RE.is_match(s) => Err(message.clone()),
        _ => Ok(()),
    }
}

/// Validator: string must be a UUID
pub fn uuid(
    message: &str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone + use<> {
    let message = message.to_string();
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if Uuid::parse_str(s).is_err() => Err(message.clone()),
        _ => Ok(()),
    }
}

/// Validator: value must be in allowed list
///
/// Applied to arrays, every element must be allowed.
pub fn in_list(
    allowed: &[&str],
    message: &str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone + use<> {
    let allowed: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
    let message = message.to_string();
    move |_: &str, value: &Value| {
        let ok = |v: &Value| v.as_str().is_some_and(|s| allowed.iter().any(|a| a == s));
        let valid = match value {
            Value::Array(items) => items.iter().all(ok),
            other => ok(other),
        };
        if valid { Ok(()) } else { Err(message.clone()) }
    }
}

/// Validator: array must have at least `min` elements
pub fn array_min(
    min: usize,
    message: &str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone + use<> {
    let message = message.to_string();
    move |_: &str, value: &Value| match value.as_array() {
        Some(items) if items.len() < min => Err(message.clone()),
        _ => Ok(()),
    }
}
