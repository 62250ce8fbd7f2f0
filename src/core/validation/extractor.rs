//! Axum extractor for validated payloads
//!
//! `Validated<T>` checks the JSON body against `T::schema()`, applies the
//! schema's filters and only then deserializes into `T`.

use super::config::ValidationSchema;
use crate::core::error::{ApiError, RequestError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Payload types that declare a validation schema
pub trait ValidatedPayload {
    fn schema() -> ValidationSchema;
}

/// Axum extractor that validates and filters request payloads
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_ingredient(
///     Validated(payload): Validated<NewIngredient>,
/// ) -> ApiResult<ApiResponse> {
///     // payload is already validated and filtered
/// }
/// ```
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: ValidatedPayload + DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<Value> = Json::from_request(req, state).await.map_err(|e| {
            ApiError::Request(RequestError::InvalidBody {
                message: e.body_text(),
            })
        })?;

        validate_payload(payload).map(Validated)
    }
}

/// Validate, filter and deserialize a raw payload
pub fn validate_payload<T>(payload: Value) -> Result<T, ApiError>
where
    T: ValidatedPayload + DeserializeOwned,
{
    let filtered = T::schema()
        .validate_and_filter(payload)
        .map_err(ValidationError::FieldErrors)?;

    Ok(serde_json::from_value(filtered)?)
}
