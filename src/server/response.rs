//! Success envelope shared by every handler

use crate::core::link::ResourceLink;
use crate::core::pagination::{CollectionLinks, PaginationInfo};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// `{ code, message, data?, pagination?, links? }`; the HTTP status is `code`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data: None,
            pagination: None,
            links: None,
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }

    pub fn created(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationInfo) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Attach a named link set (single-entity responses)
    pub fn with_links(mut self, links: IndexMap<String, ResourceLink>) -> Self {
        self.links = serde_json::to_value(links).ok();
        self
    }

    /// Attach collection navigation links
    pub fn with_collection_links(mut self, links: CollectionLinks) -> Self {
        self.links = serde_json::to_value(links).ok();
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
