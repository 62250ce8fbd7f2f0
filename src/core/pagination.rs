//! Pagination metadata and collection navigation links

use crate::config::PaginationDefaults;
use crate::core::error::{ApiResult, ValidationError};
use crate::core::query::QueryParams;
use serde::Serialize;

/// Inputs of [`PaginationInfo::calculate`]; absent values take the defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationInput {
    pub total_items: Option<u64>,
    pub limit: Option<u64>,
    pub page: Option<u64>,
}

/// Page metadata for a collection response
///
/// `next` is present iff `page < totalPage`, `prev` iff `page > 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_page: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<u64>,
}

impl PaginationInfo {
    /// Compute page metadata
    ///
    /// A limit of zero is rejected rather than dividing by it. A page of zero
    /// falls back to the default page.
    pub fn calculate(input: PaginationInput, defaults: &PaginationDefaults) -> ApiResult<Self> {
        let total_items = input.total_items.unwrap_or(defaults.total_items);
        let limit = input.limit.unwrap_or(defaults.limit);
        let page = input
            .page
            .filter(|p| *p >= 1)
            .unwrap_or(defaults.page.max(1));

        if limit == 0 {
            return Err(ValidationError::FieldError {
                field: "limit".to_string(),
                message: "limit must be greater than 0".to_string(),
            }
            .into());
        }

        let total_page = total_items.div_ceil(limit);

        Ok(Self {
            page,
            limit,
            total_items,
            total_page,
            next: (page < total_page).then(|| page + 1),
            prev: (page > 1).then(|| page - 1),
        })
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }
}

/// What the collection linker needs to know about the current view
#[derive(Debug, Clone)]
pub struct CollectionLinkRequest<'a> {
    pub path: &'a str,
    pub query: &'a QueryParams,
    pub page: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// `self` / `next` / `prev` links of a paginated collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// Keys the linker rewrites itself instead of passing through
const CARRIED_KEYS: [&str; 4] = ["limit", "sort", "sort_type", "page"];

impl CollectionLinks {
    /// Build links from caller-supplied neighbour flags
    ///
    /// Every link carries `limit`, `sort`, `sort_type`, the remaining query
    /// keys, and finally `page`.
    pub fn build(request: CollectionLinkRequest<'_>, defaults: &PaginationDefaults) -> Self {
        let default_limit = defaults.limit.to_string();
        let limit = request.query.get("limit").unwrap_or(default_limit.as_str());
        let sort = request.query.get("sort").unwrap_or(defaults.sort.as_str());
        let sort_type = request.query.get("sort_type").unwrap_or(defaults.sort_type.as_str());

        let mut carried: Vec<(&str, &str)> = vec![
            ("limit", limit),
            ("sort", sort),
            ("sort_type", sort_type),
        ];
        for key in request.query.keys() {
            if CARRIED_KEYS.contains(&key) {
                continue;
            }
            carried.extend(request.query.values(key).map(|value| (key, value)));
        }

        let link_for = |page: u64| {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            serializer.extend_pairs(carried.iter().copied());
            serializer.append_pair("page", &page.to_string());
            format!("{}?{}", request.path, serializer.finish())
        };

        Self {
            self_link: link_for(request.page),
            next: request
                .has_next
                .then(|| request.page.checked_add(1))
                .flatten()
                .map(link_for),
            prev: request
                .has_prev
                .then(|| request.page.checked_sub(1))
                .flatten()
                .filter(|page| *page >= 1)
                .map(link_for),
        }
    }

    /// Build links whose neighbour flags come from the computed pagination
    pub fn for_page(
        path: &str,
        query: &QueryParams,
        pagination: &PaginationInfo,
        defaults: &PaginationDefaults,
    ) -> Self {
        Self::build(
            CollectionLinkRequest {
                path,
                query,
                page: pagination.page,
                has_next: pagination.has_next(),
                has_prev: pagination.has_prev(),
            },
            defaults,
        )
    }
}
