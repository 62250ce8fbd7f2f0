//! Query-string parsing into storage query options
//!
//! Raw query strings are untrusted. [`parse_query_params`] merges them with
//! the configured [`PaginationDefaults`] and produces a [`QueryOptions`]
//! value. Malformed numbers never fail the request: the pagination slice is
//! simply left out.
//!
//! # Example
//! ```rust,ignore
//! let params = QueryParams::from_query_str("page=2&limit=10&sort=title&sort_type=dsc");
//! let options = parse_query_params(&params, &PaginationDefaults::default());
//! assert_eq!(options.skip, Some(10));
//! ```

use crate::config::PaginationDefaults;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Serialize;
use std::convert::Infallible;

/// Raw query-string pairs in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Decode an `application/x-www-form-urlencoded` query string
    pub fn from_query_str(query: &str) -> Self {
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First non-empty value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Every non-empty value for `key`, in order
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Distinct keys in first-seen order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (k, _) in &self.pairs {
            if !keys.contains(&k.as_str()) {
                keys.push(k);
            }
        }
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .uri
            .query()
            .map(QueryParams::from_query_str)
            .unwrap_or_default())
    }
}

/// Sort direction, serialized as `1` / `-1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the literal `dsc` sorts descending
    pub fn from_sort_type(sort_type: &str) -> Self {
        if sort_type == "dsc" {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

/// A single-key sort mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Normalized options handed to a [`DataService`](crate::core::DataService)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Raw page value after defaulting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl QueryOptions {
    /// Page as a number, when it parses and is at least 1
    pub fn page_number(&self) -> Option<u64> {
        self.page.as_deref().and_then(parse_positive)
    }
}

/// Strictly parse a positive integer
pub(crate) fn parse_positive(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

/// Turn raw query parameters into [`QueryOptions`]
pub fn parse_query_params(params: &QueryParams, defaults: &PaginationDefaults) -> QueryOptions {
    let page = params
        .get("page")
        .map(str::to_string)
        .unwrap_or_else(|| defaults.page.to_string());
    let limit = params
        .get("limit")
        .map(str::to_string)
        .unwrap_or_else(|| defaults.limit.to_string());
    let sort = params.get("sort").unwrap_or(defaults.sort.as_str());
    let sort_type = params.get("sort_type").unwrap_or(defaults.sort_type.as_str());

    let mut options = QueryOptions::default();

    if let (Some(p), Some(l)) = (parse_positive(&page), parse_positive(&limit)) {
        if let Some(skip) = (p - 1).checked_mul(l) {
            options.skip = Some(skip);
            options.limit = Some(l);
        }
    }

    if !sort.is_empty() {
        options.sort = Some(SortSpec {
            field: sort.to_string(),
            direction: SortDirection::from_sort_type(sort_type),
        });
    }

    options.search = params.get("search").map(str::to_string);
    options.page = Some(page);

    options
}
