//! HTTP handlers, one module per resource

pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod users;

use crate::config::PaginationDefaults;
use crate::core::entity::{Entity, Lookup};
use crate::core::error::{ApiResult, EntityError, ValidationError};
use crate::core::pagination::{CollectionLinks, PaginationInfo, PaginationInput};
use crate::core::query::{QueryParams, parse_query_params};
use crate::core::service::DataService;
use axum::Json;
use serde_json::{Value, json};
use uuid::Uuid;

/// `GET /health`
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Server is running"
    }))
}

/// Path ids must be UUIDs
pub(crate) fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        ValidationError::InvalidId {
            value: raw.to_string(),
        }
        .into()
    })
}

/// Base path of a resource as it appears in links (`/recipes`)
pub(crate) fn resource_path<T: Entity>() -> String {
    format!("/{}", T::resource_name())
}

pub(crate) async fn find_or_404<T: Entity>(service: &dyn DataService<T>, id: Uuid) -> ApiResult<T> {
    service
        .find_one(&Lookup::ById(id))
        .await?
        .ok_or_else(|| EntityError::not_found(T::resource_name_singular(), id).into())
}

/// One page of a collection, before projection
pub(crate) struct CollectionPage {
    pub records: Vec<Value>,
    pub pagination: PaginationInfo,
    pub links: CollectionLinks,
}

/// Parse the query, load the page and its total, and derive pagination and
/// navigation links from them
pub(crate) async fn fetch_page<T: Entity>(
    service: &dyn DataService<T>,
    query: &QueryParams,
    defaults: &PaginationDefaults,
) -> ApiResult<CollectionPage> {
    let options = parse_query_params(query, defaults);

    let (found, total) = tokio::try_join!(
        service.find(&options),
        service.count(options.search.as_deref())
    )?;

    let pagination = PaginationInfo::calculate(
        PaginationInput {
            total_items: Some(total),
            limit: options.limit,
            page: options.page_number(),
        },
        defaults,
    )?;
    let links = CollectionLinks::for_page(&resource_path::<T>(), query, &pagination, defaults);

    Ok(CollectionPage {
        records: found.iter().map(T::to_public_json).collect(),
        pagination,
        links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Ingredient;
    use crate::storage::InMemoryDataService;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_id_rejects_garbage() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_page_agrees_with_links() {
        let service = InMemoryDataService::<Ingredient>::new();
        for i in 0..25 {
            service
                .create(Ingredient::new(format!("item {i}"), "", Default::default()))
                .await
                .unwrap();
        }

        let query = QueryParams::from_query_str("page=2&limit=10");
        let page = fetch_page(&service, &query, &PaginationDefaults::default())
            .await
            .unwrap();

        assert_eq!(page.records.len(), 10);
        assert_eq!(page.pagination.total_page, 3);
        assert_eq!(page.pagination.next, Some(3));
        assert_eq!(page.pagination.prev, Some(1));
        assert!(page.links.next.as_deref().unwrap().contains("page=3"));
        assert!(page.links.prev.as_deref().unwrap().contains("page=1"));
    }

    #[tokio::test]
    async fn test_fetch_page_with_bad_limit_returns_everything() {
        let service = InMemoryDataService::<Ingredient>::new();
        for i in 0..12 {
            service
                .create(Ingredient::new(format!("item {i}"), "", Default::default()))
                .await
                .unwrap();
        }

        let query = QueryParams::from_query_str("limit=abc");
        let page = fetch_page(&service, &query, &PaginationDefaults::default())
            .await
            .unwrap();

        assert_eq!(page.records.len(), 12);
        assert_eq!(page.pagination.limit, 10);
        assert_eq!(page.pagination.total_page, 2);
    }
}
