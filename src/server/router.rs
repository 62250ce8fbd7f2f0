//! Route table

use super::handlers::{auth, health_check, ingredients, recipes, users};
use super::state::AppState;
use crate::core::error::{ApiError, RequestError};
use axum::http::Uri;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Build every route of the API
///
/// - GET /health
/// - POST {prefix}/auth/signup, POST {prefix}/auth/signin
/// - GET|PUT|DELETE {prefix}/users/{id}, PATCH {prefix}/users/{id}/password
/// - GET|POST {prefix}/ingredients, GET|PUT|DELETE {prefix}/ingredients/{id}
/// - GET|POST {prefix}/recipes, GET|PUT|DELETE {prefix}/recipes/{id}
///
/// Anything else answers 404 "Route not found".
pub fn build_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/password", patch(users::change_password))
        .route(
            "/ingredients",
            get(ingredients::list_ingredients).post(ingredients::create_ingredient),
        )
        .route(
            "/ingredients/{id}",
            get(ingredients::get_ingredient)
                .put(ingredients::update_ingredient)
                .delete(ingredients::delete_ingredient),
        )
        .route(
            "/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipes/{id}",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        );

    let prefix = state.config.server.api_prefix.trim_end_matches('/').to_string();
    let root = Router::new().route("/health", get(health_check));

    // axum refuses to nest at the root
    let app = if prefix.is_empty() {
        root.merge(api)
    } else {
        root.nest(&prefix, api)
    };

    app.fallback(route_not_found).with_state(state)
}

async fn route_not_found(uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), "no route matched");
    RequestError::RouteNotFound {
        path: uri.path().to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::Storage;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(prefix: &str) -> Router {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "test-secret".to_string();
        config.server.api_prefix = prefix.to_string();
        build_routes(AppState::new(config, Storage::in_memory()))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_is_outside_prefix() {
        let (status, body) = get(app("/api/v1"), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Server is running");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get(app("/api/v1"), "/api/v1/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_routes_mounted_at_root_without_prefix() {
        let (status, body) = get(app(""), "/ingredients").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!([]));
    }
}
