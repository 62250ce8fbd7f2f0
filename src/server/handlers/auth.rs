//! Sign-up and sign-in

use super::resource_path;
use crate::core::auth::{hash_password, verify_password};
use crate::core::entity::{Entity, Lookup};
use crate::core::error::{ApiError, ApiResult, EntityError, RequestError};
use crate::core::link::{LinkMethod, ResourceLink};
use crate::core::validation::Validated;
use crate::entities::{SignIn, SignUp, User};
use crate::server::response::ApiResponse;
use crate::server::state::AppState;
use axum::extract::State;
use indexmap::IndexMap;
use serde_json::json;

fn link(rel: &str, href: String, method: LinkMethod) -> (String, ResourceLink) {
    (
        rel.to_string(),
        ResourceLink {
            rel: rel.to_string(),
            href,
            method,
        },
    )
}

/// `POST /auth/signup`
pub async fn sign_up(
    State(state): State<AppState>,
    Validated(payload): Validated<SignUp>,
) -> ApiResult<ApiResponse> {
    let existing = state
        .storage
        .users
        .find_one(&Lookup::by_field("email", payload.email.clone()))
        .await?;
    if existing.is_some() {
        return Err(EntityError::AlreadyExists {
            entity_type: User::resource_name_singular().to_string(),
            key: "email".to_string(),
        }
        .into());
    }

    let hash = hash_password(&payload.password)?;
    let user = User::new(
        payload.name,
        payload.email,
        hash,
        payload.roles.unwrap_or_default(),
    );
    let user = state.storage.users.create(user).await?;

    tracing::info!(user_id = %user.id, "user registered");

    let links: IndexMap<_, _> = [link("sign_in", "/auth/signin".to_string(), LinkMethod::Post)]
        .into_iter()
        .collect();
    Ok(ApiResponse::created("User created successfully").with_links(links))
}

/// `POST /auth/signin`
pub async fn sign_in(
    State(state): State<AppState>,
    Validated(payload): Validated<SignIn>,
) -> ApiResult<ApiResponse> {
    let user = state
        .storage
        .users
        .find_one(&Lookup::by_field("email", payload.email))
        .await?
        .filter(|user| verify_password(&payload.password, &user.password))
        .ok_or_else(invalid_credential)?;

    let token = state
        .tokens
        .issue(&user)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "user signed in");

    // Tokens are stateless, so there is no logout endpoint to advertise
    let links: IndexMap<_, _> = [link(
        "profile",
        format!("{}/{}", resource_path::<User>(), user.id),
        LinkMethod::Get,
    )]
    .into_iter()
    .collect();

    Ok(ApiResponse::ok("User login successfully")
        .with_data(json!({
            "id": user.id,
            "email": user.email,
            "roles": user.roles,
            "token": token,
        }))
        .with_links(links))
}

fn invalid_credential() -> ApiError {
    RequestError::InvalidBody {
        message: "Invalid Credential".to_string(),
    }
    .into()
}
