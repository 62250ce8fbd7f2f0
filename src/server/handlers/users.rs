//! User profile handlers
//!
//! Every mutation requires the actor to be the user being changed.

use super::{find_or_404, parse_id, resource_path};
use crate::core::auth::{ensure_owner, hash_password, verify_password};
use crate::core::entity::{Entity, Lookup};
use crate::core::error::{ApiResult, EntityError, RequestError};
use crate::core::validation::Validated;
use crate::entities::{ChangePassword, UpdateUser, User};
use crate::server::auth::AuthUser;
use crate::server::response::ApiResponse;
use crate::server::state::AppState;
use axum::extract::{Path, State};
use serde_json::{Value, json};

fn profile(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "roles": user.roles,
    })
}

/// `GET /users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;
    let user = find_or_404(state.storage.users.as_ref(), id).await?;

    Ok(ApiResponse::ok("User data retrieved successfully")
        .with_data(profile(&user))
        .with_links(state.links.generate(&id.to_string(), &resource_path::<User>())))
}

/// `PUT /users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Validated(payload): Validated<UpdateUser>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;
    ensure_owner(actor.id, id)?;

    if payload.is_empty() {
        return Err(RequestError::InvalidBody {
            message: "Invalid request payload".to_string(),
        }
        .into());
    }

    let mut user = find_or_404(state.storage.users.as_ref(), id).await?;

    if let Some(email) = payload.email {
        if email != user.email {
            let taken = state
                .storage
                .users
                .find_one(&Lookup::by_field("email", email.clone()))
                .await?;
            if taken.is_some() {
                return Err(EntityError::AlreadyExists {
                    entity_type: User::resource_name_singular().to_string(),
                    key: "email".to_string(),
                }
                .into());
            }
            user.email = email;
        }
    }
    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(password) = payload.password {
        user.password = hash_password(&password)?;
    }
    if let Some(roles) = payload.roles {
        user.roles = roles;
    }
    user.touch();

    let user = state
        .storage
        .users
        .update(&id, user)
        .await?
        .ok_or_else(|| EntityError::not_found(User::resource_name_singular(), id))?;

    tracing::info!(user_id = %id, "user updated");

    Ok(ApiResponse::ok("User Updated Successfully")
        .with_data(profile(&user))
        .with_links(state.links.generate(&id.to_string(), &resource_path::<User>())))
}

/// `PATCH /users/{id}/password`
pub async fn change_password(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Validated(payload): Validated<ChangePassword>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;
    ensure_owner(actor.id, id)?;

    let mut user = find_or_404(state.storage.users.as_ref(), id).await?;
    if !verify_password(&payload.current_password, &user.password) {
        return Err(RequestError::InvalidBody {
            message: "Invalid current password".to_string(),
        }
        .into());
    }

    user.password = hash_password(&payload.new_password)?;
    user.touch();

    let user = state
        .storage
        .users
        .update(&id, user)
        .await?
        .ok_or_else(|| EntityError::not_found(User::resource_name_singular(), id))?;

    tracing::info!(user_id = %id, "password changed");

    Ok(ApiResponse::ok("User password updated successfully")
        .with_data(profile(&user))
        .with_links(state.links.generate(&id.to_string(), &resource_path::<User>())))
}

/// `DELETE /users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;
    ensure_owner(actor.id, id)?;

    state
        .storage
        .users
        .delete(&id)
        .await?
        .ok_or_else(|| EntityError::not_found(User::resource_name_singular(), id))?;

    tracing::info!(user_id = %id, "user deleted");

    Ok(ApiResponse::ok("User deleted successfully"))
}
