//! Ingredient handlers

use super::{fetch_page, find_or_404, parse_id, resource_path};
use crate::core::entity::Entity;
use crate::core::error::{ApiResult, EntityError};
use crate::core::projection::ItemProjector;
use crate::core::query::QueryParams;
use crate::core::validation::Validated;
use crate::entities::{Ingredient, NewIngredient, UpdateIngredient};
use crate::server::auth::AuthUser;
use crate::server::response::ApiResponse;
use crate::server::state::AppState;
use axum::extract::{Path, State};
use serde_json::Value;

fn with_ingredient(state: &AppState, response: ApiResponse, ingredient: &Ingredient) -> ApiResponse {
    response
        .with_data(ingredient.to_public_json())
        .with_links(
            state
                .links
                .generate(&ingredient.id.to_string(), &resource_path::<Ingredient>()),
        )
}

/// `POST /ingredients`
pub async fn create_ingredient(
    State(state): State<AppState>,
    actor: AuthUser,
    Validated(payload): Validated<NewIngredient>,
) -> ApiResult<ApiResponse> {
    let ingredient = state
        .storage
        .ingredients
        .create(Ingredient::from(payload))
        .await?;

    tracing::info!(ingredient_id = %ingredient.id, user_id = %actor.id, "ingredient created");

    Ok(with_ingredient(
        &state,
        ApiResponse::created("Ingredient created successfully"),
        &ingredient,
    ))
}

/// `GET /ingredients`
pub async fn list_ingredients(
    State(state): State<AppState>,
    query: QueryParams,
) -> ApiResult<ApiResponse> {
    let page = fetch_page(state.storage.ingredients.as_ref(), &query, state.pagination()).await?;
    let items = ItemProjector::new(Ingredient::LIST_FIELDS, &resource_path::<Ingredient>())
        .project(&page.records)?;

    Ok(ApiResponse::ok("Ingredients fetched successfully")
        .with_data(Value::Array(items))
        .with_pagination(page.pagination)
        .with_collection_links(page.links))
}

/// `GET /ingredients/{id}`
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;
    let ingredient = find_or_404(state.storage.ingredients.as_ref(), id).await?;

    Ok(with_ingredient(
        &state,
        ApiResponse::ok("Ingredient fetched successfully"),
        &ingredient,
    ))
}

/// `PUT /ingredients/{id}`
pub async fn update_ingredient(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Validated(payload): Validated<UpdateIngredient>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;
    let mut ingredient = find_or_404(state.storage.ingredients.as_ref(), id).await?;

    payload.apply(&mut ingredient);
    ingredient.touch();

    let ingredient = state
        .storage
        .ingredients
        .update(&id, ingredient)
        .await?
        .ok_or_else(|| EntityError::not_found(Ingredient::resource_name_singular(), id))?;

    tracing::info!(ingredient_id = %id, user_id = %actor.id, "ingredient updated");

    Ok(with_ingredient(
        &state,
        ApiResponse::ok("Ingredient updated successfully"),
        &ingredient,
    ))
}

/// `DELETE /ingredients/{id}`
pub async fn delete_ingredient(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;

    state
        .storage
        .ingredients
        .delete(&id)
        .await?
        .ok_or_else(|| EntityError::not_found(Ingredient::resource_name_singular(), id))?;

    tracing::info!(ingredient_id = %id, user_id = %actor.id, "ingredient deleted");

    Ok(ApiResponse::ok("Ingredient deleted successfully"))
}
