//! Recipe handlers
//!
//! Reads accept `expand` to embed the creator and ingredients.

use super::{fetch_page, find_or_404, parse_id, resource_path};
use crate::core::entity::Entity;
use crate::core::error::{ApiResult, EntityError};
use crate::core::expand::{ExpansionSpec, find_and_expand};
use crate::core::projection::ItemProjector;
use crate::core::query::QueryParams;
use crate::core::validation::Validated;
use crate::entities::{NewRecipe, Recipe, UpdateRecipe};
use crate::server::auth::AuthUser;
use crate::server::response::ApiResponse;
use crate::server::state::AppState;
use axum::extract::{Path, State};
use serde_json::Value;

fn with_recipe(state: &AppState, response: ApiResponse, id: &str, data: Value) -> ApiResponse {
    response
        .with_data(data)
        .with_links(state.links.generate(id, &resource_path::<Recipe>()))
}

/// `POST /recipes`; the actor becomes the creator
pub async fn create_recipe(
    State(state): State<AppState>,
    actor: AuthUser,
    Validated(payload): Validated<NewRecipe>,
) -> ApiResult<ApiResponse> {
    let recipe = state
        .storage
        .recipes
        .create(Recipe::new(payload, actor.id))
        .await?;

    tracing::info!(recipe_id = %recipe.id, user_id = %actor.id, "recipe created");

    Ok(with_recipe(
        &state,
        ApiResponse::created("Recipe created successfully"),
        &recipe.id.to_string(),
        recipe.to_public_json(),
    ))
}

/// `GET /recipes`
pub async fn list_recipes(
    State(state): State<AppState>,
    query: QueryParams,
) -> ApiResult<ApiResponse> {
    let spec = ExpansionSpec::from_query(&query);
    let page = fetch_page(state.storage.recipes.as_ref(), &query, state.pagination()).await?;

    let expanded = state.expander.expand_all(&page.records, &spec).await?;
    let items = ItemProjector::new(Recipe::LIST_FIELDS, &resource_path::<Recipe>())
        .project(&expanded)?;

    Ok(ApiResponse::ok("Recipes fetched successfully")
        .with_data(Value::Array(items))
        .with_pagination(page.pagination)
        .with_collection_links(page.links))
}

/// `GET /recipes/{id}`
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: QueryParams,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;
    let spec = ExpansionSpec::from_query(&query);
    let recipe = find_and_expand(state.storage.recipes.as_ref(), id, &spec, &state.expander).await?;

    Ok(with_recipe(
        &state,
        ApiResponse::ok("Recipe fetched successfully"),
        &id.to_string(),
        recipe,
    ))
}

/// `PUT /recipes/{id}`
pub async fn update_recipe(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
    Validated(payload): Validated<UpdateRecipe>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;
    let mut recipe = find_or_404(state.storage.recipes.as_ref(), id).await?;

    payload.apply(&mut recipe);
    recipe.touch();

    let recipe = state
        .storage
        .recipes
        .update(&id, recipe)
        .await?
        .ok_or_else(|| EntityError::not_found(Recipe::resource_name_singular(), id))?;

    tracing::info!(recipe_id = %id, user_id = %actor.id, "recipe updated");

    Ok(with_recipe(
        &state,
        ApiResponse::ok("Recipe updated successfully"),
        &id.to_string(),
        recipe.to_public_json(),
    ))
}

/// `DELETE /recipes/{id}`
pub async fn delete_recipe(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    let id = parse_id(&id)?;

    state
        .storage
        .recipes
        .delete(&id)
        .await?
        .ok_or_else(|| EntityError::not_found(Recipe::resource_name_singular(), id))?;

    tracing::info!(recipe_id = %id, user_id = %actor.id, "recipe deleted");

    Ok(ApiResponse::ok("Recipe deleted successfully"))
}
