//! Application state shared across handlers

use crate::config::{AppConfig, PaginationDefaults};
use crate::core::auth::TokenService;
use crate::core::entity::Entity;
use crate::core::expand::{Relation, RelationExpander};
use crate::core::link::LinkGenerator;
use crate::core::service::ServiceFetcher;
use crate::entities::{Ingredient, User};
use crate::storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Storage,
    pub tokens: Arc<TokenService>,
    /// Resolves `creator` and `ingredients[].ingredient` on recipes
    pub expander: Arc<RelationExpander>,
    pub links: Arc<LinkGenerator>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Storage) -> Self {
        let tokens = TokenService::from_config(&config.auth);
        let expander = recipe_expander(&storage);

        Self {
            config: Arc::new(config),
            storage,
            tokens: Arc::new(tokens),
            expander: Arc::new(expander),
            links: Arc::new(LinkGenerator::default()),
        }
    }

    pub fn pagination(&self) -> &PaginationDefaults {
        &self.config.pagination
    }
}

/// Expander for recipe references, backed by the user and ingredient stores
pub fn recipe_expander(storage: &Storage) -> RelationExpander {
    RelationExpander::new()
        .with_relation(Relation::reference("creator", User::resource_name()))
        .with_relation(Relation::nested(
            "ingredients",
            "ingredient",
            Ingredient::resource_name(),
        ))
        .with_fetcher(Arc::new(ServiceFetcher::new(storage.users.clone())))
        .with_fetcher(Arc::new(ServiceFetcher::new(storage.ingredients.clone())))
}
