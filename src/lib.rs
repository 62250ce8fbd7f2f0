//! # Recipe API
//!
//! A REST API for recipes, ingredients and user accounts, with paginated,
//! searchable and sortable collections whose responses carry hypermedia
//! links.
//!
//! ## Features
//!
//! - **Query parsing**: `page`, `limit`, `sort`, `sort_type` and `search`
//!   turned into storage options, with configurable defaults
//! - **Pagination**: page metadata and `self`/`next`/`prev` links that always agree
//! - **Projection**: collection items reduced to a field subset plus a self link
//! - **Expansion**: `?expand=creator=name,email` embeds referenced records
//! - **Auth**: HS256 bearer tokens and argon2 password hashes
//! - **Storage**: in-memory by default, MongoDB behind `mongodb_backend`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recipe_api::prelude::*;
//!
//! let config = AppConfig::load(Some("config.yaml"))?;
//! let storage = Storage::from_config(&config.storage).await?;
//! let addr = config.bind_address();
//!
//! ServerBuilder::new()
//!     .with_config(config)
//!     .with_storage(storage)
//!     .serve(&addr)
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiError, ApiResult, CollectionLinks, DataService, Entity, EntityFetcher, ExpansionSpec,
        ItemProjector, LinkGenerator, Lookup, PaginationInfo, PaginationInput, QueryOptions,
        QueryParams, RelationExpander, parse_query_params,
    };

    // === Entities ===
    pub use crate::entities::{Category, Ingredient, Recipe, RecipeIngredient, Role, User};

    // === Storage ===
    pub use crate::storage::{InMemoryDataService, Storage};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoDataService;

    // === Config ===
    pub use crate::config::{AppConfig, PaginationDefaults};

    // === Server ===
    pub use crate::server::{ApiResponse, AppState, AuthUser, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
