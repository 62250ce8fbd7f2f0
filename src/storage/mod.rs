//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryDataService;
#[cfg(feature = "mongodb_backend")]
pub use self::mongodb::MongoDataService;

use crate::config::{StorageBackend, StorageConfig};
use crate::core::service::DataService;
use crate::entities::{Ingredient, Recipe, User};
use anyhow::Result;
use std::sync::Arc;

/// The three record services the server runs on
#[derive(Clone)]
pub struct Storage {
    pub ingredients: Arc<dyn DataService<Ingredient>>,
    pub recipes: Arc<dyn DataService<Recipe>>,
    pub users: Arc<dyn DataService<User>>,
}

impl Storage {
    pub fn in_memory() -> Self {
        Self {
            ingredients: Arc::new(InMemoryDataService::<Ingredient>::new()),
            recipes: Arc::new(InMemoryDataService::<Recipe>::new()),
            users: Arc::new(InMemoryDataService::<User>::new()),
        }
    }

    #[cfg(feature = "mongodb_backend")]
    pub async fn mongodb(uri: &str, database: &str) -> Result<Self> {
        let db = self::mongodb::connect(uri, database).await?;
        Ok(Self::from_database(db))
    }

    #[cfg(feature = "mongodb_backend")]
    pub fn from_database(db: ::mongodb::Database) -> Self {
        Self {
            ingredients: Arc::new(MongoDataService::<Ingredient>::new(db.clone())),
            recipes: Arc::new(MongoDataService::<Recipe>::new(db.clone())),
            users: Arc::new(MongoDataService::<User>::new(db)),
        }
    }

    /// Build the backend named in the configuration
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::InMemory => Ok(Self::in_memory()),
            #[cfg(feature = "mongodb_backend")]
            StorageBackend::Mongodb => {
                let uri = config
                    .uri
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("storage.uri is required for mongodb"))?;
                Self::mongodb(uri, &config.database).await
            }
            #[cfg(not(feature = "mongodb_backend"))]
            StorageBackend::Mongodb => Err(anyhow::anyhow!(
                "mongodb backend requested but the crate was built without `mongodb_backend`"
            )),
        }
    }
}
