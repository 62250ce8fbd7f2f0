//! Core module: pure query, pagination and hypermedia logic plus the traits
//! storage backends implement

pub mod auth;
pub mod entity;
pub mod error;
pub mod expand;
pub mod link;
pub mod pagination;
pub mod projection;
pub mod query;
pub mod service;
pub mod validation;

pub use entity::{Entity, Lookup};
pub use error::{ApiError, ApiResult};
pub use expand::{ExpansionSpec, Relation, RelationExpander};
pub use link::{LinkDefinition, LinkGenerator, LinkMethod, ResourceLink};
pub use pagination::{CollectionLinkRequest, CollectionLinks, PaginationInfo, PaginationInput};
pub use projection::ItemProjector;
pub use query::{QueryOptions, QueryParams, SortDirection, SortSpec, parse_query_params};
pub use service::{DataService, EntityFetcher, ServiceFetcher};
