//! HTTP server: routes, handlers, the response envelope and the bearer-token
//! extractor

pub mod auth;
pub mod builder;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use auth::AuthUser;
pub use builder::ServerBuilder;
pub use response::ApiResponse;
pub use router::build_routes;
pub use state::AppState;
