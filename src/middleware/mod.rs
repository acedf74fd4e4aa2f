// Request middleware and extractors

pub mod auth;
pub mod cors;

pub use auth::{AuthenticatedUser, OptionalUser};
pub use cors::dynamic_cors_middleware;
