//! Todo list API with privilege and ownership checks.

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod store;

pub use config::schema::ApiConfig;
pub use error::ApiError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
