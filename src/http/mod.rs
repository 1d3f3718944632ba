//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, span, shape validation helpers)
//!     → auth::gate (route capability)
//!     → handlers/ (access resolver + store)
//!     → JSON response, or ApiError body
//!     → response.rs (fallbacks, error bodies for layer rejections)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
