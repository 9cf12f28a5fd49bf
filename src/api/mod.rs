// src/api/mod.rs
// REST API: router, handlers, wire types and error mapping

pub mod error;
pub mod http;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use http::router::create_router;
