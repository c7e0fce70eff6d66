// src/api/mod.rs
// HTTP surface: error mapping and the axum router

pub mod error;
pub mod http;

pub use error::{ApiError, ApiResult};
pub use http::{create_router, run};
