//! # kindred API
//!
//! REST surface over a shared [`EngineHandle`](kindred_core::EngineHandle).

pub mod activity;
pub mod error;
pub mod rest;

pub use activity::{ActivityError, UserActivity};
pub use error::ApiError;
pub use rest::{AppState, RestApi, DEFAULT_EXPLAIN_LIMIT, DEFAULT_MAX_K};
