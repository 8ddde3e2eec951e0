//! Endpoint layer for dojo registry callers.
//!
//! Exposes the `dojos:*` function registry, JSON dispatch, and the
//! environment configuration used to locate the store.

pub mod api;
pub mod config;

pub use api::{
    call, call_service, call_with_config, function_spec, ApiError, ApiResponse, FunctionKind,
    FunctionSpec, FUNCTIONS,
};
pub use config::ApiConfig;
