//! HTTP API layer for critique-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: one module per resource, nested under `/api/v1` by the server
//! - **Middleware**: bearer-token authentication and the shared [`AppState`]
//! - **Response**: the JSON envelope every endpoint answers with
//!
//! Built on Axum 0.8 with a Tower middleware stack.

pub mod endpoints;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, AuthUser, MaybeAuthUser, auth_middleware};
