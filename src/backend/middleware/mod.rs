//! Middleware Module
//!
//! This module contains HTTP middleware for the backend server.
//!
//! - **`auth`** - Bearer-token authentication for the `/api` routes
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware, Router};
//! use talent_haven::backend::middleware::auth_middleware;
//! use talent_haven::backend::server::AppState;
//!
//! fn protect(router: Router<AppState>, state: AppState) -> Router<AppState> {
//!     router.route_layer(middleware::from_fn_with_state(state, auth_middleware))
//! }
//! ```

pub mod auth;

pub use auth::{
    auth_middleware, authenticate_token, bearer_token, AuthUser, AuthenticatedUser,
};
