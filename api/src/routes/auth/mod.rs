//! # auth Routes Module
//!
//! - `post.rs` — login, refresh, logout
//! - `get.rs` — profile of the current user
//!
//! Login and refresh are public. Logout and profile only need a valid access
//! token, not a specific permission.

pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
use get::get_profile;
use post::{login, logout, refresh};

/// - `POST /auth/login` → `login`
/// - `POST /auth/refresh` → `refresh`
/// - `POST /auth/logout` → `logout`
/// - `GET /auth/profile` → `get_profile`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile))
}
