//! HTTP route entry point for `/api/v1/...`.
//!
//! Route groups:
//! - `/health` → liveness (public)
//! - `/auth` → login, refresh, logout, profile
//! - `/achievements` → achievement workflow
//! - `/reports` → aggregates over verified achievements
//! - `/users` → account management
//! - `/students`, `/lecturers` → directory lookups
//!
//! Every protected route names the single permission it needs through
//! [`require`](crate::auth::guards::require).

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::from_fn_with_state,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::auth::middleware::log_request;
use crate::state::AppState;

pub mod achievements;
pub mod auth;
pub mod health;
pub mod lecturers;
pub mod reports;
pub mod students;
pub mod users;

/// Upper bound on any request body; attachment uploads are the large ones.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Builds the `/api/v1` router.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/auth", auth::auth_routes())
        .nest("/achievements", achievements::achievement_routes(state.clone()))
        .nest("/reports", reports::report_routes(state.clone()))
        .nest("/users", users::users_routes(state.clone()))
        .nest("/students", students::student_routes(state.clone()))
        .nest("/lecturers", lecturers::lecturer_routes(state))
}

/// The whole application: API routes, uploaded files, request logging and CORS.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_DISPOSITION, CONTENT_TYPE]);

    Router::new()
        .nest("/api/v1", routes(state.clone()))
        .nest_service("/uploads", ServeDir::new(state.upload_root()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn_with_state(state.clone(), log_request))
        .layer(cors)
        .with_state(state)
}
