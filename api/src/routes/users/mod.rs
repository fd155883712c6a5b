//! # Users Routes Module
//!
//! Account management. Every route needs `user:manage`.
//!
//! - `get.rs` — list and read
//! - `post.rs` — create
//! - `put.rs` — update, assign role
//! - `delete.rs` — delete
//! - `common.rs` — request bodies

use axum::{
    Router,
    routing::{get, put},
};
use db::rbac::Permission;

use crate::auth::guards::require;
use crate::state::AppState;

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

/// - `GET /users` → `list_users`
/// - `POST /users` → `create_user`
/// - `GET /users/{id}` → `get_user`
/// - `PUT /users/{id}` → `update_user`
/// - `DELETE /users/{id}` → `delete_user`
/// - `PUT /users/{id}/role` → `assign_role`
pub fn users_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_users).post(post::create_user))
        .route("/{id}", get(get::get_user).put(put::update_user).delete(delete::delete_user))
        .route("/{id}/role", put(put::assign_role))
        .route_layer(require(&state, Permission::UserManage))
}
