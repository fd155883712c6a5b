//! # Achievements Routes Module
//!
//! - `get.rs` — list, read, status history
//! - `post.rs` — create, submit, verify, reject, attachments
//! - `put.rs` — update a draft
//! - `delete.rs` — soft delete a draft
//! - `common.rs` — request bodies

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use db::rbac::Permission;

use crate::auth::guards::require;
use crate::routes::MAX_BODY_BYTES;
use crate::state::AppState;

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

/// - `GET /achievements` → `list_achievements` (`achievement:list`)
/// - `POST /achievements` → `create_achievement` (`achievement:create`)
/// - `GET /achievements/{id}` → `get_achievement` (`achievement:view`)
/// - `PUT /achievements/{id}` → `update_achievement` (`achievement:update`)
/// - `DELETE /achievements/{id}` → `delete_achievement` (`achievement:delete`)
/// - `POST /achievements/{id}/submit` → `submit_achievement` (`achievement:submit`)
/// - `POST /achievements/{id}/verify` → `verify_achievement` (`achievement:verify`)
/// - `POST /achievements/{id}/reject` → `reject_achievement` (`achievement:reject`)
/// - `POST /achievements/{id}/attachments` → `upload_attachments` (`achievement:upload_attachment`)
/// - `GET /achievements/{id}/history` → `get_history` (`achievement:view`)
pub fn achievement_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_achievements).route_layer(require(&state, Permission::AchievementList)))
        .route("/", post(post::create_achievement).route_layer(require(&state, Permission::AchievementCreate)))
        .route("/{id}", get(get::get_achievement).route_layer(require(&state, Permission::AchievementView)))
        .route("/{id}", put(put::update_achievement).route_layer(require(&state, Permission::AchievementUpdate)))
        .route("/{id}", delete(delete::delete_achievement).route_layer(require(&state, Permission::AchievementDelete)))
        .route("/{id}/submit", post(post::submit_achievement).route_layer(require(&state, Permission::AchievementSubmit)))
        .route("/{id}/verify", post(post::verify_achievement).route_layer(require(&state, Permission::AchievementVerify)))
        .route("/{id}/reject", post(post::reject_achievement).route_layer(require(&state, Permission::AchievementReject)))
        .route(
            "/{id}/attachments",
            post(post::upload_attachments)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .route_layer(require(&state, Permission::AchievementUploadAttachment)),
        )
        .route("/{id}/history", get(get::get_history).route_layer(require(&state, Permission::AchievementView)))
}
