//! # Students Routes Module
//!
//! Directory lookups over student profiles plus advisor assignment.

use axum::{
    Router,
    routing::{get, put},
};
use db::rbac::Permission;

use crate::auth::guards::require;
use crate::state::AppState;

pub mod get;
pub mod put;

/// - `GET /students` → `list_students` (`student:list`)
/// - `GET /students/{id}` → `get_student` (`student:read`)
/// - `GET /students/{id}/achievements` → `get_student_achievements` (`student:achievements`)
/// - `PUT /students/{id}/advisor` → `update_advisor` (`student:update_advisor`)
pub fn student_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_students).route_layer(require(&state, Permission::StudentList)))
        .route("/{id}", get(get::get_student).route_layer(require(&state, Permission::StudentRead)))
        .route(
            "/{id}/achievements",
            get(get::get_student_achievements).route_layer(require(&state, Permission::StudentAchievements)),
        )
        .route(
            "/{id}/advisor",
            put(put::update_advisor).route_layer(require(&state, Permission::StudentUpdateAdvisor)),
        )
}
