//! # Lecturers Routes Module

use axum::{Router, routing::get};
use db::rbac::Permission;

use crate::auth::guards::require;
use crate::state::AppState;

pub mod get;

/// - `GET /lecturers` → `list_lecturers` (`lecturer:list`)
/// - `GET /lecturers/{id}/advisees` → `get_advisees` (`lecturer:advisees`)
pub fn lecturer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_lecturers).route_layer(require(&state, Permission::LecturerList)))
        .route(
            "/{id}/advisees",
            get(get::get_advisees).route_layer(require(&state, Permission::LecturerAdvisees)),
        )
}
