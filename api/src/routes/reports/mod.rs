//! # Reports Routes Module
//!
//! Aggregates over verified achievements. Both endpoints need `report:view`.

use axum::{Router, routing::get};
use db::rbac::Permission;

use crate::auth::guards::require;
use crate::state::AppState;

pub mod get;

/// - `GET /reports/statistics` → `get_statistics`
/// - `GET /reports/student/{id}` → `get_student_report`
pub fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/statistics", get(get::get_statistics).route_layer(require(&state, Permission::ReportView)))
        .route("/student/{id}", get(get::get_student_report).route_layer(require(&state, Permission::ReportView)))
}
