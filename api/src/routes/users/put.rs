use axum::extract::{Path, State};
use services::user_service::UserView;
use validator::Validate;

use super::common::{AssignRoleRequest, UpdateUserRequest};
use crate::extract::JsonBody;
use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// PUT /api/v1/users/{id}
///
/// Any subset of `username`, `email`, `full_name`, `is_active`.
///
/// - `200 OK`
/// - `400 Bad Request` (nothing to change, or username/email taken)
/// - `404 Not Found`
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> ApiResult<UserView> {
    req.validate()?;
    let user = state.users().update(&id, req.into()).await?;
    ok(user, "User updated successfully")
}

/// PUT /api/v1/users/{id}/role
///
/// ```json
/// { "role_id": "..." }
/// ```
pub async fn assign_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AssignRoleRequest>,
) -> ApiResult<UserView> {
    req.validate()?;
    let user = state.users().assign_role(&id, &req.role_id).await?;
    ok(user, "Role assigned successfully")
}
