use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::{FromFnLayer, Next, from_fn_with_state},
    response::{IntoResponse, Response},
};
use db::rbac::Permission;
use services::permission_service::PermissionResolver;
use tracing::warn;

use crate::auth::claims::AuthUser;
use crate::response::ApiError;
use crate::state::AppState;

pub type GuardFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Route layer that admits only callers holding `permission`.
///
/// ```ignore
/// get(list).route_layer(require(&state, Permission::AchievementList))
/// ```
pub fn require(
    state: &AppState,
    permission: Permission,
) -> FromFnLayer<
    impl Fn(State<AppState>, Request, Next) -> GuardFuture + Clone + Send + Sync + 'static,
    AppState,
    (State<AppState>, Request),
> {
    from_fn_with_state(
        state.clone(),
        move |state: State<AppState>, req: Request, next: Next| -> GuardFuture {
            Box::pin(require_permission(state, permission, req, next))
        },
    )
}

/// Authenticates the request and checks `permission` against the caller's
/// permission list.
///
/// Tokens without an embedded list get one loaded from the role tables. The
/// resolved `AuthUser` is stored in the request extensions for the handler;
/// nothing is cached beyond this request.
pub async fn require_permission(
    State(state): State<AppState>,
    permission: Permission,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();

    let AuthUser(mut claims) = match AuthUser::from_request_parts(&mut parts, &state).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    if claims.permissions.is_empty() {
        match state.permissions().permissions_for_user(&claims.sub).await {
            Ok(loaded) => claims.permissions = loaded,
            Err(err) => return ApiError::from(err).into_response(),
        }
    }

    if !PermissionResolver::authorize(&claims.permissions, permission) {
        warn!(user_id = %claims.sub, permission = %permission, "Permission denied");
        return ApiError::forbidden(format!("Missing required permission: {permission}")).into_response();
    }

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(AuthUser(claims));
    next.run(req).await
}
