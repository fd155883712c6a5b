use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::TypedHeader;
use headers::{Authorization, Origin, UserAgent, authorization::Bearer};
use std::net::SocketAddr;
use tracing::info;

use crate::state::AppState;

/// Logs method, path, IP address, user ID (if authenticated), origin, and user-agent
/// for each incoming HTTP request. Skips CORS preflight `OPTIONS` requests.
///
/// ```ignore
/// let app = Router::new().layer(from_fn_with_state(state, log_request));
/// ```
///
/// The IP comes from `ConnectInfo` and is `unknown` when the router is driven
/// without a socket (tests).
pub async fn log_request(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();

    let ip = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let user_id = TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .and_then(|TypedHeader(Authorization(bearer))| state.tokens().decode_access(bearer.token()).ok())
        .map(|claims| claims.sub);

    let origin = TypedHeader::<Origin>::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|TypedHeader(o)| o.to_string());

    let user_agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|TypedHeader(ua)| ua.to_string());

    info!(
        method = ?parts.method,
        path = %parts.uri.path(),
        ip = ip.as_deref().unwrap_or("unknown"),
        user = user_id.as_deref().unwrap_or("anonymous"),
        origin = origin.as_deref().unwrap_or("unknown"),
        user_agent = user_agent.as_deref().unwrap_or("unknown"),
        "Incoming request"
    );

    next.run(Request::from_parts(parts, body)).await
}
