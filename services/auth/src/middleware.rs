//! Middleware for session validation and admin gating

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::authz;
use crate::state::AppState;

/// Name of the signed session cookie
pub const SESSION_COOKIE: &str = "variant_session";

/// Pull the session id out of the signed cookie, falling back to an
/// `Authorization: Bearer <session-id>` header for non-browser callers.
pub fn extract_session_id(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let jar = SignedCookieJar::from_headers(headers, state.cookie_key.clone());
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Require a valid session; the user snapshot is made available to
/// handlers via request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let session_id =
        extract_session_id(&state, req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    // An expired session reads as absent; the caller cannot tell the
    // difference and does not need to.
    let user = state
        .sessions
        .current_user(&session_id)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Require a valid session belonging to an admin or super admin
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let session_id =
        extract_session_id(&state, req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let user = state
        .sessions
        .current_user(&session_id)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !authz::can_view_admin_panel(user.role) {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
