//! Authorization service routes
//!
//! The HTTP surface consumed by the dashboard UI layer. Authentication
//! failures are a single generic message. Administrative rule violations
//! come back with HTTP 200 as `success=false` plus the specific
//! human-readable reason; the UI renders the message and does not branch
//! on status codes for those.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::admin::{AdminResult, UpdateUser};
use crate::authz;
use crate::middleware::{SESSION_COOKIE, admin_middleware, auth_middleware};
use crate::models::{AppAccess, DashboardAccess, Role, UserSnapshot};
use crate::state::AppState;

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Request for creating a user
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub user_id: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    pub dashboards: DashboardAccess,
    #[serde(default)]
    pub app_access: Option<AppAccess>,
}

/// Request for editing a user; absent fields are left unchanged
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub role: Option<Role>,
    pub name: Option<String>,
    pub dashboards: Option<DashboardAccess>,
    pub app_access: Option<AppAccess>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateUser {
            password: req.password,
            role: req.role,
            name: req.name,
            dashboards: req.dashboards,
            app_access: req.app_access,
        }
    }
}

/// Outcome of an administrative action, rendered by the admin panel
#[derive(Serialize)]
pub struct AdminResponse {
    pub success: bool,
    pub message: String,
}

impl From<AdminResult> for AdminResponse {
    fn from(result: AdminResult) -> Self {
        match result {
            Ok(message) => AdminResponse {
                success: true,
                message,
            },
            Err(e) => AdminResponse {
                success: false,
                message: e.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: usize,
}

fn default_audit_limit() -> usize {
    50
}

/// Create the router for the authorization service
pub fn create_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/auth/me", get(me))
        .route("/dashboards", get(list_dashboards))
        .route("/dashboards/:id/apps", get(dashboard_apps))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/:id", put(edit_user).delete(soft_delete_user))
        .route("/admin/users/:id/toggle", post(toggle_user_status))
        .route("/admin/audit", get(recent_audit))
        .route("/admin/cache/invalidate", post(invalidate_cache))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .merge(session_routes)
        .merge(admin_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "variant-auth"
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for user: {}", payload.username);

    if !state.rate_limiter.check(&payload.username).await {
        return Err(AuthError::TooManyAttempts);
    }

    let (session_id, expires_at) = match state
        .sessions
        .authenticate(&payload.username, &payload.password, payload.remember_me)
        .await
    {
        Ok(issued) => issued,
        Err(_) => {
            state.rate_limiter.record_failure(&payload.username).await;
            return Err(AuthError::InvalidCredentials);
        }
    };
    state.rate_limiter.reset(&payload.username).await;

    let cookie = Cookie::build((SESSION_COOKIE, session_id.clone()))
        .path("/")
        .http_only(true)
        .build();

    let response = LoginResponse {
        success: true,
        session_id,
        expires_at,
    };

    Ok((jar.add(cookie), Json(response)))
}

/// Logout endpoint; deleting an absent session is a no-op
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.logout(cookie.value()).await;
    }

    (
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(serde_json::json!({"message": "Logged out successfully"})),
    )
}

/// Current user endpoint
pub async fn me(Extension(user): Extension<UserSnapshot>) -> impl IntoResponse {
    Json(user)
}

/// Dashboards visible to the current user
pub async fn list_dashboards(Extension(user): Extension<UserSnapshot>) -> impl IntoResponse {
    Json(authz::accessible_dashboards(&user))
}

/// Apps the current user may see on a dashboard; `null` means
/// unrestricted
pub async fn dashboard_apps(
    Extension(user): Extension<UserSnapshot>,
    Path(dashboard_id): Path<String>,
) -> Result<impl IntoResponse, AuthError> {
    if !authz::can_access_dashboard(&user, &dashboard_id) {
        return Err(AuthError::Forbidden);
    }

    let apps = authz::allowed_apps(&user, &dashboard_id);
    Ok(Json(serde_json::json!({ "apps": apps })))
}

/// Admin: list all users with metadata
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.users.users_with_metadata().await)
}

/// Admin: create a user
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<UserSnapshot>,
    Json(payload): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let result = state
        .users
        .create_user(
            &actor.username,
            actor.role,
            &payload.user_id,
            &payload.password,
            payload.role,
            &payload.name,
            payload.dashboards,
            payload.app_access,
        )
        .await;
    Json(AdminResponse::from(result))
}

/// Admin: edit a user
pub async fn edit_user(
    State(state): State<AppState>,
    Extension(actor): Extension<UserSnapshot>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let result = state
        .users
        .edit_user(&actor.username, actor.role, &user_id, payload.into())
        .await;
    Json(AdminResponse::from(result))
}

/// Admin: deactivate a user (soft delete)
pub async fn soft_delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<UserSnapshot>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let result = state
        .users
        .soft_delete_user(&actor.username, actor.role, &user_id)
        .await;
    Json(AdminResponse::from(result))
}

/// Admin: flip a user between active and inactive
pub async fn toggle_user_status(
    State(state): State<AppState>,
    Extension(actor): Extension<UserSnapshot>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let result = state
        .users
        .toggle_user_status(&actor.username, actor.role, &user_id)
        .await;
    Json(AdminResponse::from(result))
}

/// Admin: recent audit entries, newest first
pub async fn recent_audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> impl IntoResponse {
    Json(state.users.recent_audit(query.limit).await)
}

/// Admin: drop the process-local directory cache.
///
/// Used after external agents may have modified the durable copy; the
/// next read goes back to the store.
pub async fn invalidate_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.directory.invalidate().await;
    Json(serde_json::json!({"success": true, "message": "User cache invalidated"}))
}

/// Custom error type for authentication errors
#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    Forbidden,
    TooManyAttempts,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Deliberately the same message for unknown user and wrong
            // password, to avoid user enumeration
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Access denied"),
            AuthError::TooManyAttempts => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts, try again later",
            ),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
