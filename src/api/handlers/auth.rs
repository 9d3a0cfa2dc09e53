use crate::AppState;
use crate::api::error::AppError;
use crate::services::audit::AuditEventType;
use crate::services::auth_service::{self, AuthError, Credentials, Principal};
use crate::utils::auth::{cookie_value, decode_session, issue_session};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

const SESSION_COOKIE: &str = "session_token";

#[derive(Deserialize, ToSchema, Validate)]
pub struct UserLoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    /// One of [`crate::services::auth_service::UserPrincipal`] or
    /// [`crate::services::auth_service::AdminPrincipal`], tagged by `kind`
    #[schema(value_type = Object)]
    pub principal: Principal,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            // One generic message for every credential failure; the response
            // must not reveal whether the account exists.
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::Database(e) => AppError::Database(e),
            AuthError::Hash(msg) => AppError::Internal(msg),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = UserLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<UserLoginRequest>,
) -> Result<Response, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let principal = auth_service::authenticate(
        &state.db,
        Credentials::User {
            email: payload.email,
            password: payload.password,
        },
    )
    .await?;

    state
        .audit
        .log(
            AuditEventType::UserLogin,
            Some(principal.id().to_string()),
            None,
            "login",
            "success",
            None,
        )
        .await;

    issue_response(&state, principal)
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_admin(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Response, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let principal = auth_service::authenticate(
        &state.db,
        Credentials::Admin {
            username: payload.username,
            password: payload.password,
        },
    )
    .await?;

    state
        .audit
        .log(
            AuditEventType::AdminLogin,
            Some(principal.id().to_string()),
            None,
            "login",
            "success",
            None,
        )
        .await;

    issue_response(&state, principal)
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "auth"
)]
pub async fn logout() -> Response {
    let clear = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0; SameSite=Lax");
    let mut response =
        Json(serde_json::json!({"success": true, "message": "Logged out"})).into_response();
    if let Ok(value) = HeaderValue::from_str(&clear) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current session principal, tagged by kind"),
        (status = 401, description = "No valid session")
    ),
    tag = "auth"
)]
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Principal>, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| cookie_value(h, SESSION_COOKIE))
                .map(|s| s.to_string())
        })
        .ok_or_else(|| AppError::Unauthorized("No session".into()))?;

    let claims = decode_session(&token, &state.config.session_secret)
        .map_err(|_| AppError::Unauthorized("Invalid session".into()))?;

    Ok(Json(claims.principal))
}

fn issue_response(state: &AppState, principal: Principal) -> Result<Response, AppError> {
    let token = issue_session(
        &principal,
        &state.config.session_secret,
        state.config.session_max_age_hours,
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    let max_age_secs = state.config.session_max_age_hours * 3600;
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; Max-Age={max_age_secs}; SameSite=Lax"
    );

    let mut response = Json(AuthResponse { token, principal }).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))?,
    );
    Ok(response)
}
