use crate::AppState;
use crate::utils::auth::{SessionClaims, cookie_value, decode_session};
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tracing::{error, warn};

/// Paths that stay reachable while the site is in maintenance mode: static
/// assets, the maintenance-status endpoint itself, and the whole admin
/// surface (including its login page).
const MAINTENANCE_EXEMPT_PREFIXES: &[&str] = &["/assets", "/api/maintenance", "/admin", "/api/admin"];

/// Public site surface, passed through untouched before any admin checks.
const PUBLIC_PREFIXES: &[&str] = &[
    "/blog",
    "/categories",
    "/tags",
    "/search",
    "/about",
    "/contact",
    "/terms",
    "/privacy",
    "/auth",
    "/api/auth",
    "/api/posts",
    "/api/categories",
    "/api/tags",
    "/api/search",
    "/health",
    "/swagger-ui",
    "/api-docs",
];

const FALLBACK_MAINTENANCE_PAGE: &str = "<!doctype html>\
<html><head><title>Maintenance</title></head>\
<body><h1>We&rsquo;ll be right back</h1>\
<p>The site is down for scheduled maintenance.</p></body></html>";

enum Denial {
    Unauthorized,
    Deactivated,
    Server(String),
}

/// Request gate, evaluated in fixed order: maintenance first (a locked-down
/// site must not become a session oracle), then the public pass-through,
/// then admin authorization. Everything else continues unchanged.
pub async fn request_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    if state.maintenance.is_enabled() && !matches_any(&path, MAINTENANCE_EXEMPT_PREFIXES) {
        return maintenance_page(&state).await;
    }

    if path == "/" || matches_any(&path, PUBLIC_PREFIXES) {
        return next.run(req).await;
    }

    if is_guarded_admin_path(&path) {
        return admin_gate(state, req, next, &path).await;
    }

    next.run(req).await
}

fn matches_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")))
}

/// Admin UI and API paths, minus the admin login surface which must stay
/// reachable without a session.
fn is_guarded_admin_path(path: &str) -> bool {
    if matches_any(path, &["/admin/login", "/api/admin/auth"]) {
        return false;
    }
    matches_any(path, &["/admin", "/api/admin"])
}

async fn admin_gate(state: AppState, mut req: Request, next: Next, path: &str) -> Response {
    let is_api = path.starts_with("/api/");

    let claims = match resolve_admin_session(&state, &req) {
        Ok(claims) => claims,
        Err(denial) => return deny(is_api, denial),
    };

    if is_api {
        let id = match HeaderValue::from_str(claims.principal.id()) {
            Ok(v) => v,
            Err(e) => {
                return deny(is_api, Denial::Server(format!("invalid admin id header: {e}")));
            }
        };
        req.headers_mut().insert("x-admin-id", id);
        req.headers_mut().insert(
            "x-admin-role",
            HeaderValue::from_static(claims.principal.role_str()),
        );
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}

fn resolve_admin_session(state: &AppState, req: &Request) -> Result<SessionClaims, Denial> {
    let token = bearer_token(req)
        .or_else(|| session_cookie(req))
        .ok_or(Denial::Unauthorized)?;

    let claims = decode_session(&token, &state.config.session_secret)
        .map_err(|_| Denial::Unauthorized)?;

    if !claims.principal.has_admin_access() {
        warn!("⛔ Non-admin session attempted admin access");
        return Err(Denial::Unauthorized);
    }

    if !claims.principal.is_active() {
        return Err(Denial::Deactivated);
    }

    Ok(claims)
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

fn session_cookie(req: &Request) -> Option<String> {
    req.headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| cookie_value(h, "session_token"))
        .map(|s| s.to_string())
}

/// API paths answer with JSON status codes; UI paths bounce to the admin
/// login page with an error query parameter. Gate failures never propagate
/// as raw errors.
fn deny(is_api: bool, denial: Denial) -> Response {
    match denial {
        Denial::Unauthorized => {
            if is_api {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "Admin session required"})),
                )
                    .into_response()
            } else {
                Redirect::to("/admin/login?error=unauthorized").into_response()
            }
        }
        Denial::Deactivated => {
            if is_api {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": "Account is deactivated"})),
                )
                    .into_response()
            } else {
                Redirect::to("/admin/login?error=account_deactivated").into_response()
            }
        }
        Denial::Server(msg) => {
            error!("Gate failure: {}", msg);
            if is_api {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal Server Error", "details": msg})),
                )
                    .into_response()
            } else {
                Redirect::to("/admin/login?error=server_error").into_response()
            }
        }
    }
}

async fn maintenance_page(state: &AppState) -> Response {
    let page_path = state.config.public_root.join("maintenance.html");
    let body = match tokio::fs::read_to_string(&page_path).await {
        Ok(body) => body,
        Err(_) => FALLBACK_MAINTENANCE_PAGE.to_string(),
    };

    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/html"))],
        body,
    )
        .into_response()
}
