//! Session checks in front of console pages and API routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use lexpanel_client::models::Role;
use tower_sessions::Session;

use crate::auth::{is_console_role, session_identity};
use crate::error::ApiError;
use crate::state::AppState;

/// Pages reachable without a session.
const PUBLIC_PAGES: &[&str] = &["/login", "/signup"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Redirect(&'static str),
}

/// File types the SPA build puts next to `index.html`.
const ASSET_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "map", "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "woff",
    "woff2", "ttf", "webmanifest",
];

/// Static files are never gated.
pub fn is_asset(path: &str) -> bool {
    if path.starts_with("/assets/") || path == "/favicon.ico" {
        return true;
    }
    path.rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .is_some_and(|(stem, ext)| {
            !stem.is_empty() && ASSET_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
        })
}

fn is_api(path: &str) -> bool {
    ["/api", "/auth", "/health"]
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")))
}

/// Decide what happens to a page request.
///
/// `signed_in` is the role of the session's account, or `None` when the
/// session holds no token.
pub fn decide(path: &str, signed_in: Option<Role>, enforce_admin_role: bool) -> GateDecision {
    if is_api(path) || is_asset(path) || PUBLIC_PAGES.contains(&path) {
        return GateDecision::Pass;
    }

    match signed_in {
        None => GateDecision::Redirect("/login"),
        Some(role) if enforce_admin_role && !is_console_role(role) => {
            GateDecision::Redirect("/login")
        }
        Some(_) if path == "/" => GateDecision::Redirect("/dashboard"),
        Some(_) => GateDecision::Pass,
    }
}

/// Redirects page requests that need a session.
pub async fn auth_gate(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let role = match session_identity(&session).await {
        Ok(identity) => identity.map(|(_, user)| user.role),
        Err(e) => return e.into_response(),
    };

    let path = request.uri().path();
    match decide(path, role, state.config.enforce_admin_role) {
        GateDecision::Pass => next.run(request).await,
        GateDecision::Redirect(to) => {
            tracing::debug!(path, to, "redirecting page request");
            Redirect::to(to).into_response()
        }
    }
}

/// Rejects API requests without a session and hands handlers a client
/// carrying the session's token.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (token, user) = session_identity(&session)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if state.config.enforce_admin_role && !is_console_role(user.role) {
        return Err(ApiError::Forbidden);
    }

    request
        .extensions_mut()
        .insert(state.client.with_token(token));
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
