use axum::extract::State;
use axum::Json;
use lexpanel_client::form::{FormDraft, LoginForm};
use lexpanel_client::models::{LoginRequest, Role, SessionUser};
use serde::Serialize;
use tower_sessions::Session;

use crate::error::ApiError;
use crate::state::AppState;

pub(crate) const SESSION_KEY_TOKEN: &str = "token";
pub(crate) const SESSION_KEY_USER: &str = "user";

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub user: SessionUser,
    /// Where the console should go next.
    pub redirect: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LogoutOutcome {
    pub redirect: &'static str,
}

/// Roles that pass when the console is restricted to staff.
pub fn is_console_role(role: Role) -> bool {
    matches!(role, Role::Admin | Role::AiReporter)
}

/// The session's bearer token and account, if signed in.
pub(crate) async fn session_identity(
    session: &Session,
) -> Result<Option<(String, SessionUser)>, ApiError> {
    let token: Option<String> = session.get(SESSION_KEY_TOKEN).await?;
    let user: Option<SessionUser> = session.get(SESSION_KEY_USER).await?;
    Ok(token.zip(user))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<LoginOutcome>, ApiError> {
    form.validate()?;

    let request = LoginRequest::from(form);
    let response = state.client.login(&request).await?;

    if state.config.enforce_admin_role && !is_console_role(response.user.role) {
        tracing::warn!(email = %response.user.email, role = %response.user.role, "login refused for role");
        return Err(ApiError::Forbidden);
    }

    session.cycle_id().await?;
    session.insert(SESSION_KEY_TOKEN, &response.token).await?;
    session.insert(SESSION_KEY_USER, &response.user).await?;

    tracing::info!(email = %response.user.email, role = %response.user.role, "login successful");

    Ok(Json(LoginOutcome {
        redirect: response.user.role.landing_route(),
        user: response.user,
    }))
}

pub async fn logout(session: Session) -> Result<Json<LogoutOutcome>, ApiError> {
    session.flush().await?;
    Ok(Json(LogoutOutcome { redirect: "/login" }))
}

pub async fn status(session: Session) -> Json<AuthStatus> {
    let user = session_identity(&session)
        .await
        .ok()
        .flatten()
        .map(|(_, user)| user);

    Json(AuthStatus {
        authenticated: user.is_some(),
        user,
    })
}
