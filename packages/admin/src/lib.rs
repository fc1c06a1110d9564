//! Lexpanel admin gateway.
//!
//! Serves the console SPA behind a session gate and exposes the console's
//! screens as JSON endpoints backed by [`lexpanel_client`]. The session
//! store is the only place a backend token is kept; every API request gets
//! a client carrying the token of its own session.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::error::ApiError;
use crate::state::AppState;

async fn api_not_found() -> ApiError {
    ApiError::UnknownResource("no such endpoint".to_string())
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/users", get(handlers::list_users))
        .route("/users/{id}/toggle-active", post(handlers::toggle_active))
        .route("/users/{id}/toggle-verified", post(handlers::toggle_verified))
        .route("/lawyers/pending", get(handlers::list_pending_lawyers))
        .route("/lawyers/bulk-verify", post(handlers::bulk_verify_lawyers))
        .route("/lawyers/{id}/verify", post(handlers::verify_lawyer))
        .route("/lawyers/{id}/reject", post(handlers::reject_lawyer))
        .route("/transactions", get(handlers::list_transactions))
        .route("/content", get(handlers::list_content))
        .route("/content/{id}/status", post(handlers::set_content_status))
        .route(
            "/policies",
            get(handlers::list_policies).post(handlers::create_policy),
        )
        .route(
            "/policies/{id}",
            get(handlers::get_policy)
                .put(handlers::update_policy)
                .delete(handlers::delete_policy),
        )
        .route("/articles", get(handlers::list_articles))
        .route("/articles/generate", post(handlers::generate_articles))
        .route(
            "/articles/{id}",
            get(handlers::get_article).delete(handlers::delete_article),
        )
        .route("/articles/{id}/publish", post(handlers::publish_article))
        .route("/articles/{id}/archive", post(handlers::archive_article))
        .route(
            "/ai-reporter/settings",
            get(handlers::get_settings).put(handlers::save_settings),
        )
        .route("/export/{resource}", get(handlers::export))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .fallback(api_not_found)
}

/// The console SPA: static files with `index.html` for client-side routes.
fn spa(state: &AppState) -> Router {
    let dir = &state.config.static_dir;
    Router::new()
        .fallback_service(ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_gate,
        ))
}

/// Build the gateway router with its session layer.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            state.config.session_idle_hours,
        )))
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_secure(state.config.session_secure);

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/status", get(auth::status));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(auth_routes)
        .nest("/api", api_routes(&state))
        .fallback_service(spa(&state))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(session_layer)
}
