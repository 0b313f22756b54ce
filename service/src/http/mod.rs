//! HTTP surface: router assembly and per-entity handler groups.
//!
//! Handlers stay thin: parse path/query input, call into [`crate::repo`],
//! and shape the `{status:'success', ...}` envelope. Every fallible path
//! returns [`crate::error::ApiError`] so the error rendering lives in one
//! place.

pub mod auth;
pub mod bills;
pub mod committees;
pub mod extract;
pub mod following;
pub mod legislators;
pub mod nominations;
pub mod security;
pub mod votes;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};

use crate::auth::AuthTokens;
use crate::repo::docs::DocStore;
use crate::store::ItemStore;

/// Shared handler state, injected as an `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<dyn ItemStore>,
    pub docs: Arc<dyn DocStore>,
    pub tokens: Arc<AuthTokens>,
}

// Health check handler
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Build the full API router with `state` attached.
#[must_use]
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/auth", auth::router())
        .nest("/api/v1/legislators", legislators::router())
        .nest("/api/v1/bills", bills::router())
        .nest("/api/v1/votes", votes::router())
        .nest("/api/v1/committees", committees::router())
        .nest("/api/v1/nominations", nominations::router())
        .nest("/api/v1/following", following::router())
        .route("/health", get(health_check))
        .layer(Extension(state))
}
