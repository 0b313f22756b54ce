//! Account registration, login and identity echo.

use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::extract::CurrentUser;
use super::AppState;
use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::repo::docs::DocError;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/user", get(user))
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

fn session_body(state: &AppState, id: &str, name: &str, email: &str) -> Value {
    json!({
        "token": state.tokens.issue(id, name),
        "expiresIn": state.tokens.ttl_secs(),
        "name": name,
        "id": id,
        "email": email,
    })
}

async fn register(
    Extension(state): Extension<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<Value>, ApiError> {
    if body.name.is_empty() || body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "name, email and password are required".into(),
        ));
    }

    let digest = hash_password(&body.password).map_err(ApiError::Internal)?;

    let id = state
        .docs
        .create_user(&body.name, &body.email, &digest)
        .await
        .map_err(|err| match err {
            DocError::Duplicate => ApiError::Conflict("Email address already exists."),
            other => other.into(),
        })?;

    Ok(Json(session_body(&state, &id, &body.name, &body.email)))
}

async fn login(
    Extension(state): Extension<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError> {
    // Same rejection whether the account is unknown or the password is
    // wrong.
    let user = state
        .docs
        .user_by_email(&body.email)
        .await?
        .ok_or(ApiError::Unauthorized("Invalid login."))?;

    if !verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid login."));
    }

    Ok(Json(session_body(&state, &user.id, &user.name, &user.email)))
}

#[allow(clippy::unused_async)] // Required for Axum handler signature
async fn user(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({
        "name": user.name,
        "email": user.email,
        "id": user.id,
    }))
}
