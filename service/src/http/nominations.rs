//! Nomination routes.

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;
use crate::repo::nominations;
use crate::store::attr::s_or_empty;
use crate::store::page::cursor_key;
use crate::store::Item;

pub fn router() -> Router {
    Router::new()
        .route("/all", get(all_nominations))
        .route(
            "/all/nominationID/{nominationID}/latestActionDate/{latestActionDate}",
            get(all_nominations_after),
        )
        .route("/nomination/nominationID/{nominationID}", get(detail))
        .route(
            "/nomination/nominationID/{nominationID}/actions",
            get(actions),
        )
}

fn render_cursor(last_key: Option<&Item>) -> Option<Value> {
    let key = last_key?;
    Some(json!({
        "nominationID": s_or_empty(key, "nomination_id"),
        "latestActionDate": s_or_empty(key, "latest_action_date"),
    }))
}

async fn all_nominations(
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, ApiError> {
    let (nominations, last_key) =
        nominations::nominations_page(state.items.as_ref(), None).await?;

    let mut body = json!({ "status": "success", "nominations": nominations });
    if let Some(cursor) = render_cursor(last_key.as_ref()) {
        body["lastEvaluatedKey"] = cursor;
    }
    Ok(Json(body))
}

async fn all_nominations_after(
    Extension(state): Extension<AppState>,
    Path((nomination_id, latest_action_date)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let cursor = cursor_key(&[
        ("nomination_id", &nomination_id),
        ("blank", " "),
        ("latest_action_date", &latest_action_date),
    ]);
    let (nominations, last_key) =
        nominations::nominations_page(state.items.as_ref(), Some(cursor)).await?;

    let mut body = json!({ "status": "success", "nominations": nominations });
    if let Some(cursor) = render_cursor(last_key.as_ref()) {
        body["lastEvaluatedKey"] = cursor;
    }
    Ok(Json(body))
}

async fn detail(
    Extension(state): Extension<AppState>,
    Path(nomination_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let nomination =
        nominations::nomination_by_id(state.items.as_ref(), &nomination_id).await?;
    Ok(Json(json!({ "status": "success", "nomination": nomination })))
}

async fn actions(
    Extension(state): Extension<AppState>,
    Path(nomination_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (actions, description) =
        nominations::nomination_actions(state.items.as_ref(), &nomination_id).await?;
    Ok(Json(json!({
        "status": "success",
        "actions": actions,
        "nominationID": nomination_id,
        "description": description,
    })))
}
