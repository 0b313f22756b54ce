//! Bill routes. Every response echoes the requested `billID` alongside the
//! decoded fields.

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;
use crate::repo::bills;

pub fn router() -> Router {
    Router::new()
        .route("/bill/billID/{billID}", get(detail))
        .route("/billSummary/billID/{billID}", get(summary))
        .route("/bill/billID/{billID}/actions", get(actions))
        .route("/bill/billID/{billID}/amendments", get(amendments))
        .route("/bill/billID/{billID}/committees", get(committees))
}

async fn detail(
    Extension(state): Extension<AppState>,
    Path(bill_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let detail = bills::bill_detail(state.items.as_ref(), &bill_id).await?;
    let mut body =
        serde_json::to_value(detail).map_err(|e| ApiError::Internal(e.to_string()))?;
    if let Value::Object(map) = &mut body {
        map.insert("status".into(), json!("success"));
        map.insert("billID".into(), json!(bill_id));
    }
    Ok(Json(body))
}

async fn summary(
    Extension(state): Extension<AppState>,
    Path(bill_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (title, summary) = bills::bill_summary(state.items.as_ref(), &bill_id).await?;
    Ok(Json(json!({
        "status": "success",
        "billID": bill_id,
        "billTitle": title,
        "summary": summary,
    })))
}

async fn actions(
    Extension(state): Extension<AppState>,
    Path(bill_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (actions, title) = bills::bill_actions(state.items.as_ref(), &bill_id).await?;
    Ok(Json(json!({
        "status": "success",
        "actions": actions,
        "billID": bill_id,
        "billTitle": title,
    })))
}

async fn amendments(
    Extension(state): Extension<AppState>,
    Path(bill_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (amendments, title) = bills::bill_amendments(state.items.as_ref(), &bill_id).await?;
    Ok(Json(json!({
        "status": "success",
        "amendments": amendments,
        "billID": bill_id,
        "billTitle": title,
    })))
}

async fn committees(
    Extension(state): Extension<AppState>,
    Path(bill_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (committees, title) = bills::bill_committees(state.items.as_ref(), &bill_id).await?;
    Ok(Json(json!({
        "status": "success",
        "committees": committees,
        "billTitle": title,
        "billID": bill_id,
    })))
}
