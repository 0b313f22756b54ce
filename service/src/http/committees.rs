//! Committee routes.

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;
use crate::repo::{committees, legislators};

pub fn router() -> Router {
    Router::new()
        .route("/committee/committeeID/{committeeID}", get(detail))
        .route("/committee/committeeID/{committeeID}/members", get(members))
        .route(
            "/committee/committeeID/{committeeID}/subcommittees",
            get(subcommittees),
        )
        .route("/allCommittees", get(all_committees))
}

async fn detail(
    Extension(state): Extension<AppState>,
    Path(committee_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let detail = committees::committee_detail(state.items.as_ref(), &committee_id).await?;
    Ok(Json(json!({
        "status": "success",
        "committeeID": committee_id,
        "name": detail.name,
        "subcommittee": detail.subcommittee,
        "currentMembers": detail.current_members,
        "url": detail.url,
        "subcommittees": detail.subcommittees,
    })))
}

/// Member ids resolved to full roster entries.
async fn members(
    Extension(state): Extension<AppState>,
    Path(committee_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = state.items.as_ref();
    let (ids, name) = committees::member_ids(store, &committee_id).await?;
    let roster = legislators::roster_for_ids(store, ids).await?;
    Ok(Json(json!({
        "status": "success",
        "name": name,
        "currentMembers": roster,
    })))
}

async fn subcommittees(
    Extension(state): Extension<AppState>,
    Path(committee_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (refs, name) =
        committees::subcommittees(state.items.as_ref(), &committee_id).await?;
    Ok(Json(json!({
        "status": "success",
        "committees": refs,
        "committeeName": name,
    })))
}

async fn all_committees(
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, ApiError> {
    let committees = committees::all_committees(state.items.as_ref()).await?;
    Ok(Json(json!({ "status": "success", "committees": committees })))
}
