//! Follow routes. Every route is auth-gated through [`CurrentUser`]; each
//! entity kind gets its own create/get/find/delete set backed by the four
//! generic handlers below.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::extract::CurrentUser;
use super::AppState;
use crate::error::ApiError;
use crate::repo::docs::{DocError, FollowKind};

pub fn router() -> Router {
    Router::new()
        .route("/createLegislator", post(create_legislator))
        .route("/createBill", post(create_bill))
        .route("/createNomination", post(create_nomination))
        .route("/createCommittee", post(create_committee))
        .route("/getLegislators", get(get_legislators))
        .route("/getBills", get(get_bills))
        .route("/getNominations", get(get_nominations))
        .route("/getCommittees", get(get_committees))
        .route("/findLegislator/{id}", get(find_legislator))
        .route("/findBill/{id}", get(find_bill))
        .route("/findNomination/{id}", get(find_nomination))
        .route("/findCommittee/{id}", get(find_committee))
        .route("/deleteLegislator/{id}", delete(delete_legislator))
        .route("/deleteBill/{id}", delete(delete_bill))
        .route("/deleteNomination/{id}", delete(delete_nomination))
        .route("/deleteCommittee/{id}", delete(delete_committee))
}

#[derive(Debug, Deserialize)]
struct CreateBody {
    #[serde(rename = "followingID")]
    following_id: String,
}

async fn create(
    kind: FollowKind,
    state: AppState,
    user: CurrentUser,
    body: CreateBody,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.following_id.is_empty() {
        return Err(ApiError::Validation("followingID is required".into()));
    }

    state
        .docs
        .create_follow(kind, &user.0.id, &body.following_id)
        .await
        .map_err(|err| match err {
            DocError::Duplicate => ApiError::Conflict("Already created."),
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "userID": user.0.id, "followingID": body.following_id },
        })),
    ))
}

async fn list(
    kind: FollowKind,
    state: AppState,
    user: CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let ids = state.docs.follows_for_user(kind, &user.0.id).await?;
    let following: Vec<Value> = ids
        .into_iter()
        .map(|id| json!({ "followingID": id }))
        .collect();
    Ok(Json(json!({ "status": "success", "following": following })))
}

async fn find(
    kind: FollowKind,
    state: AppState,
    user: CurrentUser,
    id: String,
) -> Result<Json<Value>, ApiError> {
    let exists = state.docs.follow_exists(kind, &user.0.id, &id).await?;
    let status = if exists { "found" } else { "not found" };
    Ok(Json(json!({ "status": status })))
}

async fn remove(
    kind: FollowKind,
    state: AppState,
    user: CurrentUser,
    id: String,
) -> Result<Json<Value>, ApiError> {
    // Deleting an absent follow is a no-op, not an error.
    state.docs.delete_follow(kind, &user.0.id, &id).await?;
    Ok(Json(json!({ "status": "success" })))
}

macro_rules! follow_routes {
    ($kind:expr, $create:ident, $list:ident, $find:ident, $remove:ident) => {
        async fn $create(
            Extension(state): Extension<AppState>,
            user: CurrentUser,
            Json(body): Json<CreateBody>,
        ) -> Result<(StatusCode, Json<Value>), ApiError> {
            create($kind, state, user, body).await
        }

        async fn $list(
            Extension(state): Extension<AppState>,
            user: CurrentUser,
        ) -> Result<Json<Value>, ApiError> {
            list($kind, state, user).await
        }

        async fn $find(
            Extension(state): Extension<AppState>,
            user: CurrentUser,
            Path(id): Path<String>,
        ) -> Result<Json<Value>, ApiError> {
            find($kind, state, user, id).await
        }

        async fn $remove(
            Extension(state): Extension<AppState>,
            user: CurrentUser,
            Path(id): Path<String>,
        ) -> Result<Json<Value>, ApiError> {
            remove($kind, state, user, id).await
        }
    };
}

follow_routes!(
    FollowKind::Legislator,
    create_legislator,
    get_legislators,
    find_legislator,
    delete_legislator
);
follow_routes!(
    FollowKind::Bill,
    create_bill,
    get_bills,
    find_bill,
    delete_bill
);
follow_routes!(
    FollowKind::Nomination,
    create_nomination,
    get_nominations,
    find_nomination,
    delete_nomination
);
follow_routes!(
    FollowKind::Committee,
    create_committee,
    get_committees,
    find_committee,
    delete_committee
);
