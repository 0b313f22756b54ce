//! Roll-call vote routes.
//!
//! Paged listings return a `lastEvaluatedKey` object when more pages
//! remain; the client echoes its fields back as path segments on the
//! cursor variant of the route.

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Map, Value};

use super::AppState;
use crate::error::ApiError;
use crate::store::attr::s_or_empty;
use crate::store::page::cursor_key;
use crate::store::Item;
use crate::repo::votes;

pub fn router() -> Router {
    Router::new()
        .route("/legislator/{legislatorID}", get(legislator_votes))
        .route(
            "/legislator/{legislatorID}/rollID/{rollID}/votedAt/{votedAt}",
            get(legislator_votes_after),
        )
        .route("/billID/{billID}", get(bill_votes))
        .route(
            "/billID/{billID}/rollID/{rollID}/votedAt/{votedAt}",
            get(bill_votes_after),
        )
        .route(
            "/nomination/nominationID/{nominationID}",
            get(nomination_votes),
        )
        .route("/vote/rollID/{rollID}", get(detail))
        .route("/all", get(all_votes))
        .route("/all/rollID/{rollID}/votedAt/{votedAt}", get(all_votes_after))
}

/// Render a resume key as `{rollID, votedAt, ...extra}` when present.
fn render_cursor(last_key: Option<&Item>, extra: &[(&str, &str)]) -> Option<Value> {
    let key = last_key?;
    let mut out = Map::new();
    out.insert("rollID".into(), json!(s_or_empty(key, "roll_id")));
    out.insert("votedAt".into(), json!(s_or_empty(key, "voted_at")));
    for (name, field) in extra {
        out.insert((*name).to_string(), json!(s_or_empty(key, field)));
    }
    Some(Value::Object(out))
}

async fn legislator_votes(
    Extension(state): Extension<AppState>,
    Path(legislator_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = state.items.as_ref();
    let chamber = votes::legislator_chamber(store, &legislator_id).await?;
    let name = votes::legislator_name(store, &legislator_id).await?;
    let (votes, last_key) =
        votes::legislator_votes(store, &legislator_id, &chamber, None).await?;

    let mut body = json!({ "status": "success", "votes": votes, "name": name });
    if let Some(cursor) = render_cursor(last_key.as_ref(), &[]) {
        body["lastEvaluatedKey"] = cursor;
    }
    Ok(Json(body))
}

async fn legislator_votes_after(
    Extension(state): Extension<AppState>,
    Path((legislator_id, roll_id, voted_at)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let store = state.items.as_ref();
    let chamber = votes::legislator_chamber(store, &legislator_id).await?;
    let cursor = cursor_key(&[
        ("chamber", &chamber),
        ("roll_id", &roll_id),
        ("voted_at", &voted_at),
    ]);
    let (votes, last_key) =
        votes::legislator_votes(store, &legislator_id, &chamber, Some(cursor)).await?;

    let mut data = json!({ "votes": votes });
    if let Some(cursor) = render_cursor(last_key.as_ref(), &[]) {
        data["lastEvaluatedKey"] = cursor;
    }
    Ok(Json(json!({ "status": "success", "data": data })))
}

async fn bill_votes(
    Extension(state): Extension<AppState>,
    Path(bill_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (votes, last_key) =
        votes::votes_for_bill(state.items.as_ref(), &bill_id, None).await?;

    let mut body = json!({ "status": "success", "votes": votes });
    if let Some(cursor) = render_cursor(last_key.as_ref(), &[("billID", "bill_id")]) {
        body["lastEvaluatedKey"] = cursor;
    }
    Ok(Json(body))
}

async fn bill_votes_after(
    Extension(state): Extension<AppState>,
    Path((bill_id, roll_id, voted_at)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let cursor = cursor_key(&[
        ("bill_id", &bill_id),
        ("roll_id", &roll_id),
        ("voted_at", &voted_at),
    ]);
    let (votes, last_key) =
        votes::votes_for_bill(state.items.as_ref(), &bill_id, Some(cursor)).await?;

    let mut body = json!({ "status": "success", "votes": votes });
    if let Some(cursor) = render_cursor(last_key.as_ref(), &[("billID", "bill_id")]) {
        body["lastEvaluatedKey"] = cursor;
    }
    Ok(Json(body))
}

async fn nomination_votes(
    Extension(state): Extension<AppState>,
    Path(nomination_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let votes = votes::votes_for_nomination(state.items.as_ref(), &nomination_id).await?;
    Ok(Json(json!({ "status": "success", "votes": votes })))
}

async fn detail(
    Extension(state): Extension<AppState>,
    Path(roll_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let detail = votes::vote_detail(state.items.as_ref(), &roll_id).await?;
    Ok(Json(json!({ "status": "success", "voteDetail": detail })))
}

async fn all_votes(
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, ApiError> {
    let (votes, last_key) = votes::votes_all(state.items.as_ref(), None).await?;

    let mut body = json!({ "status": "success", "votes": votes });
    if let Some(cursor) = render_cursor(last_key.as_ref(), &[]) {
        body["lastEvaluatedKey"] = cursor;
    }
    Ok(Json(body))
}

async fn all_votes_after(
    Extension(state): Extension<AppState>,
    Path((roll_id, voted_at)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let cursor = cursor_key(&[
        ("roll_id", &roll_id),
        ("voted_at", &voted_at),
        ("blank", " "),
    ]);
    let (votes, last_key) = votes::votes_all(state.items.as_ref(), Some(cursor)).await?;

    let mut body = json!({ "status": "success", "votes": votes });
    if let Some(cursor) = render_cursor(last_key.as_ref(), &[]) {
        body["lastEvaluatedKey"] = cursor;
    }
    Ok(Json(body))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::mock::ItemBuilder;

    #[test]
    fn cursor_renders_camel_case_fields() {
        let key = ItemBuilder::new()
            .s("roll_id", "h2021-144")
            .s("voted_at", "2021-05-12")
            .s("bill_id", "HR1234")
            .build();

        let rendered = render_cursor(Some(&key), &[("billID", "bill_id")]).unwrap();
        assert_eq!(
            rendered,
            json!({
                "rollID": "h2021-144",
                "votedAt": "2021-05-12",
                "billID": "HR1234",
            })
        );
    }

    #[test]
    fn absent_cursor_renders_nothing() {
        assert!(render_cursor(None, &[]).is_none());
    }
}
