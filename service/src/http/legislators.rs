//! Legislator routes: roster, detail, terms, committee memberships and the
//! geographic district lookups.

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;
use crate::repo::legislators;

pub fn router() -> Router {
    Router::new()
        .route("/locDists/{lnglat}", get(districts_for_point))
        .route("/allLegislators", get(all_legislators))
        .route("/legislator/{legislatorID}", get(detail))
        .route("/legislator/summary/{legislatorID}", get(summary))
        .route("/legislator/terms/{legislatorID}", get(terms))
        .route("/legislator/{legislatorID}/committees", get(memberships))
        .route("/coordinates/{district}", get(coordinates))
}

fn parse_lnglat(raw: &str) -> Result<(f64, f64), ApiError> {
    let invalid = || {
        ApiError::Validation(format!(
            "expected coordinates as 'lng,lat', got '{raw}'"
        ))
    };
    let (lng, lat) = raw.split_once(',').ok_or_else(invalid)?;
    Ok((
        lng.trim().parse().map_err(|_| invalid())?,
        lat.trim().parse().map_err(|_| invalid())?,
    ))
}

/// Representatives for whichever districts contain the given point.
async fn districts_for_point(
    Extension(state): Extension<AppState>,
    Path(lnglat): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (lng, lat) = parse_lnglat(&lnglat)?;
    let districts = state.docs.districts_containing(lng, lat).await?;
    let reps = legislators::reps_for_districts(state.items.as_ref(), districts).await?;
    Ok(Json(json!({ "status": "success", "reps": reps })))
}

async fn all_legislators(
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, ApiError> {
    let roster = legislators::all_legislators(state.items.as_ref()).await?;
    Ok(Json(json!({ "status": "success", "legislators": roster })))
}

async fn detail(
    Extension(state): Extension<AppState>,
    Path(legislator_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let detail = legislators::legislator_detail(state.items.as_ref(), &legislator_id).await?;
    Ok(Json(json!({ "status": "success", "data": detail })))
}

async fn summary(
    Extension(state): Extension<AppState>,
    Path(legislator_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let summary = legislators::legislator_summary(state.items.as_ref(), &legislator_id).await?;
    Ok(Json(json!({ "status": "success", "data": summary })))
}

async fn terms(
    Extension(state): Extension<AppState>,
    Path(legislator_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (terms, name) = legislators::terms(state.items.as_ref(), &legislator_id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "terms": terms, "name": name },
    })))
}

async fn memberships(
    Extension(state): Extension<AppState>,
    Path(legislator_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (committees, name) =
        legislators::memberships(state.items.as_ref(), &legislator_id).await?;
    Ok(Json(json!({
        "status": "success",
        "committees": committees,
        "name": name,
    })))
}

/// Stored GeoJSON for one district, passed through untouched.
async fn coordinates(
    Extension(state): Extension<AppState>,
    Path(district): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let shape = state
        .docs
        .district_shape(&district)
        .await?
        .ok_or(ApiError::NotFound("District"))?;
    Ok(Json(json!({ "status": "success", "data": shape })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lnglat_parses_with_optional_spaces() {
        assert_eq!(
            parse_lnglat("-87.6,41.8").ok(),
            Some((-87.6, 41.8))
        );
        assert_eq!(
            parse_lnglat("-87.6, 41.8").ok(),
            Some((-87.6, 41.8))
        );
    }

    #[test]
    fn malformed_lnglat_is_rejected() {
        assert!(matches!(parse_lnglat("chicago"), Err(ApiError::Validation(_))));
        assert!(matches!(parse_lnglat("-87.6"), Err(ApiError::Validation(_))));
        assert!(matches!(parse_lnglat("-87.6,north"), Err(ApiError::Validation(_))));
    }
}
