//! Committee lookups.

use serde::Serialize;

use super::require_one;
use crate::error::ApiError;
use crate::store::attr::{req_s, s_or_empty, string_set};
use crate::store::fanout::resolve_all;
use crate::store::{Item, ItemQuery, ItemStore};

const TABLE: &str = "Committee";

/// Committee id/name pair, the shape every cross-entity committee list
/// uses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommitteeRef {
    #[serde(rename = "committeeID")]
    pub committee_id: String,
    #[serde(rename = "committeeName")]
    pub committee_name: String,
}

/// Full committee record as returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct CommitteeDetail {
    pub name: String,
    pub subcommittee: String,
    #[serde(rename = "currentMembers")]
    pub current_members: Vec<String>,
    pub url: String,
    pub subcommittees: Vec<String>,
}

/// Uppercase the first character; stored committee names are lowercased.
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

async fn fetch(
    store: &dyn ItemStore,
    committee_id: &str,
    projection: &'static str,
) -> Result<Item, ApiError> {
    let query = ItemQuery::table(TABLE, "committee_id", committee_id, projection);
    require_one(store.query(query).await?.items, "Committee")
}

/// Resolve each committee id to its id/name pair, in input order.
pub async fn refs_for_ids(
    store: &dyn ItemStore,
    ids: Vec<String>,
) -> Result<Vec<CommitteeRef>, ApiError> {
    let resolved = resolve_all(ids, |id| async move {
        let query = ItemQuery::table(TABLE, "committee_id", id, "name, committee_id");
        Ok(store.query(query).await?.items)
    })
    .await;

    let mut refs = Vec::new();
    for items in resolved.into_result()? {
        for item in items {
            refs.push(CommitteeRef {
                committee_id: req_s(&item, "committee_id")?.to_string(),
                committee_name: req_s(&item, "name")?.to_string(),
            });
        }
    }
    Ok(refs)
}

pub async fn committee_detail(
    store: &dyn ItemStore,
    committee_id: &str,
) -> Result<CommitteeDetail, ApiError> {
    let item = fetch(
        store,
        committee_id,
        "subcommittee, currentMembers, url, name, subcommittees",
    )
    .await?;

    Ok(CommitteeDetail {
        name: capitalize(req_s(&item, "name")?),
        subcommittee: req_s(&item, "subcommittee")?.to_string(),
        current_members: string_set(&item, "currentMembers"),
        url: s_or_empty(&item, "url"),
        subcommittees: string_set(&item, "subcommittees"),
    })
}

/// Member bioguide ids plus the capitalized committee name.
pub async fn member_ids(
    store: &dyn ItemStore,
    committee_id: &str,
) -> Result<(Vec<String>, String), ApiError> {
    let item = fetch(store, committee_id, "currentMembers, name").await?;
    let name = capitalize(req_s(&item, "name")?);
    Ok((string_set(&item, "currentMembers"), name))
}

/// Subcommittees resolved to id/name pairs, plus the parent's raw name.
pub async fn subcommittees(
    store: &dyn ItemStore,
    committee_id: &str,
) -> Result<(Vec<CommitteeRef>, String), ApiError> {
    let item = fetch(store, committee_id, "subcommittees, name").await?;
    let name = req_s(&item, "name")?.to_string();
    let refs = refs_for_ids(store, string_set(&item, "subcommittees")).await?;
    Ok((refs, name))
}

/// All top-level committees (subcommittees filtered out), capitalized and
/// sorted by name.
pub async fn all_committees(store: &dyn ItemStore) -> Result<Vec<CommitteeRef>, ApiError> {
    let items = store
        .scan(TABLE, "name, committee_id, subcommittee", Some(200))
        .await?;

    let mut committees = Vec::new();
    for item in items {
        if req_s(&item, "subcommittee")? != "no" {
            continue;
        }
        committees.push(CommitteeRef {
            committee_id: req_s(&item, "committee_id")?.to_string(),
            committee_name: capitalize(req_s(&item, "name")?),
        });
    }
    committees.sort_by(|a, b| a.committee_name.cmp(&b.committee_name));
    Ok(committees)
}
