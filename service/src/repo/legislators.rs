//! Legislator lookups.
//!
//! District values use the `"@"` sentinel for at-large seats; the decode
//! functions translate that to the empty string or an omitted field,
//! depending on what each response shape calls for.

use serde::Serialize;

use super::committees::CommitteeRef;
use super::{committees, require_one};
use crate::error::ApiError;
use crate::refdata::{position, state_name};
use crate::store::attr::{format_long_date, req_s, s_or_empty, string_set, Composite, AT_LARGE};
use crate::store::fanout::resolve_all;
use crate::store::{Item, ItemQuery, ItemStore};

const TABLE: &str = "Legislator";

const ROSTER_PROJECTION: &str =
    "bioguide_id, last_name, first_name, party, state, district, chamber";

/// One roster row: the shape used by the full-roster listing and committee
/// membership lists. State is expanded to its full name; at-large seats
/// omit the district field entirely.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(rename = "bioguideID")]
    pub bioguide_id: String,
    pub chamber: String,
    pub first_name: String,
    pub last_name: String,
    pub party: String,
    pub position: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

/// Summary shape: raw state code, at-large district as `""`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegislatorSummary {
    #[serde(rename = "bioguideID")]
    pub bioguide_id: String,
    pub chamber: String,
    pub district: String,
    pub first_name: String,
    pub last_name: String,
    pub party: String,
    pub position: String,
    pub state: String,
}

/// One term of service, dates rendered long-form.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Term {
    pub start: String,
    pub end: String,
    pub position: String,
}

/// Full legislator record. Missing optionals render as empty strings so
/// the shape stays stable.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegislatorDetail {
    pub chamber: String,
    pub committees: Vec<String>,
    pub district: String,
    pub facebook_account: String,
    pub first_name: String,
    pub last_name: String,
    /// `"ST"` for at-large seats, `"ST-N"` otherwise.
    pub location: String,
    pub middle_name: String,
    pub next_election: String,
    pub office: String,
    pub party: String,
    pub phone: String,
    pub position: String,
    pub state: String,
    pub terms: Vec<Term>,
    pub twitter_account: String,
    pub url: String,
    pub youtube_account: String,
}

/// A representative matched by geographic district lookup.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DistrictRep {
    /// `"ST"` for at-large, `"ST-N"` otherwise.
    pub district: String,
    #[serde(rename = "bioguideID")]
    pub bioguide_id: String,
}

fn decode_roster(item: &Item) -> Result<RosterEntry, ApiError> {
    let chamber = req_s(item, "chamber")?;
    let state = req_s(item, "state")?;
    let district = req_s(item, "district")?;
    Ok(RosterEntry {
        bioguide_id: req_s(item, "bioguide_id")?.to_string(),
        chamber: chamber.to_string(),
        first_name: req_s(item, "first_name")?.to_string(),
        last_name: req_s(item, "last_name")?.to_string(),
        party: req_s(item, "party")?.to_string(),
        position: position(chamber).to_string(),
        state: state_name(state).to_string(),
        district: (district != AT_LARGE).then(|| district.to_string()),
    })
}

fn decode_terms(item: &Item) -> Vec<Term> {
    string_set(item, "terms")
        .iter()
        .map(|term| {
            let record = Composite::split(term);
            Term {
                start: format_long_date(record.field(0)),
                end: format_long_date(record.field(1)),
                position: record.field(2).to_string(),
            }
        })
        .collect()
}

async fn fetch(
    store: &dyn ItemStore,
    legislator_id: &str,
    projection: &'static str,
) -> Result<Item, ApiError> {
    let query = ItemQuery::table(TABLE, "bioguide_id", legislator_id, projection);
    require_one(store.query(query).await?.items, "Legislator")
}

/// The whole roster, sorted by state name then last name.
pub async fn all_legislators(store: &dyn ItemStore) -> Result<Vec<RosterEntry>, ApiError> {
    let items = store.scan(TABLE, ROSTER_PROJECTION, None).await?;
    let mut roster = items
        .iter()
        .map(decode_roster)
        .collect::<Result<Vec<_>, _>>()?;
    roster.sort_by(|a, b| {
        a.state
            .cmp(&b.state)
            .then_with(|| a.last_name.cmp(&b.last_name))
    });
    Ok(roster)
}

pub async fn legislator_detail(
    store: &dyn ItemStore,
    legislator_id: &str,
) -> Result<LegislatorDetail, ApiError> {
    let item = fetch(
        store,
        legislator_id,
        "first_name, middle_name, last_name, committees, district, party, state, terms, \
         next_election, twitter_account, youtube_account, facebook_account, url, office, \
         phone, chamber, fax",
    )
    .await?;

    let chamber = req_s(&item, "chamber")?;
    let state = req_s(&item, "state")?;
    let district = req_s(&item, "district")?;
    let location = if district == AT_LARGE {
        state.to_string()
    } else {
        format!("{state}-{district}")
    };

    Ok(LegislatorDetail {
        chamber: chamber.to_string(),
        committees: string_set(&item, "committees"),
        district: if district == AT_LARGE {
            String::new()
        } else {
            district.to_string()
        },
        facebook_account: s_or_empty(&item, "facebook_account"),
        first_name: req_s(&item, "first_name")?.to_string(),
        last_name: req_s(&item, "last_name")?.to_string(),
        location,
        middle_name: s_or_empty(&item, "middle_name"),
        next_election: s_or_empty(&item, "next_election"),
        office: s_or_empty(&item, "office"),
        party: req_s(&item, "party")?.to_string(),
        phone: s_or_empty(&item, "phone"),
        position: position(chamber).to_string(),
        state: state.to_string(),
        terms: decode_terms(&item),
        twitter_account: s_or_empty(&item, "twitter_account"),
        url: s_or_empty(&item, "url"),
        youtube_account: s_or_empty(&item, "youtube_account"),
    })
}

pub async fn legislator_summary(
    store: &dyn ItemStore,
    legislator_id: &str,
) -> Result<LegislatorSummary, ApiError> {
    let item = fetch(
        store,
        legislator_id,
        "bioguide_id, last_name, first_name, party, state, district, chamber",
    )
    .await?;

    let chamber = req_s(&item, "chamber")?;
    let district = req_s(&item, "district")?;
    Ok(LegislatorSummary {
        bioguide_id: req_s(&item, "bioguide_id")?.to_string(),
        chamber: chamber.to_string(),
        district: if district == AT_LARGE {
            String::new()
        } else {
            district.to_string()
        },
        first_name: req_s(&item, "first_name")?.to_string(),
        last_name: req_s(&item, "last_name")?.to_string(),
        party: req_s(&item, "party")?.to_string(),
        position: position(chamber).to_string(),
        state: req_s(&item, "state")?.to_string(),
    })
}

/// Terms plus the legislator's display name.
pub async fn terms(
    store: &dyn ItemStore,
    legislator_id: &str,
) -> Result<(Vec<Term>, String), ApiError> {
    let item = fetch(store, legislator_id, "terms, last_name, first_name").await?;
    let name = format!(
        "{} {}",
        req_s(&item, "first_name")?,
        req_s(&item, "last_name")?
    );
    Ok((decode_terms(&item), name))
}

/// Committee memberships resolved to id/name pairs, plus the legislator's
/// display name.
pub async fn memberships(
    store: &dyn ItemStore,
    legislator_id: &str,
) -> Result<(Vec<CommitteeRef>, String), ApiError> {
    let item = fetch(store, legislator_id, "committees, last_name, first_name").await?;
    let name = format!(
        "{} {}",
        req_s(&item, "first_name")?,
        req_s(&item, "last_name")?
    );
    let refs = committees::refs_for_ids(store, string_set(&item, "committees")).await?;
    Ok((refs, name))
}

/// Representatives for a list of district names (`"ST"` or `"ST-N"`), via
/// the state/district index, one fan-out query per district.
pub async fn reps_for_districts(
    store: &dyn ItemStore,
    districts: Vec<String>,
) -> Result<Vec<DistrictRep>, ApiError> {
    let resolved = resolve_all(districts, |name| async move {
        let (state, district) = match name.split_once('-') {
            Some((state, district)) => (state.to_string(), district.to_string()),
            None => (name.chars().take(2).collect(), AT_LARGE.to_string()),
        };
        let query = ItemQuery::index(
            TABLE,
            "state-district-index",
            "state",
            state,
            "bioguide_id, district, state",
        )
        .with_sort_key("district", district);
        Ok(store.query(query).await?.items)
    })
    .await;

    let mut reps = Vec::new();
    for items in resolved.into_result()? {
        for item in items {
            let state = req_s(&item, "state")?;
            let district = req_s(&item, "district")?;
            reps.push(DistrictRep {
                district: if district == AT_LARGE {
                    state.to_string()
                } else {
                    format!("{state}-{district}")
                },
                bioguide_id: req_s(&item, "bioguide_id")?.to_string(),
            });
        }
    }
    Ok(reps)
}

/// Roster entries for a list of bioguide ids, in input order (committee
/// membership listing).
pub async fn roster_for_ids(
    store: &dyn ItemStore,
    ids: Vec<String>,
) -> Result<Vec<RosterEntry>, ApiError> {
    let resolved = resolve_all(ids, |id| async move {
        let query = ItemQuery::table(TABLE, "bioguide_id", id, ROSTER_PROJECTION);
        Ok(store.query(query).await?.items)
    })
    .await;

    let mut roster = Vec::new();
    for items in resolved.into_result()? {
        for item in &items {
            roster.push(decode_roster(item)?);
        }
    }
    Ok(roster)
}
