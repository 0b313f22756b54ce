//! Roll-call vote lookups.
//!
//! Party tallies are stored as `Yea@Nay@NotVoting@Present` strings; each
//! individual vote is `bioguide@name@party@state@vote[@district]`. List
//! queries page through secondary indexes newest-first; the `blank`
//! sentinel partition (`" "`) backs the global listing.

use serde::Serialize;

use super::require_one;
use crate::error::ApiError;
use crate::refdata::vote_text;
use crate::store::attr::{opt_s, req_s, s_or_empty, string_set, Composite};
use crate::store::page::query_page;
use crate::store::{Item, ItemQuery, ItemStore};

const TABLE: &str = "Vote";

/// Per-party Yea/Nay/Not-Voting/Present counts, kept as strings the way
/// the store holds them.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PartyTally {
    pub yea: String,
    pub nay: String,
    pub not_voting: String,
    pub present: String,
}

impl PartyTally {
    fn split(text: &str) -> Self {
        let record = Composite::split(text);
        Self {
            yea: record.field(0).to_string(),
            nay: record.field(1).to_string(),
            not_voting: record.field(2).to_string(),
            present: record.field(3).to_string(),
        }
    }
}

/// One legislator's position on a roll call.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct IndividualVote {
    #[serde(rename = "bioguideID")]
    pub bioguide_id: String,
    #[serde(rename = "legislatorName")]
    pub legislator_name: String,
    pub party: String,
    pub state: String,
    pub vote: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

/// A full roll call with tallies and individual positions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub bill_title: String,
    pub chamber: String,
    pub question: String,
    pub result: String,
    #[serde(rename = "rollID")]
    pub roll_id: String,
    pub voted_at: String,
    pub democratic_votes: PartyTally,
    pub republican_votes: PartyTally,
    pub independent_votes: PartyTally,
    pub individual_votes: Vec<IndividualVote>,
}

/// Roll-call header for the global listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub bill_title: String,
    pub chamber: String,
    #[serde(rename = "rollID")]
    pub roll_id: String,
    pub question: String,
    pub result: String,
}

/// A roll call annotated with one legislator's position.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegislatorVote {
    pub chamber: String,
    #[serde(rename = "rollID")]
    pub roll_id: String,
    pub bill_title: String,
    pub question: String,
    pub result: String,
    pub vote: String,
}

/// Raw vote detail: tallies and individual entries in stored form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDetail {
    #[serde(rename = "billID")]
    pub bill_id: String,
    #[serde(rename = "nominationID")]
    pub nomination_id: String,
    pub individual_votes: Vec<String>,
    pub democratic_votes: String,
    pub republican_votes: String,
    pub independent_votes: String,
}

fn decode_individual(entry: &str) -> IndividualVote {
    let record = Composite::split(entry);
    IndividualVote {
        bioguide_id: record.field(0).to_string(),
        legislator_name: record.field(1).to_string(),
        party: record.field(2).to_string(),
        state: record.field(3).to_string(),
        vote: vote_text(record.field(4)).to_string(),
        district: (record.len() >= 6).then(|| record.field(5).to_string()),
    }
}

fn decode_record(item: &Item) -> Result<VoteRecord, ApiError> {
    Ok(VoteRecord {
        bill_title: req_s(item, "bill_title")?.to_string(),
        chamber: req_s(item, "chamber")?.to_string(),
        question: req_s(item, "question")?.to_string(),
        result: req_s(item, "result")?.to_string(),
        roll_id: req_s(item, "roll_id")?.to_string(),
        voted_at: req_s(item, "voted_at")?.to_string(),
        democratic_votes: PartyTally::split(req_s(item, "democraticVotes")?),
        republican_votes: PartyTally::split(req_s(item, "republicanVotes")?),
        independent_votes: PartyTally::split(req_s(item, "independentVotes")?),
        individual_votes: string_set(item, "individualVotes")
            .iter()
            .map(|entry| decode_individual(entry))
            .collect(),
    })
}

fn decode_summary(item: &Item) -> Result<VoteSummary, ApiError> {
    Ok(VoteSummary {
        bill_title: req_s(item, "bill_title")?.to_string(),
        chamber: req_s(item, "chamber")?.to_string(),
        roll_id: req_s(item, "roll_id")?.to_string(),
        question: req_s(item, "question")?.to_string(),
        result: req_s(item, "result")?.to_string(),
    })
}

/// A legislator's chamber, lowercased for index partition values.
pub async fn legislator_chamber(
    store: &dyn ItemStore,
    legislator_id: &str,
) -> Result<String, ApiError> {
    let query = ItemQuery::table("Legislator", "bioguide_id", legislator_id, "chamber");
    let item = require_one(store.query(query).await?.items, "Legislator")?;
    Ok(req_s(&item, "chamber")?.to_lowercase())
}

/// A legislator's display name.
pub async fn legislator_name(
    store: &dyn ItemStore,
    legislator_id: &str,
) -> Result<String, ApiError> {
    let query = ItemQuery::table(
        "Legislator",
        "bioguide_id",
        legislator_id,
        "last_name, first_name",
    );
    let item = require_one(store.query(query).await?.items, "Legislator")?;
    Ok(format!(
        "{} {}",
        req_s(&item, "first_name")?,
        req_s(&item, "last_name")?
    ))
}

/// One page of the legislator's chamber votes, each annotated with their
/// own position (empty when they did not vote).
pub async fn legislator_votes(
    store: &dyn ItemStore,
    legislator_id: &str,
    chamber: &str,
    cursor: Option<Item>,
) -> Result<(Vec<LegislatorVote>, Option<Item>), ApiError> {
    let query = ItemQuery::index(
        TABLE,
        "chamber-voted_at-index",
        "chamber",
        chamber.to_string(),
        "chamber, roll_id, bill_title, individualVotes, question, result",
    );
    let page = query_page(store, query, cursor).await?;

    let mut votes = Vec::with_capacity(page.items.len());
    for item in &page.items {
        let position = string_set(item, "individualVotes")
            .iter()
            .find_map(|entry| {
                let record = Composite::split(entry);
                (record.field(0) == legislator_id)
                    .then(|| vote_text(record.field(4)).to_string())
            })
            .unwrap_or_default();

        votes.push(LegislatorVote {
            chamber: req_s(item, "chamber")?.to_string(),
            roll_id: req_s(item, "roll_id")?.to_string(),
            bill_title: req_s(item, "bill_title")?.to_string(),
            question: req_s(item, "question")?.to_string(),
            result: req_s(item, "result")?.to_string(),
            vote: position,
        });
    }
    Ok((votes, page.last_key))
}

/// One page of roll calls on a bill, full records.
pub async fn votes_for_bill(
    store: &dyn ItemStore,
    bill_id: &str,
    cursor: Option<Item>,
) -> Result<(Vec<VoteRecord>, Option<Item>), ApiError> {
    let query = ItemQuery::index(
        TABLE,
        "bill_id-voted_at-index",
        "bill_id",
        bill_id,
        "bill_title, chamber, democraticVotes, independentVotes, republicanVotes, \
         individualVotes, question, result, voted_at, roll_id",
    );
    let page = query_page(store, query, cursor).await?;
    let votes = page.items.iter().map(decode_record).collect::<Result<_, _>>()?;
    Ok((votes, page.last_key))
}

/// All roll calls on a nomination, newest first (unpaged; nominations see
/// at most a handful of votes).
pub async fn votes_for_nomination(
    store: &dyn ItemStore,
    nomination_id: &str,
) -> Result<Vec<VoteRecord>, ApiError> {
    let mut query = ItemQuery::index(
        TABLE,
        "nomination_id-voted_at-index",
        "nomination_id",
        nomination_id,
        "bill_title, chamber, roll_id, democraticVotes, independentVotes, republicanVotes, \
         individualVotes, question, result, voted_at",
    );
    query.forward = false;
    let output = store.query(query).await?;
    output.items.iter().map(decode_record).collect()
}

/// One page of the global vote listing via the sentinel partition.
pub async fn votes_all(
    store: &dyn ItemStore,
    cursor: Option<Item>,
) -> Result<(Vec<VoteSummary>, Option<Item>), ApiError> {
    let query = ItemQuery::index(
        TABLE,
        "blank-voted_at-index",
        "blank",
        " ",
        "bill_title, chamber, question, result, roll_id",
    );
    let page = query_page(store, query, cursor).await?;
    if page.items.is_empty() {
        return Err(ApiError::NotFound("Votes"));
    }
    let votes = page.items.iter().map(decode_summary).collect::<Result<_, _>>()?;
    Ok((votes, page.last_key))
}

/// Raw detail for one roll call.
pub async fn vote_detail(store: &dyn ItemStore, roll_id: &str) -> Result<VoteDetail, ApiError> {
    let query = ItemQuery::table(
        TABLE,
        "roll_id",
        roll_id,
        "democraticVotes, independentVotes, republicanVotes, individualVotes, question, \
         bill_id, nomination_id",
    );
    let item = require_one(store.query(query).await?.items, "Vote")?;

    Ok(VoteDetail {
        bill_id: opt_s(&item, "bill_id").unwrap_or_default().to_string(),
        nomination_id: s_or_empty(&item, "nomination_id"),
        individual_votes: string_set(&item, "individualVotes"),
        democratic_votes: req_s(&item, "democraticVotes")?.to_string(),
        republican_votes: req_s(&item, "republicanVotes")?.to_string(),
        independent_votes: req_s(&item, "independentVotes")?.to_string(),
    })
}
