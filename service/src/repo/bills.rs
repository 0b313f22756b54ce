//! Bill lookups.
//!
//! Bill summaries are single gzip blobs; actions and amendments are binary
//! sets whose entries decompress to `@`-delimited composite records:
//!
//! ```text
//! action:    id@chamber@date@text
//! amendment: number@introduced@title@url@last_action_date@last_action@sponsor
//! ```
//!
//! Both lists sort strictly descending by their integer sequence field.

use serde::Serialize;

use super::committees::{self, CommitteeRef};
use super::require_one;
use crate::error::ApiError;
use crate::store::attr::{format_long_date, gzip_s, gzip_set, req_s, s_or_empty, string_set, Composite};
use crate::store::{Item, ItemQuery, ItemStore};

const TABLE: &str = "Bill";

/// One recorded action on a bill.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BillAction {
    pub id: i64,
    pub chamber: String,
    pub date: String,
    #[serde(rename = "actionText")]
    pub action_text: String,
}

/// One amendment to a bill.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillAmendment {
    pub number: i64,
    #[serde(rename = "congressdotgovURL")]
    pub congressdotgov_url: String,
    pub introduced_date: String,
    pub last_major_action_date: String,
    pub last_major_action: String,
    pub sponsor: String,
    pub title: String,
}

/// Full bill record as returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct BillDetail {
    pub actions: Vec<BillAction>,
    pub amendments: Vec<BillAmendment>,
    #[serde(rename = "billTitle")]
    pub bill_title: String,
    pub committees: Vec<String>,
    pub congress: String,
    pub introduced: String,
    #[serde(rename = "latestMajorActionDate")]
    pub latest_major_action_date: String,
    pub summary: String,
    #[serde(rename = "textURL")]
    pub text_url: String,
}

fn decode_actions(item: &Item) -> Result<Vec<BillAction>, ApiError> {
    let mut actions: Vec<BillAction> = gzip_set(item, "actions")?
        .iter()
        .map(|text| {
            let record = Composite::split(text);
            BillAction {
                id: record.int_field(0),
                chamber: record.field(1).to_string(),
                date: format_long_date(record.field(2)),
                action_text: record.field(3).to_string(),
            }
        })
        .collect();
    actions.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(actions)
}

fn decode_amendments(item: &Item) -> Result<Vec<BillAmendment>, ApiError> {
    let mut amendments: Vec<BillAmendment> = gzip_set(item, "amendments")?
        .iter()
        .map(|text| {
            let record = Composite::split(text);
            BillAmendment {
                number: record.int_field(0),
                congressdotgov_url: record.field(3).to_string(),
                introduced_date: format_long_date(record.field(1)),
                last_major_action_date: format_long_date(record.field(4)),
                last_major_action: record.field(5).to_string(),
                sponsor: record.field(6).to_string(),
                title: record.field(2).to_string(),
            }
        })
        .collect();
    amendments.sort_by(|a, b| b.number.cmp(&a.number));
    Ok(amendments)
}

async fn fetch(
    store: &dyn ItemStore,
    bill_id: &str,
    projection: &'static str,
) -> Result<Item, ApiError> {
    let query = ItemQuery::table(TABLE, "bill_id", bill_id, projection);
    require_one(store.query(query).await?.items, "Bill")
}

pub async fn bill_detail(store: &dyn ItemStore, bill_id: &str) -> Result<BillDetail, ApiError> {
    let item = fetch(
        store,
        bill_id,
        "bill_title, summary, congress, introduced_date, latest_major_action_date, actions, \
         committeeIDs, amendments, text_url",
    )
    .await?;

    Ok(BillDetail {
        actions: decode_actions(&item)?,
        amendments: decode_amendments(&item)?,
        bill_title: req_s(&item, "bill_title")?.to_string(),
        committees: string_set(&item, "committeeIDs"),
        congress: req_s(&item, "congress")?.to_string(),
        introduced: format_long_date(req_s(&item, "introduced_date")?),
        latest_major_action_date: format_long_date(req_s(&item, "latest_major_action_date")?),
        summary: gzip_s(&item, "summary")?,
        text_url: s_or_empty(&item, "text_url"),
    })
}

/// Title plus the decompressed summary text.
pub async fn bill_summary(
    store: &dyn ItemStore,
    bill_id: &str,
) -> Result<(String, String), ApiError> {
    let item = fetch(store, bill_id, "bill_title, summary").await?;
    Ok((
        req_s(&item, "bill_title")?.to_string(),
        gzip_s(&item, "summary")?,
    ))
}

/// Actions plus the bill's title, descending by sequence id.
pub async fn bill_actions(
    store: &dyn ItemStore,
    bill_id: &str,
) -> Result<(Vec<BillAction>, String), ApiError> {
    let item = fetch(store, bill_id, "bill_title, actions, bill_id").await?;
    Ok((decode_actions(&item)?, req_s(&item, "bill_title")?.to_string()))
}

/// Amendments plus the bill's title, descending by amendment number.
pub async fn bill_amendments(
    store: &dyn ItemStore,
    bill_id: &str,
) -> Result<(Vec<BillAmendment>, String), ApiError> {
    let item = fetch(store, bill_id, "bill_title, amendments, bill_id").await?;
    Ok((
        decode_amendments(&item)?,
        req_s(&item, "bill_title")?.to_string(),
    ))
}

/// Committees the bill was referred to, resolved to id/name pairs, plus
/// the bill's title.
pub async fn bill_committees(
    store: &dyn ItemStore,
    bill_id: &str,
) -> Result<(Vec<CommitteeRef>, String), ApiError> {
    let item = fetch(store, bill_id, "bill_title, committeeIDs, bill_id").await?;
    let title = req_s(&item, "bill_title")?.to_string();
    let refs = committees::refs_for_ids(store, string_set(&item, "committeeIDs")).await?;
    Ok((refs, title))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::mock::{ItemBuilder, MockItemStore};

    fn bill_item() -> Item {
        ItemBuilder::new()
            .s("bill_id", "HR1234")
            .s("bill_title", "An act to test")
            .s("congress", "117")
            .s("introduced_date", "2021-01-05")
            .s("latest_major_action_date", "2021-03-18")
            .gz("summary", "A summary of the act.")
            .gz_set(
                "actions",
                &[
                    "1@house@2021-01-05@Introduced in House",
                    "3@senate@2021-03-18@Received in the Senate",
                    "2@house@2021-02-10@Passed House",
                ],
            )
            .gz_set(
                "amendments",
                &[
                    "2@2021-02-01@Second amendment@https://example.gov/2@2021-02-03@Agreed to@Rep. Doe",
                    "10@2021-02-20@Tenth amendment@https://example.gov/10@2021-02-22@Failed@Rep. Roe",
                ],
            )
            .ss("committeeIDs", &["HSAG"])
            .build()
    }

    #[tokio::test]
    async fn detail_sorts_actions_and_amendments_descending() {
        let store = MockItemStore::new();
        store.put("HR1234", vec![bill_item()]);

        let detail = bill_detail(&store, "HR1234").await.unwrap();

        let ids: Vec<_> = detail.actions.iter().map(|a| a.id).collect();
        assert_eq!(ids, [3, 2, 1]);
        // 10 > 2 numerically; a lexicographic sort would invert them.
        let numbers: Vec<_> = detail.amendments.iter().map(|a| a.number).collect();
        assert_eq!(numbers, [10, 2]);

        assert_eq!(detail.introduced, "January 5, 2021");
        assert_eq!(detail.latest_major_action_date, "March 18, 2021");
        assert_eq!(detail.summary, "A summary of the act.");
        assert_eq!(detail.text_url, "");
    }

    #[tokio::test]
    async fn actions_decode_positional_fields() {
        let store = MockItemStore::new();
        store.put("HR1234", vec![bill_item()]);

        let (actions, title) = bill_actions(&store, "HR1234").await.unwrap();
        assert_eq!(title, "An act to test");
        assert_eq!(
            actions[0],
            BillAction {
                id: 3,
                chamber: "senate".into(),
                date: "March 18, 2021".into(),
                action_text: "Received in the Senate".into(),
            }
        );
    }

    #[tokio::test]
    async fn amendment_fields_map_by_position() {
        let store = MockItemStore::new();
        store.put("HR1234", vec![bill_item()]);

        let (amendments, _) = bill_amendments(&store, "HR1234").await.unwrap();
        assert_eq!(
            amendments[1],
            BillAmendment {
                number: 2,
                congressdotgov_url: "https://example.gov/2".into(),
                introduced_date: "February 1, 2021".into(),
                last_major_action_date: "February 3, 2021".into(),
                last_major_action: "Agreed to".into(),
                sponsor: "Rep. Doe".into(),
                title: "Second amendment".into(),
            }
        );
    }

    #[tokio::test]
    async fn bill_without_lists_renders_empty() {
        let store = MockItemStore::new();
        store.put(
            "S55",
            vec![ItemBuilder::new()
                .s("bill_id", "S55")
                .s("bill_title", "A bare bill")
                .s("congress", "117")
                .s("introduced_date", "2021-01-05")
                .s("latest_major_action_date", "2021-01-05")
                .gz("summary", "Short.")
                .build()],
        );

        let detail = bill_detail(&store, "S55").await.unwrap();
        assert!(detail.actions.is_empty());
        assert!(detail.amendments.is_empty());
        assert!(detail.committees.is_empty());
    }

    #[tokio::test]
    async fn missing_bill_is_not_found() {
        let store = MockItemStore::new();
        let result = bill_summary(&store, "HR0").await;
        assert!(matches!(result, Err(ApiError::NotFound("Bill"))));
    }
}
