//! Nomination lookups.
//!
//! Nomination actions are a binary set, each entry gzip of `id@date@text`.
//! The list endpoints page via the `blank` sentinel partition ordered by
//! latest action date.

use serde::Serialize;

use super::require_one;
use crate::error::ApiError;
use crate::store::attr::{format_long_date, gzip_s, gzip_set, req_s, s_or_empty, Composite};
use crate::store::page::query_page;
use crate::store::{Item, ItemQuery, ItemStore};

const TABLE: &str = "Nomination";

const LIST_PROJECTION: &str = "nomination_id, nominee_description, date_received, \
     latest_action_date, committee_id, congress, status, actions";

/// One recorded action on a nomination.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NominationAction {
    pub id: i64,
    pub date: String,
    pub action: String,
}

/// Full nomination record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Nomination {
    #[serde(rename = "nominationID")]
    pub nomination_id: String,
    pub description: String,
    pub date_received: String,
    pub latest_action_date: String,
    #[serde(rename = "committeeID")]
    pub committee_id: String,
    pub congress: String,
    pub status: String,
    pub actions: Vec<NominationAction>,
}

fn decode_actions(item: &Item) -> Result<Vec<NominationAction>, ApiError> {
    let mut actions: Vec<NominationAction> = gzip_set(item, "actions")?
        .iter()
        .map(|text| {
            let record = Composite::split(text);
            NominationAction {
                id: record.int_field(0),
                date: format_long_date(record.field(1)),
                action: record.field(2).to_string(),
            }
        })
        .collect();
    actions.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(actions)
}

fn decode(item: &Item) -> Result<Nomination, ApiError> {
    Ok(Nomination {
        nomination_id: req_s(item, "nomination_id")?.to_string(),
        description: gzip_s(item, "nominee_description")?,
        date_received: req_s(item, "date_received")?.to_string(),
        latest_action_date: req_s(item, "latest_action_date")?.to_string(),
        committee_id: s_or_empty(item, "committee_id"),
        congress: req_s(item, "congress")?.to_string(),
        status: req_s(item, "status")?.to_string(),
        actions: decode_actions(item)?,
    })
}

/// One page of nominations, newest action first.
pub async fn nominations_page(
    store: &dyn ItemStore,
    cursor: Option<Item>,
) -> Result<(Vec<Nomination>, Option<Item>), ApiError> {
    let query = ItemQuery::index(
        TABLE,
        "blank-latest_action_date-index",
        "blank",
        " ",
        LIST_PROJECTION,
    );
    let page = query_page(store, query, cursor).await?;
    let nominations = page.items.iter().map(decode).collect::<Result<_, _>>()?;
    Ok((nominations, page.last_key))
}

pub async fn nomination_by_id(
    store: &dyn ItemStore,
    nomination_id: &str,
) -> Result<Nomination, ApiError> {
    let mut query = ItemQuery::table(TABLE, "nomination_id", nomination_id, LIST_PROJECTION);
    query.limit = Some(1);
    let item = require_one(store.query(query).await?.items, "Nomination")?;
    decode(&item)
}

/// Actions (descending by sequence id) plus the nominee description.
pub async fn nomination_actions(
    store: &dyn ItemStore,
    nomination_id: &str,
) -> Result<(Vec<NominationAction>, String), ApiError> {
    let query = ItemQuery::table(
        TABLE,
        "nomination_id",
        nomination_id,
        "nominee_description, actions, nomination_id",
    );
    let item = require_one(store.query(query).await?.items, "Nomination")?;
    Ok((decode_actions(&item)?, gzip_s(&item, "nominee_description")?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::mock::{ItemBuilder, MockItemStore};

    fn nomination_item(id: &str) -> Item {
        ItemBuilder::new()
            .s("nomination_id", id)
            .gz("nominee_description", "Jane Doe, to be a judge.")
            .s("date_received", "2021-01-20")
            .s("latest_action_date", "2021-02-10")
            .s("committee_id", "SSJU")
            .s("congress", "117")
            .s("status", "Confirmed")
            .gz_set(
                "actions",
                &[
                    "0@2021-01-20@Received in the Senate",
                    "2@2021-02-10@Confirmed by the Senate",
                    "1@2021-02-01@Committee hearing held",
                ],
            )
            .build()
    }

    #[tokio::test]
    async fn actions_sort_descending_by_sequence_id() {
        let store = MockItemStore::new();
        store.put("PN123", vec![nomination_item("PN123")]);

        let (actions, description) = nomination_actions(&store, "PN123").await.unwrap();
        assert_eq!(description, "Jane Doe, to be a judge.");
        let ids: Vec<_> = actions.iter().map(|a| a.id).collect();
        assert_eq!(ids, [2, 1, 0]);
        assert_eq!(actions[0].date, "February 10, 2021");
        assert_eq!(actions[0].action, "Confirmed by the Senate");
    }

    #[tokio::test]
    async fn detail_decodes_description_and_optionals() {
        let store = MockItemStore::new();
        store.put("PN123", vec![nomination_item("PN123")]);

        let nomination = nomination_by_id(&store, "PN123").await.unwrap();
        assert_eq!(nomination.nomination_id, "PN123");
        assert_eq!(nomination.committee_id, "SSJU");
        assert_eq!(nomination.status, "Confirmed");
        assert_eq!(nomination.actions.len(), 3);
    }

    #[tokio::test]
    async fn listing_uses_sentinel_partition() {
        let store = MockItemStore::new();
        store.put(" ", vec![nomination_item("PN123")]);

        let (nominations, last_key) = nominations_page(&store, None).await.unwrap();
        assert_eq!(nominations.len(), 1);
        assert!(last_key.is_none());

        let queries = store.queries();
        assert_eq!(queries[0].index, Some("blank-latest_action_date-index"));
        assert_eq!(queries[0].key, ("blank", " ".to_string()));
        assert!(!queries[0].forward);
    }

    #[tokio::test]
    async fn missing_nomination_is_not_found() {
        let store = MockItemStore::new();
        let result = nomination_by_id(&store, "PN0").await;
        assert!(matches!(result, Err(ApiError::NotFound("Nomination"))));
    }
}
