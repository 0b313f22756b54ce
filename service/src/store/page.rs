//! Fixed-size cursor pagination over store queries.
//!
//! List endpoints return pages of twenty items in descending sort-key
//! order. The resume key from the store passes through to the client as an
//! opaque cursor and comes back verbatim on the next request; the store
//! does the positioning, so the cursor carries no trust.

use aws_sdk_dynamodb::types::AttributeValue;

use super::{Item, ItemQuery, ItemStore, QueryOutput, StoreError};

/// Items per page on every list endpoint.
pub const PAGE_SIZE: i32 = 20;

/// Run `query` as one descending page of [`PAGE_SIZE`] items, resuming from
/// `cursor` when present.
///
/// # Errors
///
/// Propagates the store error.
pub async fn query_page(
    store: &dyn ItemStore,
    mut query: ItemQuery,
    cursor: Option<Item>,
) -> Result<QueryOutput, StoreError> {
    query.forward = false;
    query.limit = Some(PAGE_SIZE);
    query.start_key = cursor;
    store.query(query).await
}

/// Build a cursor item from string key/value pairs.
///
/// Clients echo the cursor fields back as query parameters; this
/// reassembles them into the store's key shape.
#[must_use]
pub fn cursor_key(pairs: &[(&str, &str)]) -> Item {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), AttributeValue::S((*value).to_string())))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::mock::{ItemBuilder, MockItemStore};

    #[tokio::test]
    async fn pages_read_descending_with_fixed_size() {
        let store = MockItemStore::new();
        store.put(" ", Vec::new());

        let query = ItemQuery::index("Vote", "blank-voted_at-index", "blank", " ", "roll_id");
        query_page(&store, query, None).await.unwrap();

        let issued = store.queries();
        assert_eq!(issued.len(), 1);
        assert!(!issued[0].forward);
        assert_eq!(issued[0].limit, Some(PAGE_SIZE));
        assert!(issued[0].start_key.is_none());
    }

    #[tokio::test]
    async fn cursor_passes_through_as_start_key() {
        let store = MockItemStore::new();
        store.put(" ", Vec::new());

        let cursor = cursor_key(&[
            ("roll_id", "h2021-144"),
            ("voted_at", "2021-05-12"),
            ("blank", " "),
        ]);
        let query = ItemQuery::index("Vote", "blank-voted_at-index", "blank", " ", "roll_id");
        query_page(&store, query, Some(cursor.clone())).await.unwrap();

        let issued = store.queries();
        assert_eq!(issued[0].start_key.as_ref().unwrap(), &cursor);
    }

    #[tokio::test]
    async fn consecutive_pages_concatenate_without_repeats() {
        let store = MockItemStore::new();

        // Two store pages covering a 40-item descending set.
        let ids: Vec<String> = (0..2 * PAGE_SIZE).rev().map(|i| format!("h2021-{i:03}")).collect();
        let (first, second) = ids.split_at(PAGE_SIZE as usize);
        let items = |ids: &[String]| {
            ids.iter()
                .map(|id| ItemBuilder::new().s("roll_id", id).build())
                .collect()
        };
        store.push_page(QueryOutput {
            items: items(first),
            last_key: Some(
                ItemBuilder::new()
                    .s("roll_id", first.last().unwrap())
                    .s("blank", " ")
                    .build(),
            ),
        });
        store.push_page(QueryOutput {
            items: items(second),
            last_key: None,
        });

        let query = ItemQuery::index("Vote", "blank-voted_at-index", "blank", " ", "roll_id");
        let page_one = query_page(&store, query.clone(), None).await.unwrap();
        let cursor = page_one.last_key.clone().unwrap();
        let page_two = query_page(&store, query, Some(cursor.clone())).await.unwrap();
        assert!(page_two.last_key.is_none());

        // Page two resumed exactly from page one's key, and the two pages
        // together read as one full descending pass with no item repeated.
        assert_eq!(store.queries()[1].start_key.as_ref().unwrap(), &cursor);
        let seen: Vec<&str> = page_one
            .items
            .iter()
            .chain(page_two.items.iter())
            .map(|item| item.get("roll_id").and_then(|v| v.as_s().ok()).unwrap().as_str())
            .collect();
        assert_eq!(seen, ids);
        let unique: std::collections::HashSet<&&str> = seen.iter().collect();
        assert_eq!(unique.len(), seen.len());
    }

    #[test]
    fn cursor_key_builds_string_items() {
        let key = cursor_key(&[("nomination_id", "PN123"), ("latest_action_date", "2021-02-01")]);
        assert_eq!(key.len(), 2);
        assert_eq!(
            key.get("nomination_id"),
            Some(&AttributeValue::S("PN123".to_string()))
        );
    }
}
