//! Key/value store access.
//!
//! The legislative reference tables (legislators, bills, votes, committees,
//! nominations) live in DynamoDB. This module provides a trait-based client
//! for the two access shapes the API needs — key-condition queries (with
//! optional secondary index, descending order and resume key) and plain
//! table scans. The trait abstraction enables:
//!
//! - Easy mocking in unit and router tests
//! - Keeping the handler layer free of SDK types
//!
//! Submodules build on the trait: [`attr`] decodes raw items, [`page`]
//! wraps queries in fixed-size cursor pagination, and [`fanout`] resolves
//! foreign-key lists concurrently.

pub mod attr;
pub mod fanout;
pub mod page;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

/// A raw attribute-tagged item.
pub type Item = HashMap<String, AttributeValue>;

/// Errors from the key/value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(String),
    #[error("store scan failed: {0}")]
    Scan(String),
}

/// A key-condition query against a table or one of its secondary indexes.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub table: &'static str,
    pub index: Option<&'static str>,
    /// Partition key attribute and value. List indexes over the whole
    /// dataset use a constant `" "` sentinel partition so the index sort
    /// key orders everything.
    pub key: (&'static str, String),
    /// Optional sort-key equality condition (composite-key indexes).
    pub sort_key: Option<(&'static str, String)>,
    /// Comma-separated attribute names to fetch.
    pub projection: &'static str,
    /// Ascending when true; list endpoints read descending.
    pub forward: bool,
    pub limit: Option<i32>,
    /// Resume position from a prior page's last evaluated key, passed
    /// through verbatim. Forged cursors just continue the scan elsewhere;
    /// no privilege is implied.
    pub start_key: Option<Item>,
}

impl ItemQuery {
    /// Query a table by its primary key.
    #[must_use]
    pub fn table(
        table: &'static str,
        key_attr: &'static str,
        key_value: impl Into<String>,
        projection: &'static str,
    ) -> Self {
        Self {
            table,
            index: None,
            key: (key_attr, key_value.into()),
            sort_key: None,
            projection,
            forward: true,
            limit: None,
            start_key: None,
        }
    }

    /// Query a secondary index by its partition key.
    #[must_use]
    pub fn index(
        table: &'static str,
        index: &'static str,
        key_attr: &'static str,
        key_value: impl Into<String>,
        projection: &'static str,
    ) -> Self {
        Self {
            index: Some(index),
            ..Self::table(table, key_attr, key_value, projection)
        }
    }

    /// Add a sort-key equality condition.
    #[must_use]
    pub fn with_sort_key(mut self, attr: &'static str, value: impl Into<String>) -> Self {
        self.sort_key = Some((attr, value.into()));
        self
    }
}

/// Result of a query: one page of items plus the resume key when the store
/// reports more results beyond it.
#[derive(Debug, Default)]
pub struct QueryOutput {
    pub items: Vec<Item>,
    pub last_key: Option<Item>,
}

/// Trait for key/value store operations.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Run a key-condition query.
    async fn query(&self, query: ItemQuery) -> Result<QueryOutput, StoreError>;

    /// Scan a whole table (reference tables only; bounded by `limit`).
    async fn scan(
        &self,
        table: &'static str,
        projection: &'static str,
        limit: Option<i32>,
    ) -> Result<Vec<Item>, StoreError>;
}

/// Alias every projected attribute name.
///
/// Several domain attributes (`state`, `status`, `name`, `result`, `url`)
/// collide with the store's reserved words, so all names go through the
/// expression-name indirection unconditionally.
fn alias_projection(projection: &str) -> (String, Vec<(String, String)>) {
    let mut expr = Vec::new();
    let mut names = Vec::new();
    for (i, field) in projection.split(',').map(str::trim).enumerate() {
        let alias = format!("#p{i}");
        expr.push(alias.clone());
        names.push((alias, field.to_string()));
    }
    (expr.join(","), names)
}

/// DynamoDB-backed implementation of [`ItemStore`].
#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
}

impl std::fmt::Debug for DynamoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoStore").finish()
    }
}

impl DynamoStore {
    /// Wrap a pre-built SDK client (connection settings live in [`crate::db`]).
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ItemStore for DynamoStore {
    async fn query(&self, query: ItemQuery) -> Result<QueryOutput, StoreError> {
        let (projection, names) = alias_projection(query.projection);

        let mut condition = "#pk = :pk".to_string();
        let mut request = self
            .client
            .query()
            .table_name(query.table)
            .projection_expression(projection)
            .expression_attribute_names("#pk", query.key.0)
            .expression_attribute_values(":pk", AttributeValue::S(query.key.1))
            .scan_index_forward(query.forward);

        if let Some(index) = query.index {
            request = request.index_name(index);
        }
        if let Some((attr, value)) = query.sort_key {
            condition.push_str(" AND #sk = :sk");
            request = request
                .expression_attribute_names("#sk", attr)
                .expression_attribute_values(":sk", AttributeValue::S(value));
        }
        for (alias, field) in names {
            request = request.expression_attribute_names(alias, field);
        }
        if let Some(limit) = query.limit {
            request = request.limit(limit);
        }
        if let Some(start_key) = query.start_key {
            request = request.set_exclusive_start_key(Some(start_key));
        }

        let response = request
            .key_condition_expression(condition)
            .send()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let last_key = match response.last_evaluated_key() {
            Some(key) if !key.is_empty() => Some(key.clone()),
            _ => None,
        };

        Ok(QueryOutput {
            items: response.items.unwrap_or_default(),
            last_key,
        })
    }

    async fn scan(
        &self,
        table: &'static str,
        projection: &'static str,
        limit: Option<i32>,
    ) -> Result<Vec<Item>, StoreError> {
        let (projection, names) = alias_projection(projection);

        let mut request = self
            .client
            .scan()
            .table_name(table)
            .projection_expression(projection);
        for (alias, field) in names {
            request = request.expression_attribute_names(alias, field);
        }
        if let Some(limit) = limit {
            request = request.limit(limit);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Scan(e.to_string()))?;

        Ok(response.items.unwrap_or_default())
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::must_use_candidate)]
pub mod mock {
    //! In-memory store for unit and router tests.

    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use aws_sdk_dynamodb::primitives::Blob;
    use aws_sdk_dynamodb::types::AttributeValue;

    use super::{Item, ItemQuery, ItemStore, QueryOutput, StoreError};

    /// Gzip-compress text, for building synthetic binary attributes.
    pub fn gzip_bytes(text: &str) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    /// Builder for raw items in tests.
    #[derive(Default)]
    pub struct ItemBuilder {
        item: Item,
    }

    impl ItemBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn s(mut self, name: &str, value: &str) -> Self {
            self.item
                .insert(name.to_string(), AttributeValue::S(value.to_string()));
            self
        }

        pub fn ss(mut self, name: &str, values: &[&str]) -> Self {
            self.item.insert(
                name.to_string(),
                AttributeValue::Ss(values.iter().map(ToString::to_string).collect()),
            );
            self
        }

        /// Gzip-compressed binary attribute.
        pub fn gz(mut self, name: &str, text: &str) -> Self {
            self.item
                .insert(name.to_string(), AttributeValue::B(Blob::new(gzip_bytes(text))));
            self
        }

        /// Binary set of gzip-compressed entries.
        pub fn gz_set(mut self, name: &str, texts: &[&str]) -> Self {
            self.item.insert(
                name.to_string(),
                AttributeValue::Bs(texts.iter().map(|t| Blob::new(gzip_bytes(t))).collect()),
            );
            self
        }

        pub fn build(self) -> Item {
            self.item
        }
    }

    /// Mock implementation of [`ItemStore`].
    ///
    /// Responses are matched on the partition-key value first (stable under
    /// concurrent fan-out), falling back to a FIFO queue for sequenced
    /// pagination tests. Unmatched queries return an empty page.
    #[derive(Default)]
    pub struct MockItemStore {
        by_key: Mutex<HashMap<String, Vec<Item>>>,
        fail_keys: Mutex<HashMap<String, String>>,
        queue: Mutex<Vec<QueryOutput>>,
        scan_items: Mutex<HashMap<&'static str, Vec<Item>>>,
        queries: Mutex<Vec<ItemQuery>>,
    }

    impl MockItemStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Return `items` for any query whose partition-key value is `key`.
        pub fn put(&self, key: &str, items: Vec<Item>) {
            self.by_key.lock().unwrap().insert(key.to_string(), items);
        }

        /// Fail any query whose partition-key value is `key`.
        pub fn fail(&self, key: &str, message: &str) {
            self.fail_keys
                .lock()
                .unwrap()
                .insert(key.to_string(), message.to_string());
        }

        /// Push a sequenced response (popped in order, before key matching).
        pub fn push_page(&self, output: QueryOutput) {
            self.queue.lock().unwrap().push(output);
        }

        /// Set the items returned for scans of `table`.
        pub fn put_scan(&self, table: &'static str, items: Vec<Item>) {
            self.scan_items.lock().unwrap().insert(table, items);
        }

        /// All queries issued so far.
        pub fn queries(&self) -> Vec<ItemQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ItemStore for MockItemStore {
        async fn query(&self, query: ItemQuery) -> Result<QueryOutput, StoreError> {
            self.queries.lock().unwrap().push(query.clone());

            if let Some(message) = self.fail_keys.lock().unwrap().get(&query.key.1) {
                return Err(StoreError::Query(message.clone()));
            }

            let mut queue = self.queue.lock().unwrap();
            if !queue.is_empty() {
                return Ok(queue.remove(0));
            }
            drop(queue);

            let items = self
                .by_key
                .lock()
                .unwrap()
                .get(&query.key.1)
                .cloned()
                .unwrap_or_default();
            Ok(QueryOutput {
                items,
                last_key: None,
            })
        }

        async fn scan(
            &self,
            table: &'static str,
            _projection: &'static str,
            _limit: Option<i32>,
        ) -> Result<Vec<Item>, StoreError> {
            Ok(self
                .scan_items
                .lock()
                .unwrap()
                .get(table)
                .cloned()
                .unwrap_or_default())
        }
    }
}
