//! Bounded-concurrency resolution of id lists.
//!
//! Detail endpoints hold lists of foreign keys (committee members, member
//! committees, subcommittees) that each need their own store lookup. The
//! lookups run concurrently with a fixed width so one hot request cannot
//! monopolize store connections, and results come back in input order.

use futures::stream::{self, StreamExt};
use std::future::Future;

use super::StoreError;

/// Maximum in-flight lookups per request.
pub const FANOUT_WIDTH: usize = 8;

/// Outcome of a fan-out: the values that resolved, in input order, plus the
/// ids that failed.
pub struct Resolved<T> {
    pub items: Vec<T>,
    pub failures: Vec<(String, StoreError)>,
}

impl<T> Resolved<T> {
    /// Collapse into a `Result`, logging every failed id and returning the
    /// first error. Partial results are never served.
    ///
    /// # Errors
    ///
    /// Returns the first lookup failure.
    pub fn into_result(self) -> Result<Vec<T>, StoreError> {
        let mut failures = self.failures.into_iter();
        match failures.next() {
            None => Ok(self.items),
            Some((id, error)) => {
                tracing::warn!(%id, %error, "lookup failed during fan-out");
                for (id, error) in failures {
                    tracing::warn!(%id, %error, "lookup failed during fan-out");
                }
                Err(error)
            }
        }
    }
}

/// Resolve every id through `lookup`, at most [`FANOUT_WIDTH`] at a time.
///
/// `buffered` (not `buffer_unordered`) keeps completion order equal to
/// input order, so response lists stay in stored order.
pub async fn resolve_all<T, F, Fut>(ids: Vec<String>, lookup: F) -> Resolved<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let results: Vec<(String, Result<T, StoreError>)> = stream::iter(ids)
        .map(|id| {
            let fut = lookup(id.clone());
            async move { (id, fut.await) }
        })
        .buffered(FANOUT_WIDTH)
        .collect()
        .await;

    let mut items = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (id, result) in results {
        match result {
            Ok(value) => items.push(value),
            Err(error) => failures.push((id, error)),
        }
    }
    Resolved { items, failures }
}
