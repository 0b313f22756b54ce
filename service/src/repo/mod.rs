//! Domain repositories.
//!
//! Each submodule owns one entity family: the decode from raw store items
//! into typed response structs, and the queries that fetch them. Handlers
//! in [`crate::http`] stay thin over these.

pub mod bills;
pub mod committees;
pub mod docs;
pub mod legislators;
pub mod nominations;
pub mod votes;

use crate::error::ApiError;
use crate::store::Item;

/// Take the single expected item from a lookup, or the entity's not-found
/// error when the query came back empty.
pub(crate) fn require_one(items: Vec<Item>, entity: &'static str) -> Result<Item, ApiError> {
    items
        .into_iter()
        .next()
        .ok_or(ApiError::NotFound(entity))
}
