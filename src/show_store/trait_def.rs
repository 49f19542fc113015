//! ShowStore trait definition.

use super::error::ShowStoreResult;
use super::models::{NewShow, Show, ShowUpdate};
use super::query::{SearchQuery, ShowField};

/// Storage backend for shows.
///
/// Every call acquires its own connection for the duration of the call and
/// releases it before returning, on success and on error alike.
pub trait ShowStore: Send + Sync {
    /// Insert a show, assigning the next unused id when none is given.
    /// Fails with `Conflict` when the given id is taken.
    fn create_show(&self, show: NewShow) -> ShowStoreResult<Show>;

    fn get_show(&self, show_id: i64) -> ShowStoreResult<Option<Show>>;

    /// Overwrite the fields present in `update`. Fails with `NotFound` when
    /// the id does not exist.
    fn update_show(&self, show_id: i64, update: ShowUpdate) -> ShowStoreResult<Show>;

    fn delete_show(&self, show_id: i64) -> ShowStoreResult<()>;

    /// Filter, order and paginate, in that order.
    fn search_shows(&self, query: &SearchQuery) -> ShowStoreResult<Vec<Show>>;

    fn count_shows(&self) -> ShowStoreResult<usize>;

    /// Number of distinct values of `field` (NULL counts as a value), or of
    /// distinct whole records, `show_id` included, when `field` is `None`.
    fn count_distinct(&self, field: Option<ShowField>) -> ShowStoreResult<usize>;
}
