use async_trait::async_trait;

use crate::Offset;
use crate::Order;
use crate::PagerRecord;
use crate::RecordFilter;
use crate::error::StoreResult;

/// Queryable backing store for a [`crate::CursorPager`].
///
/// Implementations must return records sorted by `order`. For
/// [`Offset::Before`] the page is ordered nearest-to-anchor first, i.e. it
/// walks the order backwards from the anchor.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    type Record: PagerRecord;
    type Filter: RecordFilter<Self::Record>;

    async fn query(
        &self,
        filter: &Self::Filter,
        order: Order,
        offset: &Offset<Self::Record>,
        limit: usize,
    ) -> StoreResult<Vec<Self::Record>>;

    /// Fetch a single record by id, ignoring any filter.
    async fn record(&self, id: &str) -> StoreResult<Option<Self::Record>>;
}
