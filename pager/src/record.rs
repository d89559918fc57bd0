use std::fmt::Debug;

/// A single ledger-visible entry that can be paged.
pub trait PagerRecord: Clone + Debug + Send + Sync + 'static {
    type SortKey: Ord + Clone + Debug + Send + Sync;

    /// Stable identifier used both as diff identity and merge key.
    fn id(&self) -> &str;

    /// Date bucket label. Only consulted under chronological orders.
    fn group_key(&self) -> String;

    /// Composite sort key for `order`. Larger keys are listed first when the
    /// order is descending.
    fn sort_key(&self, order: crate::Order) -> Self::SortKey;
}

/// Relevance predicate attached to a filter description.
pub trait RecordFilter<R>: Clone + Debug + Send + Sync + 'static {
    fn is_included(&self, record: &R) -> bool;
}

/// Live change delivered by the store's notification channel.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange<R> {
    /// Exactly one record changed.
    Updated(R),
    /// An unknown number of records changed.
    Bulk,
}
