use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use ledger_pager::Offset;
use ledger_pager::Order;
use ledger_pager::PagerRecord;
use ledger_pager::RecordChange;
use ledger_pager::RecordStore;
use ledger_pager::StoreResult;
use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tracing::debug;
use tracing::trace;

use crate::HistoryError;
use crate::HistoryFilter;
use crate::HistoryResult;
use crate::LedgerEntry;

pub const CHANGE_FEED_CAPACITY: usize = 256;

/// History records held in memory, queryable by a pager.
///
/// Every mutation is published on a broadcast change feed; see
/// [`MemoryStore::subscribe`].
pub struct MemoryStore<R> {
    records: RwLock<Vec<R>>,
    changes: broadcast::Sender<RecordChange<R>>,
}

impl<R> MemoryStore<R>
where
    R: PagerRecord + LedgerEntry,
{
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            records: RwLock::new(Vec::new()),
            changes,
        }
    }

    /// Build a store from an initial set of records. Ids must be unique.
    pub fn from_records(records: Vec<R>) -> HistoryResult<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(HistoryError::DuplicateId(record.id().to_string()));
            }
        }
        debug!(count = records.len(), "seeding history store");
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Ok(Self {
            records: RwLock::new(records),
            changes,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordChange<R>> {
        self.changes.subscribe()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Insert or replace a record and announce it as a single change.
    pub async fn upsert(&self, record: R) {
        insert(&mut *self.records.write().await, record.clone());
        self.publish(RecordChange::Updated(record));
    }

    /// Insert or replace several records and announce them as one bulk
    /// change.
    pub async fn upsert_many(&self, records: Vec<R>) {
        if records.is_empty() {
            return;
        }
        {
            let mut stored = self.records.write().await;
            for record in records {
                insert(&mut stored, record);
            }
        }
        self.publish(RecordChange::Bulk);
    }

    /// Remove a record. Returns the removed record, if any.
    pub async fn remove(&self, id: &str) -> Option<R> {
        let removed = {
            let mut stored = self.records.write().await;
            let idx = stored.iter().position(|r| r.id() == id)?;
            stored.remove(idx)
        };
        // A removal cannot be patched in place, so it is announced as bulk.
        self.publish(RecordChange::Bulk);
        Some(removed)
    }

    fn publish(&self, change: RecordChange<R>) {
        // No subscribers is not an error.
        if self.changes.send(change).is_err() {
            trace!("no change feed subscribers");
        }
    }
}

impl<R> Default for MemoryStore<R>
where
    R: PagerRecord + LedgerEntry,
{
    fn default() -> Self {
        Self::new()
    }
}

fn insert<R: PagerRecord>(stored: &mut Vec<R>, record: R) {
    match stored.iter_mut().find(|r| r.id() == record.id()) {
        Some(slot) => *slot = record,
        None => stored.push(record),
    }
}

fn display_cmp<R: PagerRecord>(order: Order, a: &R, b: &R) -> Ordering {
    let ordering = a.sort_key(order).cmp(&b.sort_key(order));
    if order.is_descending() {
        ordering.reverse()
    } else {
        ordering
    }
}

#[async_trait]
impl<R> RecordStore for MemoryStore<R>
where
    R: PagerRecord + LedgerEntry,
{
    type Record = R;
    type Filter = HistoryFilter;

    async fn query(
        &self,
        filter: &HistoryFilter,
        order: Order,
        offset: &Offset<R>,
        limit: usize,
    ) -> StoreResult<Vec<R>> {
        let mut matching: Vec<R> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(*r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| display_cmp(order, a, b));

        let page: Vec<R> = match offset {
            Offset::None => matching.into_iter().take(limit).collect(),
            Offset::After {
                anchor,
                includes_anchor,
            } => matching
                .into_iter()
                .filter(|r| match display_cmp(order, r, anchor) {
                    Ordering::Greater => true,
                    Ordering::Equal => *includes_anchor,
                    Ordering::Less => false,
                })
                .take(limit)
                .collect(),
            // Walk backwards so the nearest record comes first.
            Offset::Before {
                anchor,
                includes_anchor,
            } => matching
                .into_iter()
                .rev()
                .filter(|r| match display_cmp(order, r, anchor) {
                    Ordering::Less => true,
                    Ordering::Equal => *includes_anchor,
                    Ordering::Greater => false,
                })
                .take(limit)
                .collect(),
        };
        trace!(%order, count = page.len(), "memory store query");
        Ok(page)
    }

    async fn record(&self, id: &str) -> StoreResult<Option<R>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
