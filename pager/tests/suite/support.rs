#![allow(clippy::expect_used)]

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use async_trait::async_trait;
use ledger_pager::CursorPager;
use ledger_pager::ListUpdate;
use ledger_pager::Offset;
use ledger_pager::Order;
use ledger_pager::PagerConfig;
use ledger_pager::PagerRecord;
use ledger_pager::RecordFilter;
use ledger_pager::RecordStore;
use ledger_pager::StoreError;
use ledger_pager::StoreResult;
use tokio::sync::Mutex;

pub const DAY: i64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub ts: i64,
    pub amount: i64,
    pub note: String,
}

impl PagerRecord for Row {
    type SortKey = (i64, String);

    fn id(&self) -> &str {
        &self.id
    }

    fn group_key(&self) -> String {
        format!("day-{:02}", self.ts / DAY)
    }

    fn sort_key(&self, order: Order) -> Self::SortKey {
        match order {
            Order::Newest | Order::Oldest => (self.ts, self.id.clone()),
            Order::MostValuable | Order::BiggestAmount => (self.amount, self.id.clone()),
        }
    }
}

pub fn row(ts: i64) -> Row {
    Row {
        id: format!("r{ts:04}"),
        ts,
        amount: (ts * 37) % 101,
        note: String::new(),
    }
}

/// Matches every row whose id does not start with `exclude_prefix`. Queries
/// made with this filter sleep for `delay` first.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub exclude_prefix: Option<String>,
    pub delay: Duration,
}

impl RowFilter {
    pub fn slow(delay: Duration) -> Self {
        Self {
            exclude_prefix: None,
            delay,
        }
    }
}

impl RecordFilter<Row> for RowFilter {
    fn is_included(&self, record: &Row) -> bool {
        match &self.exclude_prefix {
            Some(prefix) => !record.id.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

#[derive(Default)]
pub struct RowStore {
    pub rows: Mutex<Vec<Row>>,
    pub fail: AtomicBool,
    pub queries: AtomicUsize,
}

impl RowStore {
    pub fn with_rows(rows: Vec<Row>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            ..Default::default()
        })
    }

    /// Rows spread evenly over `days` days, oldest first.
    pub fn spread(count: i64, days: i64) -> Arc<Self> {
        let per_day = count / days;
        let rows = (0..count)
            .map(|i| row((i / per_day) * DAY + (i % per_day)))
            .collect();
        Self::with_rows(rows)
    }

    pub async fn upsert(&self, record: Row) {
        let mut rows = self.rows.lock().await;
        match rows.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => rows.push(record),
        }
    }
}

fn display_cmp(order: Order, a: &Row, b: &Row) -> Ordering {
    let ordering = a.sort_key(order).cmp(&b.sort_key(order));
    if order.is_descending() {
        ordering.reverse()
    } else {
        ordering
    }
}

#[async_trait]
impl RecordStore for RowStore {
    type Record = Row;
    type Filter = RowFilter;

    async fn query(
        &self,
        filter: &RowFilter,
        order: Order,
        offset: &Offset<Row>,
        limit: usize,
    ) -> StoreResult<Vec<Row>> {
        self.queries
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if !filter.delay.is_zero() {
            tokio::time::sleep(filter.delay).await;
        }
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Unavailable("offline".to_string()));
        }
        let mut rows: Vec<Row> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|r| filter.is_included(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| display_cmp(order, a, b));
        let page = match offset {
            Offset::None => rows.into_iter().take(limit).collect(),
            Offset::After {
                anchor,
                includes_anchor,
            } => rows
                .into_iter()
                .filter(|r| match display_cmp(order, r, anchor) {
                    Ordering::Greater => true,
                    Ordering::Equal => *includes_anchor,
                    Ordering::Less => false,
                })
                .take(limit)
                .collect(),
            Offset::Before {
                anchor,
                includes_anchor,
            } => rows
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
        Ok(page)
    }

    async fn record(&self, id: &str) -> StoreResult<Option<Row>> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Unavailable("offline".to_string()));
        }
        Ok(self.rows.lock().await.iter().find(|r| r.id == id).cloned())
    }
}

pub fn spawn_pager(store: &Arc<RowStore>, config: PagerConfig) -> CursorPager<RowStore> {
    CursorPager::spawn(
        Arc::clone(store),
        RowFilter::default(),
        Order::Newest,
        config,
    )
    .expect("valid config")
}

/// Wait for the next update and acknowledge it, returning its contents.
pub async fn next_applied(pager: &CursorPager<RowStore>) -> Applied {
    let update = tokio::time::timeout(Duration::from_secs(5), pager.next_update())
        .await
        .expect("timed out waiting for update")
        .expect("pager worker gone");
    Applied::from_update(update)
}

/// Owned copy of an acknowledged [`ListUpdate`].
pub struct Applied {
    pub kind: ledger_pager::UpdateKind,
    pub snapshot: Arc<ledger_pager::ViewModel<Row>>,
    pub scroll: ledger_pager::ScrollAdjustment,
    pub triggers: ledger_pager::EdgeTriggers,
    pub inserted: usize,
}

impl Applied {
    fn from_update(update: ListUpdate<Row>) -> Self {
        let applied = Self {
            kind: update.kind,
            snapshot: Arc::clone(&update.snapshot),
            scroll: update.scroll.clone(),
            triggers: update.triggers.clone(),
            inserted: update.inserted,
        };
        update.ack();
        applied
    }

    pub fn ids(&self) -> Vec<String> {
        self.snapshot.ids().map(str::to_string).collect()
    }
}

/// Assert no update arrives within `window`.
pub async fn assert_quiet(pager: &CursorPager<RowStore>, window: Duration) {
    if let Ok(update) = tokio::time::timeout(window, pager.next_update()).await {
        panic!("unexpected update: {:?}", update.map(|u| u.kind));
    }
}
