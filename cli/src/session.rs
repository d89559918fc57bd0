use std::sync::Arc;

use ledger_history::HistoryFilter;
use ledger_history::LedgerEntry;
use ledger_history::MemoryStore;
use ledger_pager::CursorPager;
use ledger_pager::Edge;
use ledger_pager::EdgeTriggers;
use ledger_pager::ListUpdate;
use ledger_pager::Order;
use ledger_pager::PagerConfig;
use ledger_pager::PagerRecord;
use ledger_pager::ViewModel;
use tracing::debug;
use tracing::info;

/// Final state of a scripted scroll through a history list.
#[derive(Debug)]
pub struct PagedHistory<R> {
    pub snapshot: Arc<ViewModel<R>>,
    pub triggers: EdgeTriggers,
    /// Pages applied, counting the initial reload.
    pub pages_loaded: usize,
}

impl<R> PagedHistory<R> {
    /// No further page can be requested from the tail.
    pub fn exhausted(&self) -> bool {
        self.triggers.next.is_none()
    }
}

/// Load `records` into an in-memory store, reload a pager over it and then
/// scroll down row by row until `extra_pages` more pages have been loaded or
/// the list is exhausted.
pub async fn page_through<R>(
    records: Vec<R>,
    filter: HistoryFilter,
    order: Order,
    config: PagerConfig,
    extra_pages: usize,
) -> anyhow::Result<PagedHistory<R>>
where
    R: PagerRecord + LedgerEntry,
{
    let store = Arc::new(MemoryStore::from_records(records)?);
    let pager = CursorPager::spawn(store, filter.clone(), order, config)?;

    pager.reload(filter, order).await?;
    let mut update = pager.next_update().await?;
    let mut pages_loaded = 1;
    while pages_loaded <= extra_pages && update.triggers.next.is_some() {
        let snapshot = Arc::clone(&update.snapshot);
        update.ack();
        if !scroll_to_tail_trigger(&pager, &snapshot).await? {
            anyhow::bail!("tail trigger is not part of the applied list");
        }
        update = pager.next_update().await?;
        pages_loaded += 1;
    }
    if update.triggers.next.is_none() {
        debug!(pages_loaded, "list exhausted");
    }

    let paged = finish(update, pages_loaded);
    info!(
        rows = paged.snapshot.len(),
        pages = paged.pages_loaded,
        %order,
        "paged through history"
    );
    pager.shutdown().await?;
    Ok(paged)
}

/// Report every row of `snapshot` as displayed, top to bottom, until one of
/// them fires the tail trigger.
async fn scroll_to_tail_trigger<R>(
    pager: &CursorPager<MemoryStore<R>>,
    snapshot: &ViewModel<R>,
) -> anyhow::Result<bool>
where
    R: PagerRecord + LedgerEntry,
{
    let ids: Vec<String> = snapshot.ids().map(str::to_string).collect();
    for id in ids {
        if pager.will_display(&id).await? == Some(Edge::Tail) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn finish<R>(update: ListUpdate<R>, pages_loaded: usize) -> PagedHistory<R> {
    let paged = PagedHistory {
        snapshot: Arc::clone(&update.snapshot),
        triggers: update.triggers.clone(),
        pages_loaded,
    };
    update.ack();
    paged
}
