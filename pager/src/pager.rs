use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_channel::Receiver;
use async_channel::Sender;
use ledger_async_utils::OrCancelExt;
use tokio::sync::Mutex;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::Edge;
use crate::EdgeTriggers;
use crate::IndexPath;
use crate::ListUpdate;
use crate::Offset;
use crate::Order;
use crate::PagerConfig;
use crate::PagerRecord;
use crate::RecordChange;
use crate::RecordFilter;
use crate::RecordStore;
use crate::ScrollAdjustment;
use crate::UpdateKind;
use crate::ViewModel;
use crate::Viewport;
use crate::error::PagerErr;
use crate::error::PagerResult;

pub(crate) const SUBMISSION_CHANNEL_CAPACITY: usize = 64;

/// Operations accepted by the pager's worker.
#[derive(Debug, Clone)]
pub enum PagerOp<R, F> {
    Reload { filter: F, order: Order },
    /// `trigger` is the fired edge trigger, restored if the load fails.
    LoadNext { trigger: Option<String> },
    LoadPrevious { trigger: Option<String> },
    /// Requery from `anchor` (inclusive), or from the first visible row when
    /// `None`.
    RefreshVisibleWindow { anchor: Option<String> },
    ReconcileSingle { record_id: String },
    Changed(RecordChange<R>),
    Shutdown,
}

impl<R, F> PagerOp<R, F> {
    /// Superseding operations cancel everything queued or running before
    /// them. A reload cancelled this way is still applied by the next
    /// refresh.
    fn supersedes(&self) -> bool {
        matches!(
            self,
            PagerOp::Reload { .. } | PagerOp::RefreshVisibleWindow { .. }
        )
    }

    fn name(&self) -> &'static str {
        match self {
            PagerOp::Reload { .. } => "reload",
            PagerOp::LoadNext { .. } => "load_next",
            PagerOp::LoadPrevious { .. } => "load_previous",
            PagerOp::RefreshVisibleWindow { .. } => "refresh_visible_window",
            PagerOp::ReconcileSingle { .. } => "reconcile_single",
            PagerOp::Changed(_) => "changed",
            PagerOp::Shutdown => "shutdown",
        }
    }
}

struct Submission<R, F> {
    id: u64,
    op: PagerOp<R, F>,
    token: CancellationToken,
}

struct Shared {
    triggers: Mutex<EdgeTriggers>,
    /// Token handed to every submission until the next superseding one.
    generation: Mutex<CancellationToken>,
}

/// Paginated list engine for one screen.
///
/// All loads run on a dedicated serial worker; this handle is the queue pair
/// used to submit operations and receive [`ListUpdate`]s. Dropping the handle
/// stops the worker.
pub struct CursorPager<S: RecordStore> {
    next_id: AtomicU64,
    tx_sub: Sender<Submission<S::Record, S::Filter>>,
    rx_event: Receiver<ListUpdate<S::Record>>,
    viewport: watch::Sender<Viewport>,
    shared: Arc<Shared>,
}

impl<S: RecordStore> CursorPager<S> {
    /// Start the worker. Must be called from within a Tokio runtime.
    pub fn spawn(
        store: Arc<S>,
        filter: S::Filter,
        order: Order,
        config: PagerConfig,
    ) -> PagerResult<Self> {
        let config = config.validate()?;
        let (tx_sub, rx_sub) = async_channel::bounded(SUBMISSION_CHANNEL_CAPACITY);
        let (tx_event, rx_event) = async_channel::unbounded();
        let (viewport, viewport_rx) = watch::channel(Viewport::default());
        let shared = Arc::new(Shared {
            triggers: Mutex::new(EdgeTriggers::default()),
            generation: Mutex::new(CancellationToken::new()),
        });

        let worker = Worker {
            store,
            config,
            filter,
            order,
            view_model: Arc::new(ViewModel::new(order)),
            viewport: viewport_rx,
            shared: Arc::clone(&shared),
            tx_event,
            pending_reload: None,
        };
        // Runs until `Shutdown` is received or the handle is dropped.
        tokio::spawn(submission_loop(worker, rx_sub));

        Ok(Self {
            next_id: AtomicU64::new(0),
            tx_sub,
            rx_event,
            viewport,
            shared,
        })
    }

    /// Discard the list and load the first page for `filter` and `order`.
    pub async fn reload(&self, filter: S::Filter, order: Order) -> PagerResult<u64> {
        self.submit(PagerOp::Reload { filter, order }).await
    }

    /// Append the page after the last loaded record.
    pub async fn load_next(&self) -> PagerResult<u64> {
        self.submit(PagerOp::LoadNext { trigger: None }).await
    }

    /// Prepend the page before the first loaded record.
    pub async fn load_previous(&self) -> PagerResult<u64> {
        self.submit(PagerOp::LoadPrevious { trigger: None }).await
    }

    pub async fn refresh_visible_window(&self) -> PagerResult<u64> {
        self.submit(PagerOp::RefreshVisibleWindow { anchor: None }).await
    }

    pub async fn reconcile_single(&self, record_id: impl Into<String>) -> PagerResult<u64> {
        self.submit(PagerOp::ReconcileSingle {
            record_id: record_id.into(),
        })
        .await
    }

    /// Feed a change notification from the store.
    pub async fn notify_change(&self, change: RecordChange<S::Record>) -> PagerResult<u64> {
        self.submit(PagerOp::Changed(change)).await
    }

    /// Report the UI's scroll position. Read by the worker when it computes
    /// scroll adjustments and picks the refresh anchor.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.send_replace(viewport);
    }

    /// Call when `record_id` is about to be displayed. Fires and consumes a
    /// matching edge trigger, submitting the corresponding load. If that load
    /// fails the trigger is restored, so displaying the row again retries.
    pub async fn will_display(&self, record_id: &str) -> PagerResult<Option<Edge>> {
        let fired = self.shared.triggers.lock().await.fire(record_id);
        let trigger = Some(record_id.to_string());
        match fired {
            Some(Edge::Tail) => {
                self.submit(PagerOp::LoadNext { trigger }).await?;
            }
            Some(Edge::Head) => {
                self.submit(PagerOp::LoadPrevious { trigger }).await?;
            }
            None => {}
        }
        Ok(fired)
    }

    /// [`Self::will_display`] keyed by position in an applied snapshot.
    pub async fn will_display_row(
        &self,
        snapshot: &ViewModel<S::Record>,
        index_path: IndexPath,
    ) -> PagerResult<Option<Edge>> {
        match snapshot.id_at(index_path) {
            Some(id) => self.will_display(id).await,
            None => Ok(None),
        }
    }

    pub async fn triggers(&self) -> EdgeTriggers {
        self.shared.triggers.lock().await.clone()
    }

    /// Wait for the next snapshot produced by the worker.
    pub async fn next_update(&self) -> PagerResult<ListUpdate<S::Record>> {
        self.rx_event.recv().await.map_err(|_| PagerErr::WorkerGone)
    }

    /// Cancel outstanding work and stop the worker.
    pub async fn shutdown(&self) -> PagerResult<()> {
        self.shared.generation.lock().await.cancel();
        self.submit(PagerOp::Shutdown).await.map(|_| ())
    }

    pub async fn submit(&self, op: PagerOp<S::Record, S::Filter>) -> PagerResult<u64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let token = {
            let mut generation = self.shared.generation.lock().await;
            if op.supersedes() {
                generation.cancel();
                *generation = CancellationToken::new();
            }
            generation.clone()
        };
        self.tx_sub
            .send(Submission { id, op, token })
            .await
            .map_err(|_| PagerErr::WorkerGone)?;
        Ok(id)
    }
}

async fn submission_loop<S: RecordStore>(
    mut worker: Worker<S>,
    rx_sub: Receiver<Submission<S::Record, S::Filter>>,
) {
    while let Ok(sub) = rx_sub.recv().await {
        debug!(id = sub.id, op = sub.op.name(), "Submission");
        if matches!(sub.op, PagerOp::Shutdown) {
            break;
        }
        if sub.token.is_cancelled() {
            debug!(id = sub.id, op = sub.op.name(), "skipping cancelled submission");
            worker.abandon(sub.op);
            continue;
        }
        if let Flow::Stop = worker.handle(sub).await {
            break;
        }
    }
    info!("pager worker exited");
}

#[must_use]
enum Flow {
    Continue,
    Stop,
}

struct Worker<S: RecordStore> {
    store: Arc<S>,
    config: PagerConfig,
    filter: S::Filter,
    order: Order,
    view_model: Arc<ViewModel<S::Record>>,
    viewport: watch::Receiver<Viewport>,
    shared: Arc<Shared>,
    tx_event: Sender<ListUpdate<S::Record>>,
    /// Filter and order of a reload cancelled before it applied. The next
    /// refresh runs it instead of refreshing under the stale filter.
    pending_reload: Option<(S::Filter, Order)>,
}

impl<S: RecordStore> Worker<S> {
    fn abandon(&mut self, op: PagerOp<S::Record, S::Filter>) {
        if let PagerOp::Reload { filter, order } = op {
            self.pending_reload = Some((filter, order));
        }
    }

    async fn handle(&mut self, sub: Submission<S::Record, S::Filter>) -> Flow {
        let Submission { id, op, token } = sub;
        match op {
            PagerOp::Reload { filter, order } => {
                self.pending_reload = None;
                self.reload(id, filter, order, &token).await
            }
            PagerOp::LoadNext { trigger } => self.load_next(id, trigger, &token).await,
            PagerOp::LoadPrevious { trigger } => self.load_previous(id, trigger, &token).await,
            PagerOp::RefreshVisibleWindow { anchor } => {
                self.refresh_visible_window(id, anchor, &token).await
            }
            PagerOp::ReconcileSingle { record_id } => {
                self.reconcile_single(id, &record_id, &token).await
            }
            PagerOp::Changed(RecordChange::Updated(record)) => {
                if self.view_model.contains(record.id()) {
                    self.reconcile_single(id, record.id(), &token).await
                } else if self.filter.is_included(&record) {
                    self.refresh_visible_window(id, None, &token).await
                } else {
                    trace!(record_id = record.id(), "ignoring irrelevant change");
                    Flow::Continue
                }
            }
            PagerOp::Changed(RecordChange::Bulk) => {
                self.refresh_visible_window(id, None, &token).await
            }
            PagerOp::Shutdown => Flow::Stop,
        }
    }

    async fn reload(
        &mut self,
        id: u64,
        filter: S::Filter,
        order: Order,
        token: &CancellationToken,
    ) -> Flow {
        let records = self.query(&filter, order, Offset::None, token).await;
        let Some(records) = records.filter(|_| !token.is_cancelled()) else {
            if token.is_cancelled() {
                self.pending_reload = Some((filter, order));
            }
            return Flow::Continue;
        };

        let page_len = records.len();
        let mut view_model = ViewModel::new(order);
        let inserted = view_model.reload(records);
        self.filter = filter;
        self.order = order;
        self.view_model = Arc::new(view_model);
        {
            let mut triggers = self.shared.triggers.lock().await;
            triggers.previous = None;
            triggers.arm_next(
                &self.view_model,
                page_len,
                self.config.page_size,
                self.config.refill_threshold,
            );
        }
        self.publish(id, UpdateKind::Reload, ScrollAdjustment::ResetToTop, inserted).await
    }

    async fn load_next(
        &mut self,
        id: u64,
        trigger: Option<String>,
        token: &CancellationToken,
    ) -> Flow {
        let Some(anchor) = self.view_model.last().cloned() else {
            debug!("load_next on an empty list");
            return Flow::Continue;
        };
        let offset = Offset::After {
            anchor,
            includes_anchor: false,
        };
        let Some(records) = self.query(&self.filter, self.order, offset, token).await else {
            self.restore_trigger(Edge::Tail, trigger).await;
            return Flow::Continue;
        };
        if token.is_cancelled() {
            return Flow::Continue;
        }

        let page_len = records.len();
        let inserted = Arc::make_mut(&mut self.view_model).append(records);
        self.shared.triggers.lock().await.arm_next(
            &self.view_model,
            page_len,
            self.config.page_size,
            self.config.refill_threshold,
        );
        self.publish(id, UpdateKind::Append, ScrollAdjustment::Preserve, inserted).await
    }

    async fn load_previous(
        &mut self,
        id: u64,
        trigger: Option<String>,
        token: &CancellationToken,
    ) -> Flow {
        let Some(anchor) = self.view_model.first().cloned() else {
            debug!("load_previous on an empty list");
            return Flow::Continue;
        };
        let offset = Offset::Before {
            anchor,
            includes_anchor: false,
        };
        let Some(records) = self.query(&self.filter, self.order, offset, token).await else {
            self.restore_trigger(Edge::Head, trigger).await;
            return Flow::Continue;
        };
        if token.is_cancelled() {
            return Flow::Continue;
        }

        let viewport = self.current_viewport();
        let page_len = records.len();
        let inserted = Arc::make_mut(&mut self.view_model).prepend(records);
        self.shared.triggers.lock().await.arm_previous(
            &self.view_model,
            page_len,
            self.config.refill_threshold,
        );
        let scroll = ScrollAdjustment::for_change_above(&viewport, signed(inserted));
        self.publish(id, UpdateKind::Prepend, scroll, inserted).await
    }

    async fn refresh_visible_window(
        &mut self,
        id: u64,
        anchor: Option<String>,
        token: &CancellationToken,
    ) -> Flow {
        if let Some((filter, order)) = self.pending_reload.take() {
            debug!("refresh superseded a pending reload; applying the reload");
            return self.reload(id, filter, order, token).await;
        }

        let viewport = self.current_viewport();
        let anchor_record = anchor
            .or_else(|| viewport.first_visible.clone())
            .and_then(|anchor_id| self.view_model.record(&anchor_id).cloned());
        let Some(anchor_record) = anchor_record else {
            debug!("refresh anchor is not loaded; reloading instead");
            let filter = self.filter.clone();
            return self.reload(id, filter, self.order, token).await;
        };

        let anchor_id = anchor_record.id().to_string();
        let before = viewport
            .first_visible
            .as_deref()
            .and_then(|visible| self.view_model.flat_index_of(visible));
        let offset = Offset::After {
            anchor: anchor_record,
            includes_anchor: true,
        };
        let Some(records) = self.query(&self.filter, self.order, offset, token).await else {
            return Flow::Continue;
        };
        if token.is_cancelled() {
            return Flow::Continue;
        }

        let page_len = records.len();
        let view_model = Arc::make_mut(&mut self.view_model);
        let len_before = view_model.len();
        view_model.replace_from(&anchor_id, records);
        let inserted = view_model.len().saturating_sub(len_before);
        {
            let mut triggers = self.shared.triggers.lock().await;
            triggers.arm_next(
                &self.view_model,
                page_len,
                self.config.page_size,
                self.config.refill_threshold,
            );
            triggers.rearm_dropped_previous(&self.view_model, self.config.refill_threshold);
        }

        let after = viewport
            .first_visible
            .as_deref()
            .and_then(|visible| self.view_model.flat_index_of(visible));
        let delta = match (before, after) {
            (Some(before), Some(after)) => signed(after) - signed(before),
            _ => 0,
        };
        let scroll = ScrollAdjustment::for_change_above(&viewport, delta);
        self.publish(id, UpdateKind::RefreshWindow, scroll, inserted).await
    }

    async fn reconcile_single(
        &mut self,
        id: u64,
        record_id: &str,
        token: &CancellationToken,
    ) -> Flow {
        let fetched = match self.store.record(record_id).or_cancel(token).await {
            Ok(Ok(fetched)) => fetched,
            Ok(Err(err)) => {
                warn!(record_id, "failed to fetch changed record: {err}");
                return Flow::Continue;
            }
            Err(_) => return Flow::Continue,
        };

        if !self.view_model.contains(record_id) {
            return match fetched {
                Some(record) if self.filter.is_included(&record) => {
                    self.refresh_visible_window(id, None, token).await
                }
                _ => {
                    trace!(record_id, "changed record is not part of this list");
                    Flow::Continue
                }
            };
        }

        let Some(record) = fetched else {
            // A loaded record disappeared; it cannot be patched in place.
            return self.refresh_visible_window(id, None, token).await;
        };
        if token.is_cancelled() {
            return Flow::Continue;
        }
        Arc::make_mut(&mut self.view_model).replace_record(record);
        self.publish(id, UpdateKind::Reconcile, ScrollAdjustment::Preserve, 0).await
    }

    /// Run one page query. `None` means cancelled or failed; both leave the
    /// model and triggers untouched.
    async fn query(
        &self,
        filter: &S::Filter,
        order: Order,
        offset: Offset<S::Record>,
        token: &CancellationToken,
    ) -> Option<Vec<S::Record>> {
        let limit = self.config.page_size;
        match self
            .store
            .query(filter, order, &offset, limit)
            .or_cancel(token)
            .await
        {
            Ok(Ok(records)) => {
                trace!(count = records.len(), %order, "page loaded");
                Some(records)
            }
            Ok(Err(err)) => {
                warn!(%order, "page query failed: {err}");
                None
            }
            Err(_) => {
                debug!(%order, "page query cancelled");
                None
            }
        }
    }

    /// Put back a trigger consumed by a load that produced nothing, unless a
    /// newer one was armed meanwhile.
    async fn restore_trigger(&self, edge: Edge, trigger: Option<String>) {
        let Some(trigger) = trigger else {
            return;
        };
        if !self.view_model.contains(&trigger) {
            return;
        }
        let mut triggers = self.shared.triggers.lock().await;
        let slot = match edge {
            Edge::Tail => &mut triggers.next,
            Edge::Head => &mut triggers.previous,
        };
        if slot.is_none() {
            *slot = Some(trigger);
        }
    }

    /// The reported viewport, falling back to the first loaded row when the
    /// UI has not reported one.
    fn current_viewport(&self) -> Viewport {
        let mut viewport = self.viewport.borrow().clone();
        let known = viewport
            .first_visible
            .as_deref()
            .is_some_and(|id| self.view_model.contains(id));
        if !known {
            viewport.first_visible = self.view_model.first().map(|r| r.id().to_string());
        }
        viewport
    }

    async fn publish(
        &self,
        id: u64,
        kind: UpdateKind,
        scroll: ScrollAdjustment,
        inserted: usize,
    ) -> Flow {
        let triggers = self.shared.triggers.lock().await.clone();
        let (ack_tx, ack_rx) = oneshot::channel();
        let update = ListUpdate {
            id,
            kind,
            snapshot: Arc::clone(&self.view_model),
            scroll,
            triggers,
            inserted,
            ack: Some(ack_tx),
        };
        if self.tx_event.send(update).await.is_err() {
            return Flow::Stop;
        }
        // A dropped update counts as applied.
        let _ = ack_rx.await;
        Flow::Continue
    }
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}
