use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::EdgeTriggers;
use crate::ScrollAdjustment;
use crate::ViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Reload,
    Append,
    Prepend,
    RefreshWindow,
    Reconcile,
}

/// A new list snapshot for the UI to apply.
///
/// The pager's worker does not run the next operation until this update is
/// acknowledged with [`ListUpdate::ack`] or dropped.
#[derive(Debug)]
pub struct ListUpdate<R> {
    pub id: u64,
    pub kind: UpdateKind,
    pub snapshot: Arc<ViewModel<R>>,
    pub scroll: ScrollAdjustment,
    pub triggers: EdgeTriggers,
    /// Rows the operation added to the model.
    pub inserted: usize,
    pub(crate) ack: Option<oneshot::Sender<()>>,
}

impl<R> ListUpdate<R> {
    /// Signal that the UI has applied this snapshot.
    pub fn ack(mut self) {
        if let Some(tx) = self.ack.take() {
            let _ = tx.send(());
        }
    }
}
