//! Bridge from a store's broadcast change feed into a pager.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::warn;

use crate::CursorPager;
use crate::RecordChange;
use crate::RecordStore;

/// Forward every change on `rx` to `pager` until either side closes.
///
/// Missed notifications (the receiver lagged behind) collapse into a single
/// [`RecordChange::Bulk`], which forces a refresh of the visible window.
pub fn forward_changes<S: RecordStore>(
    pager: Arc<CursorPager<S>>,
    mut rx: broadcast::Receiver<RecordChange<S::Record>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let change = match rx.recv().await {
                Ok(change) => change,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change feed lagged; refreshing visible window");
                    RecordChange::Bulk
                }
                Err(RecvError::Closed) => break,
            };
            if pager.notify_change(change).await.is_err() {
                break;
            }
        }
        debug!("change forwarder exited");
    })
}
