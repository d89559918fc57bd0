use std::sync::Arc;
use std::time::Duration;

use ledger_pager::Order;
use ledger_pager::PagerConfig;
use ledger_pager::RecordChange;
use ledger_pager::UpdateKind;
use ledger_pager::changes::forward_changes;
use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

use super::support::Row;
use super::support::RowFilter;
use super::support::RowStore;
use super::support::next_applied;
use super::support::row;
use super::support::spawn_pager;

#[tokio::test]
async fn forwards_changes_until_feed_closes() {
    let store = RowStore::spread(20, 1);
    let pager = Arc::new(spawn_pager(&store, PagerConfig::default()));
    pager.reload(RowFilter::default(), Order::Newest).await.unwrap();
    next_applied(&pager).await;

    let (tx, rx) = broadcast::channel(16);
    let forwarder = forward_changes(Arc::clone(&pager), rx);

    let changed = Row {
        note: "memo".to_string(),
        ..row(4)
    };
    store.upsert(changed.clone()).await;
    tx.send(RecordChange::Updated(changed.clone())).unwrap();

    let applied = next_applied(&pager).await;
    assert_eq!(applied.kind, UpdateKind::Reconcile);
    assert_eq!(applied.snapshot.record("r0004"), Some(&changed));

    drop(tx);
    tokio::time::timeout(Duration::from_secs(5), forwarder)
        .await
        .expect("forwarder stops when the feed closes")
        .unwrap();
}

#[tokio::test]
async fn lagged_feed_becomes_bulk_refresh() {
    let store = RowStore::spread(20, 1);
    let pager = Arc::new(spawn_pager(&store, PagerConfig::default()));
    pager.reload(RowFilter::default(), Order::Newest).await.unwrap();
    next_applied(&pager).await;

    let (tx, rx) = broadcast::channel(1);
    for ts in [1, 2, 3] {
        tx.send(RecordChange::Updated(row(ts))).unwrap();
    }
    let _forwarder = forward_changes(Arc::clone(&pager), rx);

    assert_eq!(next_applied(&pager).await.kind, UpdateKind::RefreshWindow);
    assert_eq!(next_applied(&pager).await.kind, UpdateKind::Reconcile);
}
