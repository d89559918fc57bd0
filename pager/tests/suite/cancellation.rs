use std::time::Duration;

use assert_matches::assert_matches;
use ledger_pager::Order;
use ledger_pager::PagerConfig;
use ledger_pager::PagerErr;
use ledger_pager::UpdateKind;
use pretty_assertions::assert_eq;

use super::support::RowFilter;
use super::support::RowStore;
use super::support::assert_quiet;
use super::support::next_applied;
use super::support::spawn_pager;

#[tokio::test]
async fn newer_reload_discards_slow_reload() {
    let store = RowStore::spread(40, 2);
    let pager = spawn_pager(&store, PagerConfig::default());

    let slow = RowFilter::slow(Duration::from_millis(300));
    let only_day_zero = RowFilter {
        exclude_prefix: Some("r01".to_string()),
        delay: Duration::ZERO,
    };
    pager.reload(slow, Order::Newest).await.unwrap();
    pager.reload(only_day_zero, Order::Oldest).await.unwrap();

    let applied = next_applied(&pager).await;
    assert_eq!(applied.kind, UpdateKind::Reload);
    assert_eq!(applied.snapshot.order(), Order::Oldest);
    assert_eq!(applied.snapshot.len(), 20);
    assert!(applied.ids().iter().all(|id| !id.starts_with("r01")));
    assert_eq!(applied.ids().first().map(String::as_str), Some("r0000"));

    assert_quiet(&pager, Duration::from_millis(400)).await;
}

#[tokio::test]
async fn reload_cancels_queued_edge_load() {
    let store = RowStore::spread(120, 3);
    let pager = spawn_pager(&store, PagerConfig::default());
    pager
        .reload(RowFilter::slow(Duration::from_millis(150)), Order::Newest)
        .await
        .unwrap();
    next_applied(&pager).await;

    // Runs under the slow filter; the reload below lands while it sleeps.
    pager.load_next().await.unwrap();
    pager
        .reload(RowFilter::default(), Order::MostValuable)
        .await
        .unwrap();

    let applied = next_applied(&pager).await;
    assert_eq!(applied.kind, UpdateKind::Reload);
    assert_eq!(applied.snapshot.order(), Order::MostValuable);
    assert_eq!(applied.snapshot.len(), 50);
    assert_quiet(&pager, Duration::from_millis(300)).await;
}

#[tokio::test]
async fn updates_wait_for_acknowledgement() {
    let store = RowStore::spread(120, 3);
    let pager = spawn_pager(&store, PagerConfig::default());
    pager.reload(RowFilter::default(), Order::Newest).await.unwrap();
    pager.load_next().await.unwrap();

    let first = pager.next_update().await.unwrap();
    // The append is queued behind the unacknowledged reload.
    assert!(
        tokio::time::timeout(Duration::from_millis(100), pager.next_update())
            .await
            .is_err()
    );
    assert_eq!(first.snapshot.len(), 50);
    first.ack();

    let second = next_applied(&pager).await;
    assert_eq!(second.kind, UpdateKind::Append);
    assert_eq!(second.snapshot.len(), 100);
}

#[tokio::test]
async fn shutdown_stops_the_worker() {
    let store = RowStore::spread(10, 1);
    let pager = spawn_pager(&store, PagerConfig::default());

    pager.shutdown().await.unwrap();

    assert_matches!(pager.next_update().await, Err(PagerErr::WorkerGone));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let store = RowStore::spread(10, 1);
    let config = PagerConfig {
        page_size: 5,
        refill_threshold: 5,
    };

    let result = ledger_pager::CursorPager::spawn(
        store,
        RowFilter::default(),
        Order::Newest,
        config,
    );

    assert!(matches!(result, Err(PagerErr::InvalidConfig(_))));
}

#[tokio::test]
async fn refresh_applies_reload_it_superseded() {
    let store = RowStore::spread(40, 2);
    let pager = spawn_pager(&store, PagerConfig::default());
    pager.reload(RowFilter::default(), Order::Newest).await.unwrap();
    assert_eq!(next_applied(&pager).await.snapshot.order(), Order::Newest);

    let only_day_zero = RowFilter {
        exclude_prefix: Some("r01".to_string()),
        delay: Duration::from_millis(150),
    };
    pager.reload(only_day_zero, Order::Oldest).await.unwrap();
    pager.refresh_visible_window().await.unwrap();

    let applied = next_applied(&pager).await;
    assert_eq!(applied.kind, UpdateKind::Reload);
    assert_eq!(applied.snapshot.order(), Order::Oldest);
    assert_eq!(applied.snapshot.len(), 20);
    assert!(applied.ids().iter().all(|id| !id.starts_with("r01")));

    // Later refreshes keep the new filter.
    pager.refresh_visible_window().await.unwrap();
    let refreshed = next_applied(&pager).await;
    assert_eq!(refreshed.kind, UpdateKind::RefreshWindow);
    assert_eq!(refreshed.ids(), applied.ids());
    assert_quiet(&pager, Duration::from_millis(300)).await;
}
