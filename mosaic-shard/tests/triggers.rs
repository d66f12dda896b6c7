use std::{sync::Arc, thread};

use mosaic_feed::{FeedConfig, FeedError, Signal, Viewport, ViewportMetrics};
use mosaic_shard::{ContentLoader, FeedController, PublicUrlStore, StaticContentSource, StoredPost};

async fn loaded_controller(config: FeedConfig) -> Arc<FeedController> {
    let rows = (0..80)
        .map(|i| StoredPost::new(format!("p{i}"), None))
        .collect();
    let loader = ContentLoader::new(
        Arc::new(StaticContentSource::new(rows)),
        Arc::new(PublicUrlStore::new("https://cdn.test")),
    );
    let controller = FeedController::new(config, Viewport::new(600.0, 800.0), loader)
        .expect("valid controller");
    controller.refresh().await.expect("refresh");
    Arc::new(controller)
}

fn seeded() -> FeedConfig {
    FeedConfig {
        seed: Some(5),
        ..Default::default()
    }
}

#[tokio::test]
async fn near_end_during_inflight_extension_is_ignored() {
    let controller = loaded_controller(seeded()).await;
    let near_end = Signal::<()>::new();
    let resize = Signal::<Viewport>::new();
    let _attached = controller.attach(&near_end, &resize);
    let plans = controller.with_session_ref(|s| s.plan_count());

    let ticket = controller.trigger().try_begin().expect("idle trigger");
    near_end.emit(&());
    near_end.emit(&());
    assert_eq!(controller.with_session_ref(|s| s.plan_count()), plans);
    assert!(matches!(controller.extend(), Err(FeedError::ExtensionInFlight)));

    drop(ticket);
    near_end.emit(&());
    assert_eq!(controller.with_session_ref(|s| s.plan_count()), plans + 1);
    assert_eq!(controller.snapshot().state.total_cells(), 72 + 36);
}

#[tokio::test]
async fn scroll_metrics_extend_only_near_the_end() {
    let controller = loaded_controller(seeded()).await;

    let far = ViewportMetrics::new(0.0, 800.0, 4000.0);
    assert_eq!(controller.on_scroll(far), Ok(None));

    let near = ViewportMetrics::new(3000.0, 800.0, 4000.0);
    assert_eq!(controller.on_scroll(near), Ok(Some(36)));
    assert!(!controller.trigger().is_in_flight());
}

#[tokio::test]
async fn concurrent_extensions_never_double_append() {
    let controller = loaded_controller(seeded()).await;
    let before = controller.with_session_ref(|s| s.plan_count());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let controller = controller.clone();
            thread::spawn(move || controller.extend())
        })
        .collect();
    let succeeded = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .filter(|result| {
            assert!(matches!(result, Ok(36) | Err(FeedError::ExtensionInFlight)));
            result.is_ok()
        })
        .count();

    assert!(succeeded >= 1);
    controller.with_session_ref(|session| {
        assert_eq!(session.plan_count(), before + succeeded as u64);
        assert_eq!(session.state().total_cells(), 72 + 36 * succeeded);
    });
}

#[tokio::test]
async fn resize_signal_rebudgets_without_touching_tiles() {
    let controller = loaded_controller(seeded()).await;
    let near_end = Signal::<()>::new();
    let resize = Signal::new();
    let attached = controller.attach(&near_end, &resize);
    let before = controller.snapshot().state.tiles().to_vec();

    resize.emit(&Viewport::new(1400.0, 800.0));
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.grid.columns, 6);
    assert_eq!(snapshot.state.tiles(), &before[..]);

    // Invalid sizes are logged and ignored.
    resize.emit(&Viewport::new(-1.0, 800.0));
    assert_eq!(controller.snapshot().grid.columns, 6);

    drop(attached);
    assert_eq!(resize.listener_count(), 0);
    assert_eq!(near_end.listener_count(), 0);
}
