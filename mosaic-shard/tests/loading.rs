use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use futures_util::future::{BoxFuture, FutureExt};
use mosaic_feed::{FeedConfig, FeedError, Viewport};
use mosaic_shard::{
    ContentLoader, ContentSource, FeedController, FeedStatus, FetchOutcome, LoadError, ObjectStore,
    PublicUrlStore, RefreshOutcome, SourceError, StaticContentSource, StoredPost,
};
use tokio::sync::Notify;

fn posts(ids: &[&str]) -> Vec<StoredPost> {
    ids.iter()
        .map(|id| {
            let path = format!("posts/{id}.png");
            StoredPost::new(*id, Some(path.as_str()))
        })
        .collect()
}

fn controller(source: Arc<dyn ContentSource>) -> FeedController {
    let loader = ContentLoader::new(source, Arc::new(PublicUrlStore::new("https://cdn.test")));
    let config = FeedConfig {
        seed: Some(11),
        ..Default::default()
    };
    FeedController::new(config, Viewport::new(600.0, 800.0), loader).expect("valid controller")
}

/// First listing blocks until released, then answers with stale rows or an
/// error; later listings answer immediately.
struct GatedSource {
    calls: AtomicUsize,
    gate: Notify,
    first_fails: bool,
}

impl GatedSource {
    fn new(first_fails: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
            first_fails,
        }
    }
}

impl ContentSource for GatedSource {
    fn list_content_items(&self) -> BoxFuture<'_, Result<Vec<StoredPost>, SourceError>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if call == 0 {
                self.gate.notified().await;
                if self.first_fails {
                    return Err(SourceError::Unavailable("timed out".to_owned()));
                }
                Ok(posts(&["stale-1", "stale-2"]))
            } else {
                Ok(posts(&["fresh-1", "fresh-2"]))
            }
        }
        .boxed()
    }
}

/// Store that refuses one particular path.
struct PickyStore {
    refused: &'static str,
}

impl ObjectStore for PickyStore {
    fn resolve_url<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, SourceError>> {
        let result = if path == self.refused {
            Err(SourceError::Storage {
                path: path.to_owned(),
                reason: "forbidden".to_owned(),
            })
        } else {
            Ok(format!("https://cdn.test/{path}"))
        };
        async move { result }.boxed()
    }
}

fn pool_ids(controller: &FeedController) -> Vec<String> {
    controller.with_session_ref(|session| {
        session
            .pool()
            .unwrap_or_default()
            .iter()
            .map(|item| item.id.to_string())
            .collect()
    })
}

type Refreshed = Result<RefreshOutcome, LoadError>;

/// Runs a refresh that blocks on the source's gate while a second refresh
/// starts and completes, then releases the gate.
async fn overlapping_refreshes(
    controller: &FeedController,
    source: &GatedSource,
) -> (Refreshed, Refreshed) {
    let slow = controller.refresh();
    let fast = async {
        while source.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        let outcome = controller.refresh().await;
        source.gate.notify_one();
        outcome
    };
    tokio::join!(slow, fast)
}

#[tokio::test]
async fn refresh_loads_pool_and_builds_layout() {
    let source = Arc::new(StaticContentSource::new(posts(&["a", "b", "c"])));
    let controller = controller(source.clone());
    assert_eq!(controller.status(), FeedStatus::Idle);

    let outcome = controller.refresh().await.expect("refresh");
    assert_eq!(outcome, RefreshOutcome::Loaded { items: 3, cells: 72 });
    assert_eq!(controller.status(), FeedStatus::Ready);
    assert_eq!(source.calls(), 1);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.grid.columns, 3);
    assert_eq!(snapshot.state.total_cells(), 72);
    for tile in snapshot.state.tiles().iter().filter(|t| !t.is_filler()) {
        let expected = format!("https://cdn.test/posts/{}.png", tile.source_id());
        assert_eq!(tile.media_ref(), Some(expected.as_str()));
    }
}

#[tokio::test]
async fn storage_failure_only_clears_media_reference() {
    let source = Arc::new(StaticContentSource::new(vec![
        StoredPost::new("ok", Some("ok.png")),
        StoredPost::new("bad", Some(" bad.png ")),
        StoredPost::new("blank", Some("  ")),
    ]));
    let loader = ContentLoader::new(source, Arc::new(PickyStore { refused: "bad.png" }));

    let FetchOutcome::Fresh { items, .. } = loader.fetch().await.expect("fetch") else {
        panic!("single fetch cannot be superseded");
    };
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].media_ref.as_deref(), Some("https://cdn.test/ok.png"));
    assert_eq!(items[1].media_ref, None);
    assert_eq!(items[2].media_ref, None);
}

#[tokio::test]
async fn stale_fetch_is_discarded() {
    let source = Arc::new(GatedSource::new(false));
    let controller = controller(source.clone());

    let (slow, fast) = overlapping_refreshes(&controller, &source).await;

    assert_eq!(
        fast.expect("fast refresh"),
        RefreshOutcome::Loaded { items: 2, cells: 72 }
    );
    assert_eq!(
        slow.expect("slow refresh"),
        RefreshOutcome::Superseded { generation: 1 }
    );
    assert_eq!(controller.status(), FeedStatus::Ready);
    assert_eq!(pool_ids(&controller), ["fresh-1", "fresh-2"]);
}

#[tokio::test]
async fn stale_failed_fetch_leaves_newer_pool_alone() {
    let source = Arc::new(GatedSource::new(true));
    let controller = controller(source.clone());

    let (slow, fast) = overlapping_refreshes(&controller, &source).await;

    assert_eq!(
        fast.expect("fast refresh"),
        RefreshOutcome::Loaded { items: 2, cells: 72 }
    );
    assert_eq!(
        slow.expect("stale failure is not reported"),
        RefreshOutcome::Superseded { generation: 1 }
    );
    assert_eq!(controller.status(), FeedStatus::Ready);
    assert_eq!(pool_ids(&controller), ["fresh-1", "fresh-2"]);
    assert_eq!(controller.with_session_ref(|s| s.plan_count()), 1);
}

#[tokio::test]
async fn fetch_overtaken_before_install_is_dropped() {
    let controller = controller(Arc::new(StaticContentSource::new(posts(&["old"]))));
    let fetched = controller.loader().fetch().await.expect("fetch");
    assert!(matches!(fetched, FetchOutcome::Fresh { generation: 1, .. }));

    // A newer refresh starts after the fetch returned but before its install.
    assert_eq!(controller.loader().begin(), 2);
    assert_eq!(
        controller.apply_fetch(fetched),
        RefreshOutcome::Superseded { generation: 1 }
    );
    assert_eq!(controller.status(), FeedStatus::Idle);
    assert!(!controller.with_session_ref(|s| s.has_pool()));
    assert_eq!(controller.with_session_ref(|s| s.plan_count()), 0);

    let outcome = controller.refresh().await.expect("refresh");
    assert!(matches!(outcome, RefreshOutcome::Loaded { items: 1, .. }));
    assert_eq!(pool_ids(&controller), ["old"]);
}

#[tokio::test]
async fn failed_fetch_reports_error_and_plans_nothing() {
    let controller = controller(Arc::new(StaticContentSource::failing("backend down")));

    let err = controller.refresh().await.expect_err("fetch must fail");
    assert!(matches!(err, LoadError::Fetch(SourceError::Unavailable(_))));
    assert_eq!(
        controller.status(),
        FeedStatus::Failed("content source unavailable: backend down".to_owned())
    );
    assert!(matches!(controller.extend(), Err(FeedError::PoolNotLoaded)));
    assert!(controller.snapshot().state.is_empty());
    assert_eq!(controller.with_session_ref(|s| s.plan_count()), 0);
}

#[tokio::test]
async fn recovery_after_failure_loads_normally() {
    let source = Arc::new(StaticContentSource::failing("flaky"));
    let controller = controller(source.clone());
    assert!(controller.refresh().await.is_err());

    source.recover();
    source.set_rows(posts(&["x"]));
    let outcome = controller.refresh().await.expect("second refresh");
    assert!(matches!(outcome, RefreshOutcome::Loaded { items: 1, .. }));
    assert_eq!(controller.status(), FeedStatus::Ready);
}
