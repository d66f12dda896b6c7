//! Host-facing controller tying the loader, the session and the triggers
//! together.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use mosaic_feed::{FeedConfig, Signal, Viewport};
//! use mosaic_shard::{
//!     ContentLoader, FeedController, FeedStatus, PublicUrlStore, StaticContentSource, StoredPost,
//! };
//!
//! let source = StaticContentSource::new(vec![StoredPost::new("1", Some("posts/1.png"))]);
//! let loader = ContentLoader::new(
//!     Arc::new(source),
//!     Arc::new(PublicUrlStore::new("https://cdn.example")),
//! );
//! let config = FeedConfig { seed: Some(3), ..Default::default() };
//! let controller = Arc::new(FeedController::new(config, Viewport::new(600.0, 800.0), loader)?);
//!
//! controller.refresh_blocking()?;
//! assert_eq!(controller.status(), FeedStatus::Ready);
//!
//! let near_end = Signal::<()>::new();
//! let resize = Signal::new();
//! let _attached = controller.attach(&near_end, &resize);
//! near_end.emit(&());
//! assert_eq!(controller.snapshot().state.total_cells(), 108);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
use std::sync::Arc;

use mosaic_feed::{
    FeedConfig, FeedError, FeedSession, GridConfig, LayoutState, NearEndSource, ResizeOutcome,
    ScrollTrigger, Signal, Subscription, Viewport, ViewportMetrics,
};
use parking_lot::{Mutex, RwLock};
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::LoadError,
    loader::{ContentLoader, FetchOutcome},
    runtime,
};

/// Load state shown by the rendering collaborator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "status", content = "message", rename_all = "snake_case")
)]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last fetch failed; carries the error message.
    Failed(String),
}

/// What [`FeedController::refresh`] did with its fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The pool was replaced and the layout rebuilt.
    Loaded { items: usize, cells: usize },
    /// A newer refresh started first; this one changed nothing.
    Superseded { generation: u64 },
}

/// Point-in-time copy of everything a renderer needs.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FeedSnapshot {
    pub status: FeedStatus,
    pub grid: GridConfig,
    pub viewport: Viewport,
    pub state: LayoutState,
}

/// Subscriptions returned by [`FeedController::attach`]; dropping detaches.
#[derive(Debug)]
pub struct Attachment {
    pub near_end: Subscription,
    pub resize: Subscription,
}

/// Owns one feed session and serializes every mutation of it.
pub struct FeedController {
    session: Mutex<FeedSession>,
    status: RwLock<FeedStatus>,
    loader: ContentLoader,
    trigger: ScrollTrigger,
}

impl FeedController {
    pub fn new(
        config: FeedConfig,
        viewport: Viewport,
        loader: ContentLoader,
    ) -> Result<Self, FeedError> {
        let session = FeedSession::new(config, viewport)?;
        Ok(Self::with_session(session, loader))
    }

    pub fn with_session(session: FeedSession, loader: ContentLoader) -> Self {
        let trigger = ScrollTrigger::new(session.config().near_end_proximity_px);
        Self {
            session: Mutex::new(session),
            status: RwLock::new(FeedStatus::Idle),
            loader,
            trigger,
        }
    }

    pub fn status(&self) -> FeedStatus {
        self.status.read().clone()
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    /// Runs `f` against the session while holding its lock.
    pub fn with_session_ref<T>(&self, f: impl FnOnce(&FeedSession) -> T) -> T {
        f(&self.session.lock())
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let session = self.session.lock();
        FeedSnapshot {
            status: self.status(),
            grid: session.grid(),
            viewport: session.viewport(),
            state: session.state().clone(),
        }
    }

    /// Fetches a new pool and rebuilds the layout from it.
    ///
    /// A failed fetch leaves the current layout alone and marks the status as
    /// failed. A fetch overtaken by a newer refresh is discarded.
    #[instrument(level = "debug", skip(self))]
    pub async fn refresh(&self) -> Result<RefreshOutcome, LoadError> {
        self.set_status(FeedStatus::Loading);
        match self.loader.fetch().await {
            Ok(outcome) => Ok(self.apply_fetch(outcome)),
            Err(err) => {
                warn!(%err, "content fetch failed");
                self.set_status(FeedStatus::Failed(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Installs a fetched pool unless a newer fetch has started since.
    ///
    /// The generation is checked again under the session lock, so a result
    /// overtaken after the loader handed it out is still dropped.
    pub fn apply_fetch(&self, outcome: FetchOutcome) -> RefreshOutcome {
        let (generation, items) = match outcome {
            FetchOutcome::Fresh { generation, items } => (generation, items),
            FetchOutcome::Superseded { generation } => {
                return RefreshOutcome::Superseded { generation };
            }
        };

        let mut session = self.session.lock();
        if !self.loader.is_current(generation) {
            debug!(
                generation,
                current = self.loader.generation(),
                "discarding overtaken fetch"
            );
            return RefreshOutcome::Superseded { generation };
        }
        let count = items.len();
        let cells = session.load_pool(items).total_cells();
        self.set_status(FeedStatus::Ready);
        drop(session);

        info!(items = count, cells, "feed refreshed");
        RefreshOutcome::Loaded {
            items: count,
            cells,
        }
    }

    /// [`Self::refresh`] on the shared runtime.
    pub fn refresh_blocking(&self) -> Result<RefreshOutcome, LoadError> {
        runtime::get()?.block_on(self.refresh())
    }

    /// Appends one extension segment; returns the cells added.
    ///
    /// Fails with [`FeedError::ExtensionInFlight`] while another extension is
    /// running.
    pub fn extend(&self) -> Result<usize, FeedError> {
        let _ticket = self
            .trigger
            .try_begin()
            .ok_or(FeedError::ExtensionInFlight)?;
        self.extend_now()
    }

    /// Extends when `metrics` put the end sentinel within range and no
    /// extension is running.
    pub fn on_scroll(&self, metrics: ViewportMetrics) -> Result<Option<usize>, FeedError> {
        let Some(_ticket) = self.trigger.observe(metrics) else {
            return Ok(None);
        };
        self.extend_now().map(Some)
    }

    pub fn reshuffle(&self) -> Result<usize, FeedError> {
        let mut session = self.session.lock();
        let cells = session.reshuffle()?.total_cells();
        info!(cells, "feed reshuffled");
        Ok(cells)
    }

    pub fn resize(&self, viewport: Viewport) -> Result<ResizeOutcome, FeedError> {
        self.session.lock().resize(viewport)
    }

    /// Wires a near-end source and a resize signal to this controller.
    ///
    /// The subscriptions hold only a weak reference, so they never keep the
    /// controller alive.
    pub fn attach(
        self: &Arc<Self>,
        near_end: &impl NearEndSource,
        resize: &Signal<Viewport>,
    ) -> Attachment {
        let weak = Arc::downgrade(self);
        let near_end = near_end.on_near_end(Box::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.handle_near_end();
            }
        }));

        let weak = Arc::downgrade(self);
        let resize = resize.subscribe(move |viewport: &Viewport| {
            if let Some(controller) = weak.upgrade() {
                if let Err(err) = controller.resize(*viewport) {
                    warn!(%err, "ignoring resize");
                }
            }
        });
        Attachment { near_end, resize }
    }

    fn handle_near_end(&self) {
        match self.extend() {
            Ok(cells) => debug!(cells, "extended on near-end"),
            Err(FeedError::ExtensionInFlight) => debug!("extension already in flight"),
            Err(FeedError::PoolNotLoaded) => debug!("near end before content was loaded"),
            Err(err) => warn!(%err, "extension failed"),
        }
    }

    fn extend_now(&self) -> Result<usize, FeedError> {
        let mut session = self.session.lock();
        let before = session.state().total_cells();
        let after = session.extend()?.total_cells();
        Ok(after - before)
    }

    fn set_status(&self, status: FeedStatus) {
        *self.status.write() = status;
    }
}

impl std::fmt::Debug for FeedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedController")
            .field("status", &self.status())
            .field("loader", &self.loader)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}
