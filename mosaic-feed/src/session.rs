//! Feed sessions: initial layout, incremental growth, reshuffles and resizes.
//!
//! ## Usage
//!
//! Create a session for the current viewport, hand it the fetched content
//! pool, then call [`FeedSession::extend`] whenever the end of the mosaic is
//! reached.
//!
//! ```
//! use mosaic_feed::{ContentItem, FeedConfig, FeedSession, Viewport};
//!
//! let config = FeedConfig { seed: Some(1), ..Default::default() };
//! let mut session = FeedSession::new(config, Viewport::new(600.0, 800.0))?;
//! session.load_pool(vec![ContentItem::new("a", None), ContentItem::new("b", None)]);
//! assert_eq!(session.state().total_cells(), 72);
//!
//! session.extend()?;
//! assert_eq!(session.state().total_cells(), 108);
//! # Ok::<(), mosaic_feed::FeedError>(())
//! ```
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, instrument};

use crate::{
    config::FeedConfig,
    error::{FeedError, Result},
    grid::{GridConfig, Viewport, checked_budget},
    layout::LayoutState,
    planner::Planner,
    random::{DefaultRng, seeded_rng},
    tile::{ContentItem, KeyAllocator},
};

/// What a resize changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub columns_changed: bool,
    pub budget_changed: bool,
    /// The layout was rebuilt because `reload_on_resize` is set.
    pub reloaded: bool,
}

/// One independent feed: owns its layout, key counter and randomizer.
pub struct FeedSession<R = DefaultRng> {
    config: FeedConfig,
    viewport: Viewport,
    grid: GridConfig,
    initial_budget: usize,
    pool: Option<Arc<[ContentItem]>>,
    state: LayoutState,
    keys: KeyAllocator,
    rng: R,
    plans: u64,
}

impl FeedSession<DefaultRng> {
    /// Creates a session seeded from `config.seed`, or randomly when unset.
    pub fn new(config: FeedConfig, viewport: Viewport) -> Result<Self> {
        let rng = seeded_rng(config.seed);
        Self::with_rng(config, viewport, rng)
    }
}

impl<R: Rng> FeedSession<R> {
    /// Creates a session drawing all randomness from `rng`.
    pub fn with_rng(config: FeedConfig, viewport: Viewport, rng: R) -> Result<Self> {
        config.validate()?;
        let viewport = viewport.validated()?;
        let grid = GridConfig::resolve_with(&config.breakpoints, viewport.width);
        let initial_budget = initial_budget(&config, viewport, grid)?;
        Ok(Self {
            config,
            viewport,
            grid,
            initial_budget,
            pool: None,
            state: LayoutState::new(),
            keys: KeyAllocator::new(),
            rng,
            plans: 0,
        })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    /// Cells requested by a full reload.
    pub fn initial_budget(&self) -> usize {
        self.initial_budget
    }

    /// Cells requested by one [`Self::extend`].
    pub fn extension_budget(&self) -> usize {
        self.initial_budget / self.config.extension_divisor.max(1) as usize
    }

    pub fn has_pool(&self) -> bool {
        self.pool.is_some()
    }

    pub fn pool(&self) -> Option<&[ContentItem]> {
        self.pool.as_deref()
    }

    /// Number of planning passes run so far.
    pub fn plan_count(&self) -> u64 {
        self.plans
    }

    /// Installs a freshly fetched pool and rebuilds the layout from scratch.
    #[instrument(level = "debug", skip(self, items))]
    pub fn load_pool(&mut self, items: impl Into<Arc<[ContentItem]>>) -> &LayoutState {
        let pool = items.into();
        info!(items = pool.len(), "content pool loaded");
        self.pool = Some(pool);
        self.rebuild();
        &self.state
    }

    /// Discards the layout and consumed ids and plans a new initial layout.
    pub fn reshuffle(&mut self) -> Result<&LayoutState> {
        self.require_pool()?;
        self.rebuild();
        Ok(&self.state)
    }

    /// Appends half of the initial budget below the existing tiles.
    pub fn extend(&mut self) -> Result<&LayoutState> {
        self.extend_by(self.extension_budget())
    }

    /// Appends exactly `cells` cells below the existing tiles.
    ///
    /// Existing tiles keep their position, key and footprint, and consumed ids
    /// are not reset.
    #[instrument(level = "debug", skip(self))]
    pub fn extend_by(&mut self, cells: usize) -> Result<&LayoutState> {
        let pool = self.require_pool()?;
        self.run_plan(&pool, cells);
        debug!(
            tiles = self.state.len(),
            cells = self.state.total_cells(),
            "layout extended"
        );
        Ok(&self.state)
    }

    /// Re-resolves the grid and budget for a new viewport.
    ///
    /// Placed tiles are never resized; only later passes see the new column
    /// count and budget. With `reload_on_resize` a changed budget rebuilds the
    /// layout.
    pub fn resize(&mut self, viewport: Viewport) -> Result<ResizeOutcome> {
        let viewport = viewport.validated()?;
        let grid = GridConfig::resolve_with(&self.config.breakpoints, viewport.width);
        let budget = initial_budget(&self.config, viewport, grid)?;
        let mut outcome = ResizeOutcome {
            columns_changed: grid.columns != self.grid.columns,
            budget_changed: budget != self.initial_budget,
            reloaded: false,
        };
        self.viewport = viewport;
        self.grid = grid;
        self.initial_budget = budget;

        if self.config.reload_on_resize && outcome.budget_changed && self.pool.is_some() {
            self.rebuild();
            outcome.reloaded = true;
        }
        debug!(
            columns = grid.columns,
            budget,
            reloaded = outcome.reloaded,
            "viewport resized"
        );
        Ok(outcome)
    }

    fn require_pool(&self) -> Result<Arc<[ContentItem]>> {
        self.pool.clone().ok_or(FeedError::PoolNotLoaded)
    }

    fn rebuild(&mut self) {
        self.state.clear();
        if let Some(pool) = self.pool.clone() {
            self.run_plan(&pool, self.initial_budget);
        }
    }

    fn run_plan(&mut self, pool: &[ContentItem], cells: usize) {
        let columns = self.grid.columns;
        let limits = self.config.plan_limits();
        let (existing, consumed) = self.state.take_for_planning();
        let start = existing.len();
        let tiles = Planner::new(&mut self.rng, &mut self.keys, consumed, limits)
            .plan(existing, pool, cells, columns);
        self.state.commit(tiles, start, cells);
        self.plans += 1;
    }
}

fn initial_budget(config: &FeedConfig, viewport: Viewport, grid: GridConfig) -> Result<usize> {
    checked_budget(
        viewport.height,
        grid,
        config.screens_ahead,
        config.worst_case_rows,
    )
}
