//! Randomized tile packing for infinite mosaic feeds.
//!
//! A [`FeedSession`] turns a pool of content items into an ordered list of
//! [`PlacedTile`]s for a responsive grid. The initial layout covers a few
//! screens of worst-case rows; every [`FeedSession::extend`] appends another
//! segment below it without touching tiles that are already placed. Each
//! segment covers exactly its cell budget: content tiles are drawn from a
//! weighted size catalog under per-segment caps, and colored filler tiles
//! absorb the rest.
//!
//! Fetching, stale-response handling and async wiring live in the
//! `mosaic-shard` crate; this crate is synchronous and free of I/O.
pub mod arrange;
pub mod catalog;
pub mod config;
pub mod error;
pub mod grid;
pub mod layout;
pub mod planner;
pub mod random;
pub mod session;
pub mod signal;
pub mod tile;
pub mod trigger;

pub use crate::{
    arrange::{Arrangement, Placement, arrange},
    catalog::TileFootprint,
    config::{FeedConfig, PlanLimits, Span},
    error::{FeedError, Result},
    grid::{Breakpoints, GridConfig, MAX_CELL_BUDGET, Viewport, cell_budget},
    layout::{LayoutState, Segment},
    planner::Planner,
    random::{DefaultRng, seeded_rng},
    session::{FeedSession, ResizeOutcome},
    signal::{Signal, Subscription},
    tile::{Color, ContentId, ContentItem, PlacedTile, TileKey, TileKind},
    trigger::{LoadTicket, NearEndSource, ScrollTrigger, ViewportMetrics},
};
