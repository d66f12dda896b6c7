//! Feed configuration.
//!
//! ## Usage
//!
//! Start from [`FeedConfig::default`] and override the fields you need. With
//! the `serde` feature the config deserializes from any serde format; missing
//! fields take their defaults.
//!
//! ```
//! use mosaic_feed::config::FeedConfig;
//!
//! let config = FeedConfig {
//!     seed: Some(7),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{FeedError, Result},
    grid::{Breakpoints, DEFAULT_SCREENS_AHEAD, DEFAULT_WORST_CASE_ROWS},
};

/// Inclusive range drawn from once per growth segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T> Span<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

/// Limits the planner applies to each growth segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanLimits {
    /// Share of the segment budget reserved for filler tiles.
    pub filler_share: Span<f64>,
    /// Maximum number of 3×3 tiles.
    pub max_large_tiles: u32,
    /// Range the 2×2 cap is drawn from.
    pub max_medium_tiles: Span<u32>,
}

impl Default for PlanLimits {
    fn default() -> Self {
        FeedConfig::default().plan_limits()
    }
}

/// Tunables of a feed session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeedConfig {
    /// Width thresholds for 3/4/5/6 columns.
    pub breakpoints: Breakpoints,
    /// Viewport heights covered by the initial budget.
    pub screens_ahead: f32,
    /// Row count assumed for every tile when sizing the budget.
    pub worst_case_rows: u32,
    /// Each extension asks for `initial_budget / extension_divisor` cells.
    pub extension_divisor: u32,
    /// Share of each segment reserved for filler tiles.
    pub filler_share: Span<f64>,
    /// Maximum number of 3×3 tiles per segment.
    pub max_large_tiles: u32,
    /// Range the per-segment 2×2 cap is drawn from.
    pub max_medium_tiles: Span<u32>,
    /// Distance in pixels at which the end sentinel counts as reached.
    pub near_end_proximity_px: f32,
    /// Rebuild the layout when a resize changes the budget.
    pub reload_on_resize: bool,
    /// Fixed seed for the randomizer.
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            screens_ahead: DEFAULT_SCREENS_AHEAD,
            worst_case_rows: DEFAULT_WORST_CASE_ROWS,
            extension_divisor: 2,
            filler_share: Span::new(0.1, 0.2),
            max_large_tiles: 1,
            max_medium_tiles: Span::new(1, 2),
            near_end_proximity_px: 200.0,
            reload_on_resize: false,
            seed: None,
        }
    }
}

impl FeedConfig {
    /// Checks ranges and divisors.
    pub fn validate(&self) -> Result<()> {
        self.breakpoints.validate()?;
        if !(self.screens_ahead.is_finite() && self.screens_ahead > 0.0) {
            return Err(FeedError::config("screens_ahead", "must be positive"));
        }
        if self.worst_case_rows == 0 {
            return Err(FeedError::config("worst_case_rows", "must be at least 1"));
        }
        if self.extension_divisor == 0 {
            return Err(FeedError::config("extension_divisor", "must be at least 1"));
        }
        let share = self.filler_share;
        if !(0.0..=1.0).contains(&share.min) || !(0.0..=1.0).contains(&share.max) {
            return Err(FeedError::config("filler_share", "must lie within 0..=1"));
        }
        if share.min > share.max {
            return Err(FeedError::config("filler_share", "min exceeds max"));
        }
        if self.max_medium_tiles.min > self.max_medium_tiles.max {
            return Err(FeedError::config("max_medium_tiles", "min exceeds max"));
        }
        if !(self.near_end_proximity_px.is_finite() && self.near_end_proximity_px >= 0.0) {
            return Err(FeedError::config(
                "near_end_proximity_px",
                "must be a non-negative number",
            ));
        }
        Ok(())
    }

    pub fn plan_limits(&self) -> PlanLimits {
        PlanLimits {
            filler_share: self.filler_share,
            max_large_tiles: self.max_large_tiles,
            max_medium_tiles: self.max_medium_tiles,
        }
    }
}
