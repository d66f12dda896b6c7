//! Responsive grid resolution and cell budgets.
//!
//! ## Usage
//!
//! Resolve a [`GridConfig`] from the viewport width on every resize, then size
//! the next planning pass with [`cell_budget`].
//!
//! ```
//! use mosaic_feed::grid::{GridConfig, cell_budget};
//!
//! let grid = GridConfig::resolve(600.0);
//! assert_eq!(grid.columns, 3);
//! assert_eq!(cell_budget(800.0, grid.cell_height, grid.columns), 72);
//! ```
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

/// Default number of viewport heights the initial budget covers.
pub const DEFAULT_SCREENS_AHEAD: f32 = 2.0;

/// Default row count assumed for every tile when sizing a budget.
pub const DEFAULT_WORST_CASE_ROWS: u32 = 3;

/// Largest budget a session accepts for one planning pass.
pub const MAX_CELL_BUDGET: usize = 1 << 20;

/// Visible area of the host in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Viewport {
    /// Width in logical pixels.
    pub width: f32,
    /// Height in logical pixels.
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport without validating it.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the viewport if both sides are finite and positive.
    pub fn validated(self) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(self)
        } else {
            Err(FeedError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Width thresholds at which the grid gains a column.
///
/// Widths below `small` get 3 columns, below `medium` 4, below `large` 5, and
/// anything wider 6.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Breakpoints {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            small: 768.0,
            medium: 1024.0,
            large: 1280.0,
        }
    }
}

impl Breakpoints {
    /// Column count for a viewport width.
    pub fn columns_for(&self, width: f32) -> u32 {
        if width < self.small {
            3
        } else if width < self.medium {
            4
        } else if width < self.large {
            5
        } else {
            6
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let ordered = self.small.is_finite()
            && self.medium.is_finite()
            && self.large.is_finite()
            && 0.0 < self.small
            && self.small < self.medium
            && self.medium < self.large;
        if ordered {
            Ok(())
        } else {
            Err(FeedError::config(
                "breakpoints",
                format!(
                    "expected 0 < small < medium < large, got {} / {} / {}",
                    self.small, self.medium, self.large
                ),
            ))
        }
    }
}

/// Column count and square cell height for one viewport width.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridConfig {
    /// Number of grid columns, one of 3, 4, 5 or 6.
    pub columns: u32,
    /// Height of one grid row; cells are square so this is `width / columns`.
    pub cell_height: f32,
}

impl GridConfig {
    /// Resolves the grid for `width` using the default breakpoints.
    pub fn resolve(width: f32) -> Self {
        Self::resolve_with(&Breakpoints::default(), width)
    }

    /// Resolves the grid for `width` using custom breakpoints.
    pub fn resolve_with(breakpoints: &Breakpoints, width: f32) -> Self {
        let columns = breakpoints.columns_for(width);
        Self {
            columns,
            cell_height: width / columns as f32,
        }
    }
}

/// Cells needed to cover two viewport heights even if every tile were 3 rows
/// tall.
///
/// Over-provisions on purpose; the planner stops once the budget is met.
pub fn cell_budget(viewport_height: f32, cell_height: f32, columns: u32) -> usize {
    cell_budget_with(
        viewport_height,
        cell_height,
        columns,
        DEFAULT_SCREENS_AHEAD,
        DEFAULT_WORST_CASE_ROWS,
    )
}

/// [`cell_budget`] with an explicit screen count and worst-case tile height.
///
/// Computed as `ceil((screens * height / cell_height) * rows) * columns`,
/// saturating at `usize::MAX`.
pub fn cell_budget_with(
    viewport_height: f32,
    cell_height: f32,
    columns: u32,
    screens_ahead: f32,
    worst_case_rows: u32,
) -> usize {
    if !(cell_height.is_finite() && cell_height > 0.0) || viewport_height <= 0.0 {
        return 0;
    }
    let target_height = f64::from(viewport_height) * f64::from(screens_ahead);
    let rows = (target_height / f64::from(cell_height) * f64::from(worst_case_rows)).ceil();
    if rows.is_nan() || rows <= 0.0 {
        return 0;
    }
    // Float to int casts saturate.
    (rows as usize).saturating_mul(columns as usize)
}

/// [`cell_budget_with`] for a session, rejecting budgets above
/// [`MAX_CELL_BUDGET`].
pub(crate) fn checked_budget(
    viewport_height: f32,
    grid: GridConfig,
    screens_ahead: f32,
    worst_case_rows: u32,
) -> Result<usize> {
    let cells = cell_budget_with(
        viewport_height,
        grid.cell_height,
        grid.columns,
        screens_ahead,
        worst_case_rows,
    );
    if cells > MAX_CELL_BUDGET {
        return Err(FeedError::BudgetTooLarge {
            cells,
            limit: MAX_CELL_BUDGET,
        });
    }
    Ok(cells)
}
