//! Tile footprints, the weighted size catalogs, and per-segment caps.
//!
//! Catalog weights come from duplication: a shape listed twice is twice as
//! likely to be drawn as a shape listed once.
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Size of a tile in grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileFootprint {
    pub rows: u32,
    pub cols: u32,
}

impl TileFootprint {
    /// The 1×1 footprint, which fits every grid and every remaining budget.
    pub const UNIT: Self = Self::new(1, 1);
    /// The 2×2 footprint, capped per segment.
    pub const MEDIUM: Self = Self::new(2, 2);
    /// The 3×3 footprint, capped per segment.
    pub const LARGE: Self = Self::new(3, 3);

    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Number of grid cells this footprint covers.
    pub const fn cells(self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Whether the footprint fits in a grid with `columns` columns.
    pub const fn fits(self, columns: u32) -> bool {
        self.cols <= columns
    }
}

/// Footprints drawn for content tiles.
pub const CONTENT_CATALOG: [TileFootprint; 10] = [
    TileFootprint::new(1, 1),
    TileFootprint::new(1, 1),
    TileFootprint::new(2, 1),
    TileFootprint::new(2, 1),
    TileFootprint::new(1, 2),
    TileFootprint::new(1, 2),
    TileFootprint::new(2, 2),
    TileFootprint::new(3, 2),
    TileFootprint::new(2, 3),
    TileFootprint::new(3, 3),
];

/// Footprints drawn for filler tiles.
pub const FILLER_CATALOG: [TileFootprint; 4] = [
    TileFootprint::new(1, 1),
    TileFootprint::new(1, 1),
    TileFootprint::new(2, 1),
    TileFootprint::new(1, 2),
];

type Shapes = SmallVec<[TileFootprint; 10]>;

fn fitting(catalog: &[TileFootprint], columns: u32) -> Shapes {
    catalog.iter().copied().filter(|s| s.fits(columns)).collect()
}

fn pick<R: Rng + ?Sized>(shapes: &[TileFootprint], rng: &mut R) -> Option<TileFootprint> {
    if shapes.is_empty() {
        None
    } else {
        Some(shapes[rng.random_range(0..shapes.len())])
    }
}

/// Limits on large shapes within one growth segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentCaps {
    large_limit: u32,
    medium_limit: u32,
    large_placed: u32,
    medium_placed: u32,
}

impl SegmentCaps {
    /// Allows at most `large_limit` 3×3 and `medium_limit` 2×2 tiles.
    pub const fn new(large_limit: u32, medium_limit: u32) -> Self {
        Self {
            large_limit,
            medium_limit,
            large_placed: 0,
            medium_placed: 0,
        }
    }

    /// Whether another tile of `shape` may still be placed.
    pub fn allows(&self, shape: TileFootprint) -> bool {
        if shape == TileFootprint::LARGE {
            self.large_placed < self.large_limit
        } else if shape == TileFootprint::MEDIUM {
            self.medium_placed < self.medium_limit
        } else {
            true
        }
    }

    /// Counts a placed tile against the caps.
    pub fn record(&mut self, shape: TileFootprint) {
        if shape == TileFootprint::LARGE {
            self.large_placed += 1;
        } else if shape == TileFootprint::MEDIUM {
            self.medium_placed += 1;
        }
    }

    pub fn large_placed(&self) -> u32 {
        self.large_placed
    }

    pub fn medium_placed(&self) -> u32 {
        self.medium_placed
    }

    pub fn medium_limit(&self) -> u32 {
        self.medium_limit
    }
}

/// Draws a content footprint that fits `columns` and respects `caps`.
///
/// A capped draw is redrawn from the fitting shapes the caps still allow, and
/// falls back to 1×1 when nothing else remains.
pub fn draw_content_size<R: Rng + ?Sized>(
    columns: u32,
    caps: &SegmentCaps,
    rng: &mut R,
) -> TileFootprint {
    let shapes = fitting(&CONTENT_CATALOG, columns);
    let Some(drawn) = pick(&shapes, rng) else {
        return TileFootprint::UNIT;
    };
    if caps.allows(drawn) {
        return drawn;
    }
    let allowed: Shapes = shapes.into_iter().filter(|s| caps.allows(*s)).collect();
    pick(&allowed, rng).unwrap_or(TileFootprint::UNIT)
}

/// [`draw_content_size`] for a segment with only `max_cells` cells left.
///
/// An oversized draw is redrawn from the allowed shapes that still fit the
/// remainder; 1×1 fits any non-empty remainder.
pub fn draw_content_size_within<R: Rng + ?Sized>(
    columns: u32,
    max_cells: usize,
    caps: &SegmentCaps,
    rng: &mut R,
) -> TileFootprint {
    let drawn = draw_content_size(columns, caps, rng);
    if drawn.cells() <= max_cells {
        return drawn;
    }
    let smaller: Shapes = fitting(&CONTENT_CATALOG, columns)
        .into_iter()
        .filter(|s| s.cells() <= max_cells && caps.allows(*s))
        .collect();
    pick(&smaller, rng).unwrap_or(TileFootprint::UNIT)
}

/// Draws a filler footprint that fits `columns`, or 1×1 if none does.
pub fn draw_filler_size<R: Rng + ?Sized>(columns: u32, rng: &mut R) -> TileFootprint {
    pick(&fitting(&FILLER_CATALOG, columns), rng).unwrap_or(TileFootprint::UNIT)
}
