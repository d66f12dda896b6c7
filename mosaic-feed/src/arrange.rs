//! Positions tiles on the grid the way a row-major auto-flow grid would.
//!
//! Layout state only stores tiles in fill order; hosts that draw the mosaic
//! themselves (terminal previews, canvas renderers) use [`arrange`] to get
//! concrete cell coordinates. Placement is sparse: the cursor only moves
//! forward, so a hole left by a wide tile is never back-filled.
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::tile::PlacedTile;

/// Grid position of one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Placement {
    /// Index into the arranged tile slice.
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

/// Every tile's position plus the resulting occupancy grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Arrangement {
    columns: usize,
    placements: Vec<Placement>,
    occupancy: Vec<Vec<Option<usize>>>,
}

impl Arrangement {
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of grid rows touched by any tile.
    pub fn rows(&self) -> usize {
        self.occupancy.len()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Index of the tile covering `(row, col)`, if any.
    pub fn cell(&self, row: usize, col: usize) -> Option<usize> {
        self.occupancy.get(row)?.get(col).copied().flatten()
    }

    /// Cells inside the used rows that no tile covers.
    pub fn holes(&self) -> usize {
        self.occupancy
            .iter()
            .flatten()
            .filter(|cell| cell.is_none())
            .count()
    }

    fn is_free(&self, row: usize, col: usize, rows: usize, cols: usize) -> bool {
        (row..row + rows).all(|r| (col..col + cols).all(|c| self.cell(r, c).is_none()))
    }

    fn occupy(&mut self, placement: Placement) {
        let needed = placement.row + placement.rows;
        let columns = self.columns;
        if self.occupancy.len() < needed {
            self.occupancy.resize_with(needed, || vec![None; columns]);
        }
        for row in &mut self.occupancy[placement.row..needed] {
            for cell in &mut row[placement.col..placement.col + placement.cols] {
                *cell = Some(placement.index);
            }
        }
        self.placements.push(placement);
    }
}

/// Places `tiles` in order on a grid `columns` wide.
///
/// Tiles wider than the grid are clamped to its width, which matches how a
/// browser grid treats an oversized span.
pub fn arrange(tiles: &[PlacedTile], columns: u32) -> Arrangement {
    let columns = columns.max(1) as usize;
    let mut arrangement = Arrangement {
        columns,
        ..Default::default()
    };
    let (mut cursor_row, mut cursor_col) = (0usize, 0usize);

    for (index, tile) in tiles.iter().enumerate() {
        let rows = tile.footprint.rows.max(1) as usize;
        let cols = (tile.footprint.cols.max(1) as usize).min(columns);

        loop {
            if cursor_col + cols > columns {
                cursor_row += 1;
                cursor_col = 0;
                continue;
            }
            if arrangement.is_free(cursor_row, cursor_col, rows, cols) {
                break;
            }
            cursor_col += 1;
        }

        arrangement.occupy(Placement {
            index,
            row: cursor_row,
            col: cursor_col,
            rows,
            cols,
        });
        cursor_col += cols;
    }
    arrangement
}
