//! Layout state: placed tiles, consumed ids, and growth segments.
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::tile::{ConsumedIds, PlacedTile};

/// Tiles appended by one planning pass.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Segment {
    /// Indices of the segment's tiles in [`LayoutState::tiles`].
    pub range: Range<usize>,
    /// Cell budget the pass was asked to fill.
    pub requested_cells: usize,
    pub content_tiles: usize,
    pub filler_tiles: usize,
}

/// Ordered tiles of one layout session and the ids they consumed.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LayoutState {
    tiles: Vec<PlacedTile>,
    #[cfg_attr(feature = "serde", serde(skip))]
    consumed: ConsumedIds,
    segments: Vec<Segment>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiles in grid fill order.
    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }

    pub fn consumed(&self) -> &ConsumedIds {
        &self.consumed
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Tiles appended by the most recent planning pass.
    pub fn last_segment_tiles(&self) -> &[PlacedTile] {
        self.segments
            .last()
            .map(|segment| &self.tiles[segment.range.clone()])
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Sum of `rows * cols` over all tiles.
    pub fn total_cells(&self) -> usize {
        self.tiles.iter().map(PlacedTile::cells).sum()
    }

    /// Drops every tile, segment and consumed id.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.consumed.clear();
        self.segments.clear();
    }

    /// Hands the tile list and consumed set to a planning pass.
    pub(crate) fn take_for_planning(&mut self) -> (Vec<PlacedTile>, &mut ConsumedIds) {
        (std::mem::take(&mut self.tiles), &mut self.consumed)
    }

    /// Stores the planner output and records the new segment.
    pub(crate) fn commit(&mut self, tiles: Vec<PlacedTile>, start: usize, requested_cells: usize) {
        self.tiles = tiles;
        if requested_cells == 0 {
            return;
        }
        let added = &self.tiles[start..];
        let filler_tiles = added.iter().filter(|tile| tile.is_filler()).count();
        self.segments.push(Segment {
            range: start..self.tiles.len(),
            requested_cells,
            content_tiles: added.len() - filler_tiles,
            filler_tiles,
        });
    }
}
