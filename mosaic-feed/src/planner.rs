//! Placement planner.
//!
//! A planning pass appends one growth segment to an existing tile list. The
//! new tiles cover exactly the requested number of cells: content first, in
//! shuffled order and subject to the segment caps, then filler tiles for
//! whatever budget is left.
//!
//! # Steps
//!
//! 1. An empty pool fills the whole budget with filler.
//! 2. Otherwise a random 10–20% of the budget is reserved for filler, which
//!    bounds how many content candidates are drawn.
//! 3. Unconsumed items are shuffled and the first candidates taken.
//! 4. Each candidate gets a drawn size. A draw that overflows the remaining
//!    budget is redrawn from the shapes that still fit, so a tight budget
//!    shrinks tiles instead of ending the walk early.
//! 5. Filler closes the segment. A filler draw larger than the remainder is
//!    replaced by 1×1, so the segment lands exactly on budget.
use rand::Rng;
use tracing::{debug, instrument};

use crate::{
    catalog::{SegmentCaps, TileFootprint, draw_content_size_within, draw_filler_size},
    config::PlanLimits,
    random::{count_between, fraction_between, random_color, shuffle},
    tile::{ConsumedIds, ContentItem, FillerOrigin, KeyAllocator, PlacedTile},
};

/// Borrowed session state one planning pass works against.
pub struct Planner<'a, R: ?Sized> {
    rng: &'a mut R,
    keys: &'a mut KeyAllocator,
    consumed: &'a mut ConsumedIds,
    limits: PlanLimits,
}

impl<'a, R: Rng + ?Sized> Planner<'a, R> {
    pub fn new(
        rng: &'a mut R,
        keys: &'a mut KeyAllocator,
        consumed: &'a mut ConsumedIds,
        limits: PlanLimits,
    ) -> Self {
        Self {
            rng,
            keys,
            consumed,
            limits,
        }
    }

    /// Appends tiles covering exactly `target_new_cells` cells to `existing`.
    ///
    /// Ids placed here are added to the consumed set. No tile is wider than
    /// `columns`.
    #[instrument(
        level = "debug",
        skip(self, existing, pool),
        fields(existing = existing.len(), pool = pool.len())
    )]
    pub fn plan(
        &mut self,
        existing: Vec<PlacedTile>,
        pool: &[ContentItem],
        target_new_cells: usize,
        columns: u32,
    ) -> Vec<PlacedTile> {
        let mut tiles = existing;
        if target_new_cells == 0 {
            return tiles;
        }

        if pool.is_empty() {
            debug!("empty content pool, filling {target_new_cells} cells with filler");
            self.fill(&mut tiles, target_new_cells, columns, FillerOrigin::EmptyPool);
            return tiles;
        }

        let share = fraction_between(
            self.limits.filler_share.min,
            self.limits.filler_share.max,
            self.rng,
        );
        let filler_reserve = (target_new_cells as f64 * share).floor() as usize;
        let content_estimate = target_new_cells.saturating_sub(filler_reserve);

        let available: Vec<&ContentItem> = pool
            .iter()
            .filter(|item| !self.consumed.contains(&item.id))
            .collect();
        let mut candidates = shuffle(&available, self.rng);
        candidates.truncate(content_estimate.min(available.len()));

        let medium_limit = count_between(
            self.limits.max_medium_tiles.min,
            self.limits.max_medium_tiles.max,
            self.rng,
        );
        let mut caps = SegmentCaps::new(self.limits.max_large_tiles, medium_limit);
        let mut remaining = target_new_cells;
        let mut placed = 0usize;

        for item in candidates {
            if remaining == 0 {
                break;
            }
            if self.consumed.contains(&item.id) {
                continue;
            }
            let size = draw_content_size_within(columns, remaining, &caps, self.rng);
            let key = self.keys.content(&item.id);
            tiles.push(PlacedTile::content(key, size, item));
            self.consumed.insert(item.id.clone());
            caps.record(size);
            remaining -= size.cells();
            placed += 1;
        }

        debug!(
            placed,
            available = available.len(),
            filler_cells = remaining,
            large = caps.large_placed(),
            medium = caps.medium_placed(),
            "content placed"
        );
        self.fill(&mut tiles, remaining, columns, FillerOrigin::Padding);
        tiles
    }

    fn fill(
        &mut self,
        tiles: &mut Vec<PlacedTile>,
        mut remaining: usize,
        columns: u32,
        origin: FillerOrigin,
    ) {
        while remaining > 0 {
            let drawn = draw_filler_size(columns, self.rng);
            let size = if drawn.cells() > remaining {
                TileFootprint::UNIT
            } else {
                drawn
            };
            let key = self.keys.filler(origin);
            let fill = random_color(self.rng);
            tiles.push(PlacedTile::filler(key, size, fill));
            remaining -= size.cells();
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{catalog::TileFootprint, config::Span, tile::ContentId};

    struct Fixture {
        rng: Pcg32,
        keys: KeyAllocator,
        consumed: ConsumedIds,
    }

    impl Fixture {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                keys: KeyAllocator::new(),
                consumed: ConsumedIds::default(),
            }
        }

        fn plan(
            &mut self,
            existing: Vec<PlacedTile>,
            pool: &[ContentItem],
            cells: usize,
            columns: u32,
        ) -> Vec<PlacedTile> {
            Planner::new(
                &mut self.rng,
                &mut self.keys,
                &mut self.consumed,
                PlanLimits::default(),
            )
            .plan(existing, pool, cells, columns)
        }
    }

    fn pool(len: usize) -> Vec<ContentItem> {
        (0..len)
            .map(|i| ContentItem::new(format!("p{i}"), Some(format!("https://cdn/p{i}.jpg"))))
            .collect()
    }

    fn cells(tiles: &[PlacedTile]) -> usize {
        tiles.iter().map(PlacedTile::cells).sum()
    }

    #[test]
    fn empty_pool_fills_budget_with_filler() {
        let mut fx = Fixture::new(1);
        let tiles = fx.plan(Vec::new(), &[], 12, 4);
        assert_eq!(cells(&tiles), 12);
        for tile in &tiles {
            assert_eq!(tile.source_id(), "");
            assert!(tile.fill_color().is_some());
            assert!(tile.key.as_str().starts_with("empty-"));
        }
    }

    #[test]
    fn single_item_with_unit_budget() {
        for seed in 0..50 {
            let mut fx = Fixture::new(seed);
            let pool = vec![ContentItem::new("a", Some("u".to_owned()))];
            let tiles = fx.plan(Vec::new(), &pool, 1, 4);
            assert_eq!(tiles.len(), 1);
            assert_eq!(tiles[0].footprint, TileFootprint::UNIT);
            assert_eq!(tiles[0].source_id(), "a");
            assert!(fx.consumed.contains(&ContentId::from("a")));
        }
    }

    #[test]
    fn zero_budget_returns_existing_unchanged() {
        let mut fx = Fixture::new(2);
        let first = fx.plan(Vec::new(), &pool(5), 8, 3);
        let issued = fx.keys.issued();
        let again = fx.plan(first.clone(), &pool(5), 0, 3);
        assert_eq!(again, first);
        assert_eq!(fx.keys.issued(), issued);
    }

    #[test]
    fn every_segment_lands_exactly_on_budget() {
        for seed in 0..200 {
            let mut fx = Fixture::new(seed);
            let columns = 3 + (seed % 4) as u32;
            let budget = 1 + (seed as usize * 7) % 90;
            let tiles = fx.plan(Vec::new(), &pool(40), budget, columns);
            assert_eq!(cells(&tiles), budget, "seed {seed}");
            assert!(tiles.iter().all(|t| t.footprint.cols <= columns));
        }
    }

    #[test]
    fn caps_hold_within_a_segment() {
        for seed in 0..200 {
            let mut fx = Fixture::new(seed);
            let tiles = fx.plan(Vec::new(), &pool(200), 150, 6);
            let large = tiles
                .iter()
                .filter(|t| t.footprint == TileFootprint::LARGE)
                .count();
            let medium = tiles
                .iter()
                .filter(|t| !t.is_filler() && t.footprint == TileFootprint::MEDIUM)
                .count();
            assert!(large <= 1, "seed {seed}: {large} large tiles");
            assert!(medium <= 2, "seed {seed}: {medium} medium tiles");
        }
    }

    #[test]
    fn appended_segment_keeps_prefix_and_ids_unique() {
        let mut fx = Fixture::new(9);
        let items = pool(30);
        let first = fx.plan(Vec::new(), &items, 20, 4);
        let second = fx.plan(first.clone(), &items, 10, 4);
        assert_eq!(&second[..first.len()], &first[..]);
        assert_eq!(cells(&second[first.len()..]), 10);

        let mut ids: Vec<&str> = second
            .iter()
            .map(PlacedTile::source_id)
            .filter(|id| !id.is_empty())
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn exhausted_pool_degrades_to_filler() {
        let mut fx = Fixture::new(4);
        let items = pool(2);
        let mut tiles = fx.plan(Vec::new(), &items, 30, 3);
        tiles = fx.plan(tiles, &items, 30, 3);
        let content = tiles.iter().filter(|t| !t.is_filler()).count();
        assert!(content <= 2);
        assert_eq!(cells(&tiles), 60);
    }

    #[test]
    fn duplicate_ids_in_pool_are_placed_once() {
        let mut fx = Fixture::new(6);
        let items = vec![
            ContentItem::new("dup", None),
            ContentItem::new("dup", None),
            ContentItem::new("dup", None),
        ];
        let tiles = fx.plan(Vec::new(), &items, 40, 4);
        let count = tiles.iter().filter(|t| t.source_id() == "dup").count();
        assert!(count <= 1);
    }

    #[test]
    fn full_filler_share_still_fills_exactly() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut keys = KeyAllocator::new();
        let mut consumed = ConsumedIds::default();
        let limits = PlanLimits {
            filler_share: Span::new(1.0, 1.0),
            ..PlanLimits::default()
        };
        let tiles = Planner::new(&mut rng, &mut keys, &mut consumed, limits).plan(
            Vec::new(),
            &pool(10),
            16,
            4,
        );
        assert_eq!(cells(&tiles), 16);
        assert!(tiles.iter().all(PlacedTile::is_filler));
        assert!(consumed.is_empty());
    }

    #[test]
    fn same_seed_same_plan() {
        let items = pool(25);
        let a = Fixture::new(77).plan(Vec::new(), &items, 48, 5);
        let b = Fixture::new(77).plan(Vec::new(), &items, 48, 5);
        assert_eq!(a, b);
    }
}
