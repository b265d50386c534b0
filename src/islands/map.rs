//! Island bookkeeping: which islands exist, how damaged they are, and
//! whether they are still standing.

use std::collections::BTreeMap;

use bevy::prelude::*;
use crate::farming::PlotGrid;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Island {
    pub coord: Coord,
    /// 0..=MAX_ISLAND_DAMAGE
    pub damage: u8,
    /// false once destroyed; never flips back.
    pub visible: bool,
}

impl Island {
    fn new(coord: Coord) -> Self {
        Self { coord, damage: 0, visible: true }
    }

    pub fn is_destroyed(&self) -> bool {
        !self.visible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// New damage level, still below the cap.
    Damaged(u8),
    /// This call reached the cap: plots deprecated, island hidden.
    Destroyed,
    /// Unknown island, or already destroyed.
    Ignored,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct IslandMap {
    islands: BTreeMap<Coord, Island>,
}

impl IslandMap {
    /// Registers `coord` and materializes its plots. No-op (false) if the
    /// island is already known.
    pub fn create(&mut self, coord: Coord, grid: &mut PlotGrid) -> bool {
        if self.islands.contains_key(&coord) {
            return false;
        }
        grid.create_island_plots(coord);
        self.islands.insert(coord, Island::new(coord));
        true
    }

    /// Same as `create`, for islands opened up mid-round.
    pub fn unlock(&mut self, coord: Coord, grid: &mut PlotGrid) -> bool {
        let created = self.create(coord, grid);
        if created {
            info!("[Island] Unlocked island {}", coord);
        }
        created
    }

    pub fn register_damage(&mut self, coord: Coord, grid: &mut PlotGrid) -> DamageOutcome {
        let Some(island) = self.islands.get_mut(&coord) else {
            return DamageOutcome::Ignored;
        };
        if island.is_destroyed() {
            return DamageOutcome::Ignored;
        }
        island.damage = (island.damage + 1).min(MAX_ISLAND_DAMAGE);
        if island.damage < MAX_ISLAND_DAMAGE {
            return DamageOutcome::Damaged(island.damage);
        }
        island.visible = false;
        let flagged = grid.deprecate_island_plots(coord);
        info!("[Island] Island {} destroyed ({} plots lost)", coord, flagged);
        DamageOutcome::Destroyed
    }

    /// True iff at least one island is known and every known island is hidden.
    pub fn check_all_destroyed(&self) -> bool {
        !self.is_empty() && self.islands.values().all(Island::is_destroyed)
    }

    pub fn get(&self, coord: Coord) -> Option<&Island> {
        self.islands.get(&coord)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.islands.contains_key(&coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Island> {
        self.islands.values()
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    pub fn clear(&mut self) {
        self.islands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> (IslandMap, PlotGrid) {
        let mut map = IslandMap::default();
        let mut grid = PlotGrid::default();
        map.create(Coord::ZERO, &mut grid);
        (map, grid)
    }

    #[test]
    fn damage_counts_up_then_destroys() {
        let (mut map, mut grid) = world();
        assert_eq!(map.register_damage(Coord::ZERO, &mut grid), DamageOutcome::Damaged(1));
        assert_eq!(map.register_damage(Coord::ZERO, &mut grid), DamageOutcome::Damaged(2));
        assert_eq!(map.register_damage(Coord::ZERO, &mut grid), DamageOutcome::Damaged(3));
        assert!(grid.island_plots(Coord::ZERO).all(|p| !p.is_deprecated()));

        assert_eq!(map.register_damage(Coord::ZERO, &mut grid), DamageOutcome::Destroyed);
        let island = map.get(Coord::ZERO).unwrap();
        assert_eq!(island.damage, MAX_ISLAND_DAMAGE);
        assert!(!island.visible);
        assert!(grid.island_plots(Coord::ZERO).all(|p| p.is_deprecated()));
    }

    #[test]
    fn damage_is_capped_after_destruction() {
        let (mut map, mut grid) = world();
        for _ in 0..MAX_ISLAND_DAMAGE {
            map.register_damage(Coord::ZERO, &mut grid);
        }
        for _ in 0..3 {
            assert_eq!(map.register_damage(Coord::ZERO, &mut grid), DamageOutcome::Ignored);
        }
        let island = map.get(Coord::ZERO).unwrap();
        assert_eq!(island.damage, MAX_ISLAND_DAMAGE);
        assert!(!island.visible);
    }

    #[test]
    fn damage_on_unknown_island_is_ignored() {
        let (mut map, mut grid) = world();
        assert_eq!(map.register_damage(Coord::new(4, 4), &mut grid), DamageOutcome::Ignored);
        assert!(!map.contains(Coord::new(4, 4)));
    }

    #[test]
    fn unlock_is_idempotent() {
        let (mut map, mut grid) = world();
        let east = Coord::new(1, 0);
        assert!(map.unlock(east, &mut grid));
        map.register_damage(east, &mut grid);

        assert!(!map.unlock(east, &mut grid));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(east).unwrap().damage, 1);
        assert_eq!(grid.island_plots(east).count(), 9);
    }

    #[test]
    fn all_destroyed_needs_every_island_hidden() {
        let (mut map, mut grid) = world();
        let east = Coord::new(1, 0);
        map.unlock(east, &mut grid);

        for _ in 0..MAX_ISLAND_DAMAGE {
            map.register_damage(Coord::ZERO, &mut grid);
        }
        assert!(!map.check_all_destroyed());
        for _ in 0..MAX_ISLAND_DAMAGE {
            map.register_damage(east, &mut grid);
        }
        assert!(map.check_all_destroyed());
    }

    #[test]
    fn empty_map_is_not_destroyed() {
        assert!(!IslandMap::default().check_all_destroyed());
    }
}
