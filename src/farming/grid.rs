//! Sparse collection of plots, one fixed N×N block per materialized island.

use std::collections::HashMap;

use bevy::prelude::*;
use crate::config::GameConfig;
use crate::shared::*;
use super::plot::{PlantProfile, Plot};

#[derive(Resource, Debug, Clone)]
pub struct PlotGrid {
    side: i32,
    profile: PlantProfile,
    /// island → plots in row-major order (`y * side + x`).
    islands: HashMap<Coord, Vec<Plot>>,
}

impl Default for PlotGrid {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl PlotGrid {
    pub fn new(side: i32, profile: PlantProfile) -> Self {
        Self {
            side,
            profile,
            islands: HashMap::new(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.plots_per_side, PlantProfile::from_config(config))
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    /// Materializes a fresh Virgin block for `island`. Returns false (and
    /// leaves existing plots alone) if the island already has plots.
    pub fn create_island_plots(&mut self, island: Coord) -> bool {
        if self.islands.contains_key(&island) {
            return false;
        }
        let mut plots = Vec::with_capacity((self.side * self.side) as usize);
        for y in 0..self.side {
            for x in 0..self.side {
                plots.push(Plot::new(island, Coord::new(x, y), self.profile));
            }
        }
        self.islands.insert(island, plots);
        true
    }

    pub fn get(&self, island: Coord, local: Coord) -> Option<&Plot> {
        let idx = self.index(local)?;
        self.islands.get(&island)?.get(idx)
    }

    pub fn get_mut(&mut self, island: Coord, local: Coord) -> Option<&mut Plot> {
        let idx = self.index(local)?;
        self.islands.get_mut(&island)?.get_mut(idx)
    }

    pub fn island_plots(&self, island: Coord) -> impl Iterator<Item = &Plot> {
        self.islands.get(&island).into_iter().flatten()
    }

    /// Flags every plot of `island` Deprecated. Returns how many plots were
    /// flagged for the first time.
    pub fn deprecate_island_plots(&mut self, island: Coord) -> usize {
        let Some(plots) = self.islands.get_mut(&island) else {
            return 0;
        };
        let mut flagged = 0;
        for plot in plots.iter_mut().filter(|p| !p.is_deprecated()) {
            plot.be_deprecated();
            flagged += 1;
        }
        flagged
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plot> {
        self.islands.values().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Plot> {
        self.islands.values_mut().flatten()
    }

    pub fn island_count(&self) -> usize {
        self.islands.len()
    }

    fn index(&self, local: Coord) -> Option<usize> {
        let range = 0..self.side;
        if range.contains(&local.x) && range.contains(&local.y) {
            Some((local.y * self.side + local.x) as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_materializes_virgin_block() {
        let mut grid = PlotGrid::default();
        assert!(grid.create_island_plots(Coord::ZERO));
        assert_eq!(grid.island_plots(Coord::ZERO).count(), 9);
        for plot in grid.island_plots(Coord::ZERO) {
            assert_eq!(plot.soil_state(), SoilState::Virgin);
            assert!(!plot.has_plant());
            assert_eq!(plot.island, Coord::ZERO);
        }
        let plot = grid.get(Coord::ZERO, Coord::new(2, 1)).unwrap();
        assert_eq!(plot.local, Coord::new(2, 1));
    }

    #[test]
    fn get_misses_outside_materialized_range() {
        let mut grid = PlotGrid::default();
        grid.create_island_plots(Coord::ZERO);
        assert!(grid.get(Coord::new(1, 0), Coord::ZERO).is_none());
        assert!(grid.get(Coord::ZERO, Coord::new(3, 0)).is_none());
        assert!(grid.get(Coord::ZERO, Coord::new(0, -1)).is_none());
    }

    #[test]
    fn create_twice_keeps_existing_plots() {
        let mut grid = PlotGrid::default();
        grid.create_island_plots(Coord::ZERO);
        grid.get_mut(Coord::ZERO, Coord::ZERO)
            .unwrap()
            .be_interacted(ActionType::Plow);

        assert!(!grid.create_island_plots(Coord::ZERO));
        assert_eq!(
            grid.get(Coord::ZERO, Coord::ZERO).unwrap().soil_state(),
            SoilState::Plowed
        );
    }

    #[test]
    fn deprecate_flags_but_never_removes() {
        let mut grid = PlotGrid::default();
        grid.create_island_plots(Coord::ZERO);
        grid.create_island_plots(Coord::new(1, 0));

        assert_eq!(grid.deprecate_island_plots(Coord::ZERO), 9);
        assert_eq!(grid.deprecate_island_plots(Coord::ZERO), 0);
        assert_eq!(grid.island_plots(Coord::ZERO).count(), 9);
        assert!(grid.island_plots(Coord::ZERO).all(Plot::is_deprecated));
        assert!(grid.island_plots(Coord::new(1, 0)).all(|p| !p.is_deprecated()));

        assert_eq!(grid.deprecate_island_plots(Coord::new(5, 5)), 0);
    }
}
