//! Classification of a [`TileGrid`] into enclosed regions and tile categories.
//!
//! A [`Classifier`] is built from a validated [`TileSets`] configuration and performs
//! three independent full-grid scans:
//! - region detection on the structure layer ([`region::detect_regions`]),
//! - category anchors on the decoration layer ([`category::anchors_on_layer`]),
//! - open cells and non-default ground on the ground layer.
//!
//! [`Classifier::classify`] runs all scans at once and returns a [`Classification`]
//! that callers can cache for as long as the grid does not change.
use std::collections::{HashMap, HashSet};

use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::{LayerKind, TileGrid};

pub mod category;
pub mod region;

pub use region::Region;

/// Category name used for trees and bushes by [`TileSets::tiny_town`].
pub const TREE_CATEGORY: &str = "tree";

/// Tile-index sets that give meaning to raw tile indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSets {
    /// Structure tiles that make up fences.
    pub fence_tiles: HashSet<i32>,
    /// Structure tile marking the top-left corner of a fenced region.
    pub corner_tile: i32,
    /// Decoration tiles per named category.
    pub category_tiles: HashMap<String, HashSet<i32>>,
    /// Ground tiles that count as plain walkable terrain.
    pub default_ground_tiles: HashSet<i32>,
}

impl TileSets {
    /// Create a configuration without categories.
    pub fn new(
        fence_tiles: impl IntoIterator<Item = i32>,
        corner_tile: i32,
        default_ground_tiles: impl IntoIterator<Item = i32>,
    ) -> Self {
        Self {
            fence_tiles: fence_tiles.into_iter().collect(),
            corner_tile,
            category_tiles: HashMap::new(),
            default_ground_tiles: default_ground_tiles.into_iter().collect(),
        }
    }

    /// Add or replace a named category.
    pub fn with_category(
        mut self,
        name: impl Into<String>,
        tiles: impl IntoIterator<Item = i32>,
    ) -> Self {
        self.category_tiles
            .insert(name.into(), tiles.into_iter().collect());
        self
    }

    /// Tile sets of the Kenney "Tiny Town" tileset.
    pub fn tiny_town() -> Self {
        Self::new(
            [44, 45, 46, 47, 60, 59, 57, 69, 70, 71, 81, 82],
            45,
            [1, 2, 3],
        )
        .with_category(
            TREE_CATEGORY,
            [
                5, 4, 17, 16, 30, 107, 2, 8, 95, 19, 20, 21, 28, 29, 32, 22, 23, 24, 35, 11, 84,
            ],
        )
    }

    /// Check the configuration for missing or contradictory entries.
    pub fn validate(&self) -> Result<()> {
        if self.fence_tiles.is_empty() {
            return Err(Error::InvalidConfig("fence_tiles must not be empty".into()));
        }
        if !self.fence_tiles.contains(&self.corner_tile) {
            return Err(Error::InvalidConfig(format!(
                "corner_tile {} is not one of the fence_tiles",
                self.corner_tile
            )));
        }
        if self.default_ground_tiles.is_empty() {
            return Err(Error::InvalidConfig(
                "default_ground_tiles must not be empty".into(),
            ));
        }
        for (name, tiles) in &self.category_tiles {
            if name.trim().is_empty() {
                return Err(Error::InvalidConfig("category names must not be empty".into()));
            }
            if tiles.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "category '{name}' has no tiles"
                )));
            }
        }
        Ok(())
    }
}

/// Scans a grid according to a validated [`TileSets`] configuration.
#[derive(Clone, Debug)]
pub struct Classifier {
    tile_sets: TileSets,
}

impl Classifier {
    /// Validate `tile_sets` and build a classifier.
    pub fn new(tile_sets: TileSets) -> Result<Self> {
        tile_sets.validate()?;
        Ok(Self { tile_sets })
    }

    pub fn tile_sets(&self) -> &TileSets {
        &self.tile_sets
    }

    /// Fence-enclosed regions, one per corner tile.
    pub fn regions(&self, grid: &TileGrid) -> Vec<Region> {
        region::detect_regions(grid, &self.tile_sets.fence_tiles, self.tile_sets.corner_tile)
    }

    /// Anchors of the named decoration category.
    pub fn category_anchors(&self, grid: &TileGrid, name: &str) -> Result<Vec<IVec2>> {
        let tiles = self
            .tile_sets
            .category_tiles
            .get(name)
            .ok_or_else(|| Error::UnknownCategory { name: name.into() })?;
        Ok(category::anchors_on_layer(grid, LayerKind::Decoration, tiles))
    }

    /// Cells whose ground tile is outside the default walkable set.
    pub fn non_default_ground(&self, grid: &TileGrid) -> Vec<IVec2> {
        category::non_default_ground(grid, &self.tile_sets.default_ground_tiles)
    }

    /// Returns `true` if `pos` is inside the grid, on default ground and otherwise empty.
    pub fn is_open(&self, grid: &TileGrid, pos: IVec2) -> bool {
        grid.classify(pos)
            .map(|cell| {
                self.tile_sets.default_ground_tiles.contains(&cell.ground) && cell.is_bare()
            })
            .unwrap_or(false)
    }

    /// Run every scan and collect the results.
    pub fn classify(&self, grid: &TileGrid) -> Classification {
        let regions = self.regions(grid);
        let categories: HashMap<String, Vec<IVec2>> = self
            .tile_sets
            .category_tiles
            .iter()
            .map(|(name, tiles)| {
                (
                    name.clone(),
                    category::anchors_on_layer(grid, LayerKind::Decoration, tiles),
                )
            })
            .collect();
        let non_default_ground = self.non_default_ground(grid);
        let open = category::open_mask(grid, &self.tile_sets.default_ground_tiles);

        let classification = Classification {
            width: grid.width(),
            height: grid.height(),
            regions,
            categories,
            non_default_ground,
            open,
        };
        debug!(
            "Classified {}x{} grid: {} regions, {} open cells, {} non-default ground cells.",
            grid.width(),
            grid.height(),
            classification.regions.len(),
            classification.open_count(),
            classification.non_default_ground.len(),
        );
        classification
    }
}

/// Result of classifying one grid.
#[derive(Clone, Debug)]
pub struct Classification {
    width: u32,
    height: u32,
    regions: Vec<Region>,
    categories: HashMap<String, Vec<IVec2>>,
    non_default_ground: Vec<IVec2>,
    open: Vec<bool>,
}

impl Classification {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Anchors of a configured category.
    pub fn category_anchors(&self, name: &str) -> Result<&[IVec2]> {
        self.categories
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownCategory { name: name.into() })
    }

    pub fn non_default_ground(&self) -> &[IVec2] {
        &self.non_default_ground
    }

    /// Returns `true` if `pos` is an open cell. Out-of-range positions are never open.
    pub fn is_open(&self, pos: IVec2) -> bool {
        if pos.x < 0 || pos.y < 0 || pos.x as u32 >= self.width || pos.y as u32 >= self.height {
            return false;
        }
        self.open[(pos.y as usize) * (self.width as usize) + (pos.x as usize)]
    }

    /// Open cells in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        let width = self.width as usize;
        self.open
            .iter()
            .enumerate()
            .filter(|(_, open)| **open)
            .map(move |(i, _)| IVec2::new((i % width) as i32, (i / width) as i32))
    }

    pub fn open_count(&self) -> usize {
        self.open.iter().filter(|open| **open).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town() -> TileGrid {
        let mut grid = TileGrid::new(8, 6);
        grid.fill_rect(LayerKind::Ground, IVec2::ZERO, IVec2::new(8, 6), 1);
        grid.fill_rect(LayerKind::Ground, IVec2::new(0, 5), IVec2::new(8, 1), 41);
        grid.fill_rect(LayerKind::Structure, IVec2::new(1, 0), IVec2::new(4, 1), 46);
        grid.fill_rect(LayerKind::Structure, IVec2::new(1, 0), IVec2::new(1, 4), 46);
        grid.set_tile(LayerKind::Structure, IVec2::new(1, 0), 45)
            .unwrap();
        grid.set_tile(LayerKind::Decoration, IVec2::new(6, 2), 5)
            .unwrap();
        grid
    }

    #[test]
    fn tiny_town_configuration_is_valid() {
        assert!(TileSets::tiny_town().validate().is_ok());
        assert!(TileSets::tiny_town().category_tiles[TREE_CATEGORY].contains(&84));
    }

    #[test]
    fn validate_rejects_inconsistent_sets() {
        let corner_outside = TileSets::new([44, 46], 45, [1]);
        assert!(matches!(
            Classifier::new(corner_outside),
            Err(Error::InvalidConfig(_))
        ));

        let no_fences = TileSets::new([], 45, [1]);
        assert!(matches!(no_fences.validate(), Err(Error::InvalidConfig(_))));

        let no_ground = TileSets::new([45], 45, []);
        assert!(matches!(no_ground.validate(), Err(Error::InvalidConfig(_))));

        let empty_category = TileSets::new([45], 45, [1]).with_category("rock", []);
        assert!(matches!(
            empty_category.validate(),
            Err(Error::InvalidConfig(ref msg)) if msg.contains("rock")
        ));
    }

    #[test]
    fn classification_matches_individual_scans() {
        let grid = town();
        let classifier = Classifier::new(TileSets::tiny_town()).unwrap();
        let classification = classifier.classify(&grid);

        assert_eq!(classification.regions(), classifier.regions(&grid).as_slice());
        assert_eq!(classification.regions(), &[Region::new(1, 0, 4, 4)]);
        assert_eq!(
            classification.category_anchors(TREE_CATEGORY).unwrap(),
            &[IVec2::new(6, 2)]
        );
        assert_eq!(classification.non_default_ground().len(), 8);

        for pos in grid.positions() {
            assert_eq!(classification.is_open(pos), classifier.is_open(&grid, pos));
        }
        assert_eq!(classification.open_count(), classification.open_cells().count());
        assert!(!classification.is_open(IVec2::new(-1, 0)));
        assert!(!classifier.is_open(&grid, IVec2::new(8, 0)));
    }

    #[test]
    fn unknown_category_is_reported() {
        let grid = town();
        let classifier = Classifier::new(TileSets::tiny_town()).unwrap();
        assert!(matches!(
            classifier.category_anchors(&grid, "rock"),
            Err(Error::UnknownCategory { ref name }) if name == "rock"
        ));
        assert!(matches!(
            classifier.classify(&grid).category_anchors("rock"),
            Err(Error::UnknownCategory { .. })
        ));
    }
}
