//! Immutable multi-layer tile grid.
//!
//! A [`TileGrid`] stores one tile index per cell for each of the three
//! [`LayerKind`]s. Coordinates are 0-indexed `IVec2`s with `x` in `[0, width)` and
//! `y` in `[0, height)`; [`EMPTY_TILE`] marks a cell without a tile on that layer.
//! Access outside the grid is reported as [`Error::OutOfBounds`], never clamped.
use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod output;
pub mod tiled;

pub use output::{ItemId, OutputLayer, Placement, MAX_ITEM_ID};

/// Tile index used for "no tile on this layer".
pub const EMPTY_TILE: i32 = -1;

/// Semantic role of a tile layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Terrain: grass, walkways, water.
    Ground,
    /// Trees, bushes and other decorative objects.
    Decoration,
    /// Houses and fences.
    Structure,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [
        LayerKind::Ground,
        LayerKind::Decoration,
        LayerKind::Structure,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            LayerKind::Ground => 0,
            LayerKind::Decoration => 1,
            LayerKind::Structure => 2,
        }
    }
}

/// Tile indices of a single cell, one per layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellTiles {
    pub ground: i32,
    pub decoration: i32,
    pub structure: i32,
}

impl CellTiles {
    pub fn get(&self, layer: LayerKind) -> i32 {
        match layer {
            LayerKind::Ground => self.ground,
            LayerKind::Decoration => self.decoration,
            LayerKind::Structure => self.structure,
        }
    }

    /// Returns `true` if nothing is stacked on top of the ground layer.
    pub fn is_bare(&self) -> bool {
        self.decoration == EMPTY_TILE && self.structure == EMPTY_TILE
    }
}

/// A rectangular W×H grid holding one tile index per layer and cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    layers: [Vec<i32>; 3],
}

impl TileGrid {
    /// Create a grid where every layer of every cell is [`EMPTY_TILE`].
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            layers: [
                vec![EMPTY_TILE; len],
                vec![EMPTY_TILE; len],
                vec![EMPTY_TILE; len],
            ],
        }
    }

    /// Create a grid from three row-major layer buffers of length `width * height`.
    pub fn from_layers(
        width: u32,
        height: u32,
        ground: Vec<i32>,
        decoration: Vec<i32>,
        structure: Vec<i32>,
    ) -> Result<Self> {
        let len = (width as usize) * (height as usize);
        for (layer, data) in LayerKind::ALL.iter().zip([&ground, &decoration, &structure]) {
            if data.len() != len {
                return Err(Error::InvalidConfig(format!(
                    "{:?} layer has {} tiles, expected {}x{} = {}",
                    layer,
                    data.len(),
                    width,
                    height,
                    len
                )));
            }
        }
        Ok(Self {
            width,
            height,
            layers: [ground, decoration, structure],
        })
    }

    /// Create a grid from per-layer rows (`rows[y][x]`).
    pub fn from_rows(
        ground: &[Vec<i32>],
        decoration: &[Vec<i32>],
        structure: &[Vec<i32>],
    ) -> Result<Self> {
        let height = ground.len();
        let width = ground.first().map_or(0, Vec::len);

        let flatten = |layer: LayerKind, rows: &[Vec<i32>]| -> Result<Vec<i32>> {
            if rows.len() != height || rows.iter().any(|row| row.len() != width) {
                return Err(Error::InvalidConfig(format!(
                    "{:?} layer rows do not form a {}x{} grid",
                    layer, width, height
                )));
            }
            Ok(rows.iter().flatten().copied().collect())
        };

        let ground = flatten(LayerKind::Ground, ground)?;
        let decoration = flatten(LayerKind::Decoration, decoration)?;
        let structure = flatten(LayerKind::Structure, structure)?;
        Self::from_layers(width as u32, height as u32, ground, decoration, structure)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `pos` lies inside the grid.
    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Tile indices of every layer at `pos`.
    pub fn classify(&self, pos: IVec2) -> Result<CellTiles> {
        let i = self.index_of(pos)?;
        Ok(self.cell_at_index(i))
    }

    /// Tile index on `layer` at `pos`.
    pub fn tile(&self, layer: LayerKind, pos: IVec2) -> Result<i32> {
        let i = self.index_of(pos)?;
        Ok(self.layers[layer.index()][i])
    }

    /// Overwrite a single tile. Intended for building grids before they are classified.
    pub fn set_tile(&mut self, layer: LayerKind, pos: IVec2, tile: i32) -> Result<()> {
        let i = self.index_of(pos)?;
        self.layers[layer.index()][i] = tile;
        Ok(())
    }

    /// Fill the rectangle `[min, min + size)` on `layer`, clipped to the grid.
    pub fn fill_rect(&mut self, layer: LayerKind, min: IVec2, size: IVec2, tile: i32) {
        for y in min.y..min.y + size.y {
            for x in min.x..min.x + size.x {
                let pos = IVec2::new(x, y);
                if self.contains(pos) {
                    let i = self.index_unchecked(pos);
                    self.layers[layer.index()][i] = tile;
                }
            }
        }
    }

    /// Raw row-major tile buffer of `layer`.
    pub fn layer_data(&self, layer: LayerKind) -> &[i32] {
        &self.layers[layer.index()]
    }

    /// All coordinates in row-major order (rows top to bottom, cells left to right).
    pub fn positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        let width = self.width as i32;
        (0..self.height as i32).flat_map(move |y| (0..width).map(move |x| IVec2::new(x, y)))
    }

    pub(crate) fn cell_at_index(&self, i: usize) -> CellTiles {
        CellTiles {
            ground: self.layers[0][i],
            decoration: self.layers[1][i],
            structure: self.layers[2][i],
        }
    }

    #[inline]
    pub(crate) fn index_unchecked(&self, pos: IVec2) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }

    fn index_of(&self, pos: IVec2) -> Result<usize> {
        if !self.contains(pos) {
            return Err(Error::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.index_unchecked(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> TileGrid {
        TileGrid::from_rows(
            &[vec![1, 2, 3], vec![4, 5, 6]],
            &[vec![-1, 7, -1], vec![-1, -1, -1]],
            &[vec![-1, -1, 8], vec![-1, -1, -1]],
        )
        .expect("valid rows")
    }

    #[test]
    fn from_rows_preserves_row_major_layout() {
        let grid = sample_grid();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.tile(LayerKind::Ground, IVec2::new(2, 1)).unwrap(), 6);
        assert_eq!(
            grid.classify(IVec2::new(1, 0)).unwrap(),
            CellTiles {
                ground: 2,
                decoration: 7,
                structure: -1
            }
        );
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let grid = sample_grid();
        for pos in [IVec2::new(-1, 0), IVec2::new(3, 0), IVec2::new(0, 2)] {
            assert!(matches!(
                grid.classify(pos),
                Err(Error::OutOfBounds { width: 3, height: 2, .. })
            ));
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = TileGrid::from_rows(
            &[vec![1, 1], vec![1]],
            &[vec![-1, -1], vec![-1, -1]],
            &[vec![-1, -1], vec![-1, -1]],
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn layer_length_mismatch_is_rejected() {
        let result = TileGrid::from_layers(2, 2, vec![1; 4], vec![-1; 3], vec![-1; 4]);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn positions_are_row_major() {
        let grid = TileGrid::new(2, 2);
        let positions: Vec<_> = grid.positions().collect();
        assert_eq!(
            positions,
            vec![
                IVec2::new(0, 0),
                IVec2::new(1, 0),
                IVec2::new(0, 1),
                IVec2::new(1, 1)
            ]
        );
    }

    #[test]
    fn fill_rect_clips_to_grid() {
        let mut grid = TileGrid::new(3, 3);
        grid.fill_rect(LayerKind::Ground, IVec2::new(1, 1), IVec2::new(5, 5), 2);
        let filled = grid
            .layer_data(LayerKind::Ground)
            .iter()
            .filter(|t| **t == 2)
            .count();
        assert_eq!(filled, 4);
        assert!(grid.classify(IVec2::new(0, 0)).unwrap().is_bare());
    }
}
