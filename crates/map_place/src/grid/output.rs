//! Sparse output layer holding the items placed during one generation cycle.
use glam::IVec2;

use crate::error::{Error, Result};
use crate::grid::{TileGrid, EMPTY_TILE};

/// Identifier of a placeable item. In tile-based setups this is the item's tile index.
pub type ItemId = u32;

/// Largest item id an [`OutputLayer`] accepts, so every id is also a valid tile index.
pub const MAX_ITEM_ID: ItemId = i32::MAX as ItemId;

/// A committed assignment of an item to a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Item written at [`Placement::position`].
    pub item: ItemId,
    /// Grid coordinate of the placement.
    pub position: IVec2,
}

impl Placement {
    pub fn new(item: ItemId, position: IVec2) -> Self {
        Self { item, position }
    }
}

/// W×H matrix of placed items, empty by default.
///
/// Holds at most one item per cell. Writing to an occupied cell replaces the
/// previous item and returns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayer {
    width: u32,
    height: u32,
    cells: Vec<Option<ItemId>>,
}

impl OutputLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width as usize) * (height as usize)],
        }
    }

    /// Create an empty layer matching the dimensions of `grid`.
    pub fn for_grid(grid: &TileGrid) -> Self {
        Self::new(grid.width(), grid.height())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Item at `pos`, if any.
    pub fn get(&self, pos: IVec2) -> Result<Option<ItemId>> {
        let i = self.index_of(pos)?;
        Ok(self.cells[i])
    }

    /// Returns `true` if an item is placed at `pos`. Out-of-range positions are never occupied.
    pub fn is_occupied(&self, pos: IVec2) -> bool {
        self.index_of(pos)
            .map(|i| self.cells[i].is_some())
            .unwrap_or(false)
    }

    /// Write a placement, returning the item it replaced.
    ///
    /// Ids above [`MAX_ITEM_ID`] are rejected with [`Error::InvalidConfig`].
    pub fn place(&mut self, placement: Placement) -> Result<Option<ItemId>> {
        if placement.item > MAX_ITEM_ID {
            return Err(Error::InvalidConfig(format!(
                "item id {} does not fit a tile index",
                placement.item
            )));
        }
        let i = self.index_of(placement.position)?;
        Ok(self.cells[i].replace(placement.item))
    }

    /// Remove every placed item.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// All placements in row-major order.
    pub fn placements(&self) -> Vec<Placement> {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| {
                cell.map(|item| {
                    Placement::new(item, IVec2::new((i % width) as i32, (i / width) as i32))
                })
            })
            .collect()
    }

    /// Rows of tile indices (`rows[y][x]`) with [`EMPTY_TILE`] for empty cells,
    /// the layout tile renderers consume.
    pub fn to_tile_rows(&self) -> Vec<Vec<i32>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height as usize];
        }
        self.cells
            .chunks(self.width as usize)
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        // `place` keeps every stored id within `MAX_ITEM_ID`.
                        Some(item) => *item as i32,
                        None => EMPTY_TILE,
                    })
                    .collect()
            })
            .collect()
    }

    fn index_of(&self, pos: IVec2) -> Result<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x as u32 >= self.width || pos.y as u32 >= self.height {
            return Err(Error::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((pos.y as usize) * (self.width as usize) + (pos.x as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_layer_is_empty() {
        let layer = OutputLayer::new(4, 3);
        assert_eq!(layer.occupied_count(), 0);
        assert!(layer.placements().is_empty());
        assert!(layer
            .to_tile_rows()
            .iter()
            .all(|row| row.len() == 4 && row.iter().all(|t| *t == EMPTY_TILE)));
    }

    #[test]
    fn place_replaces_and_reports_previous_item() {
        let mut layer = OutputLayer::new(2, 2);
        let pos = IVec2::new(1, 1);
        assert_eq!(layer.place(Placement::new(57, pos)).unwrap(), None);
        assert_eq!(layer.place(Placement::new(29, pos)).unwrap(), Some(57));
        assert_eq!(layer.get(pos).unwrap(), Some(29));
        assert_eq!(layer.occupied_count(), 1);
    }

    #[test]
    fn place_out_of_range_fails() {
        let mut layer = OutputLayer::new(2, 2);
        assert!(matches!(
            layer.place(Placement::new(1, IVec2::new(2, 0))),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(!layer.is_occupied(IVec2::new(-1, 0)));
    }

    #[test]
    fn tile_rows_and_placements_agree() {
        let mut layer = OutputLayer::new(3, 2);
        layer.place(Placement::new(94, IVec2::new(2, 0))).unwrap();
        layer.place(Placement::new(83, IVec2::new(0, 1))).unwrap();

        assert_eq!(
            layer.to_tile_rows(),
            vec![vec![-1, -1, 94], vec![83, -1, -1]]
        );
        assert_eq!(
            layer.placements(),
            vec![
                Placement::new(94, IVec2::new(2, 0)),
                Placement::new(83, IVec2::new(0, 1))
            ]
        );

        layer.clear();
        assert_eq!(layer.occupied_count(), 0);
    }

    #[test]
    fn ids_beyond_tile_range_are_rejected() {
        let mut layer = OutputLayer::new(2, 1);
        let pos = IVec2::new(0, 0);
        assert!(matches!(
            layer.place(Placement::new(MAX_ITEM_ID + 1, pos)),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(layer.get(pos).unwrap(), None);

        layer.place(Placement::new(MAX_ITEM_ID, pos)).unwrap();
        assert_eq!(layer.to_tile_rows(), vec![vec![i32::MAX, EMPTY_TILE]]);
    }
}
