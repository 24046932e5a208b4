//! Per-cell category scans: anchors, open cells and non-default ground.
use std::collections::HashSet;

use glam::IVec2;

use crate::grid::{LayerKind, TileGrid};

/// Every coordinate whose tile on `layer` is in `tiles`, in row-major order.
///
/// Multi-cell objects are not merged; each occupied cell is its own anchor.
pub fn anchors_on_layer(grid: &TileGrid, layer: LayerKind, tiles: &HashSet<i32>) -> Vec<IVec2> {
    let data = grid.layer_data(layer);
    grid.positions()
        .filter(|pos| tiles.contains(&data[grid.index_unchecked(*pos)]))
        .collect()
}

/// Row-major mask of open cells: default ground with nothing on the other layers.
pub fn open_mask(grid: &TileGrid, default_ground: &HashSet<i32>) -> Vec<bool> {
    (0..grid.len())
        .map(|i| {
            let cell = grid.cell_at_index(i);
            default_ground.contains(&cell.ground) && cell.is_bare()
        })
        .collect()
}

/// Every coordinate whose ground tile is not default ground, occupied or not.
pub fn non_default_ground(grid: &TileGrid, default_ground: &HashSet<i32>) -> Vec<IVec2> {
    let ground = grid.layer_data(LayerKind::Ground);
    grid.positions()
        .filter(|pos| !default_ground.contains(&ground[grid.index_unchecked(*pos)]))
        .collect()
}
