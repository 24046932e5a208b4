//! Detection of fence-enclosed rectangular regions.
use std::collections::HashSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::grid::{LayerKind, TileGrid};

/// An axis-aligned rectangle whose border is made of fence tiles.
///
/// `(x, y)` is the top-left corner tile; `width` and `height` include the border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner tile.
    pub fn origin(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Size of the area strictly inside the border; zero when the region is thinner than 3 tiles.
    pub fn interior_size(&self) -> IVec2 {
        IVec2::new((self.width - 2).max(0), (self.height - 2).max(0))
    }

    pub fn has_interior(&self) -> bool {
        let size = self.interior_size();
        size.x > 0 && size.y > 0
    }

    /// Returns `true` if `pos` lies strictly inside the border.
    pub fn interior_contains(&self, pos: IVec2) -> bool {
        pos.x > self.x
            && pos.x < self.x + self.width - 1
            && pos.y > self.y
            && pos.y < self.y + self.height - 1
    }
}

/// Find every region whose top-left corner carries `corner_tile` on the structure layer.
///
/// From each corner the fence is followed downwards to get the height and to the right to
/// get the width. The right and bottom borders are not validated, and the scan stops at
/// the grid edge.
pub fn detect_regions(
    grid: &TileGrid,
    fence_tiles: &HashSet<i32>,
    corner_tile: i32,
) -> Vec<Region> {
    let structure = grid.layer_data(LayerKind::Structure);
    let is_fence = |pos: IVec2| {
        grid.contains(pos) && fence_tiles.contains(&structure[grid.index_unchecked(pos)])
    };

    let mut regions = Vec::new();
    for pos in grid.positions() {
        if structure[grid.index_unchecked(pos)] != corner_tile {
            continue;
        }

        let mut height = 0;
        while is_fence(pos + IVec2::new(0, height)) {
            height += 1;
        }

        let mut width = 0;
        while is_fence(pos + IVec2::new(width, 0)) {
            width += 1;
        }

        regions.push(Region::new(pos.x, pos.y, width, height));
    }
    regions
}
