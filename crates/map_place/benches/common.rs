use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::IVec2;
use map_place::prelude::{LayerKind, TileGrid};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Grass map with a fenced square in the top-left, a tree every 7 cells along y = 1 and a
/// walkway along the bottom row.
pub fn bench_town(size: u32) -> TileGrid {
    let side = size as i32;
    let mut grid = TileGrid::new(size, size);
    grid.fill_rect(LayerKind::Ground, IVec2::ZERO, IVec2::splat(side), 1);
    grid.fill_rect(LayerKind::Ground, IVec2::new(0, side - 1), IVec2::new(side, 1), 41);

    let fence = (side / 3).max(3);
    let s = LayerKind::Structure;
    grid.fill_rect(s, IVec2::ZERO, IVec2::new(fence, 1), 46);
    grid.fill_rect(s, IVec2::new(0, fence - 1), IVec2::new(fence, 1), 46);
    grid.fill_rect(s, IVec2::ZERO, IVec2::new(1, fence), 46);
    grid.fill_rect(s, IVec2::new(fence - 1, 0), IVec2::new(1, fence), 46);
    grid.fill_rect(s, IVec2::ZERO, IVec2::ONE, 45);

    for x in (fence + 1..side).step_by(7) {
        grid.fill_rect(LayerKind::Decoration, IVec2::new(x, 1), IVec2::ONE, 5);
    }
    grid
}
