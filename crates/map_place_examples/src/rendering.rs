use std::path::Path;

use glam::IVec2;
use image::{Rgb, RgbImage};
use map_place::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Colors and cell size for PNG output.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub cell_size: u32,
    pub grass: [u8; 3],
    pub path: [u8; 3],
    pub tree: [u8; 3],
    pub decoration: [u8; 3],
    pub fence: [u8; 3],
    pub structure: [u8; 3],
    pub tile_sets: TileSets,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: 16,
            grass: [120, 180, 90],
            path: [210, 185, 140],
            tree: [40, 100, 50],
            decoration: [90, 140, 70],
            fence: [140, 95, 55],
            structure: [170, 80, 70],
            tile_sets: TileSets::tiny_town(),
        }
    }
}

impl RenderConfig {
    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size.max(1);
        self
    }

    fn terrain(&self, cell: CellTiles) -> Terrain {
        let sets = &self.tile_sets;
        if cell.structure != EMPTY_TILE {
            if sets.fence_tiles.contains(&cell.structure) {
                Terrain::Fence
            } else {
                Terrain::Structure
            }
        } else if cell.decoration != EMPTY_TILE {
            let is_tree = sets
                .category_tiles
                .get(TREE_CATEGORY)
                .is_some_and(|tiles| tiles.contains(&cell.decoration));
            if is_tree {
                Terrain::Tree
            } else {
                Terrain::Decoration
            }
        } else if sets.default_ground_tiles.contains(&cell.ground) {
            Terrain::Grass
        } else {
            Terrain::Path
        }
    }

    fn color(&self, terrain: Terrain) -> [u8; 3] {
        match terrain {
            Terrain::Grass => self.grass,
            Terrain::Path => self.path,
            Terrain::Tree => self.tree,
            Terrain::Decoration => self.decoration,
            Terrain::Fence => self.fence,
            Terrain::Structure => self.structure,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Terrain {
    Grass,
    Path,
    Tree,
    Decoration,
    Fence,
    Structure,
}

impl Terrain {
    fn symbol(self) -> char {
        match self {
            Terrain::Grass => '.',
            Terrain::Path => '=',
            Terrain::Tree => 'T',
            Terrain::Decoration => '*',
            Terrain::Fence => '#',
            Terrain::Structure => 'H',
        }
    }
}

/// Stable, saturated color per item id.
fn item_color(item: ItemId) -> [u8; 3] {
    let h = item.wrapping_mul(0x9E37_79B9);
    [
        64 + (h >> 24) as u8 % 192,
        64 + (h >> 16) as u8 % 192,
        64 + (h >> 8) as u8 % 192,
    ]
}

/// Text rendering: terrain symbols, items as the lowercase first letter of their name.
pub fn render_ascii(
    grid: &TileGrid,
    output: &OutputLayer,
    catalog: &ItemCatalog,
    config: &RenderConfig,
) -> String {
    let mut text = String::with_capacity(grid.len() + grid.height() as usize);
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let pos = IVec2::new(x, y);
            let item = output.get(pos).ok().flatten();
            let symbol = match item {
                Some(id) => catalog
                    .get_by_id(id)
                    .and_then(|i| i.name.chars().next())
                    .map_or('?', |c| c.to_ascii_lowercase()),
                None => grid
                    .classify(pos)
                    .map_or(' ', |cell| config.terrain(cell).symbol()),
            };
            text.push(symbol);
        }
        text.push('\n');
    }
    text
}

/// Renders terrain and items to a PNG; items are drawn as inset squares.
pub fn render_to_png(
    grid: &TileGrid,
    output: &OutputLayer,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let cs = config.cell_size;
    let mut img = RgbImage::new(grid.width() * cs, grid.height() * cs);
    let inset = cs / 4;

    for pos in grid.positions() {
        let cell = grid.classify(pos)?;
        let terrain = config.color(config.terrain(cell));
        let item = output.get(pos)?;
        let (ox, oy) = (pos.x as u32 * cs, pos.y as u32 * cs);
        for dy in 0..cs {
            for dx in 0..cs {
                let inside = dx >= inset && dx < cs - inset && dy >= inset && dy < cs - inset;
                let color = match item {
                    Some(id) if inside => item_color(id),
                    _ => terrain,
                };
                img.put_pixel(ox + dx, oy + dy, Rgb(color));
            }
        }
    }

    let path = path.as_ref();
    img.save(path)?;
    info!("Wrote {}.", path.display());
    Ok(())
}
