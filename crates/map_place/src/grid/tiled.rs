//! Loading a [`TileGrid`] from a Tiled JSON map.
//!
//! Three tile layers are picked by name and mapped onto [`LayerKind`]s. Global tile ids
//! become tile indices after the flip flags are stripped; gid `0` becomes [`EMPTY_TILE`].
//! Group layers are searched recursively. Only plain array layer data is supported;
//! base64/compressed layers are rejected.
use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::grid::{LayerKind, TileGrid, EMPTY_TILE};

const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
const ROTATED_HEXAGONAL_120: u32 = 0x1000_0000;
const GID_FLAGS: u32 =
    FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY | ROTATED_HEXAGONAL_120;

/// Names of the Tiled layers backing each [`LayerKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TiledLayerNames {
    pub ground: String,
    pub decoration: String,
    pub structure: String,
}

impl Default for TiledLayerNames {
    fn default() -> Self {
        Self {
            ground: "Ground-n-Walkways".into(),
            decoration: "Trees-n-Bushes".into(),
            structure: "Houses-n-Fences".into(),
        }
    }
}

impl TiledLayerNames {
    pub fn new(
        ground: impl Into<String>,
        decoration: impl Into<String>,
        structure: impl Into<String>,
    ) -> Self {
        Self {
            ground: ground.into(),
            decoration: decoration.into(),
            structure: structure.into(),
        }
    }

    fn name_for(&self, layer: LayerKind) -> &str {
        match layer {
            LayerKind::Ground => &self.ground,
            LayerKind::Decoration => &self.decoration,
            LayerKind::Structure => &self.structure,
        }
    }
}

#[derive(Deserialize)]
struct TiledMap {
    width: u32,
    height: u32,
    #[serde(default)]
    layers: Vec<TiledLayer>,
}

#[derive(Deserialize)]
struct TiledLayer {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    data: Option<LayerData>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    layers: Vec<TiledLayer>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LayerData {
    Tiles(Vec<u32>),
    Encoded(IgnoredAny),
}

impl TiledLayer {
    fn find<'a>(layers: &'a [TiledLayer], name: &str) -> Option<&'a TiledLayer> {
        layers.iter().find_map(|layer| {
            if layer.kind == "tilelayer" && layer.name == name {
                Some(layer)
            } else if layer.kind == "group" {
                Self::find(&layer.layers, name)
            } else {
                None
            }
        })
    }
}

/// Convert a Tiled global tile id into a tile index.
#[inline]
pub fn gid_to_tile(gid: u32) -> i32 {
    let gid = gid & !GID_FLAGS;
    if gid == 0 {
        EMPTY_TILE
    } else {
        gid as i32
    }
}

impl TileGrid {
    /// Parse a Tiled JSON map and build a grid from the layers named in `names`.
    pub fn from_tiled_json(json: &str, names: &TiledLayerNames) -> Result<Self> {
        let map: TiledMap = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("malformed Tiled map: {e}")))?;
        let len = (map.width as usize) * (map.height as usize);

        let mut buffers = Vec::with_capacity(LayerKind::ALL.len());
        for layer_kind in LayerKind::ALL {
            let name = names.name_for(layer_kind);
            let layer = TiledLayer::find(&map.layers, name).ok_or_else(|| {
                Error::InvalidConfig(format!("Tiled map has no tile layer named '{name}'"))
            })?;
            let data = match &layer.data {
                Some(LayerData::Tiles(data)) => data,
                Some(LayerData::Encoded(_)) => {
                    let encoding = layer.encoding.as_deref().unwrap_or("unknown");
                    return Err(Error::InvalidConfig(format!(
                        "Tiled layer '{name}' uses unsupported encoding '{encoding}'"
                    )));
                }
                None => {
                    return Err(Error::InvalidConfig(format!(
                        "Tiled layer '{name}' has no tile data"
                    )))
                }
            };
            if data.len() != len {
                return Err(Error::InvalidConfig(format!(
                    "Tiled layer '{name}' has {} tiles, expected {len}",
                    data.len()
                )));
            }
            buffers.push(data.iter().copied().map(gid_to_tile).collect::<Vec<_>>());
        }

        let mut buffers = buffers.into_iter();
        match (buffers.next(), buffers.next(), buffers.next()) {
            (Some(ground), Some(decoration), Some(structure)) => {
                TileGrid::from_layers(map.width, map.height, ground, decoration, structure)
            }
            _ => Err(Error::InvalidConfig("Tiled map is missing layers".into())),
        }
    }
}
