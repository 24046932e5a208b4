use std::path::Path;

use glam::IVec2;
use map_place::prelude::*;
use tracing::info;

const GRASS: i32 = 1;
const GRASS_FLOWERS: i32 = 2;
const WALKWAY: i32 = 41;
const WATER: i32 = 109;
const CORNER: i32 = 45;
const FENCE_H: i32 = 46;
const FENCE_V: i32 = 47;
const HOUSE: i32 = 52;
const TREE: i32 = 5;
const ROCKS: i32 = 27;

/// A 40x25 "Tiny Town" style map with two fenced yards, a crossing walkway, a pond,
/// houses and scattered trees.
pub fn demo_town() -> TileGrid {
    let mut grid = TileGrid::new(40, 25);
    grid.fill_rect(LayerKind::Ground, IVec2::ZERO, IVec2::new(40, 25), GRASS);
    grid.fill_rect(LayerKind::Ground, IVec2::new(6, 19), IVec2::new(5, 2), GRASS_FLOWERS);

    grid.fill_rect(LayerKind::Ground, IVec2::new(0, 12), IVec2::new(40, 1), WALKWAY);
    grid.fill_rect(LayerKind::Ground, IVec2::new(20, 0), IVec2::new(1, 25), WALKWAY);
    grid.fill_rect(LayerKind::Ground, IVec2::new(31, 2), IVec2::new(4, 3), WATER);

    fence(&mut grid, IVec2::new(2, 2), IVec2::new(8, 6));
    fence(&mut grid, IVec2::new(26, 15), IVec2::new(10, 7));

    grid.fill_rect(LayerKind::Structure, IVec2::new(12, 15), IVec2::new(3, 2), HOUSE);
    grid.fill_rect(LayerKind::Structure, IVec2::new(23, 6), IVec2::new(3, 2), HOUSE);

    for (x, y) in [
        (14, 3),
        (15, 3),
        (16, 6),
        (4, 17),
        (5, 18),
        (11, 21),
        (30, 8),
        (36, 9),
        (37, 6),
        (23, 21),
    ] {
        grid.fill_rect(LayerKind::Decoration, IVec2::new(x, y), IVec2::ONE, TREE);
    }
    grid.fill_rect(LayerKind::Decoration, IVec2::new(17, 9), IVec2::new(2, 1), ROCKS);
    grid
}

fn fence(grid: &mut TileGrid, origin: IVec2, size: IVec2) {
    let s = LayerKind::Structure;
    grid.fill_rect(s, origin, IVec2::new(size.x, 1), FENCE_H);
    grid.fill_rect(s, origin + IVec2::new(0, size.y - 1), IVec2::new(size.x, 1), FENCE_H);
    grid.fill_rect(s, origin, IVec2::new(1, size.y), FENCE_V);
    grid.fill_rect(s, origin + IVec2::new(size.x - 1, 0), IVec2::new(1, size.y), FENCE_V);
    grid.fill_rect(s, origin, IVec2::ONE, CORNER);
}

/// Loads a Tiled JSON map when a path is given, the demo town otherwise.
pub fn load_tiled_or_demo(path: Option<&Path>) -> anyhow::Result<TileGrid> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let grid = TileGrid::from_tiled_json(&json, &TiledLayerNames::default())?;
            info!(
                "Loaded {}x{} map from {}.",
                grid.width(),
                grid.height(),
                path.display()
            );
            Ok(grid)
        }
        None => Ok(demo_town()),
    }
}

/// Keyword-based stand-in for a language-model translator.
///
/// Understands a count (digits or "a"/"one".."ten"), an item name from the catalog, a
/// location ("fence", "tree", "path"/"road", otherwise anywhere) and a direction
/// ("left", "right", "up"/"above"/"north", "down"/"below"/"south").
pub fn phrase_translator(phrase: &str, catalog: &ItemCatalog) -> Result<String> {
    const NUMBERS: [&str; 10] = [
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    let lower = phrase.to_ascii_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let count = words
        .iter()
        .find_map(|w| {
            w.parse::<usize>().ok().or_else(|| match *w {
                "a" | "an" => Some(1),
                _ => NUMBERS.iter().position(|n| n == w).map(|i| i + 1),
            })
        })
        .unwrap_or(1);

    let item = catalog
        .iter()
        .filter(|item| lower.contains(&item.name.to_ascii_lowercase()))
        .max_by_key(|item| item.name.len())
        .ok_or_else(|| Error::Translation(format!("no known item in '{phrase}'")))?;

    let has = |keys: &[&str]| words.iter().any(|w| keys.contains(w));
    let rule = if has(&["fence", "fenced", "fences", "yard", "pen"]) {
        Rule::EnclosedArea
    } else if has(&["tree", "trees", "forest"]) {
        Rule::adjacent_to_tree()
    } else if has(&["path", "paths", "road", "walkway", "water", "pond"]) {
        Rule::AdjacentToPath
    } else {
        Rule::AnywhereOpen
    };

    let mut command = PlacementCommand::new(rule, count, item.name.clone());
    for (keys, direction) in [
        (&["left", "west"][..], "left"),
        (&["right", "east"][..], "right"),
        (&["up", "above", "north", "top"][..], "up"),
        (&["down", "below", "south", "bottom"][..], "down"),
    ] {
        if has(keys) {
            command = command.with_direction(direction);
            break;
        }
    }
    Ok(command.to_reply())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(phrase: &str) -> PlacementCommand {
        let reply = phrase_translator(phrase, &ItemCatalog::tiny_town()).unwrap();
        PlacementCommand::from_reply(&reply).unwrap()
    }

    #[test]
    fn understands_counts_items_rules_and_directions() {
        let command = translate("place 3 Mushrooms adjacent to tree in the left direction");
        assert_eq!(command.rule, Rule::adjacent_to_tree());
        assert_eq!(command.count, 3);
        assert_eq!(command.item, "Mushroom");
        assert_eq!(command.direction.as_deref(), Some("left"));

        let command = translate("put two signs above the road");
        assert_eq!(command.rule, Rule::AdjacentToPath);
        assert_eq!(command.count, 2);
        assert_eq!(command.direction.as_deref(), Some("up"));
    }

    #[test]
    fn prefers_the_longest_matching_item() {
        assert_eq!(translate("drop a pickaxe anywhere").item, "Pickaxe");
        assert_eq!(translate("a full bucket in the yard").rule, Rule::EnclosedArea);
    }

    #[test]
    fn unknown_items_fail_translation() {
        assert!(matches!(
            phrase_translator("place a dragon", &ItemCatalog::tiny_town()),
            Err(Error::Translation(_))
        ));
    }

    #[test]
    fn demo_town_has_every_feature() {
        let grid = demo_town();
        let classification = Classifier::new(TileSets::tiny_town())
            .unwrap()
            .classify(&grid);
        assert_eq!(classification.regions().len(), 2);
        assert_eq!(classification.category_anchors(TREE_CATEGORY).unwrap().len(), 10);
        assert!(!classification.non_default_ground().is_empty());
    }
}
