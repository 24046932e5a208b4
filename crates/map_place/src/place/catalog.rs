//! Named items that can be placed, keyed by tile id.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::{ItemId, MAX_ITEM_ID};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Display name, matched case-insensitively.
    pub name: String,
    /// Tile id written to the output layer.
    pub id: ItemId,
}

/// Ordered list of placeable items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCatalog {
    items: Vec<CatalogItem>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, rejecting blank and duplicate names and ids above [`MAX_ITEM_ID`].
    pub fn insert(&mut self, name: impl Into<String>, id: ItemId) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidConfig("item names must not be empty".into()));
        }
        if id > MAX_ITEM_ID {
            return Err(Error::InvalidConfig(format!(
                "item '{name}' has id {id}, above the largest tile index {MAX_ITEM_ID}"
            )));
        }
        if self.find(&name).is_some() {
            return Err(Error::InvalidConfig(format!(
                "item '{name}' is already in the catalog"
            )));
        }
        self.items.push(CatalogItem { name, id });
        Ok(())
    }

    pub fn with_item(mut self, name: impl Into<String>, id: ItemId) -> Result<Self> {
        self.insert(name, id)?;
        Ok(self)
    }

    /// Items of the Kenney "Tiny Town" tileset.
    pub fn tiny_town() -> Self {
        const ITEMS: [(&str, ItemId); 17] = [
            ("Wheelbarrow", 57),
            ("Mushroom", 29),
            ("Sign", 83),
            ("Beehive", 94),
            ("Key", 117),
            ("Bow", 118),
            ("Arrow", 119),
            ("Rake", 116),
            ("Target", 95),
            ("Coin", 93),
            ("Bomb", 105),
            ("Scythe", 129),
            ("Shovel", 128),
            ("Pickaxe", 115),
            ("Axe", 127),
            ("Empty Bucket", 130),
            ("Full Bucket", 131),
        ];
        Self {
            items: ITEMS
                .iter()
                .map(|(name, id)| CatalogItem {
                    name: (*name).to_string(),
                    id: *id,
                })
                .collect(),
        }
    }

    /// Look up an item by name, ignoring case and surrounding whitespace.
    pub fn lookup(&self, name: &str) -> Result<&CatalogItem> {
        self.find(name).ok_or_else(|| Error::UnknownItem {
            name: name.trim().to_string(),
        })
    }

    pub fn get_by_id(&self, id: ItemId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Like [`get_by_id`](Self::get_by_id), but unknown ids are an [`Error::UnknownItem`].
    pub fn require_id(&self, id: ItemId) -> Result<&CatalogItem> {
        self.get_by_id(id).ok_or_else(|| Error::UnknownItem {
            name: format!("#{id}"),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn find(&self, name: &str) -> Option<&CatalogItem> {
        let name = name.trim();
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }
}
