//! # Durable Item Records
//!
//! The host owns item metadata. The engine only ever issues the primitive
//! operations of [`DurableRecord`]: keyed integers, the description lines,
//! and the "enchanted" display marker.
//!
//! [`ItemMeta`] is the in-memory implementation used by tests, the
//! simulation binary, and hosts without their own metadata system.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Primitive persistence operations on one item.
pub trait DurableRecord {
    /// Reads an integer record.
    fn get_int(&self, key: &str) -> Option<i64>;

    /// Writes an integer record.
    fn set_int(&mut self, key: &str, value: i64);

    /// Deletes an integer record.
    fn remove_int(&mut self, key: &str);

    /// Keys of all integer records.
    fn int_keys(&self) -> Vec<String>;

    /// The item's description lines.
    fn description(&self) -> Vec<String>;

    /// Replaces the item's description lines.
    fn set_description(&mut self, lines: Vec<String>);

    /// Whether the item is drawn as enchanted.
    fn enchanted_marker(&self) -> bool;

    /// Sets whether the item is drawn as enchanted.
    fn set_enchanted_marker(&mut self, enchanted: bool);
}

/// In-memory item metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMeta {
    /// Integer records.
    ints: BTreeMap<String, i64>,
    /// Description lines.
    description: Vec<String>,
    /// Enchanted display marker.
    glint: bool,
}

impl ItemMeta {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableRecord for ItemMeta {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.ints.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.ints.insert(key.to_string(), value);
    }

    fn remove_int(&mut self, key: &str) {
        self.ints.remove(key);
    }

    fn int_keys(&self) -> Vec<String> {
        self.ints.keys().cloned().collect()
    }

    fn description(&self) -> Vec<String> {
        self.description.clone()
    }

    fn set_description(&mut self, lines: Vec<String>) {
        self.description = lines;
    }

    fn enchanted_marker(&self) -> bool {
        self.glint
    }

    fn set_enchanted_marker(&mut self, enchanted: bool) {
        self.glint = enchanted;
    }
}

/// An item: a material identity plus its durable metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Material id (e.g. `diamond_sword`).
    pub material: String,
    /// Durable metadata.
    pub meta: ItemMeta,
}

impl Item {
    /// Creates an item with empty metadata.
    #[must_use]
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            meta: ItemMeta::new(),
        }
    }

    /// Adds a host description line.
    #[must_use]
    pub fn with_description_line(mut self, line: impl Into<String>) -> Self {
        self.meta.description.push(line.into());
        self
    }
}

impl DurableRecord for Item {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.meta.get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.meta.set_int(key, value);
    }

    fn remove_int(&mut self, key: &str) {
        self.meta.remove_int(key);
    }

    fn int_keys(&self) -> Vec<String> {
        self.meta.int_keys()
    }

    fn description(&self) -> Vec<String> {
        self.meta.description()
    }

    fn set_description(&mut self, lines: Vec<String>) {
        self.meta.set_description(lines);
    }

    fn enchanted_marker(&self) -> bool {
        self.meta.enchanted_marker()
    }

    fn set_enchanted_marker(&mut self, enchanted: bool) {
        self.meta.set_enchanted_marker(enchanted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_records() {
        let mut meta = ItemMeta::new();
        meta.set_int("a", 3);
        meta.set_int("b", 1);
        assert_eq!(meta.get_int("a"), Some(3));
        assert_eq!(meta.int_keys(), vec!["a".to_string(), "b".to_string()]);

        meta.remove_int("a");
        assert_eq!(meta.get_int("a"), None);
    }

    #[test]
    fn test_item_delegates_to_meta() {
        let mut item = Item::new("book").with_description_line("A dusty tome");
        item.set_enchanted_marker(true);
        assert!(item.meta.enchanted_marker());
        assert_eq!(item.description(), vec!["A dusty tome".to_string()]);
    }
}
