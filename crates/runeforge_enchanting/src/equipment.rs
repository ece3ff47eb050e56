//! # Equipment Classes
//!
//! Which kinds of gear an enchantment may go on, and the classifier trait
//! the host implements to tell the engine what an item is.

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::record::Item;

/// A single kind of equipment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentClass {
    /// Swords
    Sword,
    /// Axes (weapon and tool)
    Axe,
    /// Bows
    Bow,
    /// Crossbows
    Crossbow,
    /// Tridents
    Trident,
    /// Pickaxes
    Pickaxe,
    /// Shovels
    Shovel,
    /// Hoes
    Hoe,
    /// Helmets
    Helmet,
    /// Chestplates
    Chestplate,
    /// Leggings
    Leggings,
    /// Boots
    Boots,
    /// Shields
    Shield,
    /// Fishing rods
    FishingRod,
    /// Elytra
    Elytra,
    /// Rings, amulets and other worn trinkets
    Trinket,
}

impl EquipmentClass {
    /// The single-bit set for this class.
    #[must_use]
    pub const fn flag(self) -> EquipmentClasses {
        match self {
            Self::Sword => EquipmentClasses::SWORD,
            Self::Axe => EquipmentClasses::AXE,
            Self::Bow => EquipmentClasses::BOW,
            Self::Crossbow => EquipmentClasses::CROSSBOW,
            Self::Trident => EquipmentClasses::TRIDENT,
            Self::Pickaxe => EquipmentClasses::PICKAXE,
            Self::Shovel => EquipmentClasses::SHOVEL,
            Self::Hoe => EquipmentClasses::HOE,
            Self::Helmet => EquipmentClasses::HELMET,
            Self::Chestplate => EquipmentClasses::CHESTPLATE,
            Self::Leggings => EquipmentClasses::LEGGINGS,
            Self::Boots => EquipmentClasses::BOOTS,
            Self::Shield => EquipmentClasses::SHIELD,
            Self::FishingRod => EquipmentClasses::FISHING_ROD,
            Self::Elytra => EquipmentClasses::ELYTRA,
            Self::Trinket => EquipmentClasses::TRINKET,
        }
    }
}

bitflags! {
    /// Set of equipment classes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EquipmentClasses: u32 {
        /// Swords
        const SWORD = 1 << 0;
        /// Axes
        const AXE = 1 << 1;
        /// Bows
        const BOW = 1 << 2;
        /// Crossbows
        const CROSSBOW = 1 << 3;
        /// Tridents
        const TRIDENT = 1 << 4;
        /// Pickaxes
        const PICKAXE = 1 << 5;
        /// Shovels
        const SHOVEL = 1 << 6;
        /// Hoes
        const HOE = 1 << 7;
        /// Helmets
        const HELMET = 1 << 8;
        /// Chestplates
        const CHESTPLATE = 1 << 9;
        /// Leggings
        const LEGGINGS = 1 << 10;
        /// Boots
        const BOOTS = 1 << 11;
        /// Shields
        const SHIELD = 1 << 12;
        /// Fishing rods
        const FISHING_ROD = 1 << 13;
        /// Elytra
        const ELYTRA = 1 << 14;
        /// Trinkets
        const TRINKET = 1 << 15;

        /// Anything that deals damage.
        const WEAPON = Self::SWORD.bits() | Self::AXE.bits() | Self::BOW.bits()
            | Self::CROSSBOW.bits() | Self::TRIDENT.bits();
        /// Anything that gathers.
        const TOOL = Self::AXE.bits() | Self::PICKAXE.bits() | Self::SHOVEL.bits() | Self::HOE.bits();
        /// Worn armor pieces.
        const ARMOR = Self::HELMET.bits() | Self::CHESTPLATE.bits() | Self::LEGGINGS.bits()
            | Self::BOOTS.bits();
    }
}

impl EquipmentClasses {
    /// Iterates the individual classes in this set.
    pub fn classes(self) -> impl Iterator<Item = EquipmentClass> {
        EquipmentClass::iter().filter(move |class| self.contains(class.flag()))
    }

    /// True if the two sets share at least one class.
    #[inline]
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.intersects(other)
    }
}

impl FromIterator<EquipmentClass> for EquipmentClasses {
    fn from_iter<T: IntoIterator<Item = EquipmentClass>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, class| set | class.flag())
    }
}

/// Tells the engine which equipment classes an item belongs to.
pub trait EquipmentClassifier {
    /// Classes of `item`; empty if the item cannot be enchanted.
    fn classify(&self, item: &Item) -> EquipmentClasses;
}

/// Classifies items by exact material id.
#[derive(Clone, Debug, Default)]
pub struct MaterialClassifier {
    /// Classes by material id.
    classes: HashMap<String, EquipmentClasses>,
}

impl MaterialClassifier {
    /// Creates an empty classifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier for the vanilla gear set.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut classifier = Self::new();
        for tier in ["wooden", "stone", "iron", "golden", "diamond", "netherite"] {
            classifier.insert(format!("{tier}_sword"), EquipmentClasses::SWORD);
            classifier.insert(format!("{tier}_axe"), EquipmentClasses::AXE);
            classifier.insert(format!("{tier}_pickaxe"), EquipmentClasses::PICKAXE);
            classifier.insert(format!("{tier}_shovel"), EquipmentClasses::SHOVEL);
            classifier.insert(format!("{tier}_hoe"), EquipmentClasses::HOE);
        }
        for tier in ["leather", "chainmail", "iron", "golden", "diamond", "netherite"] {
            classifier.insert(format!("{tier}_helmet"), EquipmentClasses::HELMET);
            classifier.insert(format!("{tier}_chestplate"), EquipmentClasses::CHESTPLATE);
            classifier.insert(format!("{tier}_leggings"), EquipmentClasses::LEGGINGS);
            classifier.insert(format!("{tier}_boots"), EquipmentClasses::BOOTS);
        }
        classifier.insert("bow", EquipmentClasses::BOW);
        classifier.insert("crossbow", EquipmentClasses::CROSSBOW);
        classifier.insert("trident", EquipmentClasses::TRIDENT);
        classifier.insert("shield", EquipmentClasses::SHIELD);
        classifier.insert("fishing_rod", EquipmentClasses::FISHING_ROD);
        classifier.insert("elytra", EquipmentClasses::ELYTRA);
        classifier.insert("ring", EquipmentClasses::TRINKET);
        classifier.insert("amulet", EquipmentClasses::TRINKET);
        // Books accept anything.
        classifier.insert("book", EquipmentClasses::all());
        classifier
    }

    /// Registers (or replaces) the classes of a material.
    pub fn insert(&mut self, material: impl Into<String>, classes: EquipmentClasses) {
        self.classes.insert(material.into(), classes);
    }
}

impl EquipmentClassifier for MaterialClassifier {
    fn classify(&self, item: &Item) -> EquipmentClasses {
        self.classes
            .get(&item.material)
            .copied()
            .unwrap_or_else(EquipmentClasses::empty)
    }
}
