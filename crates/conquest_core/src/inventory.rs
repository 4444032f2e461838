//! # Inventory
//!
//! Fixed-capacity slot list. Capacity is chosen at spawn and never changes.

use crate::ecs::{Component, ComponentId};
use crate::error::ParseError;
use std::fmt;
use std::str::FromStr;

/// Item vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// Wood log.
    Wood,
    /// Stone chunk.
    Stone,
    /// Unrefined iron.
    IronOre,
    /// Healing potion.
    PotionHp,
    /// Starter sword.
    SwordWooden,
}

impl ItemType {
    /// All item types.
    pub const ALL: [Self; 5] = [
        Self::Wood,
        Self::Stone,
        Self::IronOre,
        Self::PotionHp,
        Self::SwordWooden,
    ];

    /// Wire name of the item.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "WOOD",
            Self::Stone => "STONE",
            Self::IronOre => "IRON_ORE",
            Self::PotionHp => "POTION_HP",
            Self::SwordWooden => "SWORD_WOODEN",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|item| item.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseError::UnknownItemType(s.to_owned()))
    }
}

/// A stack of items in an inventory slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemStack {
    /// The item type.
    pub item: ItemType,
    /// Number of items in this stack.
    pub quantity: u32,
}

impl ItemStack {
    /// Creates a new item stack.
    #[inline]
    #[must_use]
    pub const fn new(item: ItemType, quantity: u32) -> Self {
        Self { item, quantity }
    }
}

/// Inventory component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Component for Inventory {
    const ID: ComponentId = 9;
}

impl Inventory {
    /// Creates an empty inventory.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of slots
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the slot contents, `None` when out of range or empty.
    #[inline]
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<ItemStack> {
        self.slots.get(index).copied().flatten()
    }

    /// Iterates occupied slots with their index.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, ItemStack)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|stack| (index, stack)))
    }

    /// Adds items, stacking onto an existing stack of the same type first,
    /// otherwise filling the first empty slot.
    ///
    /// # Returns
    ///
    /// `false` if the inventory is full and holds no stack of `item`.
    pub fn add_item(&mut self, item: ItemType, quantity: u32) -> bool {
        if let Some(stack) = self.slots.iter_mut().flatten().find(|stack| stack.item == item) {
            stack.quantity = stack.quantity.saturating_add(quantity);
            return true;
        }
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(ItemStack::new(item, quantity));
                true
            }
            None => false,
        }
    }

    /// Swaps two slots.
    ///
    /// # Returns
    ///
    /// `false` if either index is out of range or both are the same slot.
    pub fn swap(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.slots.len() || to >= self.slots.len() {
            return false;
        }
        self.slots.swap(from, to);
        true
    }
}
