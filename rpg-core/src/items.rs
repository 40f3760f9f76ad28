//! Standard item and action database.
//!
//! Contains the predefined combat actions and items (weapons, armor,
//! potions) that content code can reference by name. Entries are created
//! once, so every lookup of the same name returns the same [`ItemId`] and
//! stacks with earlier lookups.
//!
//! [`ItemId`]: crate::world::ItemId

use crate::inventory::{tags, Item};
use crate::rules::Action;
use crate::world::{PartialStats, Stat};

/// Get a standard action by name (case-insensitive).
pub fn get_action(name: &str) -> Option<Action> {
    let name_lower = name.to_lowercase();
    ACTIONS
        .iter()
        .find(|a| a.name.to_lowercase() == name_lower)
        .cloned()
}

/// Get a standard item by name (case-insensitive).
pub fn get_item(name: &str) -> Option<Item> {
    let name_lower = name.to_lowercase();
    ITEMS
        .iter()
        .find(|i| i.name.to_lowercase() == name_lower)
        .cloned()
}

// ============================================================================
// Actions
// ============================================================================

lazy_static::lazy_static! {
    /// Standard attacks.
    pub static ref ACTIONS: Vec<Action> = vec![
        Action::new("Light Stab", "attack", 1.0, "physical")
            .with_description("Stab your opponent with your puny dagger"),
        Action::new("Stab", "attack", 2.0, "physical")
            .with_description("Stick 'em with the pointy end"),
        Action::new("Slash", "attack", 3.0, "physical")
            .with_description("Swing your sword at your opponent"),
    ];
}

// ============================================================================
// Items
// ============================================================================

lazy_static::lazy_static! {
    /// Standard weapons, armor and potions.
    pub static ref ITEMS: Vec<Item> = vec![
        // Weapons
        Item::new("Sword")
            .with_description("An elegant weapon, from a more civilised time")
            .with_tags([tags::EQUIPPABLE, tags::WEAPON, "mainhand", "offhand"])
            .with_weight(3)
            .with_actions(vec![ACTIONS[1].clone(), ACTIONS[2].clone()]),
        Item::new("Dagger")
            .with_description("A pointy little thing")
            .with_tags([tags::EQUIPPABLE, tags::WEAPON, "mainhand", "offhand"])
            .with_weight(1)
            .with_actions(vec![ACTIONS[0].clone()]),

        // Armor
        Item::new("Helmet of Strength")
            .with_description("A spartan helmet, enchanted with a strength spell")
            .with_tags([tags::EQUIPPABLE, "head"])
            .with_weight(2)
            .with_stat_bonus(PartialStats::new().with(Stat::Strength, 5).with(Stat::Armor, 5)),
        Item::new("Hermes' Boots")
            .with_description("A pair of boots with suspicious wings")
            .with_tags([tags::EQUIPPABLE, "feet"])
            .with_weight(2)
            .with_stat_bonus(PartialStats::new().with(Stat::Agility, 5).with(Stat::Armor, 2)),

        // Potions
        Item::new("Potion of Healing")
            .with_description("Heals ♥ 5 when consumed")
            .with_tags([tags::CONSUMABLE, "potion"])
            .with_weight(1)
            .with_durability(1),
    ];
}

/// The standard sword.
pub fn sword() -> Item {
    ITEMS[0].clone()
}

/// The standard dagger.
pub fn dagger() -> Item {
    ITEMS[1].clone()
}

/// +5 strength, +5 armor.
pub fn helmet_of_strength() -> Item {
    ITEMS[2].clone()
}

/// +5 agility, +2 armor.
pub fn hermes_boots() -> Item {
    ITEMS[3].clone()
}

pub fn potion_of_healing() -> Item {
    ITEMS[4].clone()
}
