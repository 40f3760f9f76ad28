//! Character creation.
//!
//! [`CharacterBuilder`] collects everything needed for a new character,
//! including its starting backpack and equipment, and validates it in
//! [`CharacterBuilder::build`]. The sample characters used by content and
//! tests are built here too.

use crate::inventory::{InventoryError, Item, ItemStack};
use crate::items;
use crate::rules::{Action, Effects};
use crate::world::{Character, Stats};
use std::collections::HashMap;

/// Default stat sheets for the playable and monster races.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    Human,
    Goblin,
    Hobgoblin,
    GoblinChief,
}

impl Archetype {
    pub fn base_stats(&self) -> Stats {
        //                                MHP, MST, MMA, STR, AGI, ACU, ARM, RES
        match self {
            Archetype::Human => Stats::new(20, 50, 0, 10, 10, 10, 2, 4),
            Archetype::Goblin => Stats::new(5, 20, 0, 2, 14, 0, 1, 2),
            Archetype::Hobgoblin => Stats::new(10, 25, 0, 6, 11, 1, 2, 2),
            Archetype::GoblinChief => Stats::new(20, 30, 5, 10, 8, 5, 4, 4),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Human => "Human",
            Archetype::Goblin => "Goblin",
            Archetype::Hobgoblin => "Hobgoblin",
            Archetype::GoblinChief => "Goblin Chief",
        }
    }
}

/// Builder for creating characters.
#[derive(Debug, Clone, Default)]
pub struct CharacterBuilder {
    name: Option<String>,
    sprite_sheet: HashMap<String, String>,
    is_player: bool,
    base_stats: Option<Stats>,
    actions: Vec<Action>,
    effects: Effects,
    starting_items: Vec<ItemStack>,
    /// Slot name and item, equipped in order after the backpack is filled.
    equipment: Vec<(String, Item)>,
}

/// Error from character building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    MissingName,
    MissingBaseStats,
    Equipment(InventoryError),
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderError::MissingName => write!(f, "Character name is required"),
            BuilderError::MissingBaseStats => write!(f, "Base stats are required"),
            BuilderError::Equipment(err) => write!(f, "Starting equipment is invalid: {err}"),
        }
    }
}

impl std::error::Error for BuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuilderError::Equipment(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InventoryError> for BuilderError {
    fn from(err: InventoryError) -> Self {
        BuilderError::Equipment(err)
    }
}

impl CharacterBuilder {
    /// Create a new character builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the character's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the character as player-controlled.
    pub fn player(mut self) -> Self {
        self.is_player = true;
        self
    }

    /// Add a named sprite to the appearance.
    pub fn sprite(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.sprite_sheet.insert(key.into(), value.into());
        self
    }

    /// Set the base stats.
    pub fn base_stats(mut self, stats: Stats) -> Self {
        self.base_stats = Some(stats);
        self
    }

    /// Use an archetype's default stats as base stats.
    pub fn archetype(self, archetype: Archetype) -> Self {
        self.base_stats(archetype.base_stats())
    }

    /// Give the character an innate action.
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Start with an active effect.
    pub fn effect(mut self, name: impl Into<String>, params: serde_json::Value) -> Self {
        self.effects.insert(name.into(), params);
        self
    }

    /// Put items in the starting backpack.
    pub fn starting_item(mut self, item: Item, count: u32) -> Self {
        self.starting_items.push(ItemStack::new(item, count));
        self
    }

    /// Equip an item from the starting backpack.
    pub fn equip(mut self, slot: impl Into<String>, item: Item) -> Self {
        self.equipment.push((slot.into(), item));
        self
    }

    /// Build the character.
    pub fn build(self) -> Result<Character, BuilderError> {
        let name = self.name.ok_or(BuilderError::MissingName)?;
        let base_stats = self.base_stats.ok_or(BuilderError::MissingBaseStats)?;

        let mut character = Character::new(
            name,
            self.sprite_sheet,
            self.is_player,
            base_stats,
            self.actions,
            self.effects,
        );

        for stack in &self.starting_items {
            let count = i32::try_from(stack.count).map_err(|_| {
                InventoryError::PreconditionViolation(format!(
                    "too many {} in starting backpack",
                    stack.item.name
                ))
            })?;
            character.inventory.add(&stack.item, count)?;
        }

        for (slot, item) in &self.equipment {
            character = character.equip(slot, item)?;
        }

        tracing::debug!("Built character {}", character);
        Ok(character)
    }
}

// ============================================================================
// Sample Characters
// ============================================================================

/// A human player with a sword in each hand and some potions.
pub fn create_player(name: &str) -> Character {
    build_sample(
        CharacterBuilder::new()
            .name(name)
            .player()
            .archetype(Archetype::Human)
            .starting_item(items::potion_of_healing(), 3)
            .starting_item(items::dagger(), 1)
            .starting_item(items::sword(), 2)
            .equip("mainhand", items::sword())
            .equip("offhand", items::sword()),
    )
}

pub fn create_goblin() -> Character {
    build_sample(
        CharacterBuilder::new()
            .name("goblin")
            .archetype(Archetype::Goblin)
            .starting_item(items::dagger(), 1)
            .equip("mainhand", items::dagger()),
    )
}

pub fn create_hobgoblin() -> Character {
    build_sample(
        CharacterBuilder::new()
            .name("hobgoblin")
            .archetype(Archetype::Hobgoblin)
            .starting_item(items::dagger(), 2)
            .equip("mainhand", items::dagger())
            .equip("offhand", items::dagger()),
    )
}

pub fn create_goblin_chief() -> Character {
    build_sample(
        CharacterBuilder::new()
            .name("goblin_chieftain")
            .archetype(Archetype::GoblinChief)
            .starting_item(items::sword(), 1)
            .equip("mainhand", items::sword()),
    )
}

pub fn create_bandit() -> Character {
    build_sample(
        CharacterBuilder::new()
            .name("bandit")
            .archetype(Archetype::Human)
            .starting_item(items::dagger(), 1)
            .equip("mainhand", items::dagger()),
    )
}

/// Samples have a name and an archetype, and only equip equippable catalogue
/// items that were put in their backpack first, so building cannot fail.
fn build_sample(builder: CharacterBuilder) -> Character {
    builder
        .build()
        .expect("sample characters equip only catalogue items from their own backpack")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Slot;

    #[test]
    fn test_builder_requires_name_and_stats() {
        assert_eq!(
            CharacterBuilder::new().archetype(Archetype::Goblin).build(),
            Err(BuilderError::MissingName)
        );
        assert_eq!(
            CharacterBuilder::new().name("nobody").build(),
            Err(BuilderError::MissingBaseStats)
        );
    }

    #[test]
    fn test_builder_rejects_bad_equipment() {
        let result = CharacterBuilder::new()
            .name("clumsy")
            .archetype(Archetype::Human)
            .starting_item(items::potion_of_healing(), 1)
            .equip("head", items::potion_of_healing())
            .build();
        assert!(matches!(
            result,
            Err(BuilderError::Equipment(InventoryError::InvalidOperation(_)))
        ));

        // Equipping something never put in the backpack
        let result = CharacterBuilder::new()
            .name("empty-handed")
            .archetype(Archetype::Human)
            .equip("mainhand", items::sword())
            .build();
        assert!(matches!(
            result,
            Err(BuilderError::Equipment(InventoryError::InsufficientQuantity { .. }))
        ));
    }

    #[test]
    fn test_builder_sets_everything() {
        let c = CharacterBuilder::new()
            .name("Thorin")
            .player()
            .sprite("idle", "thorin_idle.txt")
            .archetype(Archetype::Human)
            .action(items::get_action("Stab").unwrap())
            .effect("blessed", serde_json::json!({ "turns": 3 }))
            .build()
            .unwrap();

        assert!(c.is_player);
        assert_eq!(c.sprite_sheet["idle"], "thorin_idle.txt");
        assert_eq!(c.base, Archetype::Human.base_stats());
        assert_eq!(c.actions.len(), 1);
        assert_eq!(c.effects["blessed"]["turns"], 3);
    }

    #[test]
    fn test_sample_player() {
        let player = create_player("Thorin");
        assert!(player.is_player);
        assert_eq!(player.inventory.equipped(Slot::MainHand), Some(&items::sword()));
        assert_eq!(player.inventory.equipped(Slot::OffHand), Some(&items::sword()));
        assert_eq!(player.inventory.count(&items::sword()), 0);
        assert_eq!(player.inventory.count(&items::potion_of_healing()), 3);
        assert_eq!(player.to_string(), "Thorin (♥ 20 / ¤ 3)");
    }

    #[test]
    fn test_samples_are_fully_equipped() {
        let samples = [
            (create_player("Thorin"), Archetype::Human),
            (create_goblin(), Archetype::Goblin),
            (create_hobgoblin(), Archetype::Hobgoblin),
            (create_goblin_chief(), Archetype::GoblinChief),
            (create_bandit(), Archetype::Human),
        ];
        for (sample, archetype) in samples {
            assert_eq!(sample.base, archetype.base_stats(), "{}", sample.name);
            assert!(
                sample.inventory.equipped(Slot::MainHand).is_some(),
                "{} should hold a weapon",
                sample.name
            );
            assert!(sample.best_damage().is_some(), "{}", sample.name);
        }
    }

    #[test]
    fn test_sample_monsters() {
        assert_eq!(create_goblin().to_string(), "goblin (♥ 5 / ¤ 1)");
        assert_eq!(create_hobgoblin().inventory.count(&items::dagger()), 0);
        assert_eq!(create_goblin_chief().current, Archetype::GoblinChief.base_stats());
        assert!(!create_bandit().is_player);
    }
}
