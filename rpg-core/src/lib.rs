//! Character, inventory and combat rules for a small turn-based RPG.
//!
//! This crate provides:
//! - Stat sheets with override (`Stats::modify`) and additive bonus semantics
//! - Inventories with equipment slots, a stacking backpack and a task list
//! - Immutable character snapshots and attack resolution
//! - Plain data carriers for the presentation layer
//!
//! It never renders, reads input, or schedules turns; a game loop drives it.
//!
//! # Quick Start
//!
//! ```
//! use rpg_core::character_builder::{create_goblin, create_player};
//! use rpg_core::items;
//! use rpg_core::rules::attack;
//!
//! let player = create_player("Thorin");
//! let goblin = create_goblin();
//!
//! let slash = items::get_action("Slash").unwrap();
//! let outcome = attack(&player, &slash, &goblin);
//!
//! assert_eq!(outcome.damage_dealt, 3);
//! assert_eq!(outcome.victim.health, 2);
//! ```

pub mod character_builder;
pub mod dialog;
pub mod inventory;
pub mod items;
pub mod rules;
pub mod testing;
pub mod world;

// Primary public API
pub use character_builder::{Archetype, BuilderError, CharacterBuilder};
pub use dialog::{DialogLine, UiEvent, UiEventKind};
pub use inventory::{Inventory, InventoryError, Item, ItemStack, Slot, Task};
pub use rules::{attack, Action, AttackOutcome, DamageInstance, Effects};
pub use world::{
    BonusSource, Character, CharacterChanges, CharacterId, ItemId, PartialStats, Party,
    PartyError, Stat, Stats, TaskId,
};
