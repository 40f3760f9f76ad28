//! Testing utilities for the rules core.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for scripted fights between two parties
//! - Assertion helpers for verifying characters and inventories

use crate::character_builder::{create_goblin, create_player};
use crate::dialog::DialogLine;
use crate::inventory::{Inventory, Item};
use crate::rules::{self, Action};
use crate::world::{Character, CharacterId, Party, PartyError};

/// Test harness for running combat scenarios.
///
/// Keeps the latest snapshot of every fighter and a log of what happened,
/// the way a game loop would.
pub struct TestHarness {
    /// The player's side.
    pub heroes: Party,
    /// The opposing side.
    pub enemies: Party,
    /// Combat log, oldest first.
    pub log: Vec<DialogLine>,
}

impl TestHarness {
    /// Create a harness with a sample player facing a single goblin.
    pub fn new() -> Self {
        Self::with_parties(
            Party::new("Heroes", vec![create_player("Test Hero")]),
            Party::new("Goblins", vec![create_goblin()]),
        )
    }

    /// Create a harness with custom parties.
    pub fn with_parties(heroes: Party, enemies: Party) -> Self {
        Self {
            heroes,
            enemies,
            log: Vec::new(),
        }
    }

    /// The heroes' leader.
    pub fn player_id(&self) -> CharacterId {
        self.heroes.leader
    }

    /// The first enemy that can still be attacked.
    pub fn first_target(&self) -> Option<CharacterId> {
        self.enemies.valid_targets().first().copied()
    }

    /// Find a fighter on either side.
    pub fn fighter(&self, id: CharacterId) -> Result<&Character, PartyError> {
        self.heroes
            .get_member(id)
            .or_else(|_| self.enemies.get_member(id))
    }

    /// Resolve one attack and store the victim's new snapshot.
    ///
    /// Returns the damage dealt.
    pub fn attack(
        &mut self,
        attacker: CharacterId,
        action: &Action,
        victim: CharacterId,
    ) -> Result<i32, PartyError> {
        let outcome = rules::attack(self.fighter(attacker)?, action, self.fighter(victim)?);

        self.log.push(DialogLine::narration(format!(
            "{} uses {} on {}",
            outcome.attacker.name, action.name, outcome.victim.name
        )));
        self.log.push(DialogLine::narration(format!(
            "{} takes ¤ {} damage -> ♥ {}",
            outcome.victim.name, outcome.damage_dealt, outcome.victim.health
        )));
        if !outcome.victim.is_alive {
            self.log
                .push(DialogLine::narration(format!("{} dies", outcome.victim.name)));
        }

        let damage_dealt = outcome.damage_dealt;
        self.store(attacker, outcome.attacker)?;
        self.store(victim, outcome.victim)?;
        Ok(damage_dealt)
    }

    /// Get a fighter's health as (current, max).
    pub fn hp(&self, id: CharacterId) -> Result<(i32, i32), PartyError> {
        let fighter = self.fighter(id)?;
        Ok((fighter.health, fighter.current.max_health))
    }

    /// True when the enemies have nobody left standing.
    pub fn heroes_won(&self) -> bool {
        self.enemies.valid_targets().is_empty()
    }

    /// Get the last log line.
    pub fn last_line(&self) -> Option<&str> {
        self.log.last().map(|line| line.text.as_str())
    }

    fn store(&mut self, id: CharacterId, snapshot: Character) -> Result<(), PartyError> {
        if self.heroes.has_member(id) {
            self.heroes.update_member(id, snapshot)
        } else {
            self.enemies.update_member(id, snapshot)
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert a fighter's HP is at expected values.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, id: CharacterId, current: i32, max: i32) {
    let (actual_current, actual_max) = harness.hp(id).expect("fighter should exist");
    assert_eq!(
        (actual_current, actual_max),
        (current, max),
        "Expected HP {current}/{max}, got {actual_current}/{actual_max}"
    );
}

/// Assert a character is dead.
#[track_caller]
pub fn assert_dead(character: &Character) {
    assert!(!character.is_alive, "Expected {} to be dead", character.name);
    assert_eq!(character.health, 0, "Dead characters have no health left");
}

/// Assert the backpack holds exactly `count` units of an item.
#[track_caller]
pub fn assert_backpack(inventory: &Inventory, item: &Item, count: u32) {
    let actual = inventory.count(item);
    assert_eq!(
        actual, count,
        "Expected {count} x {} in backpack, found {actual}",
        item.name
    );
}
