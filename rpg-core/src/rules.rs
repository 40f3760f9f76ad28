//! Combat rules: actions, damage instances and attack resolution.
//!
//! The pipeline is:
//! 1. An [`Action`] describes what a character can do
//! 2. [`Action::create_damage_instance`] turns it into a concrete [`DamageInstance`]
//! 3. [`Character::hit`] applies the damage to the target and returns a new snapshot
//!
//! Damage types and effects are carried through unchanged; resistances are
//! not applied yet.

use crate::world::Character;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Effect name to effect parameters.
pub type Effects = HashMap<String, serde_json::Value>;

/// A single resolved instance of damage.
///
/// Created as the result of an attack or other interaction and passed to the
/// target. Negative damage heals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageInstance {
    pub damage: f64,
    pub damage_type: String,
    #[serde(default)]
    pub effects: Effects,
}

impl DamageInstance {
    pub fn new(damage: f64, damage_type: impl Into<String>) -> Self {
        Self {
            damage,
            damage_type: damage_type.into(),
            effects: Effects::new(),
        }
    }

    pub fn with_effect(mut self, name: impl Into<String>, params: serde_json::Value) -> Self {
        self.effects.insert(name.into(), params);
        self
    }
}

/// A combat action template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    /// e.g. "attack"
    pub action_type: String,
    pub description: String,
    pub base_damage: f64,
    /// Different damage types will eventually interact with the target's
    /// resistances.
    pub damage_type: String,
    /// Effects to be applied to the target.
    #[serde(default)]
    pub effects: Effects,
}

impl Action {
    pub fn new(
        name: impl Into<String>,
        action_type: impl Into<String>,
        base_damage: f64,
        damage_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            action_type: action_type.into(),
            description: String::new(),
            base_damage,
            damage_type: damage_type.into(),
            effects: Effects::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_effect(mut self, name: impl Into<String>, params: serde_json::Value) -> Self {
        self.effects.insert(name.into(), params);
        self
    }

    /// Damage dealt by this action. No modifiers are applied yet.
    pub fn damage(&self) -> f64 {
        self.base_damage
    }

    pub fn create_damage_instance(&self) -> DamageInstance {
        DamageInstance {
            damage: self.damage(),
            damage_type: self.damage_type.clone(),
            effects: self.effects.clone(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (¤ {})", self.name, self.damage())
    }
}

/// Result of one character attacking another.
#[derive(Debug, Clone)]
pub struct AttackOutcome {
    /// Unchanged for now; returned so on-hit effects against the attacker
    /// (thorns and the like) have somewhere to go.
    pub attacker: Character,
    pub victim: Character,
    pub damage_dealt: i32,
}

/// Determine the result of an interaction during combat.
pub fn attack(attacker: &Character, action: &Action, victim: &Character) -> AttackOutcome {
    tracing::debug!("{} uses {} on {}", attacker.name, action.name, victim.name);

    let (victim, damage_dealt) = victim.hit(&action.create_damage_instance());

    AttackOutcome {
        attacker: attacker.clone(),
        victim,
        damage_dealt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Stats;
    use serde_json::json;

    fn goblin() -> Character {
        Character::new(
            "goblin",
            HashMap::new(),
            false,
            //         MHP, MST, MMA, STR, AGI, ACU, ARM, RES
            Stats::new(5, 20, 0, 2, 14, 0, 1, 2),
            vec![],
            Effects::new(),
        )
    }

    #[test]
    fn test_create_damage_instance_uses_declared_damage() {
        let action = Action::new("slash", "attack", 3.0, "physical")
            .with_effect("bleed", json!({ "turns": 2 }));
        let instance = action.create_damage_instance();

        assert_eq!(instance.damage, 3.0);
        assert_eq!(instance.damage_type, "physical");
        assert_eq!(instance.effects["bleed"]["turns"], 2);
    }

    #[test]
    fn test_action_display() {
        let action = Action::new("Stab", "attack", 2.0, "physical");
        assert_eq!(action.to_string(), "Stab (¤ 2)");
    }

    #[test]
    fn test_attack() {
        let attacker = goblin();
        let victim = goblin();
        let stab = Action::new("stab", "attack", 2.0, "physical");

        let outcome = attack(&attacker, &stab, &victim);
        assert_eq!(outcome.damage_dealt, 2);
        assert_eq!(outcome.victim.health, 3);
        assert!(outcome.victim.is_alive);
        assert_eq!(outcome.attacker, attacker);

        let outcome = attack(&attacker, &stab, &outcome.victim);
        let outcome = attack(&attacker, &stab, &outcome.victim);
        assert_eq!(outcome.victim.health, 0);
        assert!(!outcome.victim.is_alive);
    }
}
