//! Game world types.
//!
//! Contains the immutable character sheet and everything needed to derive it:
//! identifiers, stat sheets, bonus sources, characters and parties.

use crate::inventory::{Inventory, InventoryError, Item, Slot};
use crate::rules::{Action, DamageInstance, Effects};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for item definitions.
///
/// Clones of an [`Item`](crate::inventory::Item) share the id and stack
/// together in a backpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for tasks (quests).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Stats
// ============================================================================

/// The eight numeric attributes of a stat sheet, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// If health drops to 0, you die.
    MaxHealth,
    /// Resource for PHYSICAL actions.
    MaxStamina,
    /// Resource for MAGICAL actions.
    MaxMana,
    /// Increases damage of PHYSICAL attacks.
    Strength,
    /// Turn order, flee chance, damage of some attacks.
    Agility,
    /// Increases damage of MAGICAL attacks.
    Acumen,
    /// Decreases PHYSICAL damage taken.
    Armor,
    /// Decreases MAGICAL damage taken.
    MagicalResistance,
}

impl Stat {
    pub fn all() -> [Stat; 8] {
        [
            Stat::MaxHealth,
            Stat::MaxStamina,
            Stat::MaxMana,
            Stat::Strength,
            Stat::Agility,
            Stat::Acumen,
            Stat::Armor,
            Stat::MagicalResistance,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stat::MaxHealth => "Max Health",
            Stat::MaxStamina => "Max Stamina",
            Stat::MaxMana => "Max Mana",
            Stat::Strength => "Strength",
            Stat::Agility => "Agility",
            Stat::Acumen => "Acumen",
            Stat::Armor => "Armor",
            Stat::MagicalResistance => "Magical Resistance",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A complete stat sheet.
///
/// Characters hold one for their base stats and one for their current
/// (derived) stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub max_health: i32,
    pub max_stamina: i32,
    pub max_mana: i32,
    pub strength: i32,
    pub agility: i32,
    pub acumen: i32,
    pub armor: i32,
    pub magical_resistance: i32,
}

impl Stats {
    /// Build a sheet in sheet order: MHP, MST, MMA, STR, AGI, ACU, ARM, RES.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_health: i32,
        max_stamina: i32,
        max_mana: i32,
        strength: i32,
        agility: i32,
        acumen: i32,
        armor: i32,
        magical_resistance: i32,
    ) -> Self {
        Self {
            max_health,
            max_stamina,
            max_mana,
            strength,
            agility,
            acumen,
            armor,
            magical_resistance,
        }
    }

    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::MaxHealth => self.max_health,
            Stat::MaxStamina => self.max_stamina,
            Stat::MaxMana => self.max_mana,
            Stat::Strength => self.strength,
            Stat::Agility => self.agility,
            Stat::Acumen => self.acumen,
            Stat::Armor => self.armor,
            Stat::MagicalResistance => self.magical_resistance,
        }
    }

    pub fn set(&mut self, stat: Stat, value: i32) {
        match stat {
            Stat::MaxHealth => self.max_health = value,
            Stat::MaxStamina => self.max_stamina = value,
            Stat::MaxMana => self.max_mana = value,
            Stat::Strength => self.strength = value,
            Stat::Agility => self.agility = value,
            Stat::Acumen => self.acumen = value,
            Stat::Armor => self.armor = value,
            Stat::MagicalResistance => self.magical_resistance = value,
        }
    }

    /// Generate a new sheet from this one.
    ///
    /// Every stat set in `changes` overrides; unset stats are kept.
    pub fn modify(&self, changes: &PartialStats) -> Stats {
        let mut stats = *self;
        for stat in Stat::all() {
            if let Some(value) = changes.get(stat) {
                stats.set(stat, value);
            }
        }
        stats
    }
}

/// A stat sheet where every stat may be left unset.
///
/// Used both as the override argument of [`Stats::modify`] and as an
/// additive bonus (item stat bonuses, effects), where unset counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartialStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_health: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stamina: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_mana: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agility: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acumen: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magical_resistance: Option<i32>,
}

impl PartialStats {
    /// A sheet with nothing set. Merging it is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one stat, builder style.
    pub fn with(mut self, stat: Stat, value: i32) -> Self {
        self.set(stat, Some(value));
        self
    }

    pub fn get(&self, stat: Stat) -> Option<i32> {
        match stat {
            Stat::MaxHealth => self.max_health,
            Stat::MaxStamina => self.max_stamina,
            Stat::MaxMana => self.max_mana,
            Stat::Strength => self.strength,
            Stat::Agility => self.agility,
            Stat::Acumen => self.acumen,
            Stat::Armor => self.armor,
            Stat::MagicalResistance => self.magical_resistance,
        }
    }

    pub fn set(&mut self, stat: Stat, value: Option<i32>) {
        match stat {
            Stat::MaxHealth => self.max_health = value,
            Stat::MaxStamina => self.max_stamina = value,
            Stat::MaxMana => self.max_mana = value,
            Stat::Strength => self.strength = value,
            Stat::Agility => self.agility = value,
            Stat::Acumen => self.acumen = value,
            Stat::Armor => self.armor = value,
            Stat::MagicalResistance => self.magical_resistance = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        Stat::all().iter().all(|stat| self.get(*stat).is_none())
    }
}

impl From<Stats> for PartialStats {
    fn from(stats: Stats) -> Self {
        let mut partial = PartialStats::new();
        for stat in Stat::all() {
            partial.set(stat, Some(stats.get(stat)));
        }
        partial
    }
}

/// Sum `base` and every bonus, treating unset bonus stats as zero.
fn derive_stats<'a>(base: &Stats, bonuses: impl IntoIterator<Item = &'a PartialStats>) -> Stats {
    let mut stats = *base;
    for bonus in bonuses {
        for stat in Stat::all() {
            if let Some(delta) = bonus.get(stat) {
                stats.set(stat, stats.get(stat).saturating_add(delta));
            }
        }
    }
    stats
}

// ============================================================================
// Bonus Sources
// ============================================================================

/// Something that contributes a stat delta on top of a character's base stats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BonusSource {
    /// The item equipped in a slot.
    Equipment(Slot),
    /// A named status effect.
    Effect(String),
}

impl fmt::Display for BonusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusSource::Equipment(slot) => write!(f, "equipment:{slot}"),
            BonusSource::Effect(name) => write!(f, "effect:{name}"),
        }
    }
}

impl FromStr for BonusSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("equipment", slot)) => slot
                .parse::<Slot>()
                .map(BonusSource::Equipment)
                .map_err(|e| e.to_string()),
            Some(("effect", name)) => Ok(BonusSource::Effect(name.to_string())),
            _ => Err(format!("Unknown bonus source: {s}")),
        }
    }
}

impl From<BonusSource> for String {
    fn from(source: BonusSource) -> Self {
        source.to_string()
    }
}

impl TryFrom<String> for BonusSource {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Character
// ============================================================================

/// A combat-capable character (player, goblin, etc.).
///
/// A `Character` is a snapshot: state changes produce a new value through
/// [`Character::modify`], [`Character::hit`], [`Character::equip`] and
/// friends. The one exception is `inventory`, which the game loop may
/// mutate directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Appearance reference consumed by the presentation layer.
    pub sprite_sheet: HashMap<String, String>,
    pub is_player: bool,
    pub is_alive: bool,

    // Stats
    pub base: Stats,
    pub bonuses: HashMap<BonusSource, PartialStats>,
    /// Cached `base` + all `bonuses`.
    pub current: Stats,

    // Resources
    pub health: i32,
    pub stamina: i32,
    pub mana: i32,

    pub inventory: Inventory,
    pub actions: Vec<Action>,
    pub effects: Effects,
}

impl Character {
    /// Create a living character at full resources with an empty inventory.
    pub fn new(
        name: impl Into<String>,
        sprite_sheet: HashMap<String, String>,
        is_player: bool,
        base_stats: Stats,
        actions: Vec<Action>,
        initial_effects: Effects,
    ) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            sprite_sheet,
            is_player,
            is_alive: true,
            base: base_stats,
            bonuses: HashMap::new(),
            current: base_stats,
            health: base_stats.max_health,
            stamina: base_stats.max_stamina,
            mana: base_stats.max_mana,
            inventory: Inventory::new(),
            actions,
            effects: initial_effects,
        }
    }

    /// Generate a new snapshot with every field set in `changes` replaced.
    pub fn modify(&self, changes: CharacterChanges) -> Character {
        Character {
            id: changes.id.unwrap_or(self.id),
            name: changes.name.unwrap_or_else(|| self.name.clone()),
            sprite_sheet: changes
                .sprite_sheet
                .unwrap_or_else(|| self.sprite_sheet.clone()),
            is_player: changes.is_player.unwrap_or(self.is_player),
            is_alive: changes.is_alive.unwrap_or(self.is_alive),
            base: changes.base.unwrap_or(self.base),
            bonuses: changes.bonuses.unwrap_or_else(|| self.bonuses.clone()),
            current: changes.current.unwrap_or(self.current),
            health: changes.health.unwrap_or(self.health),
            stamina: changes.stamina.unwrap_or(self.stamina),
            mana: changes.mana.unwrap_or(self.mana),
            inventory: changes.inventory.unwrap_or_else(|| self.inventory.clone()),
            actions: changes.actions.unwrap_or_else(|| self.actions.clone()),
            effects: changes.effects.unwrap_or_else(|| self.effects.clone()),
        }
    }

    /// Recompute current stats as `base` plus the sum of all bonuses.
    ///
    /// Unset bonus stats count as zero. The caller assigns the result back
    /// to `current`.
    pub fn update_stats(&self) -> Stats {
        derive_stats(&self.base, self.bonuses.values())
    }

    /// Resolve an incoming attack.
    ///
    /// Returns the new snapshot and the damage taken. Negative damage heals,
    /// bounded at max health, but never revives a dead character.
    /// Damage type and effects are not applied yet.
    pub fn hit(&self, attack: &DamageInstance) -> (Character, i32) {
        let damage_taken = attack.damage.trunc() as i32;

        let mut health = self.health.saturating_sub(damage_taken);
        let mut is_alive = self.is_alive;

        if health <= 0 {
            health = 0;
            is_alive = false;
        } else if health > self.current.max_health {
            health = self.current.max_health;
        }

        if self.is_alive && !is_alive {
            tracing::info!("{} dies after taking {} damage", self.name, damage_taken);
        } else {
            tracing::debug!(
                "{} takes {} damage -> health {}",
                self.name,
                damage_taken,
                health
            );
        }

        let hit = self.modify(CharacterChanges::new().health(health).alive(is_alive));
        (hit, damage_taken)
    }

    /// Equip an item from the backpack in the given slot. Supports hot-swapping.
    ///
    /// The item's stat bonus is registered under the slot and current stats
    /// are recomputed. On error this snapshot is left untouched.
    pub fn equip(&self, slot: &str, item: &Item) -> Result<Character, InventoryError> {
        let mut inventory = self.inventory.clone();
        let slot = inventory.equip(slot, item)?;

        let mut bonuses = self.bonuses.clone();
        bonuses.insert(BonusSource::Equipment(slot), item.stat_bonus);

        Ok(self.restat(inventory, bonuses))
    }

    /// Remove the item in the given slot and put it back in the backpack.
    pub fn unequip(&self, slot: &str) -> Result<Character, InventoryError> {
        let mut inventory = self.inventory.clone();
        let (slot, _item) = inventory.unequip(slot)?;

        let mut bonuses = self.bonuses.clone();
        bonuses.remove(&BonusSource::Equipment(slot));

        Ok(self.restat(inventory, bonuses))
    }

    /// Add (or replace) a bonus and recompute current stats.
    pub fn with_bonus(&self, source: BonusSource, delta: PartialStats) -> Character {
        let mut bonuses = self.bonuses.clone();
        bonuses.insert(source, delta);
        self.restat(self.inventory.clone(), bonuses)
    }

    /// Drop a bonus (if present) and recompute current stats.
    pub fn without_bonus(&self, source: &BonusSource) -> Character {
        let mut bonuses = self.bonuses.clone();
        bonuses.remove(source);
        self.restat(self.inventory.clone(), bonuses)
    }

    /// The character's own actions followed by those of its equipped items.
    pub fn available_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().chain(
            self.inventory
                .equipped_items()
                .flat_map(|(_, item)| item.actions.iter()),
        )
    }

    /// The highest positive damage among the available actions.
    pub fn best_damage(&self) -> Option<f64> {
        self.available_actions()
            .map(Action::damage)
            .filter(|damage| *damage > 0.0)
            .fold(None, |best, damage| match best {
                Some(b) if b >= damage => Some(b),
                _ => Some(damage),
            })
    }

    /// Snapshot with new inventory and bonuses, stats recomputed and
    /// resource pools clamped to the new maxima.
    fn restat(
        &self,
        inventory: Inventory,
        bonuses: HashMap<BonusSource, PartialStats>,
    ) -> Character {
        let current = derive_stats(&self.base, bonuses.values());
        self.modify(
            CharacterChanges::new()
                .inventory(inventory)
                .bonuses(bonuses)
                .current(current)
                .health(self.health.min(current.max_health))
                .stamina(self.stamina.min(current.max_stamina))
                .mana(self.mana.min(current.max_mana)),
        )
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best_damage() {
            Some(damage) => write!(f, "{} (♥ {} / ¤ {})", self.name, self.health, damage),
            None => write!(f, "{} (♥ {})", self.name, self.health),
        }
    }
}

/// A partial character sheet for [`Character::modify`].
///
/// Fields left as `None` pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct CharacterChanges {
    pub id: Option<CharacterId>,
    pub name: Option<String>,
    pub sprite_sheet: Option<HashMap<String, String>>,
    pub is_player: Option<bool>,
    pub is_alive: Option<bool>,
    pub base: Option<Stats>,
    pub bonuses: Option<HashMap<BonusSource, PartialStats>>,
    pub current: Option<Stats>,
    pub health: Option<i32>,
    pub stamina: Option<i32>,
    pub mana: Option<i32>,
    pub inventory: Option<Inventory>,
    pub actions: Option<Vec<Action>>,
    pub effects: Option<Effects>,
}

impl CharacterChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn sprite_sheet(mut self, sprite_sheet: HashMap<String, String>) -> Self {
        self.sprite_sheet = Some(sprite_sheet);
        self
    }

    pub fn player(mut self, is_player: bool) -> Self {
        self.is_player = Some(is_player);
        self
    }

    pub fn alive(mut self, is_alive: bool) -> Self {
        self.is_alive = Some(is_alive);
        self
    }

    pub fn base(mut self, base: Stats) -> Self {
        self.base = Some(base);
        self
    }

    pub fn bonuses(mut self, bonuses: HashMap<BonusSource, PartialStats>) -> Self {
        self.bonuses = Some(bonuses);
        self
    }

    pub fn current(mut self, current: Stats) -> Self {
        self.current = Some(current);
        self
    }

    pub fn health(mut self, health: i32) -> Self {
        self.health = Some(health);
        self
    }

    pub fn stamina(mut self, stamina: i32) -> Self {
        self.stamina = Some(stamina);
        self
    }

    pub fn mana(mut self, mana: i32) -> Self {
        self.mana = Some(mana);
        self
    }

    pub fn inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn effects(mut self, effects: Effects) -> Self {
        self.effects = Some(effects);
        self
    }
}

// ============================================================================
// Parties
// ============================================================================

/// Errors from party lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartyError {
    #[error("Cannot find character with id {id} in {party}")]
    CharacterNotFound { id: CharacterId, party: String },
}

/// A named group of characters with a leader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub members: Vec<Character>,
    pub leader: CharacterId,
}

impl Party {
    /// Create a party led by its first member.
    ///
    /// An empty party gets a fresh leader id that matches nobody.
    pub fn new(name: impl Into<String>, members: Vec<Character>) -> Self {
        let leader = members.first().map(|c| c.id).unwrap_or_default();
        Self {
            name: name.into(),
            members,
            leader,
        }
    }

    pub fn with_leader(mut self, leader: CharacterId) -> Self {
        self.leader = leader;
        self
    }

    pub fn get_member(&self, id: CharacterId) -> Result<&Character, PartyError> {
        self.members
            .iter()
            .find(|member| member.id == id)
            .ok_or_else(|| PartyError::CharacterNotFound {
                id,
                party: self.name.clone(),
            })
    }

    pub fn has_member(&self, id: CharacterId) -> bool {
        self.members.iter().any(|member| member.id == id)
    }

    /// Ids of every member that can still be attacked (i.e. is alive).
    pub fn valid_targets(&self) -> Vec<CharacterId> {
        self.members
            .iter()
            .filter(|member| member.is_alive)
            .map(|member| member.id)
            .collect()
    }

    /// Replace a member's snapshot.
    pub fn update_member(
        &mut self,
        id: CharacterId,
        snapshot: Character,
    ) -> Result<(), PartyError> {
        let party = self.name.clone();
        let member = self
            .members
            .iter_mut()
            .find(|member| member.id == id)
            .ok_or(PartyError::CharacterNotFound { id, party })?;
        *member = snapshot;
        Ok(())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let living: Vec<String> = self
            .members
            .iter()
            .filter(|member| member.is_alive)
            .map(|member| member.to_string())
            .collect();
        write!(f, "{}", living.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::tags;

    fn sheet() -> Stats {
        //          MHP, MST, MMA, STR, AGI, ACU, ARM, RES
        Stats::new(8, 16, 4, 8, 6, 4, 2, 4)
    }

    fn character(health: i32, max_health: i32) -> Character {
        let mut stats = sheet();
        stats.max_health = max_health;
        let c = Character::new("John Halo", HashMap::new(), true, stats, vec![], Effects::new());
        c.modify(CharacterChanges::new().health(health))
    }

    #[test]
    fn test_modify_with_nothing_set_is_noop() {
        let stats = sheet();
        assert_eq!(stats.modify(&PartialStats::new()), stats);
        assert!(PartialStats::new().is_empty());
    }

    #[test]
    fn test_modify_overrides_only_set_fields() {
        let stats = sheet();
        let changes = PartialStats::new().with(Stat::Agility, 42);
        let modified = stats.modify(&changes);

        for stat in Stat::all() {
            if stat == Stat::Agility {
                assert_eq!(modified.get(stat), 42);
            } else {
                assert_eq!(modified.get(stat), stats.get(stat), "{stat} changed");
            }
        }
        // The original is untouched
        assert_eq!(stats.agility, 6);
    }

    #[test]
    fn test_modify_chains_as_sequential_override() {
        let stats = sheet();
        let b = PartialStats::new().with(Stat::Strength, 10).with(Stat::Armor, 3);
        let c = PartialStats::new().with(Stat::Armor, 7);

        let chained = stats.modify(&b).modify(&c);
        assert_eq!(chained.strength, 10);
        assert_eq!(chained.armor, 7);
        assert_eq!(chained.acumen, stats.acumen);
    }

    #[test]
    fn test_new_character_seeds_from_base() {
        let c = Character::new("Goblin", HashMap::new(), false, sheet(), vec![], Effects::new());
        assert!(c.is_alive);
        assert_eq!(c.current, c.base);
        assert_eq!(c.health, 8);
        assert_eq!(c.stamina, 16);
        assert_eq!(c.mana, 4);
        assert!(c.bonuses.is_empty());
        assert_eq!(c.inventory.backpack().count(), 0);
    }

    #[test]
    fn test_update_stats_is_additive() {
        let c = character(8, 8)
            .with_bonus(
                BonusSource::Effect("blessed".into()),
                PartialStats::new().with(Stat::Strength, 5).with(Stat::Armor, 5),
            )
            .with_bonus(
                BonusSource::Effect("haste".into()),
                PartialStats::new().with(Stat::Agility, 5).with(Stat::Armor, 2),
            );

        //                             MHP, MST, MMA, STR, AGI, ACU, ARM, RES
        assert_eq!(c.update_stats(), Stats::new(8, 16, 4, 13, 11, 4, 9, 4));
        assert_eq!(c.current, c.update_stats());
    }

    #[test]
    fn test_hit_kills_at_zero() {
        let (c, dealt) = character(10, 20).hit(&DamageInstance::new(15.0, "physical"));
        assert_eq!(c.health, 0);
        assert!(!c.is_alive);
        assert_eq!(dealt, 15);

        let (c, _) = character(10, 20).hit(&DamageInstance::new(10.0, "physical"));
        assert_eq!(c.health, 0);
        assert!(!c.is_alive);
    }

    #[test]
    fn test_hit_negative_damage_heals_up_to_max() {
        let (c, dealt) = character(10, 20).hit(&DamageInstance::new(-5.0, "healing"));
        assert_eq!(c.health, 15);
        assert!(c.is_alive);
        assert_eq!(dealt, -5);

        let (c, _) = character(10, 20).hit(&DamageInstance::new(-50.0, "healing"));
        assert_eq!(c.health, 20);
    }

    #[test]
    fn test_hit_truncates_fractional_damage() {
        let (c, dealt) = character(10, 20).hit(&DamageInstance::new(3.9, "physical"));
        assert_eq!(dealt, 3);
        assert_eq!(c.health, 7);
    }

    #[test]
    fn test_healing_does_not_revive() {
        let (dead, _) = character(10, 20).hit(&DamageInstance::new(100.0, "physical"));
        let (healed, _) = dead.hit(&DamageInstance::new(-5.0, "healing"));
        assert_eq!(healed.health, 5);
        assert!(!healed.is_alive);
    }

    #[test]
    fn test_hit_leaves_original_snapshot() {
        let original = character(10, 20);
        let (_, _) = original.hit(&DamageInstance::new(4.0, "physical"));
        assert_eq!(original.health, 10);
    }

    #[test]
    fn test_equip_and_unequip_apply_bonus() {
        let helmet = Item::new("Helmet of Strength")
            .with_tags([tags::EQUIPPABLE, "head"])
            .with_stat_bonus(PartialStats::new().with(Stat::Strength, 5).with(Stat::Armor, 5));

        let mut c = character(8, 8);
        c.inventory.add(&helmet, 1).unwrap();

        let equipped = c.equip("head", &helmet).unwrap();
        assert_eq!(equipped.current.strength, 13);
        assert_eq!(equipped.current.armor, 7);
        assert_eq!(equipped.inventory.count(&helmet), 0);
        // The old snapshot still has it in the backpack
        assert_eq!(c.inventory.count(&helmet), 1);

        let unequipped = equipped.unequip("head").unwrap();
        assert_eq!(unequipped.current, unequipped.base);
        assert_eq!(unequipped.inventory.count(&helmet), 1);
    }

    #[test]
    fn test_losing_max_health_clamps_health() {
        let c = character(8, 8);
        let cursed = c.with_bonus(
            BonusSource::Effect("cursed".into()),
            PartialStats::new().with(Stat::MaxHealth, -3),
        );
        assert_eq!(cursed.current.max_health, 5);
        assert_eq!(cursed.health, 5);

        let lifted = cursed.without_bonus(&BonusSource::Effect("cursed".into()));
        assert_eq!(lifted.current.max_health, 8);
        assert_eq!(lifted.health, 5);
    }

    #[test]
    fn test_display_uses_best_damage() {
        let c = character(8, 8);
        assert_eq!(c.to_string(), "John Halo (♥ 8)");

        let armed = c.modify(CharacterChanges::new().actions(vec![
            Action::new("stab", "attack", 2.0, "physical"),
            Action::new("slash", "attack", 3.0, "physical"),
        ]));
        assert_eq!(armed.to_string(), "John Halo (♥ 8 / ¤ 3)");
    }

    #[test]
    fn test_bonus_source_round_trips_through_string() {
        let sources = [
            BonusSource::Equipment(Slot::MainHand),
            BonusSource::Effect("poisoned".to_string()),
        ];
        for source in sources {
            let parsed: BonusSource = source.to_string().parse().unwrap();
            assert_eq!(parsed, source);
        }
        assert!("nonsense".parse::<BonusSource>().is_err());
    }

    #[test]
    fn test_party_lookup() {
        let a = character(8, 8);
        let b = character(8, 8);
        let (dead_b, _) = b.hit(&DamageInstance::new(50.0, "physical"));
        let mut party = Party::new("Heroes", vec![a.clone(), b.clone()]);

        assert_eq!(party.leader, a.id);
        assert!(party.has_member(b.id));
        assert_eq!(party.get_member(a.id).unwrap().name, "John Halo");

        party.update_member(b.id, dead_b).unwrap();
        assert_eq!(party.valid_targets(), vec![a.id]);

        let stranger = CharacterId::new();
        assert!(matches!(
            party.get_member(stranger),
            Err(PartyError::CharacterNotFound { .. })
        ));
    }
}
