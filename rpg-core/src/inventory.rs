//! Items, equipment slots and character inventories.
//!
//! An [`Inventory`] holds five fixed equipment slots, a backpack of stacked
//! items keyed by [`ItemId`], and a task list. Every failing operation
//! leaves the inventory exactly as it was.

use crate::rules::Action;
use crate::world::{ItemId, PartialStats, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Well-known capability tags checked by the rules.
///
/// Only [`tags::EQUIPPABLE`] gates an operation. Other tags, including slot
/// names such as `"head"` on catalogue items, are descriptive and never
/// checked when equipping.
pub mod tags {
    /// Required to put an item in an equipment slot.
    pub const EQUIPPABLE: &str = "equippable";
    pub const CONSUMABLE: &str = "consumable";
    pub const WEAPON: &str = "weapon";
}

/// Errors from inventory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Slot {0} is empty")]
    EmptySlot(Slot),

    #[error("Inventory does not contain enough {item} to remove {requested} (has {available})")]
    InsufficientQuantity {
        item: String,
        requested: u32,
        available: u32,
    },

    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("The task {0} is not in the task list")]
    TaskNotFound(TaskId),
}

// ============================================================================
// Slots
// ============================================================================

/// A fixed equipment location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    MainHand,
    OffHand,
    Head,
    Body,
    Feet,
}

impl Slot {
    pub fn all() -> [Slot; 5] {
        [Slot::MainHand, Slot::OffHand, Slot::Head, Slot::Body, Slot::Feet]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::MainHand => "mainhand",
            Slot::OffHand => "offhand",
            Slot::Head => "head",
            Slot::Body => "body",
            Slot::Feet => "feet",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Slot {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::all()
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| InventoryError::InvalidOperation(format!("Slot {s} does not exist")))
    }
}

// ============================================================================
// Items
// ============================================================================

/// An equippable or consumable item definition.
///
/// Identity is the `id`: two items with identical fields but different ids
/// are distinct backpack entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// Capability markers such as [`tags::EQUIPPABLE`].
    pub tags: BTreeSet<String>,
    pub weight: u32,
    pub max_durability: u32,
    /// Not used by any rule yet.
    pub durability: u32,
    /// Added to the wearer's stats while equipped.
    pub stat_bonus: PartialStats,
    /// Added to the wearer's actions while equipped.
    pub actions: Vec<Action>,
}

impl Item {
    /// Create a new item definition with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            description: String::new(),
            tags: BTreeSet::new(),
            weight: 1,
            max_durability: 100,
            durability: 100,
            stat_bonus: PartialStats::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_durability(mut self, durability: u32) -> Self {
        self.max_durability = durability;
        self.durability = durability;
        self
    }

    pub fn with_stat_bonus(mut self, stat_bonus: PartialStats) -> Self {
        self.stat_bonus = stat_bonus;
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_equippable(&self) -> bool {
        self.has_tag(tags::EQUIPPABLE)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A number of units of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Item,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: Item, count: u32) -> Self {
        Self { item, count }
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// A quest: hand in the `conditions` to receive the `reward`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub conditions: Vec<ItemStack>,
    pub reward: Vec<ItemStack>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        conditions: Vec<ItemStack>,
        reward: Vec<ItemStack>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            conditions,
            reward,
        }
    }

    /// Units required per item, with repeated entries summed.
    fn requirements(&self) -> HashMap<ItemId, (&Item, u32)> {
        let mut totals: HashMap<ItemId, (&Item, u32)> = HashMap::new();
        for stack in &self.conditions {
            let entry = totals.entry(stack.item.id).or_insert((&stack.item, 0));
            entry.1 = entry.1.saturating_add(stack.count);
        }
        totals
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// The inventory of a character. Not necessarily the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    equipment: BTreeMap<Slot, Option<Item>>,
    backpack: HashMap<ItemId, ItemStack>,
    tasklist: Vec<Task>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// Create an empty inventory with all five slots empty.
    pub fn new() -> Self {
        Self {
            equipment: Slot::all().into_iter().map(|slot| (slot, None)).collect(),
            backpack: HashMap::new(),
            tasklist: Vec::new(),
        }
    }

    /// Equip an item from the backpack in the given slot.
    ///
    /// Supports hot-swapping: an occupied slot is emptied into the backpack
    /// first. Returns the slot that now holds the item.
    pub fn equip(&mut self, slot: &str, item: &Item) -> Result<Slot, InventoryError> {
        if !item.is_equippable() {
            return Err(InventoryError::InvalidOperation(format!(
                "Item {item} not equippable"
            )));
        }
        let slot: Slot = slot.parse()?;

        if self.equipped(slot).is_some_and(|current| current.id == item.id) {
            return Ok(slot);
        }
        if self.count(item) == 0 {
            tracing::debug!("Cannot equip {}: none in backpack", item.name);
            return Err(InventoryError::InsufficientQuantity {
                item: item.name.clone(),
                requested: 1,
                available: 0,
            });
        }

        self.take_from_slot(slot)?;
        self.take(item, 1)?;
        self.equipment.insert(slot, Some(item.clone()));

        tracing::debug!("Equipped {} in {}", item.name, slot);
        Ok(slot)
    }

    /// Remove the item from the given slot and add it back to the backpack.
    ///
    /// Returns the slot and the item that was in it.
    pub fn unequip(&mut self, slot: &str) -> Result<(Slot, Item), InventoryError> {
        let slot: Slot = slot.parse()?;
        match self.take_from_slot(slot)? {
            Some(item) => {
                tracing::debug!("Unequipped {} from {}", item.name, slot);
                Ok((slot, item))
            }
            None => Err(InventoryError::EmptySlot(slot)),
        }
    }

    /// Add `count` units of an item to the backpack.
    pub fn add(&mut self, item: &Item, count: i32) -> Result<(), InventoryError> {
        let count = non_negative(count)?;
        self.put(item, count)
    }

    /// Remove `count` units of an item from the backpack.
    pub fn remove(&mut self, item: &Item, count: i32) -> Result<(), InventoryError> {
        let count = non_negative(count)?;
        self.take(item, count)
    }

    /// Use one unit of an item from the backpack. The item is consumed.
    pub fn use_item(&mut self, item: &Item) -> Result<(), InventoryError> {
        if self.count(item) == 0 {
            return Err(InventoryError::InsufficientQuantity {
                item: item.name.clone(),
                requested: 1,
                available: 0,
            });
        }
        // TODO: apply consumable effects once potions have a defined effect
        self.take(item, 1)
    }

    /// Units of an item held in the backpack (equipped units excluded).
    pub fn count(&self, item: &Item) -> u32 {
        self.backpack.get(&item.id).map_or(0, |stack| stack.count)
    }

    /// The item equipped in a slot, if any.
    pub fn equipped(&self, slot: Slot) -> Option<&Item> {
        self.equipment.get(&slot).and_then(Option::as_ref)
    }

    /// Every occupied slot, in slot order.
    pub fn equipped_items(&self) -> impl Iterator<Item = (Slot, &Item)> {
        self.equipment
            .iter()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (*slot, item)))
    }

    /// The first slot holding the given item.
    pub fn find_equipped_item(&self, id: ItemId) -> Option<Slot> {
        self.equipped_items()
            .find(|(_, item)| item.id == id)
            .map(|(slot, _)| slot)
    }

    /// Every stack carried in the backpack.
    pub fn backpack(&self) -> impl Iterator<Item = &ItemStack> {
        self.backpack.values()
    }

    /// Total weight of backpack and equipment, saturating at `u64::MAX`.
    pub fn total_weight(&self) -> u64 {
        let carried = self
            .backpack
            .values()
            .map(|stack| u64::from(stack.item.weight) * u64::from(stack.count));
        let worn = self.equipped_items().map(|(_, item)| u64::from(item.weight));
        carried.chain(worn).fold(0, u64::saturating_add)
    }

    // ------------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------------

    /// Add a task to the task list.
    pub fn accept(&mut self, task: Task) {
        tracing::debug!("Accepted task {}", task.name);
        self.tasklist.push(task);
    }

    /// Remove a task from the task list.
    pub fn finish(&mut self, task_id: TaskId) -> Result<Task, InventoryError> {
        let index = self
            .tasklist
            .iter()
            .position(|task| task.id == task_id)
            .ok_or(InventoryError::TaskNotFound(task_id))?;
        Ok(self.tasklist.remove(index))
    }

    /// Hand in a task's conditions, receive its reward and finish it.
    pub fn claim(&mut self, task_id: TaskId) -> Result<(), InventoryError> {
        let task = self
            .tasklist
            .iter()
            .find(|task| task.id == task_id)
            .ok_or(InventoryError::TaskNotFound(task_id))?;

        for (item, required) in task.requirements().into_values() {
            let available = self.count(item);
            if available < required {
                return Err(InventoryError::InsufficientQuantity {
                    item: item.name.clone(),
                    requested: required,
                    available,
                });
            }
        }

        // Applied to a copy so an overflowing reward leaves everything as it was.
        let mut staged = self.clone();
        let task = staged.finish(task_id)?;
        for stack in &task.conditions {
            staged.take(&stack.item, stack.count)?;
        }
        for stack in &task.reward {
            staged.put(&stack.item, stack.count)?;
        }
        *self = staged;

        tracing::info!("Claimed task {}", task.name);
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasklist
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn put(&mut self, item: &Item, count: u32) -> Result<(), InventoryError> {
        if count == 0 {
            return Ok(());
        }
        let total = self.count(item).checked_add(count).ok_or_else(|| {
            tracing::debug!("Cannot add {} x{}: stack is full", item.name, count);
            InventoryError::PreconditionViolation(format!(
                "cannot hold more than {} {}",
                u32::MAX,
                item.name
            ))
        })?;
        self.backpack
            .entry(item.id)
            .or_insert_with(|| ItemStack::new(item.clone(), 0))
            .count = total;
        tracing::debug!("Added {} x{} to backpack", item.name, count);
        Ok(())
    }

    fn take(&mut self, item: &Item, count: u32) -> Result<(), InventoryError> {
        let available = self.count(item);
        if available < count {
            tracing::debug!(
                "Cannot remove {} x{}: only {} in backpack",
                item.name,
                count,
                available
            );
            return Err(InventoryError::InsufficientQuantity {
                item: item.name.clone(),
                requested: count,
                available,
            });
        }
        if count == 0 {
            return Ok(());
        }

        if available == count {
            self.backpack.remove(&item.id);
        } else if let Some(stack) = self.backpack.get_mut(&item.id) {
            stack.count -= count;
        }
        tracing::debug!("Removed {} x{} from backpack", item.name, count);
        Ok(())
    }

    /// Move the item in `slot` (if any) back to the backpack.
    fn take_from_slot(&mut self, slot: Slot) -> Result<Option<Item>, InventoryError> {
        let Some(item) = self.equipped(slot).cloned() else {
            return Ok(None);
        };
        self.put(&item, 1)?;
        self.equipment.insert(slot, None);
        Ok(Some(item))
    }
}

fn non_negative(count: i32) -> Result<u32, InventoryError> {
    u32::try_from(count).map_err(|_| {
        InventoryError::PreconditionViolation(format!("count must be >= 0, got {count}"))
    })
}
