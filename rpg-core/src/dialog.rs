//! Value carriers handed to the presentation layer.
//!
//! Nothing in this crate renders; the UI consumes these as plain data.

use crate::world::Character;
use serde::{Deserialize, Serialize};

/// One line of dialog, optionally spoken by a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogLine {
    pub text: String,
    pub character: Option<Character>,
}

impl DialogLine {
    /// A line with no speaker.
    pub fn narration(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            character: None,
        }
    }

    pub fn spoken(text: impl Into<String>, character: Character) -> Self {
        Self {
            text: text.into(),
            character: Some(character),
        }
    }

    pub fn speaker_name(&self) -> Option<&str> {
        self.character.as_ref().map(|c| c.name.as_str())
    }
}

/// Kinds of event the game loop can send to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiEventKind {
    PressKey,
    MakeUiElement,
    MakeWorldObject,
    LoadUiElement,
    LoadZone,
    LoadCombat,
    OpenItem,
    OpenEquipment,
    OpenBackpack,
    ConfigSettings,
    SaveGame,
    LoadGame,
    Quit,
    MultiEvent,
    SetCharacter,
    GameOver,
}

/// An event tag plus an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiEvent {
    pub kind: UiEventKind,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl UiEvent {
    pub fn new(kind: UiEventKind, value: serde_json::Value) -> Self {
        Self { kind, value }
    }

    /// An event with no payload.
    pub fn bare(kind: UiEventKind) -> Self {
        Self::new(kind, serde_json::Value::Null)
    }

    /// Tell the UI about a new snapshot of a character.
    pub fn set_character(character: &Character) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            UiEventKind::SetCharacter,
            serde_json::to_value(character)?,
        ))
    }

    /// Several events delivered together.
    pub fn multi(events: Vec<UiEvent>) -> Result<Self, serde_json::Error> {
        Ok(Self::new(UiEventKind::MultiEvent, serde_json::to_value(events)?))
    }
}
