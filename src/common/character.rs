//! Character records shared by the character editor (which owns them) and the map editor
//! (which only displays a loaded snapshot).

use std::{collections::BTreeMap, fmt};

use axial::Qr;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::error::Invalid;

/// Token color for classes the map editor has no entry for.
pub const FALLBACK_CLASS_COLOR: &str = "#95a5a6";

/// Character id -> record, ordered by id.
pub type Characters = BTreeMap<String, Character>;

/// Character class. Anything outside the built-in list is kept verbatim.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Class {
    #[default]
    Warrior,
    Mage,
    Rogue,
    Cleric,
    Ranger,
    Other(String),
}

impl Class {
    pub const BUILT_IN: [Class; 5] = [Class::Warrior, Class::Mage, Class::Rogue, Class::Cleric, Class::Ranger];

    pub fn as_str(&self) -> &str {
        match self {
            Class::Warrior => "Warrior",
            Class::Mage => "Mage",
            Class::Rogue => "Rogue",
            Class::Cleric => "Cleric",
            Class::Ranger => "Ranger",
            Class::Other(name) => name,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Class::Warrior => "#e74c3c",
            Class::Mage => "#3498db",
            Class::Rogue => "#2ecc71",
            Class::Cleric => "#f1c40f",
            Class::Ranger => "#9b59b6",
            Class::Other(_) => FALLBACK_CLASS_COLOR,
        }
    }
}

impl From<String> for Class {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Warrior" => Class::Warrior,
            "Mage" => Class::Mage,
            "Rogue" => Class::Rogue,
            "Cleric" => Class::Cleric,
            "Ranger" => Class::Ranger,
            _ => Class::Other(name),
        }
    }
}

impl From<&str> for Class {
    fn from(name: &str) -> Self {
        Class::from(name.to_owned())
    }
}

impl From<Class> for String {
    fn from(class: Class) -> String {
        match class {
            Class::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self { hp: 100, attack: 10, defense: 8, speed: 6 }
    }
}

impl Stats {
    pub fn validate(&self) -> Result<(), Invalid> {
        for (stat, value) in [("hp", self.hp), ("attack", self.attack), ("defense", self.defense), ("speed", self.speed)] {
            if value == 0 { return Err(Invalid::NotPositive(stat)); }
        }
        Ok(())
    }
}

/// Fields missing from a file take the editor's defaults.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Character {
    pub name: String,
    pub class: Class,
    pub stats: Stats,
    pub position: Qr,
    /// Empty when the character has no sprite
    pub sprite: String,
}

impl Character {
    pub fn sprite(&self) -> Option<&str> {
        Some(self.sprite.trim()).filter(|s| !s.is_empty())
    }

    /// Letter drawn on the token when there is no sprite.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }

    pub fn tooltip(&self) -> String {
        let name = if self.name.is_empty() { "Unknown" } else { &self.name };
        let Stats { hp, attack, defense, speed } = self.stats;
        format!("{name}\n{}\nHP: {hp}  ATK: {attack}\nDEF: {defense}  SPD: {speed}", self.class)
    }

    pub fn validate(&self) -> Result<(), Invalid> {
        if self.name.trim().is_empty() { return Err(Invalid::EmptyName); }
        self.stats.validate()
    }
}

/// Read a character document in either shape: the exported `{"characters": {...}}`
/// wrapper or a bare `{id: record}` mapping.
pub fn from_document(doc: Value) -> serde_json::Result<Characters> {
    match doc {
        Value::Object(mut object) if object.contains_key("characters") => {
            serde_json::from_value(object.remove("characters").unwrap_or_default())
        }
        other => serde_json::from_value(other),
    }
}

/// The exported shape, `{"characters": {...}}`.
#[derive(Serialize)]
pub struct Export<'a> {
    pub characters: &'a Characters,
}
