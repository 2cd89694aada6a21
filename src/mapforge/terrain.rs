//! # Terrain registry
//!
//! Catalogue of paintable terrain types, keyed by numeric id. On disk each terrain is a
//! positional array `[name, color, image_or_null, {isWalkable, moveCost}]`; in memory it
//! is a [`Terrain`] record and the array only exists at the serde boundary.

use std::{cmp::Ordering, collections::BTreeMap, path::Path};

use derive_more::{Display, From};
use log::{info, warn};
use serde::{Deserialize, Serialize, Serializer};

use crate::common::{
    color::Color,
    error::{Invalid, Result},
    json,
};

/// Brush id that erases instead of painting. Never present in a registry.
pub const ERASE: &str = "-1";

/// Terrain id as written in map files.
///
/// Registered ids are canonical non-negative integers, but map cells may carry anything a
/// foreign file put there, so the raw string is kept. Ordering is numeric first.
#[derive(Clone, Debug, Deserialize, Display, Eq, From, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TerrainId(String);

impl TerrainId {
    pub fn erase() -> Self {
        TerrainId(ERASE.to_owned())
    }

    pub fn is_erase(&self) -> bool {
        self.0 == ERASE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of a canonical id (`"7"`, not `"07"` or `"+7"`).
    pub fn index(&self) -> Option<u32> {
        self.0.parse::<u32>().ok().filter(|n| n.to_string() == self.0)
    }
}

impl From<u32> for TerrainId {
    fn from(n: u32) -> Self {
        TerrainId(n.to_string())
    }
}

impl From<&str> for TerrainId {
    fn from(s: &str) -> Self {
        TerrainId(s.to_owned())
    }
}

impl Ord for TerrainId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.index(), other.index()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for TerrainId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default = "Properties::walkable_default")]
    pub is_walkable: bool,
    #[serde(default = "Properties::move_cost_default")]
    pub move_cost: u32,
}

impl Properties {
    fn walkable_default() -> bool { true }
    fn move_cost_default() -> u32 { 1 }

    pub fn blocked() -> Self {
        Self { is_walkable: false, move_cost: 99 }
    }
}

impl Default for Properties {
    fn default() -> Self {
        Self { is_walkable: true, move_cost: 1 }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "Record", into = "Record")]
pub struct Terrain {
    pub name: String,
    pub color: Color,
    /// Relative to the editor's base directory unless absolute
    pub image: Option<String>,
    pub properties: Properties,
}

/// On-disk layout of a terrain entry.
#[derive(Deserialize, Serialize)]
struct Record(
    String,
    Color,
    #[serde(default)] Option<String>,
    #[serde(default)] Properties,
);

impl TryFrom<Record> for Terrain {
    type Error = Invalid;
    fn try_from(Record(name, color, image, properties): Record) -> std::result::Result<Self, Invalid> {
        let name = name.trim().to_owned();
        if name.is_empty() { return Err(Invalid::EmptyName); }
        let image = image.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
        let properties = Properties { move_cost: properties.move_cost.max(1), ..properties };
        Ok(Terrain { name, color, image, properties })
    }
}

impl From<Terrain> for Record {
    fn from(t: Terrain) -> Self {
        Record(t.name, t.color, t.image, t.properties)
    }
}

impl Terrain {
    pub fn new(name: &str, color: &str) -> std::result::Result<Self, Invalid> {
        let name = name.trim();
        if name.is_empty() { return Err(Invalid::EmptyName); }
        Ok(Terrain {
            name: name.to_owned(),
            color: Color::parse(color)?,
            image: None,
            properties: Properties::default(),
        })
    }
}

/// Input of the "edit selected tile" form. A missing `move_cost` keeps the current one;
/// a missing or blank `image` clears the image.
#[derive(Clone, Debug, Default)]
pub struct TerrainEdit {
    pub name: String,
    pub color: String,
    pub image: Option<String>,
    pub walkable: bool,
    pub move_cost: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    terrains: BTreeMap<u32, Terrain>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in set used when nothing is loaded.
    pub fn defaults() -> Self {
        let walk = |move_cost| Properties { is_walkable: true, move_cost };
        let entries = [
            ("Desert", "#facc15", walk(1)),
            ("Grass", "#4ade80", walk(1)),
            ("Forest", "#16a34a", walk(2)),
            ("Water", "#38bdf8", Properties::blocked()),
            ("Mountain", "#a8a29e", Properties::blocked()),
            ("Wall", "#57534e", Properties::blocked()),
        ];
        let terrains = entries.into_iter().zip(0..).filter_map(|((name, color, properties), id)| {
            let color = Color::parse(color).ok()?;
            Some((id, Terrain { name: name.to_owned(), color, image: None, properties }))
        }).collect();
        Self { terrains }
    }

    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }

    pub fn get(&self, id: &TerrainId) -> Option<&Terrain> {
        self.terrains.get(&id.index()?)
    }

    pub fn contains(&self, id: &TerrainId) -> bool {
        self.get(id).is_some()
    }

    /// Ids in numeric order.
    pub fn ids(&self) -> impl Iterator<Item = TerrainId> + '_ {
        self.terrains.keys().map(|&n| TerrainId::from(n))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TerrainId, &Terrain)> {
        self.terrains.iter().map(|(&n, t)| (TerrainId::from(n), t))
    }

    fn next_id(&self) -> Option<u32> {
        self.terrains.keys().next_back().map_or(Some(0), |max| max.checked_add(1))
    }

    /// Register a new terrain with default properties and no image.
    pub fn add(&mut self, name: &str, color: &str) -> std::result::Result<TerrainId, Invalid> {
        let terrain = Terrain::new(name, color)?;
        let id = self.next_id().ok_or(Invalid::IdSpaceExhausted)?;
        info!("added terrain {id} ({}, {})", terrain.name, terrain.color);
        self.terrains.insert(id, terrain);
        Ok(TerrainId::from(id))
    }

    /// Replace a terrain in place. Returns the previous record.
    pub fn update(&mut self, id: &TerrainId, edit: TerrainEdit) -> std::result::Result<Terrain, Invalid> {
        let unknown = || Invalid::UnknownTerrain(id.to_string());
        let index = id.index().ok_or_else(unknown)?;
        let old = self.terrains.get(&index).ok_or_else(unknown)?;

        let mut terrain = Terrain::new(&edit.name, &edit.color)?;
        terrain.image = edit.image.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
        terrain.properties = Properties {
            is_walkable: edit.walkable,
            move_cost: match edit.move_cost {
                Some(0) => return Err(Invalid::NotPositive("move cost")),
                Some(cost) => cost,
                None => old.properties.move_cost,
            },
        };

        info!("updated terrain {id} ({})", terrain.name);
        Ok(std::mem::replace(self.terrains.get_mut(&index).ok_or_else(unknown)?, terrain))
    }

    /// Read a terrain file. Entries that cannot be used are skipped with a warning; a file
    /// that is unreadable or not an object is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let object = json::read_object(path)?;
        let mut terrains = BTreeMap::new();
        for (key, value) in object {
            let id = TerrainId::from(key.as_str());
            let Some(index) = id.index() else {
                warn!("{}: skipping terrain with id `{key}`, ids must be non-negative integers", path.display());
                continue;
            };
            match serde_json::from_value::<Terrain>(value) {
                Ok(terrain) => { terrains.insert(index, terrain); }
                Err(e) => warn!("{}: skipping terrain {key}: {e}", path.display()),
            }
        }
        info!("loaded {} terrains from {}", terrains.len(), path.display());
        Ok(Self { terrains })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        json::write(path, self)?;
        info!("saved {} terrains to {}", self.len(), path.display());
        Ok(())
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.terrains.iter().map(|(id, t)| (id.to_string(), t)))
    }
}
