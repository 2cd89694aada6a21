//! The character editor's working set and its file.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbaImage;
use log::{info, warn};

use crate::{
    common::{
        character::{self, Character, Characters, Class, Export, Stats},
        error::{Error, Invalid, Result},
        json,
    },
    mapforge::images::ImageCache,
};

/// Sprite previews fit inside this many pixels square.
pub const PREVIEW_PX: u32 = 100;

pub struct Roster {
    path: PathBuf,
    characters: Characters,
}

impl Roster {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), characters: Characters::new() }
    }

    /// Read the roster at `path`. A file that does not exist yet is an empty roster.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = match json::read(&path) {
            Ok(doc) => doc,
            Err(e) if e.is_not_found() => {
                info!("no roster at {}, starting empty", path.display());
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(e),
        };
        let characters = character::from_document(doc).map_err(|e| Error::format(&path, e.to_string()))?;
        info!("loaded {} characters from {}", characters.len(), path.display());
        Ok(Self { path, characters })
    }

    /// Like [`Roster::load`], but an unreadable file also gives an empty roster.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::load(path.clone()).unwrap_or_else(|e| {
            warn!("{e}; starting with no characters");
            Self::empty(path)
        })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn save(&self) -> Result<()> {
        json::write(&self.path, &self.characters)?;
        info!("saved {} characters to {}", self.len(), self.path.display());
        Ok(())
    }

    /// Write the `{"characters": ...}` form the map editor loads. An empty roster is refused.
    pub fn export(&self, path: &Path) -> Result<()> {
        if self.characters.is_empty() { return Err(Invalid::NothingToExport.into()); }
        json::write(path, &Export { characters: &self.characters })?;
        info!("exported {} characters to {}", self.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Character)> {
        self.characters.iter()
    }

    pub fn characters(&self) -> &Characters {
        &self.characters
    }

    /// The character's sprite shrunk to fit a preview box, or `None` when it has no sprite
    /// or the image cannot be read.
    pub fn preview(&self, id: &str, images: &mut ImageCache) -> std::result::Result<Option<Arc<RgbaImage>>, Invalid> {
        let character = self.get(id).ok_or_else(|| Invalid::UnknownCharacter(id.to_owned()))?;
        Ok(character.sprite().and_then(|sprite| images.get(sprite, Some((PREVIEW_PX, PREVIEW_PX)))))
    }

    /// Add a character with default stats at the origin and return its id. Ids are
    /// `char_NNN`, counting up from one past the roster size until a free one is found.
    pub fn new_character(&mut self) -> String {
        let (n, id) = (self.len() + 1..)
            .map(|n| (n, format!("char_{n:03}")))
            .find(|(_, id)| !self.characters.contains_key(id))
            .unwrap_or_default();
        let character = Character {
            name: format!("New Character {n}"),
            class: Class::Warrior,
            stats: Stats::default(),
            ..Character::default()
        };
        info!("created {id}");
        self.characters.insert(id.clone(), character);
        id
    }

    /// Replace an existing character after validating it. The name is stored trimmed.
    pub fn update(&mut self, id: &str, mut character: Character) -> std::result::Result<(), Invalid> {
        character.validate()?;
        let slot = self.characters.get_mut(id).ok_or_else(|| Invalid::UnknownCharacter(id.to_owned()))?;
        character.name = character.name.trim().to_owned();
        *slot = character;
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> std::result::Result<Character, Invalid> {
        let removed = self.characters.remove(id).ok_or_else(|| Invalid::UnknownCharacter(id.to_owned()))?;
        info!("deleted {id} ({})", removed.name);
        Ok(removed)
    }
}
