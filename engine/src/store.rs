//! Character persistence: one JSON document per character name.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::character::{CharacterRecord, ValidationError};
use crate::rules::Ability;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Character \"{0}\" not found.")]
    NotFound(String),
    #[error("Invalid character name: \"{0}\"")]
    InvalidName(String),
    #[error("Character data for \"{name}\" is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Character data for \"{name}\" is invalid: {source}")]
    Invalid {
        name: String,
        #[source]
        source: ValidationError,
    },
    #[error("Could not encode character \"{name}\": {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error for \"{name}\": {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// On-disk shape. Field names are fixed for compatibility with existing files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersistedCharacter {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub wisdom: i32,
    pub intelligence: i32,
    pub charisma: i32,
    pub weapon_damage: String,
    pub armor_class: i32,
    pub health: i32,
    pub proficiency_bonus: i32,
    pub expertise: Vec<String>,
    pub proficiency: Vec<String>,
}

impl From<&CharacterRecord> for PersistedCharacter {
    fn from(record: &CharacterRecord) -> Self {
        Self {
            strength: record.score(Ability::Str),
            dexterity: record.score(Ability::Dex),
            constitution: record.score(Ability::Con),
            wisdom: record.score(Ability::Wis),
            intelligence: record.score(Ability::Int),
            charisma: record.score(Ability::Cha),
            weapon_damage: record.weapon_damage().to_string(),
            armor_class: record.armor_class(),
            health: record.health(),
            proficiency_bonus: record.proficiency_bonus(),
            expertise: record.expertise().map(str::to_string).collect(),
            proficiency: record.proficiencies().map(str::to_string).collect(),
        }
    }
}

impl PersistedCharacter {
    /// Build a record through its validated setters. Skill names are lower-cased.
    /// Health is restored as saved, including values below zero.
    pub fn into_record(self, name: &str) -> Result<CharacterRecord, ValidationError> {
        let mut record = CharacterRecord::named(name);
        record.set_score(Ability::Str, self.strength)?;
        record.set_score(Ability::Dex, self.dexterity)?;
        record.set_score(Ability::Con, self.constitution)?;
        record.set_score(Ability::Wis, self.wisdom)?;
        record.set_score(Ability::Int, self.intelligence)?;
        record.set_score(Ability::Cha, self.charisma)?;
        record.set_weapon_damage(&self.weapon_damage)?;
        record.set_armor_class(self.armor_class)?;
        record.restore_health(self.health);
        record.set_proficiency_bonus(self.proficiency_bonus)?;
        for skill in &self.proficiency {
            record.add_proficiency(&skill.to_lowercase())?;
        }
        for skill in &self.expertise {
            record.add_expertise(&skill.to_lowercase())?;
        }
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Load/save collaborator used by the session.
pub trait CharacterStore {
    fn exists(&self, name: &str) -> Result<bool, StoreError>;
    fn load(&self, name: &str) -> Result<CharacterRecord, StoreError>;
    fn save(&mut self, name: &str, record: &CharacterRecord) -> Result<(), StoreError>;
    fn delete(&mut self, name: &str) -> Result<(), StoreError>;
}

fn check_name(name: &str) -> Result<(), StoreError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn encode(name: &str, record: &CharacterRecord) -> Result<String, StoreError> {
    PersistedCharacter::from(record)
        .to_json()
        .map_err(|source| StoreError::Encode { name: name.to_string(), source })
}

fn decode(name: &str, text: &str) -> Result<CharacterRecord, StoreError> {
    let data: PersistedCharacter = serde_json::from_str(text).map_err(|source| {
        StoreError::Malformed { name: name.to_string(), source }
    })?;
    data.into_record(name)
        .map_err(|source| StoreError::Invalid { name: name.to_string(), source })
}

/// Stores `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        check_name(name)?;
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

fn read_text_auto(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl CharacterStore for FsStore {
    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.path_for(name)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { name: name.to_string(), source }),
        }
    }

    fn load(&self, name: &str) -> Result<CharacterRecord, StoreError> {
        let path = self.path_for(name)?;
        let text = read_text_auto(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io { name: name.to_string(), source },
        })?;
        let record = decode(name, &text)?;
        info!(character = name, path = %path.display(), "loaded character");
        Ok(record)
    }

    fn save(&mut self, name: &str, record: &CharacterRecord) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        let io_err = |source: io::Error| StoreError::Io { name: name.to_string(), source };
        let json = encode(name, record)?;
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(&path, json).map_err(io_err)?;
        info!(character = name, path = %path.display(), "saved character");
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        fs::remove_file(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(name.to_string()),
            _ => StoreError::Io { name: name.to_string(), source },
        })?;
        info!(character = name, path = %path.display(), "deleted character");
        Ok(())
    }
}

/// Keeps serialized documents in memory; same encoding as [`FsStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document, e.g. one written by hand or by an older version.
    pub fn insert_raw(&mut self, name: impl Into<String>, json: impl Into<String>) {
        self.docs.insert(name.into(), json.into());
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.docs.get(name).map(String::as_str)
    }
}

impl CharacterStore for MemoryStore {
    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        check_name(name)?;
        Ok(self.docs.contains_key(name))
    }

    fn load(&self, name: &str) -> Result<CharacterRecord, StoreError> {
        check_name(name)?;
        let text = self
            .docs
            .get(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        decode(name, text)
    }

    fn save(&mut self, name: &str, record: &CharacterRecord) -> Result<(), StoreError> {
        check_name(name)?;
        let json = encode(name, record)?;
        self.docs.insert(name.to_string(), json);
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        check_name(name)?;
        self.docs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
