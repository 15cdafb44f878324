//! The single mutable character sheet.

use std::fmt;

use indexmap::IndexSet;
use thiserror::Error;

use crate::dice::{DiceExpr, DiceError};
use crate::rules::{ability_mod, Ability, Skill};

pub const MIN_ABILITY_SCORE: i32 = 1;
pub const MAX_ABILITY_SCORE: i32 = 30;
pub const MAX_PROFICIENCY_BONUS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} must be between 1 and 30, got {value}", capitalize(.ability.name()))]
    AbilityOutOfRange { ability: Ability, value: i32 },
    #[error(
        "Invalid weapon damage format: {0}. Use XdY terms or standalone numbers separated by spaces (e.g. \"2d4 1d6 3\")"
    )]
    WeaponDamage(String),
    #[error("Armor class cannot be negative, got {0}")]
    NegativeArmorClass(i32),
    #[error("Health cannot be negative, got {0}")]
    NegativeHealth(i32),
    #[error("Proficiency bonus must be between 0 and 6, got {0}")]
    ProficiencyBonusOutOfRange(i32),
    #[error("{field} must be a whole number, got \"{value}\"")]
    NotANumber { field: String, value: String },
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),
    #[error("Cannot remove proficiency in {0} while expertise remains")]
    ExpertiseRequiresProficiency(String),
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Skill-set keys: a skill name or, for saving throws, an ability's full name.
fn proficiency_key(name: &str) -> Result<String, ValidationError> {
    if let Some(skill) = Skill::parse(name) {
        return Ok(skill.name().to_string());
    }
    let lowered = name.trim().to_lowercase();
    Ability::ALL
        .into_iter()
        .find(|a| a.name() == lowered)
        .map(|a| a.name().to_string())
        .ok_or_else(|| ValidationError::UnknownSkill(name.trim().to_string()))
}

fn expertise_key(name: &str) -> Result<String, ValidationError> {
    Skill::parse(name)
        .map(|s| s.name().to_string())
        .ok_or_else(|| ValidationError::UnknownSkill(name.trim().to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
    name: Option<String>,
    strength: i32,
    dexterity: i32,
    constitution: i32,
    intelligence: i32,
    wisdom: i32,
    charisma: i32,
    proficiencies: IndexSet<String>,
    expertise: IndexSet<String>,
    weapon_damage: DiceExpr,
    armor_class: i32,
    health: i32,
    proficiency_bonus: i32,
}

impl Default for CharacterRecord {
    fn default() -> Self {
        Self {
            name: None,
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
            proficiencies: IndexSet::new(),
            expertise: IndexSet::new(),
            weapon_damage: DiceExpr::dice(1, 8),
            armor_class: 10,
            health: 10,
            proficiency_bonus: 2,
        }
    }
}

impl CharacterRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_mod(self.score(ability))
    }

    /// Rejects scores outside [1, 30]; the previous value is kept on error.
    pub fn set_score(&mut self, ability: Ability, value: i32) -> Result<(), ValidationError> {
        if !(MIN_ABILITY_SCORE..=MAX_ABILITY_SCORE).contains(&value) {
            return Err(ValidationError::AbilityOutOfRange { ability, value });
        }
        let slot = match ability {
            Ability::Str => &mut self.strength,
            Ability::Dex => &mut self.dexterity,
            Ability::Con => &mut self.constitution,
            Ability::Int => &mut self.intelligence,
            Ability::Wis => &mut self.wisdom,
            Ability::Cha => &mut self.charisma,
        };
        *slot = value;
        Ok(())
    }

    pub fn weapon_damage(&self) -> &DiceExpr {
        &self.weapon_damage
    }

    pub fn set_weapon_damage(&mut self, notation: &str) -> Result<(), ValidationError> {
        let expr: DiceExpr = notation.parse().map_err(|e| match e {
            DiceError::InvalidTerm(term) | DiceError::TooLarge(term) => {
                ValidationError::WeaponDamage(term)
            }
            DiceError::Empty => ValidationError::WeaponDamage(notation.to_string()),
        })?;
        self.weapon_damage = expr;
        Ok(())
    }

    pub fn armor_class(&self) -> i32 {
        self.armor_class
    }

    pub fn set_armor_class(&mut self, value: i32) -> Result<(), ValidationError> {
        if value < 0 {
            return Err(ValidationError::NegativeArmorClass(value));
        }
        self.armor_class = value;
        Ok(())
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn set_health(&mut self, value: i32) -> Result<(), ValidationError> {
        if value < 0 {
            return Err(ValidationError::NegativeHealth(value));
        }
        self.health = value;
        Ok(())
    }

    /// Apply damage (negative delta) or healing. Unlike `set_health` this may
    /// leave the character below zero. Returns the new health.
    pub fn adjust_health(&mut self, delta: i32) -> i32 {
        self.health = self.health.saturating_add(delta);
        self.health
    }

    /// Saved health may already be below zero after `ouch`.
    pub(crate) fn restore_health(&mut self, value: i32) {
        self.health = value;
    }

    pub fn proficiency_bonus(&self) -> i32 {
        self.proficiency_bonus
    }

    pub fn set_proficiency_bonus(&mut self, value: i32) -> Result<(), ValidationError> {
        if !(0..=MAX_PROFICIENCY_BONUS).contains(&value) {
            return Err(ValidationError::ProficiencyBonusOutOfRange(value));
        }
        self.proficiency_bonus = value;
        Ok(())
    }

    pub fn proficiencies(&self) -> impl Iterator<Item = &str> {
        self.proficiencies.iter().map(String::as_str)
    }

    pub fn expertise(&self) -> impl Iterator<Item = &str> {
        self.expertise.iter().map(String::as_str)
    }

    pub fn add_proficiency(&mut self, name: &str) -> Result<(), ValidationError> {
        let key = proficiency_key(name)?;
        self.proficiencies.insert(key);
        Ok(())
    }

    /// Expertise implies proficiency, so both sets gain the skill.
    pub fn add_expertise(&mut self, name: &str) -> Result<(), ValidationError> {
        let key = expertise_key(name)?;
        self.proficiencies.insert(key.clone());
        self.expertise.insert(key);
        Ok(())
    }

    /// Refused while the character still has expertise in the skill.
    pub fn remove_proficiency(&mut self, name: &str) -> Result<bool, ValidationError> {
        let key = proficiency_key(name)?;
        if self.expertise.contains(&key) {
            return Err(ValidationError::ExpertiseRequiresProficiency(key));
        }
        Ok(self.proficiencies.shift_remove(&key))
    }

    pub fn remove_expertise(&mut self, name: &str) -> Result<bool, ValidationError> {
        let key = expertise_key(name)?;
        Ok(self.expertise.shift_remove(&key))
    }

    pub fn has_proficiency(&self, name: &str) -> bool {
        proficiency_key(name).is_ok_and(|key| self.proficiencies.contains(&key))
    }

    pub fn has_expertise(&self, name: &str) -> bool {
        expertise_key(name).is_ok_and(|key| self.expertise.contains(&key))
    }

    pub fn has_save_proficiency(&self, ability: Ability) -> bool {
        self.proficiencies.contains(ability.name())
    }
}

fn format_modifier(modifier: i32) -> String {
    if modifier >= 0 {
        format!("+{}", modifier)
    } else {
        format!("-{}", modifier.abs())
    }
}

impl fmt::Display for CharacterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Character Stats")?;
        writeln!(f, "---------------")?;
        if let Some(name) = &self.name {
            writeln!(f, "Name: {}", name)?;
        }
        for ability in Ability::ALL {
            writeln!(
                f,
                "{}: {} ({})",
                capitalize(ability.name()),
                self.score(ability),
                format_modifier(self.modifier(ability))
            )?;
        }
        writeln!(f, "Proficiency Bonus: +{}", self.proficiency_bonus)?;
        writeln!(f)?;
        writeln!(f, "Proficiencies:")?;
        if self.proficiencies.is_empty() {
            writeln!(f, "- none")?;
        }
        for skill in &self.proficiencies {
            writeln!(f, "- {}", skill)?;
        }
        writeln!(f)?;
        writeln!(f, "Expertise:")?;
        if self.expertise.is_empty() {
            writeln!(f, "- none")?;
        }
        for skill in &self.expertise {
            writeln!(f, "- {}", skill)?;
        }
        writeln!(f)?;
        writeln!(f, "Weapon Damage: {}", self.weapon_damage)?;
        writeln!(f, "Armor Class: {}", self.armor_class)?;
        write!(f, "Health: {}", self.health)
    }
}
