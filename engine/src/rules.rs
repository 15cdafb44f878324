//! Abilities, skills and the fixed skill-to-ability table.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// Full lower-case name, also the key used for saving-throw proficiency.
    pub fn name(self) -> &'static str {
        match self {
            Ability::Str => "strength",
            Ability::Dex => "dexterity",
            Ability::Con => "constitution",
            Ability::Int => "intelligence",
            Ability::Wis => "wisdom",
            Ability::Cha => "charisma",
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Ability::Str => "STR",
            Ability::Dex => "DEX",
            Ability::Con => "CON",
            Ability::Int => "INT",
            Ability::Wis => "WIS",
            Ability::Cha => "CHA",
        }
    }

    /// Accepts the full name or the three-letter abbreviation, any case.
    pub fn parse(s: &str) -> Option<Ability> {
        let lowered = s.trim().to_lowercase();
        Ability::ALL
            .into_iter()
            .find(|a| a.name() == lowered || a.abbrev().eq_ignore_ascii_case(&lowered))
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    pub fn ability(self) -> Ability {
        use Skill::*;
        match self {
            Athletics => Ability::Str,
            Acrobatics | SleightOfHand | Stealth => Ability::Dex,
            Arcana | History | Investigation | Nature | Religion => Ability::Int,
            AnimalHandling | Insight | Medicine | Perception | Survival => Ability::Wis,
            Deception | Intimidation | Performance | Persuasion => Ability::Cha,
        }
    }

    /// Lower-case name as stored in a character's skill sets.
    pub fn name(self) -> &'static str {
        use Skill::*;
        match self {
            Acrobatics => "acrobatics",
            AnimalHandling => "animal handling",
            Arcana => "arcana",
            Athletics => "athletics",
            Deception => "deception",
            History => "history",
            Insight => "insight",
            Intimidation => "intimidation",
            Investigation => "investigation",
            Medicine => "medicine",
            Nature => "nature",
            Perception => "perception",
            Performance => "performance",
            Persuasion => "persuasion",
            Religion => "religion",
            SleightOfHand => "sleight of hand",
            Stealth => "stealth",
            Survival => "survival",
        }
    }

    /// Case-insensitive; multi-word skills may be written with spaces,
    /// underscores or hyphens (`sleight_of_hand` works on a command line).
    pub fn parse(s: &str) -> Option<Skill> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        Skill::ALL.into_iter().find(|sk| sk.name() == normalized)
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a `check` rolls against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSubject {
    Skill(Skill),
    Ability(Ability),
}

impl CheckSubject {
    pub fn parse(s: &str) -> Option<CheckSubject> {
        Skill::parse(s)
            .map(CheckSubject::Skill)
            .or_else(|| Ability::parse(s).map(CheckSubject::Ability))
    }

    pub fn ability(self) -> Ability {
        match self {
            CheckSubject::Skill(skill) => skill.ability(),
            CheckSubject::Ability(ability) => ability,
        }
    }
}

/// D&D ability modifier = floor((score - 10) / 2) for integer scores.
pub fn ability_mod(score: i32) -> i32 {
    // `div_euclid` with positive divisor matches mathematical floor division.
    (score - 10).div_euclid(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_skill_round_trips_through_its_name() {
        for skill in Skill::ALL {
            assert_eq!(Skill::parse(skill.name()), Some(skill));
        }
    }

    #[test]
    fn skill_names_accept_command_line_spellings() {
        assert_eq!(Skill::parse("Sleight_of_Hand"), Some(Skill::SleightOfHand));
        assert_eq!(Skill::parse("animal-handling"), Some(Skill::AnimalHandling));
        assert_eq!(Skill::parse("STEALTH"), Some(Skill::Stealth));
        assert_eq!(Skill::parse("lockpicking"), None);
    }

    #[test]
    fn abilities_parse_from_name_or_abbrev() {
        assert_eq!(Ability::parse("dex"), Some(Ability::Dex));
        assert_eq!(Ability::parse("WIS"), Some(Ability::Wis));
        assert_eq!(Ability::parse("Charisma"), Some(Ability::Cha));
        assert_eq!(Ability::parse("luck"), None);
    }

    #[test]
    fn skills_map_to_governing_ability() {
        assert_eq!(Skill::Stealth.ability(), Ability::Dex);
        assert_eq!(Skill::Athletics.ability(), Ability::Str);
        assert_eq!(Skill::Perception.ability(), Ability::Wis);
        assert_eq!(Skill::Arcana.ability(), Ability::Int);
        assert_eq!(Skill::Persuasion.ability(), Ability::Cha);
    }

    #[test]
    fn check_subject_prefers_skills_then_abilities() {
        assert_eq!(
            CheckSubject::parse("stealth"),
            Some(CheckSubject::Skill(Skill::Stealth))
        );
        assert_eq!(
            CheckSubject::parse("con"),
            Some(CheckSubject::Ability(Ability::Con))
        );
        assert_eq!(CheckSubject::parse("nonsense"), None);
    }
}
