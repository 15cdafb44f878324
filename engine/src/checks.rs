use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::character::CharacterRecord;
use crate::rules::{Ability, CheckSubject};
use crate::Dice;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("Invalid skill or ability: {0}. Use: check <skill|ability>")]
    InvalidSkillOrAbility(String),
    #[error("Invalid ability: {0}. Use: throw <ability>")]
    InvalidAbility(String),
}

/// Result of a skill or raw ability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub label: String,
    pub ability: Ability,
    pub roll: i32,
    pub modifier: i32,
    /// Proficiency bonus added, if any.
    pub proficiency: Option<i32>,
    /// Expertise bonus added on top of proficiency, if any.
    pub expertise: Option<i32>,
    pub total: i32,
}

/// Result of a saving throw; only proficiency can apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub ability: Ability,
    pub roll: i32,
    pub modifier: i32,
    pub proficiency: Option<i32>,
    pub total: i32,
}

/// Roll d20 + ability modifier for a skill or ability named by `subject`.
///
/// Skills add the record's proficiency bonus when proficient and the same
/// bonus again with expertise. Raw ability checks add the bonus when the
/// ability's full name is among the proficiencies.
pub fn skill_check(
    dice: &mut Dice,
    record: &CharacterRecord,
    subject: &str,
) -> Result<CheckOutcome, CheckError> {
    let parsed = CheckSubject::parse(subject)
        .ok_or_else(|| CheckError::InvalidSkillOrAbility(subject.to_string()))?;
    let ability = parsed.ability();
    let modifier = record.modifier(ability);
    let roll = dice.d20() as i32;
    let bonus = record.proficiency_bonus();

    let (label, proficiency, expertise) = match parsed {
        CheckSubject::Skill(skill) => {
            let proficiency = record.has_proficiency(skill.name()).then_some(bonus);
            let expertise = (proficiency.is_some() && record.has_expertise(skill.name()))
                .then_some(bonus);
            (skill.name().to_string(), proficiency, expertise)
        }
        CheckSubject::Ability(ability) => {
            let proficiency = record.has_save_proficiency(ability).then_some(bonus);
            (ability.name().to_string(), proficiency, None)
        }
    };

    let total = roll + modifier + proficiency.unwrap_or(0) + expertise.unwrap_or(0);
    debug!(%label, roll, modifier, total, "check");
    Ok(CheckOutcome { label, ability, roll, modifier, proficiency, expertise, total })
}

/// Roll a saving throw. Without proficiency in the ability the throw still
/// happens and reports roll + modifier only.
pub fn saving_throw(
    dice: &mut Dice,
    record: &CharacterRecord,
    ability: &str,
) -> Result<SaveOutcome, CheckError> {
    let ability =
        Ability::parse(ability).ok_or_else(|| CheckError::InvalidAbility(ability.to_string()))?;
    let modifier = record.modifier(ability);
    let roll = dice.d20() as i32;
    let proficiency = record
        .has_save_proficiency(ability)
        .then_some(record.proficiency_bonus());
    let total = roll + modifier + proficiency.unwrap_or(0);
    debug!(%ability, roll, modifier, total, "saving throw");
    Ok(SaveOutcome { ability, roll, modifier, proficiency, total })
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} check ({})", self.label, self.ability)?;
        writeln!(f, "Roll: {}", self.roll)?;
        writeln!(f, "Modifier: {:+}", self.modifier)?;
        if let Some(p) = self.proficiency {
            writeln!(f, "Proficiency: {:+}", p)?;
        }
        if let Some(e) = self.expertise {
            writeln!(f, "Expertise: {:+}", e)?;
        }
        write!(f, "Total: {}", self.total)
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} saving throw", self.ability.name())?;
        writeln!(f, "Roll: {}", self.roll)?;
        writeln!(f, "Modifier: {:+}", self.modifier)?;
        match self.proficiency {
            Some(p) => writeln!(f, "Proficiency: {:+}", p)?,
            None => writeln!(f, "Proficiency: none (not proficient)")?,
        }
        write!(f, "Total: {}", self.total)
    }
}
