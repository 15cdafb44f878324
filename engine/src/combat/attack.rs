use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::character::CharacterRecord;
use crate::dice::RollBreakdown;
use crate::rules::Ability;
use crate::Dice;

/// Used when `attack` names no ability.
pub const DEFAULT_ATTACK_ABILITY: Ability = Ability::Str;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttackError {
    #[error("Invalid ability: {0}. Use: attack [str|dex|con|int|wis|cha]")]
    InvalidAbility(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackResult {
    pub ability: Ability,
    pub roll: i32,
    pub ability_mod: i32,
    pub proficiency_bonus: i32,
    pub enchantment: i64,
    pub hit_total: i64,
    pub is_crit: bool,
    pub damage: RollBreakdown,
    /// The ability modifier added to damage; zero when the modifier is negative.
    pub damage_mod: i32,
    pub damage_total: i64,
}

/// Roll to hit and damage with the record's weapon.
///
/// Hit = d20 + ability mod + proficiency bonus + enchantment (last flat weapon term).
/// A natural 20 doubles every weapon die; flat terms and the modifier never double.
pub fn resolve_attack(
    dice: &mut Dice,
    record: &CharacterRecord,
    ability: Option<&str>,
) -> Result<AttackResult, AttackError> {
    let ability = match ability {
        Some(name) => {
            Ability::parse(name).ok_or_else(|| AttackError::InvalidAbility(name.to_string()))?
        }
        None => DEFAULT_ATTACK_ABILITY,
    };
    let weapon = record.weapon_damage();
    let ability_mod = record.modifier(ability);
    let proficiency_bonus = record.proficiency_bonus();
    let enchantment = weapon.enchantment();

    let roll = dice.d20() as i32;
    let is_crit = roll == 20;
    let hit_total = i64::from(roll) + i64::from(ability_mod) + i64::from(proficiency_bonus) + enchantment;

    let damage = weapon.roll(dice, is_crit);
    let damage_mod = ability_mod.max(0);
    let damage_total = damage.total + i64::from(damage_mod);

    debug!(%ability, roll, hit_total, is_crit, damage_total, "attack");
    Ok(AttackResult {
        ability,
        roll,
        ability_mod,
        proficiency_bonus,
        enchantment,
        hit_total,
        is_crit,
        damage,
        damage_mod,
        damage_total,
    })
}

impl fmt::Display for AttackResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_crit {
            writeln!(f, "Critical Hit!")?;
        }
        writeln!(
            f,
            "Hit: {} = {} (d20) {:+} ({}) {:+} (proficiency) {:+} (enchantment)",
            self.hit_total,
            self.roll,
            self.ability_mod,
            self.ability,
            self.proficiency_bonus,
            self.enchantment
        )?;
        let mut summary = self.damage.summary();
        if self.damage_mod > 0 {
            summary.push_str(&format!(" + {} ({})", self.damage_mod, self.ability));
        }
        write!(f, "Damage: {} = {}", self.damage_total, summary)?;
        for line in self.damage.roll_lines() {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}
