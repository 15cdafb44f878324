//! Dice notation: space-separated `XdY` terms and flat bonuses.

use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::Dice;

/// Upper bound on `X` in `XdY`.
pub const MAX_DICE_COUNT: u32 = 1000;
/// Upper bound on `Y` in `XdY`.
pub const MAX_DICE_SIDES: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid dice format: {0}. Use format: XdY")]
    InvalidTerm(String),
    #[error("Invalid dice format. Use format: XdY [XdY ...]")]
    Empty,
    #[error("Dice term too large: {0}. Use at most 1000 dice of at most 1000 sides")]
    TooLarge(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DiceTerm {
    Dice { count: u32, sides: u32 },
    Flat { bonus: u32 },
}

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for DiceTerm {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DiceError::InvalidTerm(s.to_string());
        match s.split_once('d') {
            Some((count, sides)) => {
                let count = digits(count).ok_or_else(invalid)?;
                let sides = digits(sides).ok_or_else(invalid)?;
                if count < 1 || sides < 1 {
                    return Err(invalid());
                }
                if count > MAX_DICE_COUNT || sides > MAX_DICE_SIDES {
                    return Err(DiceError::TooLarge(s.to_string()));
                }
                Ok(DiceTerm::Dice { count, sides })
            }
            None => digits(s)
                .map(|bonus| DiceTerm::Flat { bonus })
                .ok_or_else(invalid),
        }
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceTerm::Dice { count, sides } => write!(f, "{}d{}", count, sides),
            DiceTerm::Flat { bonus } => write!(f, "{}", bonus),
        }
    }
}

/// A non-empty sequence of terms, e.g. `2d4 1d6 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceExpr {
    terms: Vec<DiceTerm>,
}

impl DiceExpr {
    /// Parse already-split tokens. The first bad token fails the whole expression.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Result<Self, DiceError> {
        let terms = tokens
            .into_iter()
            .map(str::parse::<DiceTerm>)
            .collect::<Result<Vec<DiceTerm>, _>>()?;
        if terms.is_empty() {
            return Err(DiceError::Empty);
        }
        Ok(Self { terms })
    }

    /// A single `XdY` term; count and sides are clamped into the accepted range.
    pub fn dice(count: u32, sides: u32) -> Self {
        let count = count.clamp(1, MAX_DICE_COUNT);
        let sides = sides.clamp(1, MAX_DICE_SIDES);
        Self { terms: vec![DiceTerm::Dice { count, sides }] }
    }

    pub fn terms(&self) -> &[DiceTerm] {
        &self.terms
    }

    /// Last flat term, treated as the weapon's enchantment bonus on attack rolls.
    pub fn enchantment(&self) -> i64 {
        self.terms
            .iter()
            .rev()
            .find_map(|t| match t {
                DiceTerm::Flat { bonus } => Some(i64::from(*bonus)),
                DiceTerm::Dice { .. } => None,
            })
            .unwrap_or(0)
    }

    /// Roll every term. On a critical each die result is doubled; flat terms never are.
    pub fn roll(&self, dice: &mut Dice, critical: bool) -> RollBreakdown {
        let factor = if critical { 2 } else { 1 };
        let mut terms = Vec::with_capacity(self.terms.len());
        let mut total = 0i64;
        for term in &self.terms {
            let rolled = match *term {
                DiceTerm::Dice { count, sides } => {
                    let rolls: Vec<u32> = (0..count).map(|_| dice.roll(sides).saturating_mul(factor)).collect();
                    let subtotal = rolls.iter().map(|&r| i64::from(r)).sum();
                    TermRoll { term: *term, rolls, subtotal }
                }
                DiceTerm::Flat { bonus } => TermRoll {
                    term: *term,
                    rolls: Vec::new(),
                    subtotal: i64::from(bonus),
                },
            };
            total += rolled.subtotal;
            terms.push(rolled);
        }
        debug!(expr = %self, critical, total, "rolled dice expression");
        RollBreakdown { terms, total }
    }
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpr::from_tokens(s.split_whitespace())
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .terms
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermRoll {
    pub term: DiceTerm,
    /// Individual die results (already doubled on a critical); empty for flat terms.
    pub rolls: Vec<u32>,
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollBreakdown {
    pub terms: Vec<TermRoll>,
    pub total: i64,
}

impl RollBreakdown {
    /// `8 (2d6) + 3 (1d4) + 2`
    pub fn summary(&self) -> String {
        self.terms
            .iter()
            .map(|t| match t.term {
                DiceTerm::Dice { .. } => format!("{} ({})", t.subtotal, t.term),
                DiceTerm::Flat { .. } => t.subtotal.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// One `XdY: a, b` line per dice term.
    pub fn roll_lines(&self) -> Vec<String> {
        self.terms
            .iter()
            .filter(|t| matches!(t.term, DiceTerm::Dice { .. }))
            .map(|t| {
                let rolls = t
                    .rolls
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {}", t.term, rolls)
            })
            .collect()
    }
}

impl fmt::Display for RollBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.roll_lines() {
            writeln!(f, "{}", line)?;
        }
        writeln!(f, "{}", self.summary())?;
        write!(f, "Total: {}", self.total)
    }
}
