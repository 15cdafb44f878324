use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod character;
pub mod checks;
pub mod combat;
pub mod config;
pub mod dice;
pub mod prompt;
pub mod rules;
pub mod session;
pub mod store;

pub use character::{CharacterRecord, ValidationError};
pub use checks::{saving_throw, skill_check, CheckError, CheckOutcome, SaveOutcome};
pub use combat::{resolve_attack, AttackError, AttackResult};
pub use config::SessionConfig;
pub use dice::{DiceError, DiceExpr, DiceTerm, RollBreakdown, TermRoll};
pub use prompt::{LinePrompt, Prompt};
pub use rules::{ability_mod, Ability, CheckSubject, Skill};
pub use session::{Command, CommandError, HealthChange, Outcome, Session, UsageError};
pub use store::{CharacterStore, FsStore, MemoryStore, PersistedCharacter, StoreError};

enum Source {
    Rng(ChaCha8Rng),
    /// Cycles through fixed samples in `[0, 1)`.
    Uniform { values: Vec<f64>, next: usize },
    /// Cycles through fixed die faces.
    Faces { values: Vec<u32>, next: usize },
}

/// The session's single random source.
pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Rng(ChaCha8Rng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    /// Deterministic uniform samples; an empty list behaves like `[0.0]`.
    pub fn from_uniform(values: Vec<f64>) -> Self {
        Self { source: Source::Uniform { values, next: 0 } }
    }

    /// Deterministic die faces, clamped into `[1, sides]` when rolled.
    pub fn from_scripted(values: Vec<u32>) -> Self {
        Self { source: Source::Faces { values, next: 0 } }
    }

    /// Roll one die with `sides` faces: `floor(u * sides) + 1`.
    pub fn roll(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        let u = match &mut self.source {
            Source::Rng(rng) => rng.gen_range(0.0..1.0),
            Source::Uniform { values, next } => {
                let v = if values.is_empty() { 0.0 } else { values[*next % values.len()] };
                *next += 1;
                v.clamp(0.0, 1.0 - f64::EPSILON)
            }
            Source::Faces { values, next } => {
                let face = if values.is_empty() { 1 } else { values[*next % values.len()] };
                *next += 1;
                return face.clamp(1, sides);
            }
        };
        ((u * f64::from(sides)).floor() as u32 + 1).min(sides)
    }

    pub fn d20(&mut self) -> u32 {
        self.roll(20)
    }
}
