//! Line dispatcher: one command in, one [`Outcome`] out.

use std::{fmt, io};

use thiserror::Error;
use tracing::{debug, warn};

use crate::character::{capitalize, CharacterRecord, ValidationError};
use crate::checks::{saving_throw, skill_check, CheckError, CheckOutcome, SaveOutcome};
use crate::combat::{resolve_attack, AttackError, AttackResult};
use crate::dice::{DiceError, DiceExpr, RollBreakdown};
use crate::prompt::Prompt;
use crate::rules::Ability;
use crate::store::{CharacterStore, StoreError};
use crate::Dice;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("unrecognized command: {0}")]
    Unrecognized(String),
    #[error("Invalid {verb} format. Use: {usage}")]
    Arity { verb: &'static str, usage: &'static str },
    #[error("Too many arguments. Use: attack [ability]")]
    TooManyArguments,
    #[error("Invalid {verb} amount: {value}. Use: {verb} <amount>")]
    InvalidAmount { verb: &'static str, value: String },
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dice(Vec<String>),
    Attack(Option<String>),
    Ouch(i32),
    Heal(i32),
    Check(String),
    Throw(String),
    Stats,
    Create(String),
    Load(String),
    Save(String),
    Delete(String),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Dice,
    Attack,
    Ouch,
    Heal,
    Check,
    Throw,
    Stats,
    Create,
    Load,
    Save,
    Delete,
    Exit,
}

impl Verb {
    const ALL: [Verb; 12] = [
        Verb::Dice,
        Verb::Attack,
        Verb::Ouch,
        Verb::Heal,
        Verb::Check,
        Verb::Throw,
        Verb::Stats,
        Verb::Create,
        Verb::Load,
        Verb::Save,
        Verb::Delete,
        Verb::Exit,
    ];

    fn name(self) -> &'static str {
        match self {
            Verb::Dice => "dice",
            Verb::Attack => "attack",
            Verb::Ouch => "ouch",
            Verb::Heal => "heal",
            Verb::Check => "check",
            Verb::Throw => "throw",
            Verb::Stats => "stats",
            Verb::Create => "create",
            Verb::Load => "load",
            Verb::Save => "save",
            Verb::Delete => "delete",
            Verb::Exit => "exit",
        }
    }

    fn usage(self) -> &'static str {
        match self {
            Verb::Dice => "dice XdY [XdY ...]",
            Verb::Attack => "attack [ability]",
            Verb::Ouch => "ouch <amount>",
            Verb::Heal => "heal <amount>",
            Verb::Check => "check <skill|ability>",
            Verb::Throw => "throw <ability>",
            Verb::Stats => "stats",
            Verb::Create => "create <characterName>",
            Verb::Load => "load <characterName>",
            Verb::Save => "save <characterName>",
            Verb::Delete => "delete <characterName>",
            Verb::Exit => "exit",
        }
    }

    /// Case-insensitive.
    fn parse(token: &str) -> Option<Verb> {
        Verb::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(token))
    }
}

impl Command {
    /// Tokenize on whitespace and check arity. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, UsageError> {
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = tokens.collect();
        let verb = Verb::parse(first).ok_or_else(|| UsageError::Unrecognized(first.to_string()))?;
        let arity = || UsageError::Arity { verb: verb.name(), usage: verb.usage() };
        let one = || match args.as_slice() {
            [only] => Ok(only.to_string()),
            _ => Err(arity()),
        };
        let amount = || -> Result<i32, UsageError> {
            let raw = one()?;
            raw.parse()
                .map_err(|_| UsageError::InvalidAmount { verb: verb.name(), value: raw.clone() })
        };

        let cmd = match verb {
            Verb::Dice if args.is_empty() => return Err(arity()),
            Verb::Dice => Command::Dice(args.iter().map(|s| s.to_string()).collect()),
            Verb::Attack => match args.as_slice() {
                [] => Command::Attack(None),
                [ability] => Command::Attack(Some(ability.to_string())),
                _ => return Err(UsageError::TooManyArguments),
            },
            Verb::Ouch => Command::Ouch(amount()?),
            Verb::Heal => Command::Heal(amount()?),
            Verb::Check => Command::Check(one()?),
            Verb::Throw => Command::Throw(one()?),
            Verb::Create => Command::Create(one()?),
            Verb::Load => Command::Load(one()?),
            Verb::Save => Command::Save(one()?),
            Verb::Delete => Command::Delete(one()?),
            Verb::Stats | Verb::Exit if !args.is_empty() => return Err(arity()),
            Verb::Stats => Command::Stats,
            Verb::Exit => Command::Exit,
        };
        Ok(Some(cmd))
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Dice(#[from] DiceError),
    #[error(transparent)]
    Check(#[from] CheckError),
    #[error(transparent)]
    Attack(#[from] AttackError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("No character loaded. Create or load a character first.")]
    NoCharacterLoaded,
    #[error("Character \"{0}\" already exists. Use load to load it or choose a different name.")]
    AlreadyExists(String),
    #[error("Error creating character: {0}")]
    CreationAborted(#[source] ValidationError),
    #[error("Error reading input: {0}")]
    Prompt(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    Damage,
    Healing,
}

/// What a command did, kept typed for callers and rendered with `Display`.
#[derive(Debug)]
pub enum Outcome {
    Empty,
    Dice(RollBreakdown),
    Attack(Box<AttackResult>),
    Health { change: HealthChange, amount: i32, remaining: i32 },
    Check(CheckOutcome),
    Save(SaveOutcome),
    Stats(Box<CharacterRecord>),
    Created(String),
    Loaded(String),
    Saved(String),
    Deleted(String),
    DeletionCancelled(String),
    Unrecognized(String),
    Failed(CommandError),
    Exit,
}

impl Outcome {
    pub fn is_exit(&self) -> bool {
        matches!(self, Outcome::Exit)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Empty | Outcome::Exit => Ok(()),
            Outcome::Dice(roll) => write!(f, "{}", roll),
            Outcome::Attack(atk) => write!(f, "{}", atk),
            Outcome::Health { remaining, .. } => write!(f, "health remaining: {}", remaining),
            Outcome::Check(check) => write!(f, "{}", check),
            Outcome::Save(save) => write!(f, "{}", save),
            Outcome::Stats(record) => write!(f, "{}", record),
            Outcome::Created(name) => write!(
                f,
                "Character \"{}\" created successfully. Use save {} to keep it.",
                name, name
            ),
            Outcome::Loaded(name) => write!(f, "Character \"{}\" loaded successfully.", name),
            Outcome::Saved(name) => write!(f, "Character \"{}\" saved successfully.", name),
            Outcome::Deleted(name) => write!(f, "Character \"{}\" deleted successfully.", name),
            Outcome::DeletionCancelled(_) => write!(f, "Deletion cancelled."),
            Outcome::Unrecognized(verb) => write!(f, "unrecognized command: {}", verb),
            Outcome::Failed(err) => write!(f, "{}", err),
        }
    }
}

fn loaded(current: &Option<CharacterRecord>) -> Result<&CharacterRecord, CommandError> {
    current.as_ref().ok_or(CommandError::NoCharacterLoaded)
}

fn loaded_mut(current: &mut Option<CharacterRecord>) -> Result<&mut CharacterRecord, CommandError> {
    current.as_mut().ok_or(CommandError::NoCharacterLoaded)
}

/// The current character, the shared dice and the persistence collaborator.
pub struct Session<S> {
    store: S,
    dice: Dice,
    current: Option<CharacterRecord>,
}

impl<S: CharacterStore> Session<S> {
    pub fn new(store: S, dice: Dice) -> Self {
        Self { store, dice, current: None }
    }

    pub fn current(&self) -> Option<&CharacterRecord> {
        self.current.as_ref()
    }

    /// Replace the active character, e.g. with one built in code.
    pub fn set_current(&mut self, record: Option<CharacterRecord>) {
        self.current = record;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dice_mut(&mut self) -> &mut Dice {
        &mut self.dice
    }

    /// Run one line to completion. Errors come back as [`Outcome::Failed`].
    pub fn execute(&mut self, line: &str, prompt: &mut dyn Prompt) -> Outcome {
        let cmd = match Command::parse(line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return Outcome::Empty,
            Err(UsageError::Unrecognized(verb)) => {
                warn!(%verb, "unrecognized command");
                return Outcome::Unrecognized(verb);
            }
            Err(err) => {
                warn!(%err, "bad command usage");
                return Outcome::Failed(err.into());
            }
        };
        debug!(?cmd, "dispatch");
        match self.run(cmd, prompt) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%err, "command failed");
                Outcome::Failed(err)
            }
        }
    }

    pub fn run(&mut self, cmd: Command, prompt: &mut dyn Prompt) -> Result<Outcome, CommandError> {
        match cmd {
            Command::Dice(terms) => {
                let expr = DiceExpr::from_tokens(terms.iter().map(String::as_str))?;
                Ok(Outcome::Dice(expr.roll(&mut self.dice, false)))
            }
            Command::Attack(ability) => {
                let record = loaded(&self.current)?;
                let atk = resolve_attack(&mut self.dice, record, ability.as_deref())?;
                Ok(Outcome::Attack(Box::new(atk)))
            }
            Command::Ouch(amount) => {
                let record = loaded_mut(&mut self.current)?;
                let remaining = record.adjust_health(amount.saturating_neg());
                Ok(Outcome::Health { change: HealthChange::Damage, amount, remaining })
            }
            Command::Heal(amount) => {
                let record = loaded_mut(&mut self.current)?;
                let remaining = record.adjust_health(amount);
                Ok(Outcome::Health { change: HealthChange::Healing, amount, remaining })
            }
            Command::Check(subject) => {
                let record = loaded(&self.current)?;
                Ok(Outcome::Check(skill_check(&mut self.dice, record, &subject)?))
            }
            Command::Throw(ability) => {
                let record = loaded(&self.current)?;
                Ok(Outcome::Save(saving_throw(&mut self.dice, record, &ability)?))
            }
            Command::Stats => {
                let record = loaded(&self.current)?;
                Ok(Outcome::Stats(Box::new(record.clone())))
            }
            Command::Create(name) => self.create(name, prompt),
            Command::Load(name) => {
                let record = self.store.load(&name)?;
                self.current = Some(record);
                Ok(Outcome::Loaded(name))
            }
            Command::Save(name) => {
                let record = loaded_mut(&mut self.current)?;
                self.store.save(&name, record)?;
                record.set_name(name.clone());
                Ok(Outcome::Saved(name))
            }
            Command::Delete(name) => self.delete(name, prompt),
            Command::Exit => Ok(Outcome::Exit),
        }
    }

    fn create(&mut self, name: String, prompt: &mut dyn Prompt) -> Result<Outcome, CommandError> {
        if self.store.exists(&name)? {
            return Err(CommandError::AlreadyExists(name));
        }
        let record = build_character(&name, prompt)?;
        self.current = Some(record);
        Ok(Outcome::Created(name))
    }

    fn delete(&mut self, name: String, prompt: &mut dyn Prompt) -> Result<Outcome, CommandError> {
        if !self.store.exists(&name)? {
            return Err(StoreError::NotFound(name).into());
        }
        let question = format!(
            "Are you sure you want to delete character \"{}\"? (yes/no): ",
            name
        );
        let answer = prompt.ask(&question).map_err(CommandError::Prompt)?;
        if !answer.trim().eq_ignore_ascii_case("yes") {
            return Ok(Outcome::DeletionCancelled(name));
        }
        self.store.delete(&name)?;
        if self.current.as_ref().and_then(|c| c.name()) == Some(name.as_str()) {
            self.current = None;
        }
        Ok(Outcome::Deleted(name))
    }
}

fn ask(prompt: &mut dyn Prompt, question: &str) -> Result<String, CommandError> {
    prompt.ask(question).map_err(CommandError::Prompt)
}

fn ask_number(prompt: &mut dyn Prompt, field: &str, question: &str) -> Result<i32, CommandError> {
    let answer = ask(prompt, question)?;
    answer.trim().parse().map_err(|_| {
        CommandError::CreationAborted(ValidationError::NotANumber {
            field: field.to_string(),
            value: answer.trim().to_string(),
        })
    })
}

/// Ask for a comma-separated skill list until every entry is accepted.
/// A blank answer means none.
fn ask_skills(
    prompt: &mut dyn Prompt,
    record: &mut CharacterRecord,
    question: &str,
    add: fn(&mut CharacterRecord, &str) -> Result<(), ValidationError>,
) -> Result<(), CommandError> {
    let mut asking = question.to_string();
    loop {
        let answer = ask(prompt, &asking)?;
        let mut trial = record.clone();
        let applied = answer
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .try_for_each(|skill| add(&mut trial, skill));
        match applied {
            Ok(()) => {
                *record = trial;
                return Ok(());
            }
            Err(err) => {
                debug!(%err, "re-prompting skill list");
                asking = format!("{}. {}", err, question);
            }
        }
    }
}

/// Interactive creation flow. The first bad scalar aborts; skill lists re-prompt.
fn build_character(name: &str, prompt: &mut dyn Prompt) -> Result<CharacterRecord, CommandError> {
    let mut record = CharacterRecord::named(name);
    for ability in Ability::ALL {
        let label = capitalize(ability.name());
        let value = ask_number(prompt, &label, &format!("{} (1-30): ", label))?;
        record
            .set_score(ability, value)
            .map_err(CommandError::CreationAborted)?;
    }

    ask_skills(
        prompt,
        &mut record,
        "Skills you are proficient in (comma-separated): ",
        CharacterRecord::add_proficiency,
    )?;
    ask_skills(
        prompt,
        &mut record,
        "Skills you have expertise in (comma-separated): ",
        CharacterRecord::add_expertise,
    )?;

    let weapon = ask(prompt, "Weapon damage (e.g. 1d8 2): ")?;
    record
        .set_weapon_damage(&weapon)
        .map_err(CommandError::CreationAborted)?;

    let ac = ask_number(prompt, "Armor class", "Armor class: ")?;
    record.set_armor_class(ac).map_err(CommandError::CreationAborted)?;
    let health = ask_number(prompt, "Health", "Health: ")?;
    record.set_health(health).map_err(CommandError::CreationAborted)?;
    let pb = ask_number(prompt, "Proficiency bonus", "Proficiency bonus (0-6): ")?;
    record
        .set_proficiency_bonus(pb)
        .map_err(CommandError::CreationAborted)?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_checks_arity_per_verb() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(Command::parse("stats"), Ok(Some(Command::Stats)));
        assert_eq!(
            Command::parse("attack dex"),
            Ok(Some(Command::Attack(Some("dex".into()))))
        );
        assert_eq!(Command::parse("attack str dex"), Err(UsageError::TooManyArguments));
        assert!(matches!(
            Command::parse("load"),
            Err(UsageError::Arity { verb: "load", .. })
        ));
        assert!(matches!(
            Command::parse("dice"),
            Err(UsageError::Arity { verb: "dice", .. })
        ));
        assert!(matches!(
            Command::parse("stats now"),
            Err(UsageError::Arity { verb: "stats", .. })
        ));
    }

    #[test]
    fn amounts_must_be_integers() {
        assert_eq!(Command::parse("ouch -3"), Ok(Some(Command::Ouch(-3))));
        assert_eq!(
            Command::parse("heal lots"),
            Err(UsageError::InvalidAmount { verb: "heal", value: "lots".into() })
        );
    }

    #[test]
    fn every_verb_parses_in_any_case_and_has_usage() {
        for verb in Verb::ALL {
            assert_eq!(Verb::parse(verb.name()), Some(verb));
            assert_eq!(Verb::parse(&verb.name().to_uppercase()), Some(verb));
            assert!(verb.usage().starts_with(verb.name()));
        }
        assert_eq!(Verb::parse("jump"), None);
    }

    #[test]
    fn verbs_are_case_insensitive_but_unknown_ones_are_reported() {
        assert_eq!(Command::parse("EXIT"), Ok(Some(Command::Exit)));
        assert_eq!(
            Command::parse("dance wildly"),
            Err(UsageError::Unrecognized("dance".into()))
        );
    }
}
