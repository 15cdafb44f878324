pub mod attack;

pub use attack::{resolve_attack, AttackError, AttackResult, DEFAULT_ATTACK_ABILITY};
