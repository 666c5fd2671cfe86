//! Error types for battle setup and battle file loading

use crate::combatant::{Side, StatKey};
use thiserror::Error;

/// Errors raised by the battle simulator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    /// A combatant entered the battle without any health
    #[error("{side} combatant '{name}' must start with hp > 0")]
    NonPositiveHp { side: Side, name: String },

    /// A float stat was NaN or infinite
    #[error("{side} combatant '{name}' has a non-finite {stat} value")]
    NonFiniteStat {
        side: Side,
        name: String,
        stat: StatKey,
    },

    /// A chance fell outside `[0, 1]` or the critical multiplier below 1.0
    #[error("{side} combatant '{name}' has {stat} = {value}, outside its valid range")]
    StatOutOfRange {
        side: Side,
        name: String,
        stat: StatKey,
        value: f64,
    },

    /// `step()` was called after the battle already finished
    #[error("battle is already over")]
    BattleOver,
}

/// Errors raised while loading a battle file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read battle file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML battle file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON battle file: {0}")]
    Json(#[from] serde_json::Error),
}
