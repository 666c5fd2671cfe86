//! Arena battle simulator
//!
//! Resolves two combatants' base stats plus equipment into battle-ready
//! stat blocks, then runs a turn-based, RNG-driven duel between them.

pub mod combatant;
pub mod config;
pub mod equipment;
pub mod error;
pub mod rng;
pub mod roster;
pub mod simulation;
pub mod stats;

pub use combatant::{resolve, CombatStats, CombatantRecord, Side, StatKey};
pub use config::{BattleConfig, SimulatorSettings, SpeedTieBreak};
pub use equipment::{BonusType, Equipment, EquipmentBonus, EquipmentSlot};
pub use error::{BattleError, ConfigError};
pub use rng::{BattleRng, FastRng, ScriptedRng};
pub use simulation::{run_battle, run_series, BattleOutcome, BattleSimulator, Step};
pub use stats::{BattleSummary, Decision, SeriesStats, Standings};
