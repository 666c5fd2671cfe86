//! Configuration structures for loading battle files (YAML or JSON)

use crate::combatant::CombatantRecord;
use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Default number of attacks after which a battle is decided on remaining HP
pub const DEFAULT_TURN_CAP: u32 = 10_000;

/// Who acts first when both combatants have the same speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedTieBreak {
    /// The player always wins speed ties (the arena's historical behaviour)
    #[default]
    PlayerFirst,
    /// A single roll decides; below 0.5 the player starts
    CoinFlip,
}

// Custom deserializer for case-insensitive matching
impl<'de> Deserialize<'de> for SpeedTieBreak {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().replace('-', "_").as_str() {
            "player_first" | "player" => Ok(SpeedTieBreak::PlayerFirst),
            "coin_flip" | "random" => Ok(SpeedTieBreak::CoinFlip),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["player_first", "coin_flip"],
            )),
        }
    }
}

fn default_turn_cap() -> u32 {
    DEFAULT_TURN_CAP
}

/// Knobs for the battle simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorSettings {
    #[serde(default = "default_turn_cap")]
    pub turn_cap: u32,
    #[serde(default)]
    pub speed_tie: SpeedTieBreak,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            turn_cap: DEFAULT_TURN_CAP,
            speed_tie: SpeedTieBreak::default(),
        }
    }
}

/// Full battle file: both combatant records plus simulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    pub player: CombatantRecord,
    pub opponent: CombatantRecord,
    #[serde(default)]
    pub settings: SimulatorSettings,
}

impl BattleConfig {
    /// Load a battle file; `.json` files are parsed as JSON, everything else as YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        let path_str = path.as_ref().to_string_lossy().to_lowercase();

        if path_str.ends_with(".json") {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::BonusType;

    const DUEL: &str = r#"
player:
  name: Hero
  icon: H
  hp: 120
  attack: 30
  defense: 10
  speed: 50
  criticalChance: 0.2
  equipment:
    - name: Rusty Sword
      slot: weapon
      bonus_type: attackBonus
      bonus_value: 5
opponent:
  name: Rival
  hp: 90
  attack: 25
  defense: 5
  speed: 40
settings:
  turn_cap: 500
  speed_tie: Coin-Flip
"#;

    #[test]
    fn loads_yaml_with_aliases_and_defaults() {
        let config = BattleConfig::from_yaml(DUEL).unwrap();
        assert_eq!(config.player.base.critical_chance, 0.2);
        assert_eq!(config.player.equipment[0].bonus_type, BonusType::Attack);
        assert_eq!(config.opponent.base.icon, "?");
        assert_eq!(config.opponent.base.accuracy, 0.9);
        assert_eq!(config.opponent.base.critical_damage, 1.5);
        assert_eq!(config.settings.turn_cap, 500);
        assert_eq!(config.settings.speed_tie, SpeedTieBreak::CoinFlip);
    }

    #[test]
    fn settings_default_when_absent() {
        let json = r#"{
            "player": {"name": "A", "hp": 10, "attack": 1, "defense": 0, "speed": 1},
            "opponent": {"name": "B", "hp": 10, "attack": 1, "defense": 0, "speed": 1}
        }"#;
        let config = BattleConfig::from_json(json).unwrap();
        assert_eq!(config.settings, SimulatorSettings::default());
        assert_eq!(config.settings.turn_cap, DEFAULT_TURN_CAP);
    }

    #[test]
    fn missing_required_stat_is_an_error() {
        let json = r#"{
            "player": {"name": "A", "attack": 1, "defense": 0, "speed": 1},
            "opponent": {"name": "B", "hp": 10, "attack": 1, "defense": 0, "speed": 1}
        }"#;
        assert!(matches!(BattleConfig::from_json(json), Err(ConfigError::Json(_))));
    }

    #[test]
    fn unknown_tie_break_is_rejected() {
        let yaml = DUEL.replace("Coin-Flip", "rock_paper_scissors");
        assert!(matches!(BattleConfig::from_yaml(&yaml), Err(ConfigError::Yaml(_))));
    }
}
