//! Combatant stat blocks and stat aggregation (base record + equipment bonuses)

use crate::equipment::{Equipment, EquipmentBonus};
use crate::error::BattleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Which side of the arena a combatant fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("player"),
            Side::Opponent => f.write_str("opponent"),
        }
    }
}

/// The eight numeric stats equipment can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Hp,
    Attack,
    Defense,
    Speed,
    CriticalChance,
    CriticalDamage,
    DodgeChance,
    Accuracy,
}

impl StatKey {
    pub const ALL: [StatKey; 8] = [
        StatKey::Hp,
        StatKey::Attack,
        StatKey::Defense,
        StatKey::Speed,
        StatKey::CriticalChance,
        StatKey::CriticalDamage,
        StatKey::DodgeChance,
        StatKey::Accuracy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::Hp => "hp",
            StatKey::Attack => "attack",
            StatKey::Defense => "defense",
            StatKey::Speed => "speed",
            StatKey::CriticalChance => "critical_chance",
            StatKey::CriticalDamage => "critical_damage",
            StatKey::DodgeChance => "dodge_chance",
            StatKey::Accuracy => "accuracy",
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_icon() -> String {
    "?".to_string()
}

fn default_critical_damage() -> f64 {
    1.5
}

fn default_accuracy() -> f64 {
    0.9
}

/// Resolved combat stats ready for a battle.
///
/// Field names follow snake_case; the camelCase spellings used by the
/// character service are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,

    // Core stats
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,

    // Rolled stats
    #[serde(default, alias = "criticalChance")]
    pub critical_chance: f64,
    #[serde(default = "default_critical_damage", alias = "criticalDamage")]
    pub critical_damage: f64,
    #[serde(default, alias = "dodgeChance")]
    pub dodge_chance: f64,
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,

    // Reporting only
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
}

impl CombatStats {
    /// Read a stat as a float, whatever its storage type
    pub fn get(&self, key: StatKey) -> f64 {
        match key {
            StatKey::Hp => self.hp as f64,
            StatKey::Attack => self.attack as f64,
            StatKey::Defense => self.defense as f64,
            StatKey::Speed => self.speed as f64,
            StatKey::CriticalChance => self.critical_chance,
            StatKey::CriticalDamage => self.critical_damage,
            StatKey::DodgeChance => self.dodge_chance,
            StatKey::Accuracy => self.accuracy,
        }
    }

    /// Icon and name, as used in narration
    pub fn display_name(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }

    /// Check the preconditions a combatant must meet to enter a battle.
    ///
    /// Blocks produced by `resolve` always pass the range checks; hand-built
    /// blocks are held to the same ranges.
    pub fn validate(&self, side: Side) -> Result<(), BattleError> {
        if self.hp == 0 {
            return Err(BattleError::NonPositiveHp {
                side,
                name: self.name.clone(),
            });
        }
        for stat in [
            StatKey::CriticalChance,
            StatKey::CriticalDamage,
            StatKey::DodgeChance,
            StatKey::Accuracy,
        ] {
            let value = self.get(stat);
            if !value.is_finite() {
                return Err(BattleError::NonFiniteStat {
                    side,
                    name: self.name.clone(),
                    stat,
                });
            }
            let in_range = match stat {
                StatKey::CriticalDamage => value >= 1.0,
                _ => (0.0..=1.0).contains(&value),
            };
            if !in_range {
                return Err(BattleError::StatOutOfRange {
                    side,
                    name: self.name.clone(),
                    stat,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// A character record as supplied by the character service: base stats
/// plus whatever equipment it currently wears.
///
/// On the wire the record is one flat map (stat fields next to
/// `equipment`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FlatRecord")]
pub struct CombatantRecord {
    #[serde(flatten)]
    pub base: CombatStats,
    pub equipment: Vec<Equipment>,
}

// Flat wire shape of a record; aliases do not survive `flatten`, so the
// stat fields are spelled out here
#[derive(Deserialize)]
struct FlatRecord {
    name: String,
    #[serde(default = "default_icon")]
    icon: String,
    hp: u32,
    attack: u32,
    defense: u32,
    speed: u32,
    #[serde(default, alias = "criticalChance")]
    critical_chance: f64,
    #[serde(default = "default_critical_damage", alias = "criticalDamage")]
    critical_damage: f64,
    #[serde(default, alias = "dodgeChance")]
    dodge_chance: f64,
    #[serde(default = "default_accuracy")]
    accuracy: f64,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
    #[serde(default, alias = "equipments")]
    equipment: Vec<Equipment>,
}

impl From<FlatRecord> for CombatantRecord {
    fn from(raw: FlatRecord) -> Self {
        Self {
            base: CombatStats {
                name: raw.name,
                icon: raw.icon,
                hp: raw.hp,
                attack: raw.attack,
                defense: raw.defense,
                speed: raw.speed,
                critical_chance: raw.critical_chance,
                critical_damage: raw.critical_damage,
                dodge_chance: raw.dodge_chance,
                accuracy: raw.accuracy,
                wins: raw.wins,
                losses: raw.losses,
            },
            equipment: raw.equipment,
        }
    }
}

impl CombatantRecord {
    pub fn new(base: CombatStats) -> Self {
        Self {
            base,
            equipment: Vec::new(),
        }
    }

    /// Bonuses granted by every recognised piece of equipment
    pub fn bonuses(&self) -> Vec<EquipmentBonus> {
        self.equipment
            .iter()
            .filter_map(|item| {
                let bonus = item.bonus();
                if bonus.is_none() {
                    debug!(
                        target: "arena_sim::combatant",
                        combatant = %self.base.name,
                        item = %item.name,
                        bonus_type = %item.bonus_type,
                        "skipping equipment with unrecognised bonus type"
                    );
                }
                bonus
            })
            .collect()
    }

    /// Resolve base stats and equipment into a battle-ready stat block
    pub fn resolve(&self) -> CombatStats {
        resolve(&self.base, &self.bonuses())
    }
}

/// Sum of all finite bonus amounts targeting `key`
fn bonus_total(bonuses: &[EquipmentBonus], key: StatKey) -> f64 {
    bonuses
        .iter()
        .filter(|b| b.stat_key == key && b.amount.is_finite())
        .map(|b| b.amount)
        .sum()
}

/// Integer stats round to the nearest whole point and never go negative
fn add_points(base: u32, bonus: f64) -> u32 {
    (base as f64 + bonus).round().clamp(0.0, u32::MAX as f64) as u32
}

/// Merge a base stat block with equipment bonuses.
///
/// Each resolved stat is `base + sum(bonuses for that stat)`. Integer stats
/// are floored at zero, chances are kept inside `[0, 1]` and the critical
/// multiplier never drops below 1.0. Identity and record fields pass through.
pub fn resolve(base: &CombatStats, bonuses: &[EquipmentBonus]) -> CombatStats {
    let total = |key| bonus_total(bonuses, key);

    CombatStats {
        name: base.name.clone(),
        icon: base.icon.clone(),
        hp: add_points(base.hp, total(StatKey::Hp)),
        attack: add_points(base.attack, total(StatKey::Attack)),
        defense: add_points(base.defense, total(StatKey::Defense)),
        speed: add_points(base.speed, total(StatKey::Speed)),
        critical_chance: (base.critical_chance + total(StatKey::CriticalChance)).clamp(0.0, 1.0),
        critical_damage: (base.critical_damage + total(StatKey::CriticalDamage)).max(1.0),
        dodge_chance: (base.dodge_chance + total(StatKey::DodgeChance)).clamp(0.0, 1.0),
        accuracy: (base.accuracy + total(StatKey::Accuracy)).clamp(0.0, 1.0),
        wins: base.wins,
        losses: base.losses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{BonusType, EquipmentSlot};

    fn base() -> CombatStats {
        CombatStats {
            name: "Tester".into(),
            icon: "T".into(),
            hp: 100,
            attack: 20,
            defense: 5,
            speed: 10,
            critical_chance: 0.1,
            critical_damage: 1.5,
            dodge_chance: 0.05,
            accuracy: 0.9,
            wins: 3,
            losses: 1,
        }
    }

    fn bonus(stat_key: StatKey, amount: f64) -> EquipmentBonus {
        EquipmentBonus { stat_key, amount }
    }

    #[test]
    fn bonuses_for_same_stat_accumulate() {
        let resolved = resolve(
            &base(),
            &[
                bonus(StatKey::Attack, 3.0),
                bonus(StatKey::Attack, 4.0),
                bonus(StatKey::Defense, 2.0),
            ],
        );
        assert_eq!(resolved.attack, 27);
        assert_eq!(resolved.defense, 7);
        assert_eq!(resolved.hp, 100);
    }

    #[test]
    fn identity_fields_pass_through() {
        let resolved = resolve(&base(), &[bonus(StatKey::Speed, 5.0)]);
        assert_eq!(resolved.name, "Tester");
        assert_eq!(resolved.icon, "T");
        assert_eq!(resolved.wins, 3);
        assert_eq!(resolved.losses, 1);
    }

    #[test]
    fn integer_stats_never_go_negative() {
        let resolved = resolve(
            &base(),
            &[bonus(StatKey::Attack, -500.0), bonus(StatKey::Hp, -150.0)],
        );
        assert_eq!(resolved.attack, 0);
        assert_eq!(resolved.hp, 0);
    }

    #[test]
    fn chance_stats_stay_in_unit_range() {
        let resolved = resolve(
            &base(),
            &[
                bonus(StatKey::Accuracy, 0.5),
                bonus(StatKey::DodgeChance, -1.0),
                bonus(StatKey::CriticalDamage, -3.0),
            ],
        );
        assert_eq!(resolved.accuracy, 1.0);
        assert_eq!(resolved.dodge_chance, 0.0);
        assert_eq!(resolved.critical_damage, 1.0);
    }

    #[test]
    fn non_finite_bonuses_are_ignored() {
        let resolved = resolve(
            &base(),
            &[bonus(StatKey::Attack, f64::NAN), bonus(StatKey::Attack, 1.0)],
        );
        assert_eq!(resolved.attack, 21);
    }

    #[test]
    fn resolve_is_idempotent() {
        let bonuses = [bonus(StatKey::CriticalChance, 0.05)];
        assert_eq!(resolve(&base(), &bonuses), resolve(&base(), &bonuses));
    }

    #[test]
    fn record_skips_unknown_bonus_types() {
        let record = CombatantRecord {
            base: base(),
            equipment: vec![
                Equipment::new("Blade", EquipmentSlot::Weapon, BonusType::Attack, 5.0),
                Equipment::new(
                    "Odd Hat",
                    EquipmentSlot::Hat,
                    BonusType::Unknown("luckBonus".into()),
                    99.0,
                ),
            ],
        };
        let resolved = record.resolve();
        assert_eq!(resolved.attack, 25);
        assert_eq!(record.bonuses().len(), 1);
    }

    #[test]
    fn validate_rejects_zero_hp() {
        let mut stats = base();
        stats.hp = 0;
        assert_eq!(
            stats.validate(Side::Opponent),
            Err(BattleError::NonPositiveHp {
                side: Side::Opponent,
                name: "Tester".into(),
            })
        );
    }

    #[test]
    fn validate_rejects_out_of_range_stats() {
        let mut stats = base();
        stats.critical_damage = 0.5;
        assert!(matches!(
            stats.validate(Side::Player),
            Err(BattleError::StatOutOfRange { stat: StatKey::CriticalDamage, .. })
        ));

        let mut stats = base();
        stats.dodge_chance = 1.25;
        assert!(matches!(
            stats.validate(Side::Opponent),
            Err(BattleError::StatOutOfRange { stat: StatKey::DodgeChance, .. })
        ));

        let mut stats = base();
        stats.accuracy = -0.5;
        assert!(stats.validate(Side::Player).is_err());
    }

    #[test]
    fn resolved_blocks_always_validate() {
        let wild = [
            bonus(StatKey::CriticalDamage, -10.0),
            bonus(StatKey::CriticalChance, 4.0),
            bonus(StatKey::Accuracy, -2.0),
            bonus(StatKey::DodgeChance, 9.0),
        ];
        assert!(resolve(&base(), &wild).validate(Side::Player).is_ok());
    }

    #[test]
    fn flat_record_carries_every_stat_field() {
        let stats = CombatStats {
            name: "Drift".into(),
            icon: "D".into(),
            hp: 11,
            attack: 12,
            defense: 13,
            speed: 14,
            critical_chance: 0.25,
            critical_damage: 2.5,
            dodge_chance: 0.125,
            accuracy: 0.75,
            wins: 15,
            losses: 16,
        };
        let json = serde_json::to_value(&stats).unwrap();
        let fields = json.as_object().unwrap().len();
        assert_eq!(fields, 12);

        let record: CombatantRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.base, stats);
        assert!(record.equipment.is_empty());
    }

    #[test]
    fn validate_rejects_nan_accuracy() {
        let mut stats = base();
        stats.accuracy = f64::NAN;
        assert!(matches!(
            stats.validate(Side::Player),
            Err(BattleError::NonFiniteStat { stat: StatKey::Accuracy, .. })
        ));
    }
}
