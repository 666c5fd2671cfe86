//! Equipment items and the bonuses they grant

use crate::combatant::StatKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Slot an item is worn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentSlot {
    Weapon,
    Hat,
    Top,
    Shoes,
}

/// Bonus kinds the character service attaches to items.
///
/// Every recognised kind maps to exactly one stat. Anything else is kept
/// as `Unknown` and grants nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BonusType {
    Hp,
    Attack,
    Defense,
    Speed,
    CriticalChance,
    CriticalDamage,
    DodgeChance,
    Accuracy,
    Unknown(String),
}

impl BonusType {
    pub fn stat_key(&self) -> Option<StatKey> {
        match self {
            BonusType::Hp => Some(StatKey::Hp),
            BonusType::Attack => Some(StatKey::Attack),
            BonusType::Defense => Some(StatKey::Defense),
            BonusType::Speed => Some(StatKey::Speed),
            BonusType::CriticalChance => Some(StatKey::CriticalChance),
            BonusType::CriticalDamage => Some(StatKey::CriticalDamage),
            BonusType::DodgeChance => Some(StatKey::DodgeChance),
            BonusType::Accuracy => Some(StatKey::Accuracy),
            BonusType::Unknown(_) => None,
        }
    }

    /// Parse a service bonus name, case-insensitively
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "hpbonus" | "hp_bonus" | "hp" => BonusType::Hp,
            "attackbonus" | "attack_bonus" | "attack" => BonusType::Attack,
            "defensebonus" | "defense_bonus" | "defense" => BonusType::Defense,
            "speedbonus" | "speed_bonus" | "speed" => BonusType::Speed,
            "criticalchancebonus" | "critical_chance_bonus" | "critical_chance" => {
                BonusType::CriticalChance
            }
            "criticaldamagebonus" | "critical_damage_bonus" | "critical_damage" => {
                BonusType::CriticalDamage
            }
            "dodgechancebonus" | "dodge_chance_bonus" | "dodge_chance" => BonusType::DodgeChance,
            "accuracybonus" | "accuracy_bonus" | "accuracy" => BonusType::Accuracy,
            _ => BonusType::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BonusType::Hp => "hpBonus",
            BonusType::Attack => "attackBonus",
            BonusType::Defense => "defenseBonus",
            BonusType::Speed => "speedBonus",
            BonusType::CriticalChance => "criticalChanceBonus",
            BonusType::CriticalDamage => "criticalDamageBonus",
            BonusType::DodgeChance => "dodgeChanceBonus",
            BonusType::Accuracy => "accuracyBonus",
            BonusType::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for BonusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Unknown names are not an error; they deserialize to `Unknown`
impl<'de> Deserialize<'de> for BonusType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(BonusType::parse(&s))
    }
}

impl Serialize for BonusType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single additive modifier to one stat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquipmentBonus {
    pub stat_key: StatKey,
    pub amount: f64,
}

/// An equipped item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,
    #[serde(alias = "type")]
    pub slot: EquipmentSlot,
    #[serde(default, alias = "desc")]
    pub description: String,
    #[serde(alias = "bonusType")]
    pub bonus_type: BonusType,
    #[serde(alias = "bonusValue")]
    pub bonus_value: f64,
}

impl Equipment {
    pub fn new(name: &str, slot: EquipmentSlot, bonus_type: BonusType, bonus_value: f64) -> Self {
        Self {
            name: name.to_string(),
            slot,
            description: String::new(),
            bonus_type,
            bonus_value,
        }
    }

    /// The stat bonus this item grants, if its bonus type is recognised
    pub fn bonus(&self) -> Option<EquipmentBonus> {
        self.bonus_type.stat_key().map(|stat_key| EquipmentBonus {
            stat_key,
            amount: self.bonus_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_spellings() {
        assert_eq!(BonusType::parse("attackBonus"), BonusType::Attack);
        assert_eq!(BonusType::parse("CRITICALDAMAGEBONUS"), BonusType::CriticalDamage);
        assert_eq!(BonusType::parse("dodge_chance_bonus"), BonusType::DodgeChance);
        assert_eq!(BonusType::parse("accuracy"), BonusType::Accuracy);
    }

    #[test]
    fn unknown_bonus_grants_nothing() {
        let bonus_type = BonusType::parse("poisonBonus");
        assert_eq!(bonus_type, BonusType::Unknown("poisonBonus".into()));
        assert_eq!(bonus_type.stat_key(), None);

        let item = Equipment::new("Vial", EquipmentSlot::Top, bonus_type, 10.0);
        assert!(item.bonus().is_none());
    }

    #[test]
    fn known_bonus_maps_to_stat() {
        let item = Equipment::new("Boots", EquipmentSlot::Shoes, BonusType::Speed, 4.0);
        assert_eq!(
            item.bonus(),
            Some(EquipmentBonus { stat_key: StatKey::Speed, amount: 4.0 })
        );
    }

    #[test]
    fn deserializes_camel_case_item() {
        let item: Equipment = serde_json::from_str(
            r#"{"name":"Rusty Sword","type":"weapon","bonusType":"attackBonus","bonusValue":3}"#,
        )
        .unwrap();
        assert_eq!(item.slot, EquipmentSlot::Weapon);
        assert_eq!(item.bonus_type, BonusType::Attack);
        assert_eq!(item.bonus_value, 3.0);
    }
}
