//! Built-in combatants used when no battle file is supplied

use crate::combatant::{CombatStats, CombatantRecord};
use crate::equipment::{BonusType, Equipment, EquipmentSlot};

/// Stat line every freshly created character starts with.
///
/// The icon is the first character of the name, or `?` for an empty name.
pub fn default_challenger(name: &str) -> CombatStats {
    let icon = name
        .chars()
        .next()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "?".to_string());

    CombatStats {
        name: name.to_string(),
        icon,
        hp: 500,
        attack: 33,
        defense: 9,
        speed: 70,
        critical_chance: 0.13,
        critical_damage: 1.45,
        dodge_chance: 0.04,
        accuracy: 0.95,
        wins: 0,
        losses: 0,
    }
}

/// The matchmaking opponent: a former knight ranked Gold II
pub fn arena_rival() -> CombatStats {
    CombatStats {
        name: "Alberto de la Rosa".to_string(),
        icon: "🗡️".to_string(),
        hp: 180,
        attack: 80,
        defense: 18,
        speed: 72,
        critical_chance: 0.15,
        critical_damage: 1.8,
        dodge_chance: 0.08,
        accuracy: 0.92,
        wins: 127,
        losses: 89,
    }
}

/// A new character wearing the starter weapon
pub fn starter_record(name: &str) -> CombatantRecord {
    let mut record = CombatantRecord::new(default_challenger(name));
    record.equipment.push(Equipment::new(
        "Training Sword",
        EquipmentSlot::Weapon,
        BonusType::Attack,
        3.0,
    ));
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenger_icon_is_first_letter() {
        assert_eq!(default_challenger("Mira").icon, "M");
        assert_eq!(default_challenger("").icon, "?");
    }

    #[test]
    fn presets_are_battle_ready() {
        use crate::combatant::Side;
        assert!(default_challenger("Mira").validate(Side::Player).is_ok());
        assert!(arena_rival().validate(Side::Opponent).is_ok());
    }

    #[test]
    fn starter_weapon_adds_attack() {
        let resolved = starter_record("Mira").resolve();
        assert_eq!(resolved.attack, 36);
        assert_eq!(resolved.hp, 500);
    }
}
