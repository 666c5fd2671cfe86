//! Battle statistics: per-battle accumulators, summaries and series aggregates

use crate::combatant::{CombatStats, Side};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Running totals for one battle
#[derive(Debug, Clone)]
pub struct BattleStats {
    /// Individual attacks resolved (dodged or not)
    pub total_turns: u32,
    pub total_damage: u64,
    pub critical_hits: u32,
    pub dodges: u32,
    pub started_at: Instant,
}

impl BattleStats {
    pub fn new() -> Self {
        Self {
            total_turns: 0,
            total_damage: 0,
            critical_hits: 0,
            dodges: 0,
            started_at: Instant::now(),
        }
    }

    /// Freeze the totals into a summary, measuring wall-clock time since start
    pub fn summarize(&self) -> BattleSummary {
        BattleSummary {
            total_turns: self.total_turns,
            total_damage: self.total_damage,
            critical_hits: self.critical_hits,
            dodges: self.dodges,
            duration_seconds: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for BattleStats {
    fn default() -> Self {
        Self::new()
    }
}

/// How the winner of a battle was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// One side dropped to 0 HP
    Knockout,
    /// Both sides dropped to 0 HP; winner drawn at random
    DoubleKnockout,
    /// The turn cap was reached; higher remaining HP wins, ties drawn at random
    TurnCap,
}

/// Final statistics reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub total_turns: u32,
    pub total_damage: u64,
    pub critical_hits: u32,
    pub dodges: u32,
    /// Wall-clock duration; cosmetic, never affects the result
    pub duration_seconds: f64,
}

impl BattleSummary {
    /// Turns paired into rounds (one attack per side), rounded up
    pub fn rounds(&self) -> u32 {
        self.total_turns.div_ceil(2)
    }
}

/// Win/loss tallies the caller should persist after a battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub winner_name: String,
    pub winner_wins: u32,
    pub winner_losses: u32,
    pub loser_name: String,
    pub loser_wins: u32,
    pub loser_losses: u32,
}

impl Standings {
    pub fn after_battle(winner: &CombatStats, loser: &CombatStats) -> Self {
        Self {
            winner_name: winner.name.clone(),
            winner_wins: winner.wins.saturating_add(1),
            winner_losses: winner.losses,
            loser_name: loser.name.clone(),
            loser_wins: loser.wins,
            loser_losses: loser.losses.saturating_add(1),
        }
    }
}

/// The part of a battle outcome a series keeps
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub winner_side: Side,
    pub decision: Decision,
    pub summary: BattleSummary,
}

/// Aggregated statistics over many independent battles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesStats {
    pub battles: usize,
    pub player_wins: usize,
    pub opponent_wins: usize,
    pub player_win_rate: f64,

    pub knockouts: usize,
    pub double_knockouts: usize,
    pub turn_cap_decisions: usize,

    pub avg_turns: f64,
    pub std_turns: f64,
    pub min_turns: u32,
    pub max_turns: u32,
    pub avg_rounds: f64,
    pub avg_damage: f64,
    pub avg_crits: f64,
    pub avg_dodges: f64,
}

impl SeriesStats {
    pub fn from_entries(entries: &[SeriesEntry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let n = entries.len() as f64;
        let mean = |f: fn(&SeriesEntry) -> f64| entries.iter().map(f).sum::<f64>() / n;

        let player_wins = entries.iter().filter(|e| e.winner_side == Side::Player).count();
        let count_decision = |d: Decision| entries.iter().filter(|e| e.decision == d).count();

        let avg_turns = mean(|e| e.summary.total_turns as f64);
        let variance = entries
            .iter()
            .map(|e| {
                let delta = e.summary.total_turns as f64 - avg_turns;
                delta * delta
            })
            .sum::<f64>()
            / n;

        Self {
            battles: entries.len(),
            player_wins,
            opponent_wins: entries.len() - player_wins,
            player_win_rate: player_wins as f64 / n,
            knockouts: count_decision(Decision::Knockout),
            double_knockouts: count_decision(Decision::DoubleKnockout),
            turn_cap_decisions: count_decision(Decision::TurnCap),
            avg_turns,
            std_turns: variance.sqrt(),
            min_turns: entries.iter().map(|e| e.summary.total_turns).min().unwrap_or(0),
            max_turns: entries.iter().map(|e| e.summary.total_turns).max().unwrap_or(0),
            avg_rounds: mean(|e| e.summary.rounds() as f64),
            avg_damage: mean(|e| e.summary.total_damage as f64),
            avg_crits: mean(|e| e.summary.critical_hits as f64),
            avg_dodges: mean(|e| e.summary.dodges as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(total_turns: u32, total_damage: u64) -> BattleSummary {
        BattleSummary {
            total_turns,
            total_damage,
            critical_hits: 1,
            dodges: 0,
            duration_seconds: 0.0,
        }
    }

    #[test]
    fn rounds_round_up() {
        assert_eq!(summary(0, 0).rounds(), 0);
        assert_eq!(summary(1, 0).rounds(), 1);
        assert_eq!(summary(4, 0).rounds(), 2);
        assert_eq!(summary(5, 0).rounds(), 3);
    }

    #[test]
    fn series_aggregates_wins_and_averages() {
        let entry = |winner_side, decision, turns, damage| SeriesEntry {
            winner_side,
            decision,
            summary: summary(turns, damage),
        };
        let entries = vec![
            entry(Side::Player, Decision::Knockout, 2, 100),
            entry(Side::Player, Decision::Knockout, 4, 200),
            entry(Side::Opponent, Decision::TurnCap, 6, 300),
        ];
        let stats = SeriesStats::from_entries(&entries);
        assert_eq!(stats.battles, 3);
        assert_eq!(stats.player_wins, 2);
        assert_eq!(stats.opponent_wins, 1);
        assert_eq!(stats.turn_cap_decisions, 1);
        assert_eq!(stats.min_turns, 2);
        assert_eq!(stats.max_turns, 6);
        assert!((stats.avg_turns - 4.0).abs() < 1e-9);
        assert!((stats.avg_damage - 200.0).abs() < 1e-9);
        assert!((stats.player_win_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_series_is_all_zero() {
        let stats = SeriesStats::from_entries(&[]);
        assert_eq!(stats.battles, 0);
        assert_eq!(stats.player_win_rate, 0.0);
    }
}
