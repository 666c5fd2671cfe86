//! Core battle engine: a turn-based state machine over two resolved stat blocks

use crate::combatant::{CombatStats, Side};
use crate::config::{SimulatorSettings, SpeedTieBreak};
use crate::error::BattleError;
use crate::rng::{BattleRng, FastRng};
use crate::stats::{BattleStats, BattleSummary, Decision, SeriesEntry, SeriesStats, Standings};
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};

/// Damage of a non-critical hit.
///
/// Defense mitigates with diminishing returns (`def / (def + 100)`), so it
/// never blocks everything; every hit deals at least 1.
#[inline(always)]
pub fn base_damage(attack: u32, defense: u32) -> u32 {
    let defense = defense as f64;
    let mitigation = defense / (defense + 100.0);
    let raw = attack as f64 * (1.0 - mitigation);
    (raw.round() as u32).max(1)
}

/// Damage of a critical hit built on `damage`
#[inline(always)]
pub fn critical_damage(damage: u32, multiplier: f64) -> u32 {
    ((damage as f64 * multiplier).round() as u32).max(1)
}

/// Where the state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for `side` to attack
    TurnPending(Side),
    BattleOver,
}

/// Mutable state of one battle
#[derive(Debug, Clone)]
pub struct BattleState {
    pub player_hp: u32,
    pub opponent_hp: u32,
    pub active_side: Side,
    pub phase: Phase,
    pub turn_count: u32,
    pub log: Vec<String>,
    pub stats: BattleStats,
}

impl BattleState {
    fn new(player_hp: u32, opponent_hp: u32, first: Side) -> Self {
        Self {
            player_hp,
            opponent_hp,
            active_side: first,
            phase: Phase::TurnPending(first),
            turn_count: 0,
            log: Vec::new(),
            stats: BattleStats::new(),
        }
    }

    pub fn hp(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_hp,
            Side::Opponent => self.opponent_hp,
        }
    }

    fn hp_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Player => &mut self.player_hp,
            Side::Opponent => &mut self.opponent_hp,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::BattleOver
    }
}

/// What happened in a single attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Dodged,
    Hit { damage: u32, critical: bool },
}

/// One resolved attack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    /// 1-based attack number
    pub turn: u32,
    pub attacker: Side,
    pub outcome: TurnOutcome,
    /// Defender's HP after the attack
    pub defender_hp: u32,
}

impl TurnRecord {
    pub fn defender(&self) -> Side {
        self.attacker.other()
    }

    /// Narration line naming attacker, defender and the result
    pub fn narrate(&self, attacker: &CombatStats, defender: &CombatStats) -> String {
        let a = attacker.display_name();
        let d = defender.display_name();
        match self.outcome {
            TurnOutcome::Dodged => format!("{a} attacks {d}. {d} dodges!"),
            TurnOutcome::Hit { damage, critical: true } => {
                format!("{a} attacks {d}. Critical Hit! {d} takes {damage} damage.")
            }
            TurnOutcome::Hit { damage, critical: false } => {
                format!("{a} attacks {d}. {d} takes {damage} damage.")
            }
        }
    }
}

/// Terminal result of a battle
#[derive(Debug, Clone, PartialEq)]
pub struct BattleOutcome {
    pub winner: CombatStats,
    pub loser: CombatStats,
    pub winner_side: Side,
    pub decision: Decision,
    pub summary: BattleSummary,
    pub log: Vec<String>,
}

impl BattleOutcome {
    /// Win/loss tallies to persist for both combatants
    pub fn standings(&self) -> Standings {
        Standings::after_battle(&self.winner, &self.loser)
    }

    pub fn series_entry(&self) -> SeriesEntry {
        SeriesEntry {
            winner_side: self.winner_side,
            decision: self.decision,
            summary: self.summary.clone(),
        }
    }
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} defeats {} ({:?}) in {} rounds",
            self.winner.name,
            self.loser.name,
            self.decision,
            self.summary.rounds()
        )
    }
}

/// Result of a single `step()` call
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// One attack was resolved; the battle may or may not be over
    Turn(TurnRecord),
    /// The battle is over; emitted exactly once
    Finished(BattleOutcome),
}

/// Runs one battle between two resolved combatants.
///
/// Owns its state and roll source exclusively. Drive it with `step()` (for
/// externally paced playback) or `run()`; both yield identical battles for
/// the same roll stream.
pub struct BattleSimulator<R: BattleRng> {
    player: CombatStats,
    opponent: CombatStats,
    settings: SimulatorSettings,
    rng: R,
    state: BattleState,
    verdict: Option<(Side, Decision)>,
    reported: bool,
}

impl<R: BattleRng> BattleSimulator<R> {
    /// Validate both combatants and decide who moves first.
    ///
    /// Faster combatant starts. Speed ties go to the player unless the
    /// settings ask for a coin flip, which draws one roll.
    pub fn new(
        player: CombatStats,
        opponent: CombatStats,
        settings: SimulatorSettings,
        mut rng: R,
    ) -> Result<Self, BattleError> {
        player.validate(Side::Player)?;
        opponent.validate(Side::Opponent)?;

        let first = if player.speed > opponent.speed {
            Side::Player
        } else if opponent.speed > player.speed {
            Side::Opponent
        } else {
            match settings.speed_tie {
                SpeedTieBreak::PlayerFirst => Side::Player,
                SpeedTieBreak::CoinFlip => coin_flip(&mut rng),
            }
        };

        debug!(
            target: "arena_sim::simulation",
            player = %player.name,
            opponent = %opponent.name,
            first = %first,
            "battle initialised"
        );

        let state = BattleState::new(player.hp, opponent.hp, first);
        Ok(Self {
            player,
            opponent,
            settings,
            rng,
            state,
            verdict: None,
            reported: false,
        })
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn combatant(&self, side: Side) -> &CombatStats {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    /// Give back the roll source, e.g. to inspect how many rolls were drawn
    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Advance the state machine by one transition
    pub fn step(&mut self) -> Result<Step, BattleError> {
        let attacker = match self.state.phase {
            Phase::BattleOver => {
                if self.reported {
                    return Err(BattleError::BattleOver);
                }
                return Ok(Step::Finished(self.conclude()));
            }
            Phase::TurnPending(side) => side,
        };

        if self.state.stats.total_turns >= self.settings.turn_cap {
            self.decide_on_turn_cap();
            return Ok(Step::Finished(self.conclude()));
        }

        let record = self.resolve_turn(attacker);
        let defender = record.defender();

        if self.state.hp(defender) == 0 || self.state.hp(attacker) == 0 {
            self.decide_on_knockout();
        } else {
            self.state.active_side = defender;
            self.state.phase = Phase::TurnPending(defender);
        }

        Ok(Step::Turn(record))
    }

    /// Run the battle to completion
    pub fn run(mut self) -> Result<BattleOutcome, BattleError> {
        loop {
            if let Step::Finished(outcome) = self.step()? {
                return Ok(outcome);
            }
        }
    }

    /// TURN_RESOLVING: one attack from `attacker` against the other side
    fn resolve_turn(&mut self, attacker_side: Side) -> TurnRecord {
        let defender_side = attacker_side.other();
        let (attacker, defender) = match attacker_side {
            Side::Player => (&self.player, &self.opponent),
            Side::Opponent => (&self.opponent, &self.player),
        };

        // Defender's dodge eats into the attacker's accuracy margin; with no
        // margin left even a 0.0 roll misses
        let hit_roll = self.rng.next_f64();
        let margin = attacker.accuracy - defender.dodge_chance;
        let outcome = if margin <= 0.0 || hit_roll > margin {
            self.state.stats.dodges += 1;
            TurnOutcome::Dodged
        } else {
            let mut damage = base_damage(attacker.attack, defender.defense);
            let crit_roll = self.rng.next_f64();
            let critical = crit_roll < attacker.critical_chance;
            if critical {
                damage = critical_damage(damage, attacker.critical_damage);
                self.state.stats.critical_hits += 1;
            }

            let hp = self.state.hp_mut(defender_side);
            *hp = hp.saturating_sub(damage);
            self.state.stats.total_damage += damage as u64;
            TurnOutcome::Hit { damage, critical }
        };

        self.state.stats.total_turns += 1;
        self.state.turn_count = self.state.stats.total_turns;

        let record = TurnRecord {
            turn: self.state.turn_count,
            attacker: attacker_side,
            outcome,
            defender_hp: self.state.hp(defender_side),
        };
        let line = record.narrate(attacker, defender);

        debug!(
            target: "arena_sim::simulation",
            turn = record.turn,
            attacker = %attacker_side,
            outcome = ?record.outcome,
            player_hp = self.state.player_hp,
            opponent_hp = self.state.opponent_hp,
            "turn resolved"
        );

        self.state.log.push(line);
        record
    }

    fn decide_on_knockout(&mut self) {
        let player_down = self.state.player_hp == 0;
        let opponent_down = self.state.opponent_hp == 0;

        let (winner, decision) = match (player_down, opponent_down) {
            (true, true) => (coin_flip(&mut self.rng), Decision::DoubleKnockout),
            (false, true) => (Side::Player, Decision::Knockout),
            (true, false) => (Side::Opponent, Decision::Knockout),
            (false, false) => return,
        };

        let w = self.combatant(winner).display_name();
        let l = self.combatant(winner.other()).display_name();
        let line = match decision {
            Decision::DoubleKnockout => {
                format!("Both fighters are down! It's a draw, deciding randomly... {w} wins!")
            }
            _ => format!("{w} wins! {l} is defeated."),
        };
        self.finish(winner, decision, line);
    }

    fn decide_on_turn_cap(&mut self) {
        let player_hp = self.state.player_hp;
        let opponent_hp = self.state.opponent_hp;

        warn!(
            target: "arena_sim::simulation",
            turn_cap = self.settings.turn_cap,
            player_hp,
            opponent_hp,
            "turn cap reached, deciding on remaining hp"
        );

        let winner = if player_hp > opponent_hp {
            Side::Player
        } else if opponent_hp > player_hp {
            Side::Opponent
        } else {
            coin_flip(&mut self.rng)
        };

        let w = self.combatant(winner).display_name();
        let line = if player_hp == opponent_hp {
            format!(
                "Turn limit of {} reached, HP tied at {player_hp}. Deciding randomly... {w} wins!",
                self.settings.turn_cap
            )
        } else {
            format!(
                "Turn limit of {} reached. {w} wins on HP ({player_hp} to {opponent_hp}).",
                self.settings.turn_cap
            )
        };
        self.finish(winner, Decision::TurnCap, line);
    }

    fn finish(&mut self, winner: Side, decision: Decision, line: String) {
        self.state.log.push(line);
        self.state.phase = Phase::BattleOver;
        self.verdict = Some((winner, decision));
    }

    /// Build the outcome once the state machine reached BATTLE_OVER
    fn conclude(&mut self) -> BattleOutcome {
        self.reported = true;
        // Only reachable after `finish`, which always records a verdict
        let (winner_side, decision) = self.verdict.unwrap_or((Side::Player, Decision::Knockout));
        let summary = self.state.stats.summarize();

        info!(
            target: "arena_sim::simulation",
            winner = %self.combatant(winner_side).name,
            decision = ?decision,
            turns = summary.total_turns,
            total_damage = summary.total_damage,
            "battle over"
        );

        BattleOutcome {
            winner: self.combatant(winner_side).clone(),
            loser: self.combatant(winner_side.other()).clone(),
            winner_side,
            decision,
            summary,
            log: self.state.log.clone(),
        }
    }
}

/// One roll: below 0.5 favours the player
#[inline(always)]
fn coin_flip<R: BattleRng>(rng: &mut R) -> Side {
    if rng.next_f64() < 0.5 {
        Side::Player
    } else {
        Side::Opponent
    }
}

/// Run a single battle with a seeded fast RNG
pub fn run_battle(
    player: &CombatStats,
    opponent: &CombatStats,
    settings: SimulatorSettings,
    seed: u64,
) -> Result<BattleOutcome, BattleError> {
    BattleSimulator::new(player.clone(), opponent.clone(), settings, FastRng::new(seed))?.run()
}

/// Run `count` independent battles, battle `i` seeded with `base_seed + i`
pub fn run_series_entries(
    player: &CombatStats,
    opponent: &CombatStats,
    settings: SimulatorSettings,
    count: usize,
    base_seed: u64,
    parallel: bool,
) -> Result<Vec<SeriesEntry>, BattleError> {
    player.validate(Side::Player)?;
    opponent.validate(Side::Opponent)?;

    let one = |i: usize| {
        run_battle(player, opponent, settings, base_seed.wrapping_add(i as u64))
            .map(|outcome| outcome.series_entry())
    };

    if parallel {
        (0..count).into_par_iter().map(one).collect()
    } else {
        (0..count).map(one).collect()
    }
}

/// Run a series of battles and return aggregated stats
pub fn run_series(
    player: &CombatStats,
    opponent: &CombatStats,
    settings: SimulatorSettings,
    count: usize,
    base_seed: u64,
    parallel: bool,
) -> Result<SeriesStats, BattleError> {
    let entries = run_series_entries(player, opponent, settings, count, base_seed, parallel)?;
    Ok(SeriesStats::from_entries(&entries))
}
