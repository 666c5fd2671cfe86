//! Random roll sources injected into the battle simulator

/// A source of uniform rolls in `[0, 1)`.
///
/// Every probabilistic decision in a battle (hit, critical, coin flips)
/// draws exactly one roll, so a fixed roll stream reproduces a battle.
pub trait BattleRng {
    fn next_f64(&mut self) -> f64;
}

impl<R: BattleRng + ?Sized> BattleRng for &mut R {
    #[inline(always)]
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Fast seeded RNG used for real battles
#[derive(Clone)]
pub struct FastRng {
    inner: fastrand::Rng,
}

impl FastRng {
    #[inline(always)]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
        }
    }
}

impl BattleRng for FastRng {
    #[inline(always)]
    fn next_f64(&mut self) -> f64 {
        self.inner.f64()
    }
}

/// Replays a fixed list of rolls, cycling when exhausted.
///
/// Useful for scripting exact battles and for replaying a recorded roll
/// stream. An empty script always rolls `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(rolls: Vec<f64>) -> Self {
        Self { rolls, cursor: 0 }
    }

    /// A script that repeats the same roll forever
    pub fn constant(roll: f64) -> Self {
        Self::new(vec![roll])
    }

    /// Number of rolls drawn so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl BattleRng for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        if self.rolls.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let roll = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        roll
    }
}
