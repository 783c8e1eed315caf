use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod battle;
pub mod combatant;
pub mod config;
pub mod content;
pub mod difficulty;
pub mod encounter;
pub mod event;

pub use battle::{Battle, BattleConfig, Phase, PlayerAction};
pub use combatant::{Enemy, EnemySkill, EnemyTemplate, Player, PlayerSkill, Pool};
pub use content::Catalog;
pub use difficulty::{Difficulty, DifficultyCatalog, DifficultyProfile};
pub use event::{ActionError, BattleEvent, Emphasis};

/// Uniform draws in `[0, 1)` feeding every probability-gated effect.
pub trait RandomSource {
    fn draw(&mut self) -> f64;

    /// `p >= 1.0` and `p <= 0.0` are decided without consuming a draw.
    fn chance(&mut self, p: f64) -> bool {
        if p >= 1.0 {
            return true;
        }
        if p <= 0.0 {
            return false;
        }
        self.draw() < p
    }

    /// Uniform index into a collection of `len` items; `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let raw = (self.draw() * len as f64) as usize;
        raw.min(len.saturating_sub(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn draw(&mut self) -> f64 {
        (**self).draw()
    }
}

/// What an exhausted script keeps returning: high enough that no sub-1.0 chance fires.
pub const SCRIPT_EXHAUSTED: f64 = 0.999_999;

enum Source {
    Seeded(ChaCha8Rng),
    Scripted(VecDeque<f64>),
}

pub struct Dice {
    source: Source,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Replays `draws` in order, then [`SCRIPT_EXHAUSTED`] forever.
    pub fn from_scripted(draws: Vec<f64>) -> Self {
        Self {
            source: Source::Scripted(draws.into()),
        }
    }

    /// Draws left in a scripted source; `None` for seeded dice.
    pub fn scripted_remaining(&self) -> Option<usize> {
        match &self.source {
            Source::Seeded(_) => None,
            Source::Scripted(queue) => Some(queue.len()),
        }
    }
}

impl RandomSource for Dice {
    fn draw(&mut self) -> f64 {
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0.0..1.0),
            Source::Scripted(queue) => queue
                .pop_front()
                .unwrap_or(SCRIPT_EXHAUSTED)
                .clamp(0.0, SCRIPT_EXHAUSTED),
        }
    }
}

/// Round a scaled value the way every multiplier in the game is applied.
pub fn scale(base: i32, multiplier: f64) -> i32 {
    (base as f64 * multiplier).round() as i32
}
