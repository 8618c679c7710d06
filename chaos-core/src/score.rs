//! Resilience score sources.
//!
//! The lab never calls a global random generator; it draws from a
//! [`ScoreSource`] it owns so runs can be pinned in tests and demos.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub const MIN_TERMINAL_SCORE: f64 = 6.0;
pub const MAX_TERMINAL_SCORE: f64 = 10.0;

pub trait ScoreSource: Send + 'static {
    /// Next terminal score in `[6.0, 10.0]` with one decimal.
    fn next_score(&mut self) -> f64;
}

/// Uniform scores from a seedable generator.
pub struct SeededScores {
    rng: StdRng,
}

impl SeededScores {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl ScoreSource for SeededScores {
    fn next_score(&mut self) -> f64 {
        let raw = self.rng.gen_range(MIN_TERMINAL_SCORE..=MAX_TERMINAL_SCORE);
        round_score(raw)
    }
}

/// Replays a fixed list of scores, repeating the last one when exhausted.
pub struct FixedScores {
    queue: VecDeque<f64>,
    last: f64,
}

impl FixedScores {
    pub fn new(scores: impl IntoIterator<Item = f64>) -> Self {
        Self {
            queue: scores.into_iter().collect(),
            last: MAX_TERMINAL_SCORE,
        }
    }
}

impl ScoreSource for FixedScores {
    fn next_score(&mut self) -> f64 {
        if let Some(next) = self.queue.pop_front() {
            self.last = round_score(next);
        }
        self.last
    }
}

/// Round to one decimal and clamp into the terminal range.
pub fn round_score(raw: f64) -> f64 {
    let clamped = raw.clamp(MIN_TERMINAL_SCORE, MAX_TERMINAL_SCORE);
    (clamped * 10.0).round() / 10.0
}
