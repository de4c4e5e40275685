//! Sources of simulated activity log lines.
//!
//! The simulator asks its source once per tick whether to log and what.
//! [`RandomPhrases`] reproduces the dashboard's random cadence;
//! [`ScriptedPhrases`] replays a fixed script for tests.

use gta_protocol::config_models::SimulationConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Decides, tick by tick, which log line (if any) the active stage gets.
pub trait PhraseSource {
    /// The line to append on this tick, or `None` to skip the tick.
    fn next_line(&mut self) -> Option<String>;
}

/// Appends a random canned phrase with a fixed probability per tick.
pub struct RandomPhrases {
    rng: StdRng,
    probability: f64,
    phrases: Vec<String>,
}

impl RandomPhrases {
    /// Create a source over `phrases`.
    ///
    /// `probability` is clamped to `0.0..=1.0`. A `seed` makes the sequence
    /// reproducible; without one the generator is seeded from entropy.
    pub fn new(phrases: Vec<String>, probability: f64, seed: Option<u64>) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            probability,
            phrases,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.phrases.clone(), config.log_probability, config.seed)
    }
}

impl PhraseSource for RandomPhrases {
    fn next_line(&mut self) -> Option<String> {
        if self.phrases.is_empty() || !self.rng.gen_bool(self.probability) {
            return None;
        }
        self.phrases.choose(&mut self.rng).cloned()
    }
}

/// Replays a fixed sequence of tick decisions.
///
/// Once the script runs out, every further tick yields `fallback`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPhrases {
    script: VecDeque<Option<String>>,
    fallback: Option<String>,
}

impl ScriptedPhrases {
    /// Replay `script`, then never log again.
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        Self {
            script: script.into_iter().collect(),
            fallback: None,
        }
    }

    /// Log `line` on every tick.
    pub fn always(line: impl Into<String>) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Some(line.into()),
        }
    }

    /// Never log.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Keep yielding `line` after the script is exhausted.
    pub fn then_always(mut self, line: impl Into<String>) -> Self {
        self.fallback = Some(line.into());
        self
    }
}

impl PhraseSource for ScriptedPhrases {
    fn next_line(&mut self) -> Option<String> {
        match self.script.pop_front() {
            Some(step) => step,
            None => self.fallback.clone(),
        }
    }
}
