use rand::Rng;
use serde::{Deserialize, Serialize};

/// Jitter amplitude range and re-trigger timing, in pixels and frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterTuning {
    pub noise_factor: f64,
    pub min_timeout: i32,
    pub max_timeout: i32,
}

impl Default for JitterTuning {
    fn default() -> Self {
        Self {
            noise_factor: 20.0,
            min_timeout: 10,
            max_timeout: 30,
        }
    }
}

/// One randomized offset with its own countdown.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JitterChannel {
    timer: i32,
    amplitude: f64,
}

impl JitterChannel {
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn timer(&self) -> i32 {
        self.timer
    }

    /// Counts down one frame; once the timer goes negative a fresh timeout
    /// and amplitude are drawn.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, tuning: &JitterTuning) {
        self.timer -= 1;
        if self.timer >= 0 {
            return;
        }

        self.timer = rng.gen_range(tuning.min_timeout..=tuning.max_timeout);
        self.amplitude = if tuning.noise_factor > 0.0 {
            rng.gen_range(-tuning.noise_factor..=tuning.noise_factor)
        } else {
            0.0
        };
    }
}

/// Width and height jitter for a single track. The amplitudes are added to
/// size targets before smoothing, so the smoother absorbs the steps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SizeJitter {
    pub width: JitterChannel,
    pub height: JitterChannel,
}

impl SizeJitter {
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, tuning: &JitterTuning) {
        self.width.tick(rng, tuning);
        self.height.tick(rng, tuning);
    }
}
