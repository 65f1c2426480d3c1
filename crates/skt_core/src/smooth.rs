//! Rolling-window smoothing for noisy per-tick samples.
//!
//! Consumers such as engine audio and camera targeting read speed and
//! direction once per tick but must not see single-tick spikes. `reset`
//! refills the whole window so the smoothed value jumps instantly after a
//! teleport, while `set_next` feeds one sample per tick.

use glam::Vec3;

#[derive(Debug, Clone)]
pub struct RollingAverage {
    samples: Vec<f32>,
    index: usize,
}

impl RollingAverage {
    pub fn new(window: usize, initial: f32) -> Self {
        assert!(window > 0, "rolling average window must be non-zero");
        Self {
            samples: vec![initial; window],
            index: 0,
        }
    }

    /// Refill the whole window with `value`; the mean becomes `value` at once.
    pub fn reset(&mut self, value: f32) {
        self.samples.fill(value);
        self.index = 0;
    }

    pub fn set_next(&mut self, value: f32) {
        self.samples[self.index] = value;
        self.index = (self.index + 1) % self.samples.len();
    }

    pub fn get(&self) -> f32 {
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }
}

#[derive(Debug, Clone)]
pub struct SmoothedVec3 {
    samples: Vec<Vec3>,
    index: usize,
}

impl SmoothedVec3 {
    pub fn new(window: usize, initial: Vec3) -> Self {
        assert!(window > 0, "smoothing window must be non-zero");
        Self {
            samples: vec![initial; window],
            index: 0,
        }
    }

    pub fn reset(&mut self, value: Vec3) {
        self.samples.fill(value);
        self.index = 0;
    }

    pub fn set_next(&mut self, value: Vec3) {
        self.samples[self.index] = value;
        self.index = (self.index + 1) % self.samples.len();
    }

    pub fn get(&self) -> Vec3 {
        self.samples.iter().copied().sum::<Vec3>() / self.samples.len() as f32
    }
}
