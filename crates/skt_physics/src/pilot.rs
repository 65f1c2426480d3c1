//! Pilots: the per-tick control signal source for one airplane.
//!
//! A pilot is polled exactly once per fixed tick by the orchestration
//! service and answers with an acceleration/yaw pair. Human input, bots and
//! replays all sit behind the same trait. Bots sample value noise against
//! accumulated simulation time, never the wall clock, so a seeded bot
//! flies the same line in every run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use skt_core::mathx::lerp;

/// One tick's worth of control input. Consumers clamp; producers may be
/// sloppy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PilotControl {
    pub acceleration: f32,
    pub yaw: f32,
}

pub trait Pilot {
    fn name(&self) -> &str;
    /// Produce this tick's control. `dt` is the fixed tick length.
    fn control(&mut self, dt: f32) -> PilotControl;
}

/// Constant control values. Useful for tests and scripted scenarios.
pub struct FixedPilot {
    name: String,
    control: PilotControl,
}

impl FixedPilot {
    pub fn new(name: &str, acceleration: f32, yaw: f32) -> Self {
        Self {
            name: name.to_string(),
            control: PilotControl { acceleration, yaw },
        }
    }
}

impl Pilot for FixedPilot {
    fn name(&self) -> &str {
        &self.name
    }

    fn control(&mut self, _dt: f32) -> PilotControl {
        self.control
    }
}

/// Bot steering envelope: noise output is lerped into these bands.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BotConfig {
    pub yaw_min: f32,
    pub yaw_max: f32,
    pub acceleration_min: f32,
    pub acceleration_max: f32,
    /// How fast the yaw noise axis advances, in noise units per second.
    pub yaw_noise_speed: f32,
    pub acceleration_noise_speed: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            yaw_min: -0.6,
            yaw_max: 0.6,
            acceleration_min: 0.2,
            acceleration_max: 1.0,
            yaw_noise_speed: 0.35,
            acceleration_noise_speed: 0.2,
        }
    }
}

const NOISE_TABLE_SIZE: usize = 256;

/// Smooth 1D value noise over a seeded lattice. Output is in [0, 1].
struct ValueNoise {
    table: Vec<f32>,
}

impl ValueNoise {
    fn from_rng(rng: &mut ChaCha8Rng) -> Self {
        let table = (0..NOISE_TABLE_SIZE).map(|_| rng.random::<f32>()).collect();
        Self { table }
    }

    fn sample(&self, x: f64) -> f32 {
        let floor = x.floor();
        let frac = (x - floor) as f32;
        let i0 = (floor as i64).rem_euclid(NOISE_TABLE_SIZE as i64) as usize;
        let i1 = (i0 + 1) % NOISE_TABLE_SIZE;
        // Smoothstep blend between lattice values.
        let t = frac * frac * (3.0 - 2.0 * frac);
        lerp(self.table[i0], self.table[i1], t)
    }
}

/// Value-noise bot: wanders inside its configured control bands.
pub struct NoiseBotPilot {
    name: String,
    config: BotConfig,
    yaw_noise: ValueNoise,
    acceleration_noise: ValueNoise,
    elapsed: f64,
}

impl NoiseBotPilot {
    pub fn new(id: u32, config: BotConfig, seed: u64) -> Self {
        // One stream per bot id so every bot flies a distinct line even from
        // a shared race seed.
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ (u64::from(id) << 32));
        Self {
            name: format!("BotPilot {id}"),
            config,
            yaw_noise: ValueNoise::from_rng(&mut rng),
            acceleration_noise: ValueNoise::from_rng(&mut rng),
            elapsed: 0.0,
        }
    }
}

impl Pilot for NoiseBotPilot {
    fn name(&self) -> &str {
        &self.name
    }

    fn control(&mut self, dt: f32) -> PilotControl {
        self.elapsed += f64::from(dt);

        let yaw_noise = self
            .yaw_noise
            .sample(self.elapsed * f64::from(self.config.yaw_noise_speed));
        let acceleration_noise = self
            .acceleration_noise
            .sample(self.elapsed * f64::from(self.config.acceleration_noise_speed));

        PilotControl {
            acceleration: lerp(
                self.config.acceleration_min,
                self.config.acceleration_max,
                acceleration_noise,
            ),
            yaw: lerp(self.config.yaw_min, self.config.yaw_max, yaw_noise),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_pilot_repeats_its_control() {
        let mut pilot = FixedPilot::new("Fixed", 0.8, -0.2);
        let a = pilot.control(1.0 / 60.0);
        let b = pilot.control(1.0 / 60.0);
        assert_eq!(a.acceleration, b.acceleration);
        assert_eq!(a.yaw, b.yaw);
        assert_eq!(pilot.name(), "Fixed");
    }

    #[test]
    fn bot_output_stays_inside_configured_bands() {
        let config = BotConfig::default();
        let mut pilot = NoiseBotPilot::new(1, config, 42);
        for _ in 0..1000 {
            let control = pilot.control(1.0 / 60.0);
            assert!(control.yaw >= config.yaw_min && control.yaw <= config.yaw_max);
            assert!(
                control.acceleration >= config.acceleration_min
                    && control.acceleration <= config.acceleration_max
            );
        }
    }

    #[test]
    fn same_seed_and_id_fly_the_same_line() {
        let config = BotConfig::default();
        let mut a = NoiseBotPilot::new(3, config, 1234);
        let mut b = NoiseBotPilot::new(3, config, 1234);
        for _ in 0..500 {
            let ca = a.control(1.0 / 60.0);
            let cb = b.control(1.0 / 60.0);
            assert_eq!(ca.acceleration, cb.acceleration);
            assert_eq!(ca.yaw, cb.yaw);
        }
    }

    #[test]
    fn different_ids_diverge_from_one_seed() {
        let config = BotConfig::default();
        let mut a = NoiseBotPilot::new(1, config, 1234);
        let mut b = NoiseBotPilot::new(2, config, 1234);
        let mut any_difference = false;
        for _ in 0..100 {
            let ca = a.control(1.0 / 60.0);
            let cb = b.control(1.0 / 60.0);
            if ca.yaw != cb.yaw {
                any_difference = true;
            }
        }
        assert!(any_difference, "bots must not mirror each other");
    }

    #[test]
    fn noise_is_continuous_between_ticks() {
        let config = BotConfig::default();
        let mut pilot = NoiseBotPilot::new(5, config, 7);
        let mut last = pilot.control(1.0 / 60.0).yaw;
        for _ in 0..200 {
            let yaw = pilot.control(1.0 / 60.0).yaw;
            // Band is 1.2 wide; one 60 Hz tick must not jump across it.
            assert!((yaw - last).abs() < 0.3, "yaw jumped from {last} to {yaw}");
            last = yaw;
        }
    }
}
