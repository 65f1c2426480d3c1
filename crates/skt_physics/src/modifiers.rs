//! Multiplicative modifier stacks over the airplane's speed and force
//! tunables.
//!
//! A stack combines its entries as `base * (1 + Σ value)`. The factor is
//! deliberately not floor-clamped at zero: a stack summing below −1 inverts
//! the modified sign. Stacks are cleared at the start of every tick and
//! rebuilt by whatever zone effects are live, so an entry never outlives the
//! tick that added it.

use crate::config::PhysConfig;
use skt_core::mathx::{inverse_lerp, lerp};

#[derive(Debug, Clone, Default)]
pub struct ModifierStack {
    values: Vec<f32>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn add(&mut self, value: f32) {
        self.values.push(value);
    }

    /// Remove the first entry with this exact value, if present.
    pub fn remove(&mut self, value: f32) {
        if let Some(index) = self.values.iter().position(|v| *v == value) {
            self.values.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn factor(&self) -> f32 {
        1.0 + self.values.iter().sum::<f32>()
    }

    pub fn modify(&self, base: f32) -> f32 {
        base * self.factor()
    }
}

/// The four stacks a movement controller owns, plus the derived speed/force
/// queries the tick loop reads. One strongly-typed method per modifier kind.
#[derive(Debug, Clone)]
pub struct MovementModifiers {
    base_speed: ModifierStack,
    max_speed: ModifierStack,
    acceleration_force: ModifierStack,
    deceleration_force: ModifierStack,
    base_speed_raw: f32,
    max_speed_raw: f32,
    acceleration_force_raw: f32,
    deceleration_force_raw: f32,
}

impl MovementModifiers {
    pub fn new(config: &PhysConfig) -> Self {
        Self {
            base_speed: ModifierStack::new(),
            max_speed: ModifierStack::new(),
            acceleration_force: ModifierStack::new(),
            deceleration_force: ModifierStack::new(),
            base_speed_raw: config.base_speed,
            max_speed_raw: config.max_speed,
            acceleration_force_raw: config.acceleration_force,
            deceleration_force_raw: config.deceleration_force,
        }
    }

    /// Clear all four stacks. Must run before any zone simulates in a tick;
    /// zones re-register their contributions every tick.
    pub fn reset(&mut self) {
        self.base_speed.clear();
        self.max_speed.clear();
        self.acceleration_force.clear();
        self.deceleration_force.clear();
    }

    pub fn add_base_speed(&mut self, value: f32) {
        self.base_speed.add(value);
    }

    pub fn add_max_speed(&mut self, value: f32) {
        self.max_speed.add(value);
    }

    pub fn add_acceleration_force(&mut self, value: f32) {
        self.acceleration_force.add(value);
    }

    pub fn add_deceleration_force(&mut self, value: f32) {
        self.deceleration_force.add(value);
    }

    pub fn calculated_base_speed(&self) -> f32 {
        self.base_speed.modify(self.base_speed_raw)
    }

    pub fn calculated_max_speed(&self) -> f32 {
        self.max_speed.modify(self.max_speed_raw)
    }

    pub fn calculated_acceleration_force(&self) -> f32 {
        self.acceleration_force.modify(self.acceleration_force_raw)
    }

    pub fn calculated_deceleration_force(&self) -> f32 {
        self.deceleration_force.modify(self.deceleration_force_raw)
    }

    /// Where `current_speed` sits between the calculated base and max speed.
    pub fn current_speed_norm(&self, current_speed: f32) -> f32 {
        inverse_lerp(
            self.calculated_base_speed(),
            self.calculated_max_speed(),
            current_speed,
        )
    }

    /// The absolute speed a [0, 1] acceleration input asks for.
    pub fn target_speed(&self, acceleration_input: f32) -> f32 {
        lerp(
            self.calculated_base_speed(),
            self.calculated_max_speed(),
            acceleration_input,
        )
    }

    /// Force magnitude scaled by how far current speed is from the target,
    /// normalized over the base→max span.
    pub fn scalar_force(&self, max_acceleration: f32, target_speed: f32, current_speed: f32) -> f32 {
        let speed_diff = (target_speed - current_speed).abs();
        let span = (self.calculated_max_speed() - self.calculated_base_speed()).abs();
        let speed_diff_norm = speed_diff / span;
        max_acceleration * speed_diff_norm
    }

    /// Curve-scaled force magnitude for the current direction of change.
    pub fn acceleration(&self, is_accelerating: bool, speed_norm: f32, config: &PhysConfig) -> f32 {
        if is_accelerating {
            self.calculated_acceleration_force() * config.acceleration_curve.evaluate(speed_norm)
        } else {
            self.calculated_deceleration_force() * config.deceleration_curve.evaluate(speed_norm)
        }
    }
}
