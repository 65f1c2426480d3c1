//! Rigid-body proxies: the linear-space body integrates forces, the
//! track-space body is purely kinematic and only ever posed. Vertical
//! position is frozen in linear space; the track's height profile belongs
//! to the spline, not to the movement integration.

use glam::{Quat, Vec3};

#[derive(Debug, Clone)]
pub struct LinearBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
}

impl LinearBody {
    pub fn new(mass: f32) -> Self {
        assert!(mass > 0.0, "linear body mass must be positive, got {mass}");
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            mass,
        }
    }

    /// Accumulate a force over one fixed step: `v += f / m * dt`.
    pub fn apply_force(&mut self, force: Vec3, dt: f32) {
        self.velocity += force / self.mass * dt;
        self.velocity.y = 0.0;
    }

    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.position.y = 0.0;
    }
}

#[derive(Debug, Clone)]
pub struct KinematicBody {
    pub position: Vec3,
    pub rotation: Quat,
}

impl KinematicBody {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn move_to(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self::new()
    }
}
