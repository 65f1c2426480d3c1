//! Shared simulation outputs with enforced single-writer ownership.
//!
//! Sound, camera and view interpolation read an airplane's speed and pose
//! every frame without owning the airplane. Each record is created as a
//! `(writer, reader)` pair over one shared cell: the writer is unique (not
//! clonable) and lives inside the owning controller; readers are cheap
//! clones that expose only getters. The whole simulation is single-threaded,
//! so a plain `Rc<RefCell<..>>` carries the sharing.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec3};
use skt_core::smooth::{RollingAverage, SmoothedVec3};

const SPEED_SMOOTHING_WINDOW: usize = 8;
const DIRECTION_SMOOTHING_WINDOW: usize = 8;

#[derive(Debug)]
struct SpeedRecord {
    base_speed: f32,
    max_speed: f32,
    linear_speed: RollingAverage,
}

/// Unique write handle, held by the movement controller.
#[derive(Debug)]
pub struct SpeedWriter {
    cell: Rc<RefCell<SpeedRecord>>,
}

/// Read-only view; clone freely for consumers.
#[derive(Debug, Clone)]
pub struct SpeedReader {
    cell: Rc<RefCell<SpeedRecord>>,
}

/// Create a speed record pair with every field at `initial_speed`.
pub fn speed_reference(initial_speed: f32) -> (SpeedWriter, SpeedReader) {
    let cell = Rc::new(RefCell::new(SpeedRecord {
        base_speed: initial_speed,
        max_speed: initial_speed,
        linear_speed: RollingAverage::new(SPEED_SMOOTHING_WINDOW, initial_speed),
    }));
    (
        SpeedWriter { cell: cell.clone() },
        SpeedReader { cell },
    )
}

impl SpeedWriter {
    pub fn set_speeds(&mut self, base_speed: f32, max_speed: f32) {
        let mut record = self.cell.borrow_mut();
        record.base_speed = base_speed;
        record.max_speed = max_speed;
    }

    pub fn reset_linear(&mut self, speed: f32) {
        self.cell.borrow_mut().linear_speed.reset(speed);
    }

    pub fn push_linear(&mut self, speed: f32) {
        self.cell.borrow_mut().linear_speed.set_next(speed);
    }
}

impl SpeedReader {
    pub fn base_speed(&self) -> f32 {
        self.cell.borrow().base_speed
    }

    pub fn max_speed(&self) -> f32 {
        self.cell.borrow().max_speed
    }

    /// Smoothed forward speed sample.
    pub fn linear_speed(&self) -> f32 {
        self.cell.borrow().linear_speed.get()
    }
}

#[derive(Debug)]
struct TransformRecord {
    position: Vec3,
    rotation: Quat,
    direction: SmoothedVec3,
}

/// Unique write handle, held by the projection controller.
#[derive(Debug)]
pub struct TransformWriter {
    cell: Rc<RefCell<TransformRecord>>,
}

/// Read-only view; clone freely for consumers.
#[derive(Debug, Clone)]
pub struct TransformReader {
    cell: Rc<RefCell<TransformRecord>>,
}

pub fn transform_reference() -> (TransformWriter, TransformReader) {
    let cell = Rc::new(RefCell::new(TransformRecord {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        direction: SmoothedVec3::new(DIRECTION_SMOOTHING_WINDOW, Vec3::Z),
    }));
    (
        TransformWriter { cell: cell.clone() },
        TransformReader { cell },
    )
}

impl TransformWriter {
    pub fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        let mut record = self.cell.borrow_mut();
        record.position = position;
        record.rotation = rotation;
    }

    pub fn reset_direction(&mut self, direction: Vec3) {
        self.cell.borrow_mut().direction.reset(direction);
    }

    pub fn push_direction(&mut self, direction: Vec3) {
        self.cell.borrow_mut().direction.set_next(direction);
    }

    pub fn position(&self) -> Vec3 {
        self.cell.borrow().position
    }

    pub fn rotation(&self) -> Quat {
        self.cell.borrow().rotation
    }
}

impl TransformReader {
    pub fn position(&self) -> Vec3 {
        self.cell.borrow().position
    }

    pub fn rotation(&self) -> Quat {
        self.cell.borrow().rotation
    }

    /// Smoothed world-space travel direction, unit length (zero if degenerate).
    pub fn direction(&self) -> Vec3 {
        self.cell.borrow().direction.get().normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_updates_are_visible_to_reader() {
        let (mut writer, reader) = speed_reference(10.0);
        assert_eq!(reader.base_speed(), 10.0);
        writer.set_speeds(12.0, 36.0);
        assert_eq!(reader.base_speed(), 12.0);
        assert_eq!(reader.max_speed(), 36.0);
    }

    #[test]
    fn linear_speed_smooths_pushed_samples() {
        let (mut writer, reader) = speed_reference(10.0);
        assert!((reader.linear_speed() - 10.0).abs() < 1e-6);
        writer.push_linear(18.0);
        let smoothed = reader.linear_speed();
        assert!(smoothed > 10.0 && smoothed < 18.0);
        writer.reset_linear(18.0);
        assert!((reader.linear_speed() - 18.0).abs() < 1e-6);
    }

    #[test]
    fn cloned_readers_observe_the_same_record() {
        let (mut writer, reader) = transform_reference();
        let other = reader.clone();
        writer.set_pose(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        assert_eq!(reader.position(), other.position());
        assert_eq!(reader.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn direction_is_normalized() {
        let (mut writer, reader) = transform_reference();
        writer.reset_direction(Vec3::new(0.0, 0.0, 10.0));
        assert!(reader.direction().distance(Vec3::Z) < 1e-6);
    }
}
