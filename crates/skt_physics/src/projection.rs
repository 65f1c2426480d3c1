//! Track-space projection: maps linear-space movement state onto the 3D
//! track spline.
//!
//! Each tick the controller consumes a one-tick snapshot of the movement
//! controller's output (travel, strafe, velocity), samples the spline at the
//! normalized travel progress, offsets laterally along the sample's right
//! vector, and layers rate-limited yaw/roll banking on top of the
//! spline-implied orientation. The resulting pose is published through the
//! transform writer and mirrored onto a kinematic body so external collision
//! detection has something to test against. Trigger events recorded by that
//! external detection accumulate here until cleared.

use std::rc::Rc;

use glam::{Mat3, Quat, Vec3};

use skt_core::mathx::lerp;
use skt_track::{SplineSample, Track};

use crate::body::KinematicBody;
use crate::config::PhysConfig;
use crate::diag::DebugOptions;
use crate::movement::ControllerState;
use crate::refs::TransformWriter;

/// One-tick snapshot handed over from the movement controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicsData {
    pub travel: f32,
    pub strafe: f32,
    pub velocity: Vec3,
}

impl PhysicsData {
    pub fn new(movement_position: Vec3, movement_velocity: Vec3) -> Self {
        Self {
            travel: movement_position.z,
            strafe: movement_position.x,
            velocity: movement_velocity,
        }
    }
}

/// External identifier for a collider that reported a trigger overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerId(pub u32);

pub struct TrackProjectionController {
    config: Rc<PhysConfig>,
    transform: TransformWriter,
    body: KinematicBody,
    data: PhysicsData,
    yaw: f32,
    roll: f32,
    triggered: Vec<TriggerId>,
    debug: DebugOptions,
    state: ControllerState,
    pilot_name: String,
}

impl TrackProjectionController {
    pub fn new(
        config: Rc<PhysConfig>,
        transform: TransformWriter,
        pilot_name: &str,
        debug: DebugOptions,
    ) -> Self {
        Self {
            config,
            transform,
            body: KinematicBody::new(),
            data: PhysicsData::default(),
            yaw: 0.0,
            roll: 0.0,
            triggered: Vec::new(),
            debug,
            state: ControllerState::Inited,
            pilot_name: pilot_name.to_string(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn rotation(&self) -> Quat {
        self.body.rotation
    }

    /// Hand over this tick's movement output.
    pub fn set_simulation_parameters(
        &mut self,
        movement_position: Vec3,
        movement_velocity: Vec3,
    ) {
        self.data = PhysicsData::new(movement_position, movement_velocity);
    }

    pub fn dispose(&mut self) {
        if self.state == ControllerState::Disposed {
            return;
        }
        self.state = ControllerState::Disposed;
        log::info!("Projection controller for '{}' disposed", self.pilot_name);
    }

    pub fn simulate(&mut self, dt: f32, track: &Track) {
        if self.state != ControllerState::Inited {
            return;
        }
        self.compute_next_pose(dt, track);
        self.body
            .move_to(self.transform.position(), self.transform.rotation());
    }

    /// Re-pose instantly from a movement state: no yaw/roll lerp residue, and
    /// the direction window is refilled so consumers see no stale samples.
    pub fn reset_simulation(
        &mut self,
        movement_position: Vec3,
        movement_velocity: Vec3,
        track: &Track,
    ) {
        self.yaw = 0.0;
        self.roll = 0.0;

        self.set_simulation_parameters(movement_position, movement_velocity);
        self.compute_next_pose(0.0, track);

        self.body
            .move_to(self.transform.position(), self.transform.rotation());
        let direction = self.sample_current_direction(track, self.body.position);
        self.transform.reset_direction(direction);
    }

    /// Record a trigger overlap reported by external collision detection.
    pub fn push_triggered(&mut self, id: TriggerId) {
        self.triggered.push(id);
        if self.debug.log_tick_forces {
            log::trace!("[{}] trigger {} recorded", self.pilot_name, id.0);
        }
    }

    /// Trigger overlaps accumulated since the last clear.
    pub fn triggered(&self) -> &[TriggerId] {
        &self.triggered
    }

    pub fn clear_triggered(&mut self) {
        self.triggered.clear();
    }

    fn compute_next_pose(&mut self, dt: f32, track: &Track) {
        let progress = track.progress_at(self.data.travel);
        let (position, sample) = sample_position_on_track(track, progress, self.data.strafe);

        let mut rotation = Quat::IDENTITY;
        rotation = self.calculate_roll(dt) * rotation;
        rotation = self.calculate_yaw(dt) * rotation;
        rotation = look_rotation(sample.forward, sample.up) * rotation;

        self.transform.set_pose(position, rotation);
        let direction = self.sample_current_direction(track, position);
        self.transform.push_direction(direction);
    }

    fn calculate_yaw(&mut self, dt: f32) -> Quat {
        let horizontal_velocity_norm = self.data.velocity.x / self.config.max_horizontal_speed;
        let angle = self.config.yaw_angle_deg * horizontal_velocity_norm;
        self.yaw = lerp(self.yaw, angle, dt * self.config.yaw_lerp_speed);
        Quat::from_rotation_y(self.yaw.to_radians())
    }

    fn calculate_roll(&mut self, dt: f32) -> Quat {
        let horizontal_velocity_norm = self.data.velocity.x / self.config.max_horizontal_speed;
        let angle = self.config.roll_angle_deg * horizontal_velocity_norm * -1.0;
        self.roll = lerp(self.roll, angle, dt * self.config.roll_lerp_speed);
        Quat::from_rotation_z(self.roll.to_radians())
    }

    /// World-space travel direction from the neighbouring spline samples: the
    /// vector to the next sample's strafe-offset position, or from the
    /// previous one at the end of the track.
    fn sample_current_direction(&self, track: &Track, current_position: Vec3) -> Vec3 {
        let spline = track.spline();
        let progress = track.progress_at(self.data.travel);
        let (index, _) = spline.sampling_values(progress);

        let (from, to) = if index + 1 < spline.sample_count() {
            let next_percent = spline.percent_at_index(index + 1);
            let (next, _) = sample_position_on_track(track, next_percent, self.data.strafe);
            (current_position, next)
        } else {
            let prev_percent = spline.percent_at_index(index - 1);
            let (prev, _) = sample_position_on_track(track, prev_percent, self.data.strafe);
            (prev, current_position)
        };

        (to - from).normalize_or_zero()
    }
}

fn sample_position_on_track(track: &Track, progress: f64, strafe: f32) -> (Vec3, SplineSample) {
    let sample = track.spline().evaluate(progress);
    let position = sample.position + sample.right * strafe;
    (position, sample)
}

/// Rotation mapping local +Z to `forward` and local +Y toward `up`.
fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let right = up.cross(forward).normalize();
    let up = forward.cross(right).normalize();
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}
