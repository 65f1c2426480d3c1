//! Linear-space movement simulation.
//!
//! One controller per airplane. The controller works in the simplified
//! linear frame (`z` is distance traveled along the track, `x` is lateral
//! strafe offset) and never sees world-space geometry beyond the track's
//! scalar queries: progress, width, soft border, zone spans. Per tick it
//! resets and rebuilds the modifier stacks from live zone effects, derives a
//! forward force from the current-vs-target speed gap, a lateral force from
//! yaw input, damps outward strafe inside the soft border band, and
//! integrates its rigid-body proxy.

use std::rc::Rc;

use glam::Vec3;

use skt_core::mathx::{clamp01, ease_in_cubic, inverse_lerp, lerp};
use skt_track::{Track, ZoneSpan};

use crate::body::LinearBody;
use crate::config::PhysConfig;
use crate::diag::DebugOptions;
use crate::modifiers::MovementModifiers;
use crate::refs::SpeedWriter;
use crate::zone::{TrackZoneEffect, ZoneKind, ZoneState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    NotInited,
    Inited,
    Disposed,
}

pub struct MovementPhysicsController {
    config: Rc<PhysConfig>,
    modifiers: MovementModifiers,
    speed: SpeedWriter,
    body: LinearBody,
    acceleration: f32,
    yaw: f32,
    acceleration_zone: Option<TrackZoneEffect>,
    deceleration_zone: Option<TrackZoneEffect>,
    debug: DebugOptions,
    state: ControllerState,
    pilot_name: String,
}

impl MovementPhysicsController {
    pub fn new(
        config: Rc<PhysConfig>,
        mut speed: SpeedWriter,
        pilot_name: &str,
        debug: DebugOptions,
    ) -> Self {
        let modifiers = MovementModifiers::new(&config);
        speed.set_speeds(
            modifiers.calculated_base_speed(),
            modifiers.calculated_max_speed(),
        );
        speed.reset_linear(modifiers.calculated_base_speed());

        Self {
            body: LinearBody::new(config.mass),
            config,
            modifiers,
            speed,
            acceleration: 0.0,
            yaw: 0.0,
            acceleration_zone: None,
            deceleration_zone: None,
            debug,
            state: ControllerState::Inited,
            pilot_name: pilot_name.to_string(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn pilot_name(&self) -> &str {
        &self.pilot_name
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    pub fn traveled_distance(&self) -> f32 {
        self.body.position.z
    }

    pub fn strafe(&self) -> f32 {
        self.body.position.x
    }

    fn current_speed(&self) -> f32 {
        self.body.velocity.z
    }

    /// Pilot input for the coming tick. Out-of-range values are clamped, not
    /// rejected: bots and replays are allowed to be sloppy here.
    pub fn set_simulation_parameters(&mut self, acceleration: f32, yaw: f32) {
        self.acceleration = clamp01(acceleration);
        self.yaw = yaw.clamp(-1.0, 1.0);
    }

    /// Teleport to a new linear-space state, discarding all inputs. No lerp.
    pub fn reset_simulation(&mut self, position: Vec3, velocity: Option<Vec3>) {
        self.yaw = 0.0;
        self.acceleration = 0.0;

        self.body.position = position;
        self.body.position.y = 0.0;
        self.body.velocity =
            velocity.unwrap_or(Vec3::Z * self.modifiers.calculated_base_speed());
        self.body.velocity.y = 0.0;

        self.speed.reset_linear(self.current_speed());
    }

    pub fn dispose(&mut self) {
        if self.state == ControllerState::Disposed {
            return;
        }
        self.state = ControllerState::Disposed;
        if let Some(zone) = self.acceleration_zone.as_mut() {
            zone.dispose();
        }
        if let Some(zone) = self.deceleration_zone.as_mut() {
            zone.dispose();
        }
        log::info!("Movement controller for '{}' disposed", self.pilot_name);
    }

    pub fn simulate(&mut self, dt: f32, track: &Track) {
        if self.state != ControllerState::Inited {
            return;
        }

        let mut velocity = self.body.velocity;
        let mut force = Vec3::ZERO;

        self.modifiers.reset();
        self.evaluate_acceleration_zone(dt, track);
        self.evaluate_deceleration_zone(dt, track);
        self.calculate_speed(&mut force);
        self.calculate_strafe(velocity, &mut force, track);
        self.calculate_bounds(&mut velocity, dt, track);

        self.body.velocity = velocity;
        self.body.apply_force(force, dt);
        self.body.integrate(dt);

        self.speed.set_speeds(
            self.modifiers.calculated_base_speed(),
            self.modifiers.calculated_max_speed(),
        );
        self.speed.push_linear(self.current_speed());

        if self.debug.log_tick_forces {
            log::trace!(
                "[{}] force ({:.3}, {:.3}) speed {:.3} strafe {:.3}",
                self.pilot_name,
                force.x,
                force.z,
                self.current_speed(),
                self.strafe()
            );
        }
    }

    /// Clamp the strafe position against a hard wall at ±`limit`, zeroing
    /// outward strafe velocity on contact. Applied by the owning service
    /// after integration; walls are level-scoped, not per-airplane.
    pub fn constrain_strafe(&mut self, limit: f32) {
        let offset = self.body.position.x;
        if offset.abs() <= limit {
            return;
        }
        let sign = offset.signum();
        self.body.position.x = limit * sign;
        if is_co_directed(self.body.velocity.x, sign) {
            self.body.velocity.x = 0.0;
        }
    }

    fn evaluate_acceleration_zone(&mut self, dt: f32, track: &Track) {
        let progress = track.progress_at(self.traveled_distance());
        let inside = track.acceleration_zone_at(progress);
        evaluate_zone(
            &mut self.acceleration_zone,
            ZoneKind::Acceleration,
            inside,
            dt,
            &mut self.modifiers,
            &self.pilot_name,
            self.debug,
        );
    }

    fn evaluate_deceleration_zone(&mut self, dt: f32, track: &Track) {
        let progress = track.progress_at(self.traveled_distance());
        let inside = track.deceleration_zone_at(progress);
        evaluate_zone(
            &mut self.deceleration_zone,
            ZoneKind::Deceleration,
            inside,
            dt,
            &mut self.modifiers,
            &self.pilot_name,
            self.debug,
        );
    }

    fn calculate_speed(&self, force: &mut Vec3) {
        let current_speed = self.current_speed();
        let current_speed_norm = self.modifiers.current_speed_norm(current_speed);
        let target_speed = self.modifiers.target_speed(self.acceleration);
        let sign = (target_speed - current_speed).signum();

        let max_acceleration =
            self.modifiers
                .acceleration(sign > 0.0, current_speed_norm, &self.config);
        let scalar_force = self
            .modifiers
            .scalar_force(max_acceleration, target_speed, current_speed);

        force.z += scalar_force * sign;
    }

    fn calculate_strafe(&self, velocity: Vec3, force: &mut Vec3, track: &Track) {
        let offset = self.body.position.x.abs();
        let position_sign = self.body.position.x.signum();

        let current_speed_norm = self.modifiers.current_speed_norm(velocity.z);
        let speed_curve = self.config.horizontal_speed_curve.evaluate(current_speed_norm);

        let current_strafe = velocity.x;
        let target_strafe = self.config.max_horizontal_speed * self.yaw * speed_curve;
        let strafe_diff_norm =
            (target_strafe - current_strafe).abs() / self.config.max_horizontal_speed;
        let strafe_sign = (target_strafe - current_strafe).signum();

        let max_force = self.config.horizontal_acceleration_force * speed_curve;
        let mut scalar_force = max_force * clamp01(strafe_diff_norm);

        // Outward-pointing strafe force fades inside the soft border band.
        if is_co_directed(strafe_sign, position_sign) {
            scalar_force *= 1.0 - soft_border_factor(track, offset);
        }

        force.x += scalar_force * strafe_sign;
    }

    fn calculate_bounds(&self, velocity: &mut Vec3, dt: f32, track: &Track) {
        let offset = self.body.position.x.abs();
        let sign = self.body.position.x.signum();

        // Outward strafe velocity is damped toward zero the deeper the
        // airplane sits in the soft border band.
        if is_co_directed(velocity.x, sign) {
            let factor = soft_border_factor(track, offset);
            let lerp_factor = factor * track.soft_border_lerp_factor() * dt;
            velocity.x = lerp(velocity.x, 0.0, lerp_factor);
        }
    }
}

/// Per-tick zone lifecycle shared by the acceleration and deceleration slots:
/// create the effect on entry, replace it when the region identity changes,
/// feed it the inside/outside sample, and release it once its influence is
/// fully lost so the same region can be entered again later.
fn evaluate_zone(
    slot: &mut Option<TrackZoneEffect>,
    kind: ZoneKind,
    inside: Option<&ZoneSpan>,
    dt: f32,
    modifiers: &mut MovementModifiers,
    pilot_name: &str,
    debug: DebugOptions,
) {
    if let Some(span) = inside {
        match slot {
            None => {
                if debug.log_zone_transitions {
                    log::debug!(
                        "[{pilot_name}] entered {} zone [{:.3}, {:.3}]",
                        kind.label(),
                        span.start,
                        span.end
                    );
                }
                *slot = Some(TrackZoneEffect::new(kind, span));
            }
            Some(zone) if !zone.is_same_zone(span) => {
                zone.dispose();
                if debug.log_zone_transitions {
                    log::debug!(
                        "[{pilot_name}] switched to {} zone [{:.3}, {:.3}]",
                        kind.label(),
                        span.start,
                        span.end
                    );
                }
                *slot = Some(TrackZoneEffect::new(kind, span));
            }
            Some(_) => {}
        }
    }

    if let Some(zone) = slot {
        zone.set_active(inside.is_some());
        zone.simulate(dt);
        zone.add_modifiers(modifiers);

        if zone.state() == ZoneState::Lost {
            if debug.log_zone_transitions {
                log::debug!("[{pilot_name}] {} zone effect lost", kind.label());
            }
            zone.dispose();
            *slot = None;
        }
    }
}

fn soft_border_factor(track: &Track, offset: f32) -> f32 {
    let half_width = track.half_width();
    let soft_border_min = half_width - track.soft_border_thickness();
    let norm = clamp01(inverse_lerp(soft_border_min, half_width, offset));
    ease_in_cubic(norm)
}

fn is_co_directed(a: f32, b: f32) -> bool {
    a * b > 0.0
}
