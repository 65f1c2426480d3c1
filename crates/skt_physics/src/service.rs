//! Per-tick orchestration across all active airplanes.
//!
//! Two sub-services own the controllers, movement first and projection
//! second, because projection consumes the *current* tick's movement output. The
//! combined service owns the pilots and drives the fixed two-phase order
//! every tick. Controller construction and destruction happen strictly
//! outside the tick; the `&mut self` tick methods make mid-iteration
//! mutation of the controller sets unrepresentable.
//!
//! Track boundary walls are level-scoped entities owned by the movement
//! service: created on level start, destroyed on teardown, applied to every
//! airplane after its movement step.

use std::rc::Rc;

use glam::Vec3;

use skt_track::Track;

use crate::config::PhysConfig;
use crate::diag::DebugOptions;
use crate::movement::{ControllerState, MovementPhysicsController};
use crate::pilot::Pilot;
use crate::projection::TrackProjectionController;
use crate::refs::{
    speed_reference, transform_reference, SpeedReader, TransformReader,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovementControllerId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectionControllerId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AirplaneId(u32);

/// A static track boundary wall. Geometry mirrors how the walls are laid
/// out around the linear track volume; the strafe limit the simulation
/// enforces is the wall's inner face.
#[derive(Debug, Clone, Copy)]
pub struct Wall {
    pub center: Vec3,
    pub size: Vec3,
}

impl Wall {
    /// Lateral coordinate of the face pointing at the track center.
    fn inner_face(&self) -> f32 {
        self.center.x.abs() - self.size.x * 0.5
    }
}

/// Linear-space simulation service: accelerates airplanes, limits lateral
/// movement against the track walls.
pub struct MovementPhysicsService {
    controllers: Vec<(MovementControllerId, MovementPhysicsController)>,
    walls: Vec<Wall>,
    next_id: u32,
    debug: DebugOptions,
}

impl MovementPhysicsService {
    pub fn new(debug: DebugOptions) -> Self {
        Self {
            controllers: Vec::new(),
            walls: Vec::new(),
            next_id: 0,
            debug,
        }
    }

    pub fn create_controller(
        &mut self,
        config: Rc<PhysConfig>,
        pilot_name: &str,
    ) -> (MovementControllerId, SpeedReader) {
        let (writer, reader) = speed_reference(config.base_speed);
        let controller =
            MovementPhysicsController::new(config, writer, pilot_name, self.debug);
        let id = MovementControllerId(self.next_id);
        self.next_id += 1;
        self.controllers.push((id, controller));
        log::info!("Movement controller created for '{pilot_name}'");
        (id, reader)
    }

    pub fn destroy_controller(&mut self, id: MovementControllerId) {
        if let Some(index) = self.controllers.iter().position(|(cid, _)| *cid == id) {
            let (_, mut controller) = self.controllers.remove(index);
            controller.dispose();
        }
    }

    pub fn controller(&self, id: MovementControllerId) -> Option<&MovementPhysicsController> {
        self.controllers
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c)
    }

    pub fn controller_mut(
        &mut self,
        id: MovementControllerId,
    ) -> Option<&mut MovementPhysicsController> {
        self.controllers
            .iter_mut()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c)
    }

    pub fn simulate(&mut self, dt: f32, track: &Track) {
        let strafe_limit = self
            .walls
            .iter()
            .map(Wall::inner_face)
            .fold(f32::INFINITY, f32::min);

        for (_, controller) in &mut self.controllers {
            controller.simulate(dt, track);
            if strafe_limit.is_finite() {
                controller.constrain_strafe(strafe_limit);
            }
        }
    }

    /// Build the two boundary walls for the loaded track. Level start only.
    pub fn create_walls(&mut self, track: &Track) {
        let width = track.width();
        let length = track.length();

        let half_length = length * 0.5;
        let wall_length = length * 1.2;
        let size = Vec3::new(width, width, wall_length);

        self.walls.push(Wall {
            center: Vec3::new(-width, 0.0, half_length),
            size,
        });
        self.walls.push(Wall {
            center: Vec3::new(width, 0.0, half_length),
            size,
        });
        log::info!(
            "Track walls created at ±{width:.1} (strafe limit {:.1})",
            self.walls[0].inner_face()
        );
    }

    pub fn destroy_walls(&mut self) {
        self.walls.clear();
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn dispose(&mut self) {
        for (_, controller) in &mut self.controllers {
            controller.dispose();
        }
        self.controllers.clear();
        self.walls.clear();
    }
}

/// Track-space simulation service: projects airplanes onto the spline and
/// carries their trigger bookkeeping.
pub struct TrackProjectionService {
    controllers: Vec<(ProjectionControllerId, TrackProjectionController)>,
    next_id: u32,
    debug: DebugOptions,
}

impl TrackProjectionService {
    pub fn new(debug: DebugOptions) -> Self {
        Self {
            controllers: Vec::new(),
            next_id: 0,
            debug,
        }
    }

    pub fn create_controller(
        &mut self,
        config: Rc<PhysConfig>,
        pilot_name: &str,
    ) -> (ProjectionControllerId, TransformReader) {
        let (writer, reader) = transform_reference();
        let controller =
            TrackProjectionController::new(config, writer, pilot_name, self.debug);
        let id = ProjectionControllerId(self.next_id);
        self.next_id += 1;
        self.controllers.push((id, controller));
        log::info!("Projection controller created for '{pilot_name}'");
        (id, reader)
    }

    pub fn destroy_controller(&mut self, id: ProjectionControllerId) {
        if let Some(index) = self.controllers.iter().position(|(cid, _)| *cid == id) {
            let (_, mut controller) = self.controllers.remove(index);
            controller.dispose();
        }
    }

    pub fn controller(&self, id: ProjectionControllerId) -> Option<&TrackProjectionController> {
        self.controllers
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c)
    }

    pub fn controller_mut(
        &mut self,
        id: ProjectionControllerId,
    ) -> Option<&mut TrackProjectionController> {
        self.controllers
            .iter_mut()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c)
    }

    pub fn simulate(&mut self, dt: f32, track: &Track) {
        for (_, controller) in &mut self.controllers {
            controller.simulate(dt, track);
        }
    }

    pub fn dispose(&mut self) {
        for (_, controller) in &mut self.controllers {
            controller.dispose();
        }
        self.controllers.clear();
    }
}

struct AirplaneEntry {
    id: AirplaneId,
    name: String,
    pilot: Box<dyn Pilot>,
    movement: MovementControllerId,
    projection: ProjectionControllerId,
    speed: SpeedReader,
    transform: TransformReader,
}

/// The combined per-race physics service: one entry per airplane, one fixed
/// two-phase tick.
pub struct AirplanePhysicsService {
    movement: MovementPhysicsService,
    projection: TrackProjectionService,
    airplanes: Vec<AirplaneEntry>,
    next_id: u32,
}

impl AirplanePhysicsService {
    pub fn new(debug: DebugOptions) -> Self {
        Self {
            movement: MovementPhysicsService::new(debug),
            projection: TrackProjectionService::new(debug),
            airplanes: Vec::new(),
            next_id: 0,
        }
    }

    pub fn create_airplane(
        &mut self,
        name: &str,
        config: Rc<PhysConfig>,
        pilot: Box<dyn Pilot>,
    ) -> AirplaneId {
        let (movement, speed) = self.movement.create_controller(config.clone(), name);
        let (projection, transform) = self.projection.create_controller(config, name);

        let id = AirplaneId(self.next_id);
        self.next_id += 1;
        self.airplanes.push(AirplaneEntry {
            id,
            name: name.to_string(),
            pilot,
            movement,
            projection,
            speed,
            transform,
        });
        id
    }

    pub fn destroy_airplane(&mut self, id: AirplaneId) {
        if let Some(index) = self.airplanes.iter().position(|entry| entry.id == id) {
            let entry = self.airplanes.remove(index);
            self.movement.destroy_controller(entry.movement);
            self.projection.destroy_controller(entry.projection);
            log::info!("Airplane '{}' destroyed", entry.name);
        }
    }

    /// Teleport an airplane to a linear-space state and re-pose it on the
    /// track immediately. Velocity defaults to base speed forward.
    pub fn reset_airplane(
        &mut self,
        id: AirplaneId,
        position: Vec3,
        velocity: Option<Vec3>,
        track: &Track,
    ) {
        let Some(index) = self.airplanes.iter().position(|entry| entry.id == id) else {
            return;
        };
        let (movement_id, projection_id) = {
            let entry = &self.airplanes[index];
            (entry.movement, entry.projection)
        };

        let Some(movement) = self.movement.controller_mut(movement_id) else {
            return;
        };
        movement.reset_simulation(position, velocity);
        let (movement_position, movement_velocity) = (movement.position(), movement.velocity());

        if let Some(projection) = self.projection.controller_mut(projection_id) {
            projection.reset_simulation(movement_position, movement_velocity, track);
        }
    }

    /// One fixed tick over every airplane, in the fixed two-phase order:
    /// pilot controls feed movement, movement output feeds projection.
    pub fn tick(&mut self, dt: f32, track: &Track) {
        for entry in &mut self.airplanes {
            let control = entry.pilot.control(dt);
            if let Some(movement) = self.movement.controller_mut(entry.movement) {
                movement.set_simulation_parameters(control.acceleration, control.yaw);
            }
        }

        self.movement.simulate(dt, track);

        for entry in &self.airplanes {
            let Some(movement) = self.movement.controller(entry.movement) else {
                continue;
            };
            let (position, velocity) = (movement.position(), movement.velocity());
            if let Some(projection) = self.projection.controller_mut(entry.projection) {
                projection.set_simulation_parameters(position, velocity);
            }
        }

        self.projection.simulate(dt, track);
    }

    pub fn create_walls(&mut self, track: &Track) {
        self.movement.create_walls(track);
    }

    pub fn destroy_walls(&mut self) {
        self.movement.destroy_walls();
    }

    pub fn airplane_ids(&self) -> Vec<AirplaneId> {
        self.airplanes.iter().map(|entry| entry.id).collect()
    }

    pub fn airplane_name(&self, id: AirplaneId) -> Option<&str> {
        self.airplanes
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.as_str())
    }

    pub fn speed_of(&self, id: AirplaneId) -> Option<SpeedReader> {
        self.airplanes
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.speed.clone())
    }

    pub fn transform_of(&self, id: AirplaneId) -> Option<TransformReader> {
        self.airplanes
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.transform.clone())
    }

    pub fn traveled_distance(&self, id: AirplaneId) -> Option<f32> {
        let entry = self.airplanes.iter().find(|entry| entry.id == id)?;
        self.movement
            .controller(entry.movement)
            .map(|c| c.traveled_distance())
    }

    pub fn strafe(&self, id: AirplaneId) -> Option<f32> {
        let entry = self.airplanes.iter().find(|entry| entry.id == id)?;
        self.movement.controller(entry.movement).map(|c| c.strafe())
    }

    pub fn velocity(&self, id: AirplaneId) -> Option<Vec3> {
        let entry = self.airplanes.iter().find(|entry| entry.id == id)?;
        self.movement.controller(entry.movement).map(|c| c.velocity())
    }

    pub fn is_disposed(&self, id: AirplaneId) -> bool {
        let Some(entry) = self.airplanes.iter().find(|entry| entry.id == id) else {
            return true;
        };
        self.movement
            .controller(entry.movement)
            .is_none_or(|c| c.state() == ControllerState::Disposed)
    }

    pub fn dispose(&mut self) {
        self.movement.dispose();
        self.projection.dispose();
        self.airplanes.clear();
    }
}
