//! Airplane racing physics core.
//!
//! Single-threaded, deterministic, fixed-timestep. Each airplane is simulated
//! in two stages per tick: a linear-space movement controller (forward travel
//! × lateral strafe) integrates speed and strafe forces, then a track-space
//! projection controller maps that linear state onto the 3D track spline for
//! view, camera and audio consumers. The orchestration service runs all
//! airplanes through both stages in a fixed order.

pub mod body;
pub mod config;
pub mod diag;
pub mod modifiers;
pub mod movement;
pub mod pilot;
pub mod projection;
pub mod refs;
pub mod service;
pub mod zone;

pub use config::{load_phys_configs_from_path, PhysConfig};
pub use diag::DebugOptions;
pub use movement::MovementPhysicsController;
pub use pilot::{BotConfig, FixedPilot, NoiseBotPilot, Pilot, PilotControl};
pub use projection::TrackProjectionController;
pub use refs::{speed_reference, transform_reference, SpeedReader, TransformReader};
pub use service::{AirplaneId, AirplanePhysicsService};
