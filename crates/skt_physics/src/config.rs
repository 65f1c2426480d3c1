//! Per-airplane-type physics tunables.
//!
//! Configs are immutable for the lifetime of a race. Curve fields are
//! resolved from a named curve set at load time, so a missing curve reference
//! fails the load instead of surfacing mid-race.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use skt_core::curve::{Curve, CurveSet};

#[derive(Debug, Clone)]
pub struct PhysConfig {
    pub base_speed: f32,
    pub max_speed: f32,
    pub acceleration_force: f32,
    pub deceleration_force: f32,
    pub mass: f32,
    pub max_horizontal_speed: f32,
    pub horizontal_acceleration_force: f32,
    pub yaw_angle_deg: f32,
    pub roll_angle_deg: f32,
    pub yaw_lerp_speed: f32,
    pub roll_lerp_speed: f32,
    pub acceleration_curve: Curve,
    pub deceleration_curve: Curve,
    pub horizontal_speed_curve: Curve,
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct PhysConfigFileJson {
    version: String,
    config_set_id: String,
    airplanes: HashMap<String, PhysConfigEntryJson>,
}

#[derive(Debug, Deserialize)]
struct PhysConfigEntryJson {
    base_speed: f32,
    max_speed: f32,
    acceleration_force: f32,
    deceleration_force: f32,
    mass: f32,
    max_horizontal_speed: f32,
    horizontal_acceleration_force: f32,
    yaw_angle_deg: f32,
    roll_angle_deg: f32,
    yaw_lerp_speed: f32,
    roll_lerp_speed: f32,
    acceleration_curve: String,
    deceleration_curve: String,
    horizontal_speed_curve: String,
}

/// Load the airplane config file, resolving curve references from `curves`.
pub fn load_phys_configs_from_path(
    path: &Path,
    curves: &CurveSet,
) -> Result<HashMap<String, PhysConfig>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let json: PhysConfigFileJson = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;

    if json.version != "0.1" {
        return Err(format!(
            "Config validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.config_set_id.is_empty() {
        return Err("Config validation failed: config_set_id is empty".to_string());
    }
    if json.airplanes.is_empty() {
        return Err("Config validation failed: no airplane types defined".to_string());
    }

    let mut configs = HashMap::new();
    for (name, entry) in json.airplanes {
        let config = build_config(&name, entry, curves)?;
        configs.insert(name, config);
    }
    Ok(configs)
}

fn build_config(
    name: &str,
    entry: PhysConfigEntryJson,
    curves: &CurveSet,
) -> Result<PhysConfig, String> {
    if entry.base_speed <= 0.0 {
        return Err(format!(
            "Config validation failed: '{name}' base_speed must be > 0"
        ));
    }
    if entry.max_speed <= entry.base_speed {
        return Err(format!(
            "Config validation failed: '{name}' max_speed {} must exceed base_speed {}",
            entry.max_speed, entry.base_speed
        ));
    }
    if entry.acceleration_force <= 0.0 || entry.deceleration_force <= 0.0 {
        return Err(format!(
            "Config validation failed: '{name}' acceleration/deceleration forces must be > 0"
        ));
    }
    if entry.mass <= 0.0 {
        return Err(format!("Config validation failed: '{name}' mass must be > 0"));
    }
    if entry.max_horizontal_speed <= 0.0 || entry.horizontal_acceleration_force <= 0.0 {
        return Err(format!(
            "Config validation failed: '{name}' horizontal speed/force must be > 0"
        ));
    }
    if entry.yaw_lerp_speed <= 0.0 || entry.roll_lerp_speed <= 0.0 {
        return Err(format!(
            "Config validation failed: '{name}' yaw/roll lerp speeds must be > 0"
        ));
    }

    let resolve = |curve_name: &str| -> Result<Curve, String> {
        curves.get(curve_name).cloned().ok_or_else(|| {
            format!(
                "Config validation failed: '{name}' references missing curve '{curve_name}'"
            )
        })
    };

    Ok(PhysConfig {
        base_speed: entry.base_speed,
        max_speed: entry.max_speed,
        acceleration_force: entry.acceleration_force,
        deceleration_force: entry.deceleration_force,
        mass: entry.mass,
        max_horizontal_speed: entry.max_horizontal_speed,
        horizontal_acceleration_force: entry.horizontal_acceleration_force,
        yaw_angle_deg: entry.yaw_angle_deg,
        roll_angle_deg: entry.roll_angle_deg,
        yaw_lerp_speed: entry.yaw_lerp_speed,
        roll_lerp_speed: entry.roll_lerp_speed,
        acceleration_curve: resolve(&entry.acceleration_curve)?,
        deceleration_curve: resolve(&entry.deceleration_curve)?,
        horizontal_speed_curve: resolve(&entry.horizontal_speed_curve)?,
    })
}

#[cfg(test)]
pub(crate) fn test_config() -> PhysConfig {
    PhysConfig {
        base_speed: 10.0,
        max_speed: 30.0,
        acceleration_force: 40.0,
        deceleration_force: 30.0,
        mass: 1.0,
        max_horizontal_speed: 8.0,
        horizontal_acceleration_force: 24.0,
        yaw_angle_deg: 30.0,
        roll_angle_deg: 45.0,
        yaw_lerp_speed: 5.0,
        roll_lerp_speed: 5.0,
        acceleration_curve: Curve::constant(1.0),
        deceleration_curve: Curve::constant(1.0),
        horizontal_speed_curve: Curve::constant(1.0),
    }
}
