//! Race definition: which track, which airplanes, which pilots.
//!
//! The race file references the track, curve and airplane-config files by
//! path (relative paths resolve against the race file's directory) and lists
//! one entry per airplane. Everything is loaded and cross-validated up front;
//! a race that starts, starts with sound data.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use skt_physics::{
    load_phys_configs_from_path, AirplaneId, AirplanePhysicsService, BotConfig, DebugOptions,
    NoiseBotPilot, Pilot,
};
use skt_track::{load_track_from_path, Track};

use crate::replay::{load_replay_from_path, ReplayPilot};

#[derive(Debug, Deserialize, Clone)]
pub struct RaceFile {
    pub version: String,
    pub race_id: String,
    pub track: String,
    pub curves: String,
    pub configs: String,
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f64,
    pub duration_secs: f64,
    #[serde(default)]
    pub seed: u64,
    pub entries: Vec<RaceEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RaceEntry {
    pub name: String,
    pub airplane_type: String,
    pub pilot: PilotSpec,
    /// Starting lane offset in linear space (strafe axis).
    #[serde(default)]
    pub lane: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum PilotSpec {
    Bot {
        #[serde(default)]
        config: Option<BotConfig>,
    },
    Replay {
        path: String,
    },
}

const fn default_fixed_dt() -> f64 {
    1.0 / 60.0
}

pub fn load_race_from_path(path: &Path) -> Result<RaceFile, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let race: RaceFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse race JSON {}: {e}", path.display()))?;
    validate_race(&race)?;
    Ok(race)
}

fn validate_race(race: &RaceFile) -> Result<(), String> {
    if race.version != "0.1" {
        return Err(format!(
            "Race validation failed: unsupported version '{}'",
            race.version
        ));
    }
    if race.race_id.is_empty() {
        return Err("Race validation failed: race_id is empty".to_string());
    }
    if race.fixed_dt <= 0.0 {
        return Err("Race validation failed: fixed_dt must be > 0".to_string());
    }
    if race.duration_secs <= 0.0 {
        return Err("Race validation failed: duration_secs must be > 0".to_string());
    }
    if race.entries.is_empty() {
        return Err("Race validation failed: entries list is empty".to_string());
    }

    let mut names = HashSet::new();
    for entry in &race.entries {
        if entry.name.is_empty() {
            return Err("Race validation failed: entry with empty name".to_string());
        }
        if !names.insert(entry.name.clone()) {
            return Err(format!(
                "Race validation failed: duplicate entry name '{}'",
                entry.name
            ));
        }
    }
    Ok(())
}

/// A fully-built race: service, track, and the airplane roster in entry
/// order.
pub struct RaceSetup {
    pub race_id: String,
    pub fixed_dt: f64,
    pub duration_secs: f64,
    pub track: Track,
    pub service: AirplanePhysicsService,
    pub airplanes: Vec<(AirplaneId, String)>,
}

impl std::fmt::Debug for RaceSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceSetup")
            .field("race_id", &self.race_id)
            .field("fixed_dt", &self.fixed_dt)
            .field("duration_secs", &self.duration_secs)
            .field("track", &self.track)
            .field("airplanes", &self.airplanes)
            .finish_non_exhaustive()
    }
}

/// Resolve referenced files, build pilots and controllers, place every
/// airplane on its starting lane and raise the track walls.
pub fn build_race(race: &RaceFile, base_dir: &Path, debug: DebugOptions) -> Result<RaceSetup, String> {
    let track = load_track_from_path(&resolve(base_dir, &race.track))?;
    let curves = skt_core::curve::load_curves_from_path(&resolve(base_dir, &race.curves))?;
    let configs = load_phys_configs_from_path(&resolve(base_dir, &race.configs), &curves)?;

    let mut service = AirplanePhysicsService::new(debug);
    let mut airplanes = Vec::new();

    for (index, entry) in race.entries.iter().enumerate() {
        let config = configs.get(&entry.airplane_type).ok_or_else(|| {
            format!(
                "Race validation failed: entry '{}' references unknown airplane type '{}'",
                entry.name, entry.airplane_type
            )
        })?;
        if entry.lane.abs() >= track.half_width() {
            return Err(format!(
                "Race validation failed: entry '{}' lane {} is outside the track",
                entry.name, entry.lane
            ));
        }

        let pilot: Box<dyn Pilot> = match &entry.pilot {
            PilotSpec::Bot { config } => Box::new(NoiseBotPilot::new(
                index as u32,
                config.unwrap_or_default(),
                race.seed,
            )),
            PilotSpec::Replay { path } => {
                let sequence = load_replay_from_path(&resolve(base_dir, path))?;
                if (f64::from(sequence.fixed_dt) - race.fixed_dt).abs() > 1e-6 {
                    return Err(format!(
                        "Race validation failed: replay '{}' was recorded at dt {} but the race runs at {}",
                        path, sequence.fixed_dt, race.fixed_dt
                    ));
                }
                Box::new(ReplayPilot::new(&entry.name, &sequence))
            }
        };

        let id = service.create_airplane(&entry.name, Rc::new(config.clone()), pilot);
        service.reset_airplane(
            id,
            glam::Vec3::new(entry.lane, 0.0, 0.0),
            None,
            &track,
        );
        airplanes.push((id, entry.name.clone()));
    }

    service.create_walls(&track);

    Ok(RaceSetup {
        race_id: race.race_id.clone(),
        fixed_dt: race.fixed_dt,
        duration_secs: race.duration_secs,
        track,
        service,
        airplanes,
    })
}

fn resolve(base_dir: &Path, relative: &str) -> PathBuf {
    let path = Path::new(relative);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
