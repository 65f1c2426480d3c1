use serde::Deserialize;
use std::fs;
use std::path::Path;

use skt_physics::{Pilot, PilotControl};

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub acceleration: f32,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_controls(&self) -> Vec<PilotControl> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(PilotControl {
                    acceleration: frame.acceleration.clamp(0.0, 1.0),
                    yaw: frame.yaw.clamp(-1.0, 1.0),
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

/// Plays an expanded control sequence, one control per tick.
pub struct ReplayPilot {
    name: String,
    controls: Vec<PilotControl>,
    cursor: usize,
}

impl ReplayPilot {
    pub fn new(name: &str, sequence: &ReplaySequence) -> Self {
        Self {
            name: name.to_string(),
            controls: sequence.expanded_controls(),
            cursor: 0,
        }
    }
}

impl Pilot for ReplayPilot {
    fn name(&self) -> &str {
        &self.name
    }

    fn control(&mut self, _dt: f32) -> PilotControl {
        let control = self
            .controls
            .get(self.cursor)
            .or_else(|| self.controls.last())
            .copied()
            .unwrap_or_default();
        if self.cursor < self.controls.len() {
            self.cursor += 1;
        }
        control
    }
}
