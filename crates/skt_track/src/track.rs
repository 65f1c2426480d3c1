//! Track definition: authored JSON, strict validation, runtime queries.
//!
//! Gameplay truth about the racing surface lives here, independent of any
//! visual representation. The movement controller works against the track's
//! scalar metadata (width, soft border, zone spans over normalized progress);
//! the projection controller reads the center spline. Validation is strict up
//! front so the per-tick query paths never have to defend against bad data.

use glam::Vec3;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::spline::Spline;

const SAMPLES_PER_SEGMENT: usize = 16;

#[derive(Debug, Deserialize, Clone)]
pub struct TrackFile {
    pub version: String,
    pub track_id: String,
    pub width: f32,
    pub soft_border_thickness: f32,
    pub soft_border_lerp_factor: f32,
    #[serde(default)]
    pub closed: bool,
    pub control_points: Vec<[f32; 3]>,
    #[serde(default)]
    pub acceleration_zones: Vec<ZoneSpan>,
    #[serde(default)]
    pub deceleration_zones: Vec<ZoneSpan>,
}

/// A track region that applies a zone effect while an airplane's progress is
/// inside `[start, end]`. The span itself is the zone's identity: two spans
/// with the same bounds are the same physical region.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ZoneSpan {
    pub start: f64,
    pub end: f64,
    pub enter_duration: f32,
    pub exit_duration: f32,
    #[serde(default)]
    pub base_speed_factor: f32,
    #[serde(default)]
    pub max_speed_factor: f32,
    #[serde(default)]
    pub acceleration_force_factor: f32,
    #[serde(default)]
    pub deceleration_force_factor: f32,
}

impl ZoneSpan {
    pub fn contains(&self, progress: f64) -> bool {
        progress >= self.start && progress <= self.end
    }

    /// Identity compare: same physical track region.
    pub fn same_span(&self, other: &ZoneSpan) -> bool {
        self.start == other.start && self.end == other.end
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    track_id: String,
    width: f32,
    soft_border_thickness: f32,
    soft_border_lerp_factor: f32,
    spline: Spline,
    acceleration_zones: Vec<ZoneSpan>,
    deceleration_zones: Vec<ZoneSpan>,
}

impl Track {
    pub fn from_file(file: TrackFile) -> Result<Self, String> {
        validate_track_file(&file)?;

        let points: Vec<Vec3> = file
            .control_points
            .iter()
            .map(|p| Vec3::from_array(*p))
            .collect();
        let spline = Spline::from_points(&points, file.closed, SAMPLES_PER_SEGMENT)
            .map_err(|e| format!("Track '{}': {e}", file.track_id))?;

        log::info!(
            "Track '{}' built: length {:.1}, width {:.1}, {} accel / {} decel zones",
            file.track_id,
            spline.length(),
            file.width,
            file.acceleration_zones.len(),
            file.deceleration_zones.len()
        );

        Ok(Self {
            track_id: file.track_id,
            width: file.width,
            soft_border_thickness: file.soft_border_thickness,
            soft_border_lerp_factor: file.soft_border_lerp_factor,
            spline,
            acceleration_zones: file.acceleration_zones,
            deceleration_zones: file.deceleration_zones,
        })
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn spline(&self) -> &Spline {
        &self.spline
    }

    pub fn length(&self) -> f32 {
        self.spline.length()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    pub fn soft_border_thickness(&self) -> f32 {
        self.soft_border_thickness
    }

    pub fn soft_border_lerp_factor(&self) -> f32 {
        self.soft_border_lerp_factor
    }

    /// Normalized progress for a traveled linear distance, clamped to [0, 1].
    pub fn progress_at(&self, distance: f32) -> f64 {
        (distance as f64 / self.length() as f64).clamp(0.0, 1.0)
    }

    pub fn acceleration_zone_at(&self, progress: f64) -> Option<&ZoneSpan> {
        self.acceleration_zones.iter().find(|z| z.contains(progress))
    }

    pub fn deceleration_zone_at(&self, progress: f64) -> Option<&ZoneSpan> {
        self.deceleration_zones.iter().find(|z| z.contains(progress))
    }
}

pub fn load_track_from_path(path: &Path) -> Result<Track, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read track file {}: {e}", path.display()))?;
    let file: TrackFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse track JSON {}: {e}", path.display()))?;
    Track::from_file(file)
}

fn validate_track_file(file: &TrackFile) -> Result<(), String> {
    if file.version != "0.1" {
        return Err(format!(
            "Track validation failed: unsupported version '{}'",
            file.version
        ));
    }
    if file.track_id.is_empty() {
        return Err("Track validation failed: track_id is empty".to_string());
    }
    if file.width <= 0.0 {
        return Err("Track validation failed: width must be > 0".to_string());
    }
    if file.soft_border_thickness <= 0.0 || file.soft_border_thickness >= file.width * 0.5 {
        return Err(format!(
            "Track validation failed: soft_border_thickness {} must be in (0, width/2)",
            file.soft_border_thickness
        ));
    }
    if file.soft_border_lerp_factor <= 0.0 {
        return Err("Track validation failed: soft_border_lerp_factor must be > 0".to_string());
    }
    if file.control_points.len() < 4 {
        return Err(format!(
            "Track validation failed: need at least 4 control points, got {}",
            file.control_points.len()
        ));
    }
    for point in &file.control_points {
        if point.iter().any(|c| !c.is_finite()) {
            return Err("Track validation failed: non-finite control point".to_string());
        }
    }
    validate_zones(&file.acceleration_zones, "acceleration")?;
    validate_zones(&file.deceleration_zones, "deceleration")?;
    Ok(())
}

fn validate_zones(zones: &[ZoneSpan], kind: &str) -> Result<(), String> {
    for zone in zones {
        if !(0.0..=1.0).contains(&zone.start) || !(0.0..=1.0).contains(&zone.end) {
            return Err(format!(
                "Track validation failed: {kind} zone span [{}, {}] outside [0, 1]",
                zone.start, zone.end
            ));
        }
        if zone.start >= zone.end {
            return Err(format!(
                "Track validation failed: {kind} zone start {} must precede end {}",
                zone.start, zone.end
            ));
        }
        if zone.enter_duration <= 0.0 || zone.exit_duration <= 0.0 {
            return Err(format!(
                "Track validation failed: {kind} zone [{}, {}] has non-positive lerp duration",
                zone.start, zone.end
            ));
        }
        let factors = [
            zone.base_speed_factor,
            zone.max_speed_factor,
            zone.acceleration_force_factor,
            zone.deceleration_force_factor,
        ];
        if factors.iter().any(|f| !f.is_finite()) {
            return Err(format!(
                "Track validation failed: {kind} zone [{}, {}] has non-finite factor",
                zone.start, zone.end
            ));
        }
    }

    // Overlapping spans of one kind would make the "which zone am I in"
    // query ambiguous; reject them at load time.
    let mut sorted: Vec<&ZoneSpan> = zones.iter().collect();
    sorted.sort_by(|a, b| a.start.partial_cmp(&b.start).expect("finite span bounds"));
    for pair in sorted.windows(2) {
        if pair[1].start <= pair[0].end {
            return Err(format!(
                "Track validation failed: {kind} zones [{}, {}] and [{}, {}] overlap",
                pair[0].start, pair[0].end, pair[1].start, pair[1].end
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "skt_track_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn base_file() -> TrackFile {
        TrackFile {
            version: "0.1".to_string(),
            track_id: "test".to_string(),
            width: 24.0,
            soft_border_thickness: 4.0,
            soft_border_lerp_factor: 6.0,
            closed: false,
            control_points: vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 100.0],
                [0.0, 0.0, 200.0],
                [0.0, 0.0, 300.0],
            ],
            acceleration_zones: vec![ZoneSpan {
                start: 0.2,
                end: 0.4,
                enter_duration: 0.5,
                exit_duration: 1.0,
                base_speed_factor: 0.5,
                max_speed_factor: 0.5,
                acceleration_force_factor: 0.25,
                deceleration_force_factor: 0.0,
            }],
            deceleration_zones: vec![],
        }
    }

    #[test]
    fn valid_file_builds_track() {
        let track = Track::from_file(base_file()).expect("valid track");
        assert_eq!(track.track_id(), "test");
        assert!((track.length() - 300.0).abs() < 1.0);
        assert_eq!(track.half_width(), 12.0);
    }

    #[test]
    fn progress_at_is_clamped_distance_over_length() {
        let track = Track::from_file(base_file()).expect("valid track");
        let mid = track.progress_at(track.length() * 0.5);
        assert!((mid - 0.5).abs() < 1e-6);
        assert_eq!(track.progress_at(-10.0), 0.0);
        assert_eq!(track.progress_at(track.length() * 2.0), 1.0);
    }

    #[test]
    fn zone_lookup_finds_containing_span_only() {
        let track = Track::from_file(base_file()).expect("valid track");
        assert!(track.acceleration_zone_at(0.3).is_some());
        assert!(track.acceleration_zone_at(0.5).is_none());
        assert!(track.deceleration_zone_at(0.3).is_none());
    }

    #[test]
    fn same_span_is_identity_not_equality_of_effects() {
        let a = base_file().acceleration_zones[0];
        let mut b = a;
        b.base_speed_factor = 99.0;
        assert!(a.same_span(&b));
        b.start = 0.21;
        assert!(!a.same_span(&b));
    }

    #[test]
    fn rejects_overlapping_zones() {
        let mut file = base_file();
        file.acceleration_zones.push(ZoneSpan {
            start: 0.3,
            end: 0.6,
            enter_duration: 0.5,
            exit_duration: 0.5,
            base_speed_factor: 0.0,
            max_speed_factor: 0.0,
            acceleration_force_factor: 0.0,
            deceleration_force_factor: 0.0,
        });
        let err = Track::from_file(file).expect_err("overlap must fail");
        assert!(err.contains("overlap"));
    }

    #[test]
    fn rejects_bad_soft_border() {
        let mut file = base_file();
        file.soft_border_thickness = 12.0; // equals half width
        let err = Track::from_file(file).expect_err("must fail");
        assert!(err.contains("soft_border_thickness"));
    }

    #[test]
    fn rejects_non_positive_zone_durations() {
        let mut file = base_file();
        file.acceleration_zones[0].enter_duration = 0.0;
        let err = Track::from_file(file).expect_err("must fail");
        assert!(err.contains("non-positive lerp duration"));
    }

    #[test]
    fn load_track_from_path_parses_valid_json() {
        let path = temp_file_path("valid");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "track_id": "flat-run",
              "width": 20.0,
              "soft_border_thickness": 3.0,
              "soft_border_lerp_factor": 5.0,
              "control_points": [
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 50.0],
                [0.0, 0.0, 100.0],
                [0.0, 0.0, 150.0]
              ],
              "acceleration_zones": [
                { "start": 0.1, "end": 0.2, "enter_duration": 0.4, "exit_duration": 0.8,
                  "base_speed_factor": 0.3 }
              ]
            }"#,
        )
        .expect("write temp file");

        let track = load_track_from_path(&path).expect("track should load");
        assert_eq!(track.track_id(), "flat-run");
        assert!(track.acceleration_zone_at(0.15).is_some());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_track_rejects_bad_version() {
        let path = temp_file_path("bad_version");
        fs::write(
            &path,
            r#"{
              "version": "3.0", "track_id": "x", "width": 20.0,
              "soft_border_thickness": 3.0, "soft_border_lerp_factor": 5.0,
              "control_points": [[0,0,0],[0,0,1],[0,0,2],[0,0,3]]
            }"#,
        )
        .expect("write temp file");
        let err = load_track_from_path(&path).expect_err("bad version should fail");
        assert!(err.contains("unsupported version"));
        let _ = fs::remove_file(path);
    }
}
