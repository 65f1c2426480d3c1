//! Named float keyframe curves with deterministic evaluation.
//!
//! Force scaling in the physics controllers is authored as curves over a
//! normalized speed axis (0 = base speed, 1 = max speed). Curves are cubic
//! Hermite between keyframes with per-key tangents, and clamp to the first /
//! last key value outside the keyed range, so evaluation is total and
//! side-effect free.
//!
//! The JSON format groups curves into named sets so one file can carry every
//! curve an airplane roster references.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CurveKey {
    pub t: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

#[derive(Debug, Clone)]
pub struct Curve {
    keys: Vec<CurveKey>,
}

impl Curve {
    /// Build a curve from keyframes. Keys must be non-empty, finite, and
    /// strictly increasing in `t`.
    pub fn from_keys(keys: Vec<CurveKey>) -> Result<Self, String> {
        if keys.is_empty() {
            return Err("Curve validation failed: key list is empty".to_string());
        }
        for key in &keys {
            if !key.t.is_finite()
                || !key.value.is_finite()
                || !key.in_tangent.is_finite()
                || !key.out_tangent.is_finite()
            {
                return Err(format!(
                    "Curve validation failed: non-finite number in key at t={}",
                    key.t
                ));
            }
        }
        for pair in keys.windows(2) {
            if pair[1].t <= pair[0].t {
                return Err(format!(
                    "Curve validation failed: key times must be strictly increasing ({} then {})",
                    pair[0].t, pair[1].t
                ));
            }
        }
        Ok(Self { keys })
    }

    /// A curve that evaluates to `value` everywhere.
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![CurveKey {
                t: 0.0,
                value,
                in_tangent: 0.0,
                out_tangent: 0.0,
            }],
        }
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys.first().expect("curve has at least one key");
        let last = self.keys.last().expect("curve has at least one key");
        if t <= first.t {
            return first.value;
        }
        if t >= last.t {
            return last.value;
        }

        // Find the bracketing pair; key lists are short, linear scan is fine.
        let mut right_index = 1;
        while self.keys[right_index].t < t {
            right_index += 1;
        }
        let k0 = &self.keys[right_index - 1];
        let k1 = &self.keys[right_index];

        let dt = k1.t - k0.t;
        let s = (t - k0.t) / dt;
        let s2 = s * s;
        let s3 = s2 * s;

        // Cubic Hermite with outgoing tangent of the left key and incoming
        // tangent of the right key, matching how the curves were authored.
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

/// A loaded, validated set of named curves.
#[derive(Debug, Clone)]
pub struct CurveSet {
    pub curve_set_id: String,
    curves: HashMap<String, Curve>,
}

impl CurveSet {
    pub fn get(&self, name: &str) -> Option<&Curve> {
        self.curves.get(name)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct CurveFileJson {
    version: String,
    curve_set_id: String,
    curves: HashMap<String, Vec<CurveKey>>,
}

/// Load a curve set definition file from disk.
pub fn load_curves_from_path(path: &Path) -> Result<CurveSet, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read curve file {}: {e}", path.display()))?;
    let json: CurveFileJson = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse curve JSON {}: {e}", path.display()))?;

    if json.version != "0.1" {
        return Err(format!(
            "Curve validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.curve_set_id.is_empty() {
        return Err("Curve validation failed: curve_set_id is empty".to_string());
    }
    if json.curves.is_empty() {
        return Err("Curve validation failed: curve set has no curves".to_string());
    }

    let mut curves = HashMap::new();
    for (name, keys) in json.curves {
        let curve = Curve::from_keys(keys)
            .map_err(|e| format!("Curve '{name}' in {}: {e}", path.display()))?;
        curves.insert(name, curve);
    }

    Ok(CurveSet {
        curve_set_id: json.curve_set_id,
        curves,
    })
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
            "skt_curve_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn key(t: f32, value: f32) -> CurveKey {
        CurveKey {
            t,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    #[test]
    fn constant_curve_evaluates_everywhere() {
        let curve = Curve::constant(0.75);
        assert_eq!(curve.evaluate(-1.0), 0.75);
        assert_eq!(curve.evaluate(0.5), 0.75);
        assert_eq!(curve.evaluate(10.0), 0.75);
    }

    #[test]
    fn evaluate_clamps_outside_keyed_range() {
        let curve = Curve::from_keys(vec![key(0.0, 1.0), key(1.0, 3.0)]).expect("valid keys");
        assert_eq!(curve.evaluate(-0.5), 1.0);
        assert_eq!(curve.evaluate(1.5), 3.0);
    }

    #[test]
    fn zero_tangent_hermite_passes_midpoint() {
        // With zero tangents the Hermite basis gives the smoothstep blend:
        // halfway between two keys lands exactly on the value midpoint.
        let curve = Curve::from_keys(vec![key(0.0, 0.0), key(1.0, 2.0)]).expect("valid keys");
        let mid = curve.evaluate(0.5);
        assert!((mid - 1.0).abs() < 1e-6, "midpoint was {mid}");
    }

    #[test]
    fn evaluate_hits_keyframes_exactly() {
        let curve =
            Curve::from_keys(vec![key(0.0, 1.0), key(0.4, 0.2), key(1.0, 0.8)]).expect("valid");
        assert!((curve.evaluate(0.0) - 1.0).abs() < 1e-6);
        assert!((curve.evaluate(0.4) - 0.2).abs() < 1e-6);
        assert!((curve.evaluate(1.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn tangents_shape_the_segment() {
        let flat = Curve::from_keys(vec![key(0.0, 0.0), key(1.0, 1.0)]).expect("valid");
        let steep = Curve::from_keys(vec![
            CurveKey {
                t: 0.0,
                value: 0.0,
                in_tangent: 0.0,
                out_tangent: 3.0,
            },
            key(1.0, 1.0),
        ])
        .expect("valid");
        assert!(steep.evaluate(0.25) > flat.evaluate(0.25));
    }

    #[test]
    fn rejects_empty_and_non_increasing_keys() {
        assert!(Curve::from_keys(vec![]).is_err());
        let err = Curve::from_keys(vec![key(0.5, 1.0), key(0.5, 2.0)]).expect_err("must fail");
        assert!(err.contains("strictly increasing"));
    }

    #[test]
    fn rejects_non_finite_keys() {
        let err =
            Curve::from_keys(vec![key(0.0, f32::NAN)]).expect_err("non-finite value must fail");
        assert!(err.contains("non-finite"));
    }

    #[test]
    fn load_curve_file_parses_valid_json() {
        let path = temp_file_path("valid");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "curve_set_id": "airplane-default",
              "curves": {
                "acceleration_default": [
                  { "t": 0.0, "value": 1.0 },
                  { "t": 1.0, "value": 0.3 }
                ],
                "horizontal_default": [
                  { "t": 0.0, "value": 0.5, "out_tangent": 1.0 },
                  { "t": 1.0, "value": 1.0 }
                ]
              }
            }"#,
        )
        .expect("write temp file");

        let set = load_curves_from_path(&path).expect("should parse");
        assert_eq!(set.curve_set_id, "airplane-default");
        assert_eq!(set.len(), 2);
        let accel = set.get("acceleration_default").expect("curve present");
        assert!((accel.evaluate(0.0) - 1.0).abs() < 1e-6);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_curve_file_rejects_bad_version() {
        let path = temp_file_path("bad_version");
        fs::write(
            &path,
            r#"{ "version": "9.9", "curve_set_id": "x", "curves": { "a": [{ "t": 0.0, "value": 1.0 }] } }"#,
        )
        .expect("write temp file");
        let err = load_curves_from_path(&path).expect_err("bad version should fail");
        assert!(err.contains("unsupported version"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_curve_file_rejects_bad_keys() {
        let path = temp_file_path("bad_keys");
        fs::write(
            &path,
            r#"{ "version": "0.1", "curve_set_id": "x", "curves": { "a": [] } }"#,
        )
        .expect("write temp file");
        let err = load_curves_from_path(&path).expect_err("empty keys should fail");
        assert!(err.contains("key list is empty"));
        let _ = fs::remove_file(path);
    }
}
