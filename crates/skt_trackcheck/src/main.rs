//! Track file validator.
//!
//! Loads a track JSON through the same loader the runtime uses, prints the
//! derived geometry statistics, and emits a stable digest over the sampled
//! geometry. The digest lets authors confirm that an edit that was meant to
//! be cosmetic (reformatting, reordering keys) left the actual racing
//! surface untouched.

use sha2::{Digest, Sha256};
use std::path::PathBuf;

use skt_track::{load_track_from_path, Track};

fn usage() -> String {
    "Usage: cargo run -p skt_trackcheck -- <track.json>".to_string()
}

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        return Err(usage());
    }

    let path = PathBuf::from(&args[1]);
    let track = load_track_from_path(&path)?;

    let spline = track.spline();
    println!("track_id:            {}", track.track_id());
    println!("length:              {:.2}", track.length());
    println!("width:               {:.2}", track.width());
    println!("soft border:         {:.2}", track.soft_border_thickness());
    println!("spline samples:      {}", spline.sample_count());
    println!(
        "accel zone coverage: {:.1}%",
        zone_coverage(&track, true) * 100.0
    );
    println!(
        "decel zone coverage: {:.1}%",
        zone_coverage(&track, false) * 100.0
    );
    println!("geometry digest:     {}", geometry_digest(&track));
    Ok(())
}

/// Fraction of the track's progress axis covered by zones of one kind,
/// measured over a fine progress grid.
fn zone_coverage(track: &Track, acceleration: bool) -> f64 {
    const STEPS: usize = 1000;
    let mut covered = 0usize;
    for i in 0..=STEPS {
        let progress = i as f64 / STEPS as f64;
        let inside = if acceleration {
            track.acceleration_zone_at(progress).is_some()
        } else {
            track.deceleration_zone_at(progress).is_some()
        };
        if inside {
            covered += 1;
        }
    }
    covered as f64 / (STEPS + 1) as f64
}

/// SHA-256 over the canonicalized sampled geometry: id, scalar metadata, and
/// every spline sample position/frame with fixed formatting. Insensitive to
/// JSON formatting, sensitive to any geometric change.
fn geometry_digest(track: &Track) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{};{:.6};{:.6};{:.6}\n",
        track.track_id(),
        track.width(),
        track.soft_border_thickness(),
        track.soft_border_lerp_factor()
    ));
    let spline = track.spline();
    for index in 0..spline.sample_count() {
        let sample = spline.sample(index);
        hasher.update(format!(
            "{:.5};{:.5};{:.5};{:.5};{:.5};{:.5}\n",
            sample.position.x,
            sample.position.y,
            sample.position.z,
            sample.forward.x,
            sample.forward.y,
            sample.forward.z,
        ));
    }
    let hash = hasher.finalize();
    hash.iter().map(|b| format!("{b:02x}")).collect()
}
