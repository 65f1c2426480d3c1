//! SkyTrack headless race runner.
//!
//! Loads a race definition, builds the physics services, and drives them
//! with the fixed-timestep tick driver until the configured duration has
//! been simulated:
//!
//!   1. load + cross-validate race, track, curve and config files
//!   2. build pilots and per-airplane controllers, raise the track walls
//!   3. `feed()` / `begin_frame()` the accumulator, `while should_step()`
//!      run the two-phase physics tick
//!   4. log standings once per simulated second, then print the final
//!      standings and a SHA-256 digest of the end state
//!
//! By default the run is as-fast-as-possible; `--realtime` paces the
//! accumulator with the wall clock instead, which is how a live session
//! host would drive the same loop. The end-state digest is the determinism
//! contract: same race file, same seed, same digest.

mod race;
mod replay;

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use race::{build_race, load_race_from_path, RaceSetup};
use skt_core::time::TickDriver;
use skt_physics::DebugOptions;

fn usage() -> String {
    "Usage: cargo run -p skt_race -- <race.json> [--realtime] [--debug-physics]".to_string()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }
    let race_path = PathBuf::from(&args[1]);
    let realtime = args.iter().any(|a| a == "--realtime");
    let debug = if args.iter().any(|a| a == "--debug-physics") {
        DebugOptions::verbose()
    } else {
        DebugOptions::default()
    };

    let race = load_race_from_path(&race_path)?;
    let base_dir = race_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut setup = build_race(&race, &base_dir, debug)?;

    log::info!(
        "Race '{}' starting: {} airplanes on '{}' for {:.0}s at {:.4}s/tick",
        setup.race_id,
        setup.airplanes.len(),
        setup.track.track_id(),
        setup.duration_secs,
        setup.fixed_dt
    );

    run_race(&mut setup, realtime);

    log::info!("Final standings:");
    for (rank, line) in standings(&setup).iter().enumerate() {
        log::info!("  {}. {line}", rank + 1);
    }
    println!("state digest: {}", state_digest(&setup));

    setup.service.destroy_walls();
    setup.service.dispose();
    Ok(())
}

fn run_race(setup: &mut RaceSetup, realtime: bool) {
    let mut driver = TickDriver::new(setup.fixed_dt);
    let total_ticks = (setup.duration_secs / setup.fixed_dt).round() as u64;
    let ticks_per_second = (1.0 / setup.fixed_dt).round() as u64;
    let dt = setup.fixed_dt as f32;

    let track_length = setup.track.length();
    let mut finish_times: Vec<Option<f64>> = vec![None; setup.airplanes.len()];

    while driver.tick_count < total_ticks {
        if realtime {
            driver.begin_frame();
            std::thread::sleep(std::time::Duration::from_millis(1));
        } else {
            // Headless: feed the accumulator in full-cap slices.
            driver.feed(driver.max_accumulator);
        }

        while driver.tick_count < total_ticks && driver.should_step() {
            setup.service.tick(dt, &setup.track);

            for (index, (id, name)) in setup.airplanes.iter().enumerate() {
                if finish_times[index].is_some() {
                    continue;
                }
                let travel = setup.service.traveled_distance(*id).unwrap_or(0.0);
                if travel >= track_length {
                    finish_times[index] = Some(driver.total_time);
                    log::info!("'{}' finished at {:.2}s", name, driver.total_time);
                }
            }

            if driver.tick_count % ticks_per_second == 0 {
                log::info!("t={:>4.0}s", driver.total_time);
                for line in standings(setup) {
                    log::info!("    {line}");
                }
            }
        }
        driver.end_frame();
    }
}

/// Standings lines, leader first, by distance traveled.
fn standings(setup: &RaceSetup) -> Vec<String> {
    let mut rows: Vec<(f32, String)> = setup
        .airplanes
        .iter()
        .map(|(id, name)| {
            let travel = setup.service.traveled_distance(*id).unwrap_or(0.0);
            let speed = setup
                .service
                .speed_of(*id)
                .map(|reader| reader.linear_speed())
                .unwrap_or(0.0);
            let progress = setup.track.progress_at(travel);
            (
                travel,
                format!("{name:<12} progress {progress:>5.1}% travel {travel:>8.1} speed {speed:>5.1}",
                    progress = progress * 100.0),
            )
        })
        .collect();
    rows.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    rows.into_iter().map(|(_, line)| line).collect()
}

/// SHA-256 over the canonical end-of-run state of every airplane, in entry
/// order with fixed formatting. Identical runs hash identically.
fn state_digest(setup: &RaceSetup) -> String {
    let mut hasher = Sha256::new();
    for (id, name) in &setup.airplanes {
        let travel = setup.service.traveled_distance(*id).unwrap_or(0.0);
        let strafe = setup.service.strafe(*id).unwrap_or(0.0);
        let velocity = setup.service.velocity(*id).unwrap_or_default();
        let (position, rotation) = setup
            .service
            .transform_of(*id)
            .map(|reader| (reader.position(), reader.rotation()))
            .unwrap_or_default();

        hasher.update(format!(
            "{name};{travel:.6};{strafe:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6}\n",
            velocity.x,
            velocity.z,
            position.x,
            position.y,
            position.z,
            rotation.x,
            rotation.y,
            rotation.z,
            rotation.w,
        ));
    }
    let hash = hasher.finalize();
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "skt_race_main_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_assets(dir: &Path) {
        fs::write(
            dir.join("track.json"),
            r#"{
              "version": "0.1",
              "track_id": "sprint",
              "width": 24.0,
              "soft_border_thickness": 4.0,
              "soft_border_lerp_factor": 6.0,
              "control_points": [
                [0.0, 0.0, 0.0], [0.0, 0.0, 100.0], [0.0, 0.0, 200.0], [0.0, 0.0, 300.0]
              ]
            }"#,
        )
        .expect("write track");
        fs::write(
            dir.join("curves.json"),
            r#"{
              "version": "0.1",
              "curve_set_id": "sprint-curves",
              "curves": {
                "accel": [{ "t": 0.0, "value": 1.0 }, { "t": 1.0, "value": 0.4 }],
                "decel": [{ "t": 0.0, "value": 0.4 }, { "t": 1.0, "value": 1.0 }],
                "horiz": [{ "t": 0.0, "value": 0.6 }, { "t": 1.0, "value": 1.0 }]
              }
            }"#,
        )
        .expect("write curves");
        fs::write(
            dir.join("configs.json"),
            r#"{
              "version": "0.1",
              "config_set_id": "sprint-configs",
              "airplanes": {
                "standard": {
                  "base_speed": 10.0, "max_speed": 30.0,
                  "acceleration_force": 40.0, "deceleration_force": 30.0,
                  "mass": 1.0,
                  "max_horizontal_speed": 8.0, "horizontal_acceleration_force": 24.0,
                  "yaw_angle_deg": 30.0, "roll_angle_deg": 45.0,
                  "yaw_lerp_speed": 5.0, "roll_lerp_speed": 5.0,
                  "acceleration_curve": "accel",
                  "deceleration_curve": "decel",
                  "horizontal_speed_curve": "horiz"
                }
              }
            }"#,
        )
        .expect("write configs");
        fs::write(
            dir.join("race.json"),
            r#"{
              "version": "0.1",
              "race_id": "sprint-race",
              "track": "track.json",
              "curves": "curves.json",
              "configs": "configs.json",
              "duration_secs": 20.0,
              "seed": 7,
              "entries": [
                { "name": "Alpha", "airplane_type": "standard", "lane": -4.0,
                  "pilot": { "kind": "bot" } },
                { "name": "Bravo", "airplane_type": "standard", "lane": 4.0,
                  "pilot": { "kind": "bot" } }
              ]
            }"#,
        )
        .expect("write race");
    }

    fn run_once(dir: &Path) -> (String, Vec<f32>) {
        let race = load_race_from_path(&dir.join("race.json")).expect("race loads");
        let mut setup =
            build_race(&race, dir, DebugOptions::default()).expect("race builds");
        run_race(&mut setup, false);
        let travels = setup
            .airplanes
            .iter()
            .map(|(id, _)| setup.service.traveled_distance(*id).expect("alive"))
            .collect();
        (state_digest(&setup), travels)
    }

    #[test]
    fn full_race_runs_to_completion() {
        let dir = temp_dir("complete");
        write_assets(&dir);
        let (_digest, travels) = run_once(&dir);
        // 20 s at ≥ base speed 10 clears the 300-long sprint track.
        for travel in travels {
            assert!(travel >= 200.0, "airplane should cover ground, got {travel}");
        }
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn identical_runs_produce_identical_digests() {
        let dir = temp_dir("digest");
        write_assets(&dir);
        let (digest_a, travels_a) = run_once(&dir);
        let (digest_b, travels_b) = run_once(&dir);
        assert_eq!(digest_a, digest_b);
        assert_eq!(travels_a, travels_b);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn standings_rank_by_distance() {
        let dir = temp_dir("standings");
        write_assets(&dir);
        let race = load_race_from_path(&dir.join("race.json")).expect("race loads");
        let mut setup =
            build_race(&race, &dir, DebugOptions::default()).expect("race builds");
        // Push one airplane ahead by hand.
        let (leader, _) = setup.airplanes[1];
        setup.service.reset_airplane(
            leader,
            glam::Vec3::new(0.0, 0.0, 150.0),
            None,
            &setup.track,
        );
        let lines = standings(&setup);
        assert!(lines[0].starts_with("Bravo"));
        let _ = fs::remove_dir_all(dir);
    }
}
