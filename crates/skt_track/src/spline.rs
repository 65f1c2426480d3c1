//! Track center spline: Catmull-Rom through authored control points,
//! resampled into a fixed collection of oriented samples.
//!
//! The simulation never walks the raw polynomial. It reads the precomputed
//! sample collection through `evaluate` / `sampling_values`, which keeps
//! projection cost flat per tick and makes direction sampling (neighbouring
//! sample positions) cheap and deterministic.

use glam::Vec3;

/// One oriented point on the spline. The frame is orthonormal:
/// `right = up × forward`, `up = forward × right`.
#[derive(Debug, Clone, Copy)]
pub struct SplineSample {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
}

#[derive(Debug, Clone)]
pub struct Spline {
    samples: Vec<SplineSample>,
    length: f32,
}

impl Spline {
    /// Build a spline through `points`. `closed` wraps the tangents around the
    /// loop; open splines clamp end tangents to the end segments.
    pub fn from_points(
        points: &[Vec3],
        closed: bool,
        samples_per_segment: usize,
    ) -> Result<Self, String> {
        if points.len() < 4 {
            return Err(format!(
                "Spline validation failed: need at least 4 control points, got {}",
                points.len()
            ));
        }
        if samples_per_segment == 0 {
            return Err("Spline validation failed: samples_per_segment must be > 0".to_string());
        }

        let segment_count = if closed {
            points.len()
        } else {
            points.len() - 1
        };

        let mut samples = Vec::with_capacity(segment_count * samples_per_segment + 1);
        for segment in 0..segment_count {
            let (p0, p1, p2, p3) = segment_points(points, segment, closed);
            for i in 0..samples_per_segment {
                let t = i as f32 / samples_per_segment as f32;
                samples.push(oriented_sample(p0, p1, p2, p3, t));
            }
        }
        // Terminal sample so percent 1.0 lands exactly on the last point.
        let (p0, p1, p2, p3) = segment_points(points, segment_count - 1, closed);
        samples.push(oriented_sample(p0, p1, p2, p3, 1.0));

        let mut length = 0.0;
        for pair in samples.windows(2) {
            length += pair[0].position.distance(pair[1].position);
        }
        if length <= 0.0 {
            return Err("Spline validation failed: control points are degenerate".to_string());
        }

        Ok(Self { samples, length })
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Total chord length over the sample collection.
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn sample(&self, index: usize) -> &SplineSample {
        &self.samples[index]
    }

    /// Map a normalized percent to the sample index at or below it plus the
    /// fractional distance toward the next sample. Percent 1.0 maps to the
    /// terminal sample with zero fraction.
    pub fn sampling_values(&self, percent: f64) -> (usize, f32) {
        let percent = percent.clamp(0.0, 1.0);
        let scaled = percent * (self.samples.len() - 1) as f64;
        let index = scaled.floor() as usize;
        let fraction = (scaled - index as f64) as f32;
        (index, fraction)
    }

    /// Normalized percent of a sample index.
    pub fn percent_at_index(&self, index: usize) -> f64 {
        let index = index.min(self.samples.len() - 1);
        index as f64 / (self.samples.len() - 1) as f64
    }

    /// Interpolated oriented sample at a normalized percent (clamped).
    pub fn evaluate(&self, percent: f64) -> SplineSample {
        let (mut index, mut fraction) = self.sampling_values(percent);
        if index >= self.samples.len() - 1 {
            index = self.samples.len() - 2;
            fraction = 1.0;
        }
        let a = &self.samples[index];
        let b = &self.samples[index + 1];

        let forward = a.forward.lerp(b.forward, fraction).normalize_or_zero();
        let up_hint = a.up.lerp(b.up, fraction).normalize_or_zero();
        let (up, right) = orthonormal_frame(forward, up_hint);

        SplineSample {
            position: a.position.lerp(b.position, fraction),
            forward,
            up,
            right,
        }
    }
}

fn segment_points(points: &[Vec3], segment: usize, closed: bool) -> (Vec3, Vec3, Vec3, Vec3) {
    let n = points.len();
    let at = |i: isize| -> Vec3 {
        if closed {
            points[i.rem_euclid(n as isize) as usize]
        } else {
            points[i.clamp(0, n as isize - 1) as usize]
        }
    };
    let s = segment as isize;
    (at(s - 1), at(s), at(s + 1), at(s + 2))
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - 3.0 * p2 + p0 - p3) * t3)
}

fn catmull_rom_tangent(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    0.5 * ((p2 - p0)
        + 2.0 * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t
        + 3.0 * (3.0 * p1 - 3.0 * p2 + p0 - p3) * t2)
}

fn oriented_sample(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> SplineSample {
    let position = catmull_rom(p0, p1, p2, p3, t);
    let mut forward = catmull_rom_tangent(p0, p1, p2, p3, t).normalize_or_zero();
    if forward == Vec3::ZERO {
        // Degenerate tangent (coincident control points): fall back to the
        // chord so the frame stays well defined.
        forward = (p2 - p1).normalize_or(Vec3::Z);
    }
    let (up, right) = orthonormal_frame(forward, Vec3::Y);
    SplineSample {
        position,
        forward,
        up,
        right,
    }
}

fn orthonormal_frame(forward: Vec3, up_hint: Vec3) -> (Vec3, Vec3) {
    let mut right = up_hint.cross(forward);
    if right.length_squared() < 1e-8 {
        // Forward is (anti)parallel to the hint; pick a stable substitute.
        right = Vec3::Z.cross(forward);
    }
    let right = right.normalize();
    let up = forward.cross(right).normalize();
    (up, right)
}
