pub mod spline;
pub mod track;

pub use spline::{Spline, SplineSample};
pub use track::{load_track_from_path, Track, TrackFile, ZoneSpan};
