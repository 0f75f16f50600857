pub mod curve;
pub mod track;

pub use curve::{Curve2, CurveDomain, PeriodicSpline};
pub use track::{ClosedTrack, Track, TrackPoint};
