mod closest_point;
mod length;
mod relevant_part;

pub use closest_point::{
    ClosestPointOnCurve, ClosestPointResult, ProjectTrack, ProjectionParams, TrackProjection,
};
pub use length::SplineLength;
pub use relevant_part::{PathStation, RelevantPart, RelevantPathPart};
