pub mod approximation;
pub mod fitting;
pub mod query;
pub mod raceline;
pub mod resample;
pub mod widths;
