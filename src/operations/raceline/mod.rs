mod create;

pub use create::{CreateRaceline, Raceline};
