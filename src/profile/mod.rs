mod ax_profile;

pub use ax_profile::ax_profile;
