mod reconcile;

pub use reconcile::{ReconcileWidths, ReconciledWidths};
