use trackline::geometry::{Track, TrackPoint};
use trackline::operations::approximation::{ApproximationParams, SplineApproximation};
use trackline::TracklineError;

/// Builds a stadium-like oval sampled every ~2 m, with a deterministic wobble
/// on the centerline and varying widths.
fn noisy_oval() -> Result<Track, TracklineError> {
    let n = 180_u32;
    let points = (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * f64::from(i) / f64::from(n);
            let wobble = 0.4 * (13.0 * a).sin() + 0.2 * (29.0 * a).cos();
            let x = (80.0 + wobble) * a.cos();
            let y = (40.0 + wobble) * a.sin();
            TrackPoint::new(x, y, 4.0 + 0.5 * (3.0 * a).sin(), 4.0 - 0.5 * (3.0 * a).sin())
        })
        .collect();
    Track::new(points)
}

fn main() -> Result<(), TracklineError> {
    // Default: WARN for everything, INFO for trackline.
    // Override with RUST_LOG env var (e.g. RUST_LOG=trackline=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("trackline=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let track = noisy_oval()?;
    let params = ApproximationParams {
        debug: true,
        ..ApproximationParams::default()
    };
    let result = SplineApproximation::new(&track, params).execute()?;

    tracing::info!(
        input_points = track.len(),
        output_points = result.track.len(),
        spline_length = result.spline_length,
        residual = result.residual,
        "smoothed oval"
    );
    for p in result.track.points().iter().take(5) {
        println!(
            "{:10.3} {:10.3} {:7.3} {:7.3}",
            p.x, p.y, p.w_right, p.w_left
        );
    }
    Ok(())
}
