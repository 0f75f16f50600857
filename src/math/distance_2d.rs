use super::Point2;

/// Returns the Euclidean distance between two points.
#[must_use]
pub fn euclidean_distance(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// Returns the length of every element (consecutive point pair) of a polyline.
///
/// The result has `points.len() - 1` entries, or none for fewer than 2 points.
#[must_use]
pub fn element_lengths(points: &[Point2]) -> Vec<f64> {
    points
        .windows(2)
        .map(|w| euclidean_distance(&w[0], &w[1]))
        .collect()
}

/// Returns the cumulative distance from the first point to every point.
///
/// The first entry is always `0.0`; the result has one entry more than
/// `el_lengths`.
#[must_use]
pub fn cumulative_distances(el_lengths: &[f64]) -> Vec<f64> {
    let mut dists = Vec::with_capacity(el_lengths.len() + 1);
    let mut total = 0.0;
    dists.push(total);
    for len in el_lengths {
        total += len;
        dists.push(total);
    }
    dists
}

/// Returns the total length of a polyline.
#[must_use]
pub fn polyline_length(points: &[Point2]) -> f64 {
    points
        .windows(2)
        .map(|w| euclidean_distance(&w[0], &w[1]))
        .sum()
}
