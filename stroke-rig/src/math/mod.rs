pub mod bezier;

use glam::DVec2;

/// Rescales `t` from `[lower, upper]` to `[0, 1]`
pub fn rescale(t: f64, lower: f64, upper: f64) -> f64 {
    (t - lower) / (upper - lower)
}

/// Unit vector in the direction of `v`, or zero if `v` has no length.
pub fn normalize(v: DVec2) -> DVec2 {
    if v == DVec2::ZERO {
        return DVec2::ZERO;
    }
    v / v.length()
}

/// The unit normal to the left of `direction`, i.e. `direction` rotated by +90 degrees.
pub fn left_normal(direction: DVec2) -> DVec2 {
    normalize(direction.perp())
}

pub fn is_finite_point(p: DVec2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Cumulative chord length of `points`, normalized to `[0, 1]`.
///
/// Returns `None` when the run has no length at all.
pub fn chord_length_parameterize(points: &[DVec2]) -> Option<Vec<f64>> {
    let mut u = Vec::with_capacity(points.len());
    u.push(0.0);
    for pair in points.windows(2) {
        let last = u[u.len() - 1];
        u.push(last + pair[0].distance(pair[1]));
    }

    let total = u[u.len() - 1];
    if !(total > 0.0) {
        return None;
    }

    for value in u.iter_mut() {
        *value /= total;
    }
    Some(u)
}
