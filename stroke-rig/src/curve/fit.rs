use glam::DVec2;

use crate::{
    curve::CubicCurve,
    math::{
        bezier::{q, qprime, qprimeprime},
        chord_length_parameterize, normalize,
    },
};

// Least-squares cubic fitting after Schneider's "An Algorithm for Automatically
// Fitting Digitized Curves" (Graphics Gems, 1990). A run of points is fitted
// with one cubic if it can be, otherwise it is split at the point of worst
// error and both halves are fitted on their own. The halves share their split
// point and a tangent there, so the result is C0 (and visually G1).
//
// Recursion depth is bounded by the number of points: every split hands each
// half strictly fewer points, and two points always fit.

const NEWTON_ROUNDS: usize = 20;

/// Fits `points` with as few cubics as possible such that every point lies
/// within `max_error` of the curve at its parameter.
///
/// Fewer than two points fit nothing.
pub fn fit(points: &[DVec2], max_error: f64) -> Vec<CubicCurve> {
    if points.len() < 2 {
        return Vec::new();
    }

    let left_tangent = normalize(points[1] - points[0]);
    let right_tangent = normalize(points[points.len() - 2] - points[points.len() - 1]);

    let mut curves = Vec::new();
    fit_cubic(points, left_tangent, right_tangent, max_error, &mut curves);
    curves
}

/// Fits `points` between the given end tangents, appending the result to `curves`.
///
/// `right_tangent` points back into the run from its last point.
pub fn fit_cubic(
    points: &[DVec2],
    left_tangent: DVec2,
    right_tangent: DVec2,
    error: f64,
    curves: &mut Vec<CubicCurve>,
) {
    let first = points[0];
    let last = points[points.len() - 1];

    if points.len() == 2 {
        let dist = first.distance(last) / 3.0;
        curves.push(CubicCurve::new(
            first,
            first + left_tangent * dist,
            last + right_tangent * dist,
            last,
        ));
        return;
    }

    let Some(mut u) = chord_length_parameterize(points) else {
        // Every point is the same point.
        curves.push(CubicCurve::new(first, first, last, last));
        return;
    };

    let mut bezier = generate_bezier(points, &u, left_tangent, right_tangent);
    let (max_dist, mut split_point) = compute_max_error(points, &bezier, &u);
    if max_dist < error {
        curves.push(bezier);
        return;
    }

    // Close enough that nudging the parameters may be all it takes.
    if max_dist < error * error {
        for _ in 0..NEWTON_ROUNDS {
            let u_prime = reparameterize(&bezier, points, &u);
            bezier = generate_bezier(points, &u_prime, left_tangent, right_tangent);

            let (max_dist, split) = compute_max_error(points, &bezier, &u_prime);
            if max_dist < error {
                curves.push(bezier);
                return;
            }
            split_point = split;
            u = u_prime;
        }
    }

    // The endpoints are interpolated exactly, so the worst point is interior
    // unless something went non-finite.
    let split_point = split_point.clamp(1, points.len() - 2);
    log::trace!(
        "splitting {} points at {} (error {})",
        points.len(),
        split_point,
        max_dist
    );

    let center_tangent = normalize(points[split_point - 1] - points[split_point + 1]);
    fit_cubic(
        &points[..=split_point],
        left_tangent,
        center_tangent,
        error,
        curves,
    );
    fit_cubic(
        &points[split_point..],
        -center_tangent,
        right_tangent,
        error,
        curves,
    );
}

/// Least-squares tangent lengths for a cubic through the first and last point
/// of `points` with the given tangent directions.
///
/// Degenerate systems fall back to controls at a third of the chord.
pub fn generate_bezier(
    points: &[DVec2],
    parameters: &[f64],
    left_tangent: DVec2,
    right_tangent: DVec2,
) -> CubicCurve {
    let first = points[0];
    let last = points[points.len() - 1];
    let chord = [first, first, last, last];

    let mut c = [[0.0f64; 2]; 2];
    let mut x = [0.0f64; 2];

    for (point, &u) in points.iter().zip(parameters) {
        let a0 = left_tangent * (3.0 * (1.0 - u) * (1.0 - u) * u);
        let a1 = right_tangent * (3.0 * (1.0 - u) * u * u);

        c[0][0] += a0.dot(a0);
        c[0][1] += a0.dot(a1);
        c[1][0] += a0.dot(a1);
        c[1][1] += a1.dot(a1);

        let tmp = *point - q(&chord, u);
        x[0] += a0.dot(tmp);
        x[1] += a1.dot(tmp);
    }

    let det_c0_c1 = c[0][0] * c[1][1] - c[1][0] * c[0][1];
    let det_c0_x = c[0][0] * x[1] - c[1][0] * x[0];
    let det_x_c1 = x[0] * c[1][1] - x[1] * c[0][1];

    let (alpha_left, alpha_right) = if det_c0_c1 == 0.0 {
        (0.0, 0.0)
    } else {
        (det_x_c1 / det_c0_c1, det_c0_x / det_c0_c1)
    };

    let seg_length = first.distance(last);
    let epsilon = 1.0e-6 * seg_length;

    // Negative or vanishing (or NaN) alphas put the controls somewhere useless.
    if !(alpha_left >= epsilon && alpha_right >= epsilon) {
        let dist = seg_length / 3.0;
        return CubicCurve::new(
            first,
            first + left_tangent * dist,
            last + right_tangent * dist,
            last,
        );
    }

    CubicCurve::new(
        first,
        first + left_tangent * alpha_left,
        last + right_tangent * alpha_right,
        last,
    )
}

/// One Newton-Raphson step per point towards the parameter of its closest
/// point on `bezier`. Results are kept inside `[0, 1]`.
pub fn reparameterize(bezier: &CubicCurve, points: &[DVec2], parameters: &[f64]) -> Vec<f64> {
    let control = bezier.points();

    points
        .iter()
        .zip(parameters)
        .map(|(point, &u)| newton_raphson_root_find(&control, *point, u).clamp(0.0, 1.0))
        .collect()
}

fn newton_raphson_root_find(bezier: &[DVec2; 4], point: DVec2, u: f64) -> f64 {
    let d = q(bezier, u) - point;
    let du1 = qprime(bezier, u);
    let du2 = qprimeprime(bezier, u);

    let numerator = d.dot(du1);
    let denominator = du1.length_squared() + d.dot(du2);

    if denominator == 0.0 || !denominator.is_finite() {
        u
    } else {
        u - numerator / denominator
    }
}

/// Largest distance between a point and the curve at its parameter, and the
/// index of that point. With no error at all the middle index is reported.
pub fn compute_max_error(points: &[DVec2], bezier: &CubicCurve, parameters: &[f64]) -> (f64, usize) {
    let mut max_dist = 0.0;
    let mut split_point = points.len() / 2;

    for (i, (point, &u)) in points.iter().zip(parameters).enumerate() {
        let dist = bezier.point(u).distance(*point);
        if dist > max_dist {
            max_dist = dist;
            split_point = i;
        }
    }

    (max_dist, split_point)
}

/// Fits `points` with exactly `count` cubics, splitting the run by chord length.
///
/// Interior joints use a central-difference tangent so neighbouring pieces line
/// up. Runs too short to split get a single least-squares cubic.
pub fn fit_fixed(points: &[DVec2], count: usize) -> Vec<CubicCurve> {
    let n = points.len();
    if n < 2 || count == 0 {
        return Vec::new();
    }

    let left_tangent = normalize(points[1] - points[0]);
    let right_tangent = normalize(points[n - 2] - points[n - 1]);

    let Some(u) = chord_length_parameterize(points) else {
        return vec![CubicCurve::new(points[0], points[0], points[n - 1], points[n - 1])];
    };

    if n < count + 1 {
        return vec![generate_bezier(points, &u, left_tangent, right_tangent)];
    }

    // Normalized chord length is as good as absolute for picking split points.
    let mut splits = Vec::with_capacity(count + 1);
    splits.push(0);
    for i in 1..count {
        let target = i as f64 / count as f64;
        let mut best = 1;
        let mut best_diff = (u[1] - target).abs();
        for (j, value) in u.iter().enumerate().take(n - 1).skip(2) {
            let diff = (value - target).abs();
            if diff < best_diff {
                best_diff = diff;
                best = j;
            }
        }
        splits.push(best);
    }
    splits.push(n - 1);

    let central_tangent = |index: usize| {
        let prev = index.saturating_sub(1);
        let next = (index + 1).min(n - 1);
        normalize(points[next] - points[prev])
    };

    let mut curves = Vec::with_capacity(count);
    for (i, pair) in splits.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let piece = &points[start..=end];

        let left = if i == 0 {
            left_tangent
        } else {
            central_tangent(start)
        };
        let right = if i == count - 1 {
            right_tangent
        } else {
            -central_tangent(end)
        };

        let bezier = match chord_length_parameterize(piece) {
            Some(u) => generate_bezier(piece, &u, left, right),
            None => CubicCurve::new(piece[0], piece[0], piece[piece.len() - 1], piece[piece.len() - 1]),
        };
        curves.push(bezier);
    }

    curves
}

/// Ramer–Douglas–Peucker simplification. The first and last points are always kept.
pub fn simplify(points: &[DVec2], epsilon: f64) -> Vec<DVec2> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let start = points[0];
    let end = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut index = 0;
    for (i, point) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let dist = perpendicular_distance(*point, start, end);
        if dist > max_dist {
            max_dist = dist;
            index = i;
        }
    }

    if max_dist > epsilon {
        let mut left = simplify(&points[..=index], epsilon);
        let right = simplify(&points[index..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![start, end]
    }
}

// Distance from `point` to the infinite line through `start` and `end`, or to
// `start` when those coincide.
fn perpendicular_distance(point: DVec2, start: DVec2, end: DVec2) -> f64 {
    let base = end - start;
    let length = base.length();
    if length == 0.0 {
        return point.distance(start);
    }
    base.perp_dot(point - start).abs() / length
}
