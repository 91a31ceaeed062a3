use glam::DVec2;

// Plain Bernstein polynomials. `t` is not clamped, so these also extrapolate
// past the ends of the curve, which the Newton step in the fitter relies on.

/// Position on the cubic `bezier` at `t`.
pub fn q(bezier: &[DVec2; 4], t: f64) -> DVec2 {
    let [p0, p1, p2, p3] = *bezier;
    let mt = 1.0 - t;

    p0 * (mt * mt * mt) + p1 * (3.0 * t * mt * mt) + p2 * (3.0 * t * t * mt) + p3 * (t * t * t)
}

/// First derivative of the cubic `bezier` at `t`.
pub fn qprime(bezier: &[DVec2; 4], t: f64) -> DVec2 {
    let [p0, p1, p2, p3] = *bezier;
    let mt = 1.0 - t;

    (p1 - p0) * (3.0 * mt * mt) + (p2 - p1) * (6.0 * mt * t) + (p3 - p2) * (3.0 * t * t)
}

/// Second derivative of the cubic `bezier` at `t`.
pub fn qprimeprime(bezier: &[DVec2; 4], t: f64) -> DVec2 {
    let [p0, p1, p2, p3] = *bezier;

    (p2 - p1 * 2.0 + p0) * (6.0 * (1.0 - t)) + (p3 - p2 * 2.0 + p1) * (6.0 * t)
}

/// Exact degree elevation of the quadratic `start, control, end` to a cubic.
pub fn quadratic_to_cubic(start: DVec2, control: DVec2, end: DVec2) -> [DVec2; 4] {
    [
        start,
        start + (control - start) * (2.0 / 3.0),
        end + (control - end) * (2.0 / 3.0),
        end,
    ]
}

/// Position on the quadratic `start, control, end` at `t`.
pub fn quadratic_point(start: DVec2, control: DVec2, end: DVec2, t: f64) -> DVec2 {
    q(&quadratic_to_cubic(start, control, end), t)
}

fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);

    let mut result = 1.0;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

fn bernstein(n: usize, i: usize, t: f64) -> f64 {
    binomial(n, i) * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)
}

/// Position on a Bézier curve of any degree (`points.len() - 1`).
///
/// An empty slice evaluates to the origin and a single point to itself.
pub fn bezier_point_n(points: &[DVec2], t: f64) -> DVec2 {
    if points.is_empty() {
        return DVec2::ZERO;
    }
    let n = points.len() - 1;

    points
        .iter()
        .enumerate()
        .fold(DVec2::ZERO, |acc, (i, p)| acc + *p * bernstein(n, i, t))
}

/// First derivative of a Bézier curve of any degree.
pub fn bezier_prime_n(points: &[DVec2], t: f64) -> DVec2 {
    if points.len() < 2 {
        return DVec2::ZERO;
    }
    let n = points.len() - 1;

    points
        .windows(2)
        .enumerate()
        .fold(DVec2::ZERO, |acc, (i, w)| {
            acc + (w[1] - w[0]) * (n as f64 * bernstein(n - 1, i, t))
        })
}

/// Second derivative of a Bézier curve of any degree.
pub fn bezier_prime_prime_n(points: &[DVec2], t: f64) -> DVec2 {
    if points.len() < 3 {
        return DVec2::ZERO;
    }
    let n = points.len() - 1;
    let scale = (n * (n - 1)) as f64;

    points
        .windows(3)
        .enumerate()
        .fold(DVec2::ZERO, |acc, (i, w)| {
            acc + (w[2] - w[1] * 2.0 + w[0]) * (scale * bernstein(n - 2, i, t))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    const CURVE: [DVec2; 4] = [
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 30.0),
        DVec2::new(40.0, 30.0),
        DVec2::new(50.0, 0.0),
    ];

    fn close(a: DVec2, b: DVec2) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn endpoints_are_interpolated() {
        assert_eq!(q(&CURVE, 0.0), CURVE[0]);
        assert_eq!(q(&CURVE, 1.0), CURVE[3]);
        assert!(close(q(&CURVE, 0.5), dvec2(25.0, 22.5)));
    }

    #[test]
    fn derivatives_match_endpoint_tangents() {
        assert!(close(qprime(&CURVE, 0.0), (CURVE[1] - CURVE[0]) * 3.0));
        assert!(close(qprime(&CURVE, 1.0), (CURVE[3] - CURVE[2]) * 3.0));
        assert!(close(
            qprimeprime(&CURVE, 0.0),
            (CURVE[2] - CURVE[1] * 2.0 + CURVE[0]) * 6.0
        ));
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let h = 1e-6;
        for t in [-0.5, 0.1, 0.7, 1.3] {
            let numeric = (q(&CURVE, t + h) - q(&CURVE, t - h)) / (2.0 * h);
            assert!(numeric.distance(qprime(&CURVE, t)) < 1e-4);

            let numeric = (qprime(&CURVE, t + h) - qprime(&CURVE, t - h)) / (2.0 * h);
            assert!(numeric.distance(qprimeprime(&CURVE, t)) < 1e-4);
        }
    }

    #[test]
    fn elevated_quadratic_matches_quadratic_formula() {
        let (a, b, c) = (dvec2(0.0, 0.0), dvec2(50.0, 100.0), dvec2(100.0, 0.0));
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let mt = 1.0 - t;
            let expected = a * (mt * mt) + b * (2.0 * mt * t) + c * (t * t);
            assert!(close(quadratic_point(a, b, c, t), expected));
        }
    }

    #[test]
    fn n_degree_agrees_with_cubic() {
        for i in 0..=8 {
            let t = i as f64 / 8.0;
            assert!(close(bezier_point_n(&CURVE, t), q(&CURVE, t)));
            assert!(close(bezier_prime_n(&CURVE, t), qprime(&CURVE, t)));
            assert!(close(bezier_prime_prime_n(&CURVE, t), qprimeprime(&CURVE, t)));
        }
    }
}
