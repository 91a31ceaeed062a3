use glam::DVec2;

use crate::curve::Contour;

/// Steps each curve is sampled with before two contours are compared.
pub const CURVE_SAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// The segments cross (or touch) at this point.
    Point(DVec2),
    /// The segments are parallel, collinear or zero length.
    Parallel,
    /// The lines cross, but outside at least one of the segments.
    None,
}

/// Intersects segment `a0-a1` with segment `b0-b1`.
pub fn segment_intersection(a0: DVec2, a1: DVec2, b0: DVec2, b1: DVec2) -> SegmentIntersection {
    let denom = (b1.y - b0.y) * (a1.x - a0.x) - (b1.x - b0.x) * (a1.y - a0.y);
    if denom == 0.0 || !denom.is_finite() {
        return SegmentIntersection::Parallel;
    }

    let ua = ((b1.x - b0.x) * (a0.y - b0.y) - (b1.y - b0.y) * (a0.x - b0.x)) / denom;
    let ub = ((a1.x - a0.x) * (a0.y - b0.y) - (a1.y - a0.y) * (a0.x - b0.x)) / denom;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        SegmentIntersection::Point(a0 + (a1 - a0) * ua)
    } else {
        SegmentIntersection::None
    }
}

/// Intersects segment `a0-a1` with segment `b0-b1`.
///
/// Parallel or degenerate segments report `a1`, the end of the first segment,
/// rather than `None`. Outlines generated so far depend on that placeholder,
/// so callers that need a real crossing should use [`segment_intersection`].
pub fn line_line(a0: DVec2, a1: DVec2, b0: DVec2, b1: DVec2) -> Option<DVec2> {
    match segment_intersection(a0, a1, b0, b1) {
        SegmentIntersection::Point(p) => Some(p),
        SegmentIntersection::Parallel => Some(a1),
        SegmentIntersection::None => None,
    }
}

/// A crossing between a line and a sampled curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCurveHit {
    pub point: DVec2,
    /// Index of the polyline segment (`curve[index]..curve[index + 1]`) that was hit.
    pub index: usize,
}

/// First crossing of segment `start-end` with the polyline `curve`, walking the
/// polyline from its start.
pub fn line_curve(start: DVec2, end: DVec2, curve: &[DVec2]) -> Option<LineCurveHit> {
    curve.windows(2).enumerate().find_map(|(index, pair)| {
        match segment_intersection(start, end, pair[0], pair[1]) {
            SegmentIntersection::Point(point) => Some(LineCurveHit { point, index }),
            _ => None,
        }
    })
}

/// A crossing between two sampled curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveCurveHit {
    pub point: DVec2,
    pub index_a: usize,
    pub index_b: usize,
}

/// First crossing of polylines `a` and `b`, ordered by the segment index in
/// `a` and then by the segment index in `b`. This is not the crossing nearest
/// to the start of either curve.
pub fn curve_curve(a: &[DVec2], b: &[DVec2]) -> Option<CurveCurveHit> {
    for (index_a, pa) in a.windows(2).enumerate() {
        for (index_b, pb) in b.windows(2).enumerate() {
            if let SegmentIntersection::Point(point) =
                segment_intersection(pa[0], pa[1], pb[0], pb[1])
            {
                return Some(CurveCurveHit {
                    point,
                    index_a,
                    index_b,
                });
            }
        }
    }
    None
}

/// Whether two contours cross anywhere. Control polygon bounds are compared
/// first and only overlapping contours are sampled.
pub fn contours_intersect(a: &Contour, b: &Contour) -> bool {
    let (Some(bounds_a), Some(bounds_b)) = (a.bounds(), b.bounds()) else {
        return false;
    };
    if !bounds_a.overlaps(&bounds_b) {
        return false;
    }

    curve_curve(&a.sample(CURVE_SAMPLES), &b.sample(CURVE_SAMPLES)).is_some()
}
