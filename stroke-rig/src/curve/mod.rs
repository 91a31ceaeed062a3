pub mod fit;
pub mod intersect;
pub mod offset;

use bytemuck::{Pod, Zeroable};
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::math::bezier::{q, qprime, qprimeprime};

/// One cubic Bézier segment: start, two controls, end.
///
/// The layout is four tightly packed `DVec2`s, so a slice of curves can be
/// viewed as a flat `[f64]` coordinate array.
#[derive(Pod, Zeroable, Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct CubicCurve {
    pub p0: DVec2,
    pub p1: DVec2,
    pub p2: DVec2,
    pub p3: DVec2,
}

impl CubicCurve {
    pub fn new(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2) -> Self {
        CubicCurve { p0, p1, p2, p3 }
    }

    pub fn from_points(points: [DVec2; 4]) -> Self {
        let [p0, p1, p2, p3] = points;
        CubicCurve { p0, p1, p2, p3 }
    }

    /// A straight segment with its controls on the thirds.
    pub fn line(start: DVec2, end: DVec2) -> Self {
        let third = (end - start) / 3.0;
        CubicCurve {
            p0: start,
            p1: start + third,
            p2: end - third,
            p3: end,
        }
    }

    pub fn points(&self) -> [DVec2; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    pub fn point(&self, t: f64) -> DVec2 {
        q(&self.points(), t)
    }

    pub fn derivative(&self, t: f64) -> DVec2 {
        qprime(&self.points(), t)
    }

    pub fn second_derivative(&self, t: f64) -> DVec2 {
        qprimeprime(&self.points(), t)
    }

    /// The same shape traversed from end to start.
    pub fn reversed(&self) -> Self {
        CubicCurve {
            p0: self.p3,
            p1: self.p2,
            p2: self.p1,
            p3: self.p0,
        }
    }

    /// `steps + 1` evenly spaced samples in parameter space, ends included.
    pub fn sample(&self, steps: usize) -> Vec<DVec2> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.point(i as f64 / steps as f64))
            .collect()
    }
}

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DVec2>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;

        Some(iter.fold(
            Bounds {
                min: first,
                max: first,
            },
            |bounds, p| Bounds {
                min: bounds.min.min(*p),
                max: bounds.max.max(*p),
            },
        ))
    }

    /// Touching boxes count as overlapping.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/// An ordered run of cubics where each curve starts where the previous one ends.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Contour {
    pub curves: Vec<CubicCurve>,
}

impl From<Vec<CubicCurve>> for Contour {
    fn from(curves: Vec<CubicCurve>) -> Self {
        Contour { curves }
    }
}

impl Contour {
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn start(&self) -> Option<DVec2> {
        self.curves.first().map(|c| c.p0)
    }

    pub fn end(&self) -> Option<DVec2> {
        self.curves.last().map(|c| c.p3)
    }

    /// Every coordinate of every curve, `p0.x p0.y p1.x ...`, shared endpoints repeated.
    pub fn coords(&self) -> &[f64] {
        bytemuck::cast_slice(self.curves.as_slice())
    }

    pub fn is_continuous(&self, tolerance: f64) -> bool {
        self.curves
            .windows(2)
            .all(|pair| pair[0].p3.distance(pair[1].p0) <= tolerance)
    }

    /// Polyline through `steps + 1` samples of every curve. The shared endpoint
    /// between two curves only appears once.
    pub fn sample(&self, steps: usize) -> Vec<DVec2> {
        let mut points = Vec::with_capacity(self.curves.len() * steps.max(1) + 1);
        for (i, curve) in self.curves.iter().enumerate() {
            let samples = curve.sample(steps);
            let skip = usize::from(i > 0);
            points.extend(samples.into_iter().skip(skip));
        }
        points
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.curves.iter().flat_map(|c| {
            // The control polygon always contains the curve.
            [&c.p0, &c.p1, &c.p2, &c.p3]
        }))
    }

    /// The editor's control point array: `p0 c1 c2 p1 c1 c2 p2 ...`.
    pub fn to_control_points(&self) -> Vec<DVec2> {
        let mut points = Vec::with_capacity(self.curves.len() * 3 + 1);
        if let Some(first) = self.curves.first() {
            points.push(first.p0);
        }
        for curve in &self.curves {
            points.extend_from_slice(&[curve.p1, curve.p2, curve.p3]);
        }
        points
    }

    /// Inverse of [`Contour::to_control_points`]. Trailing points that do not
    /// complete a curve are ignored.
    pub fn from_control_points(points: &[DVec2]) -> Self {
        let mut curves = Vec::new();
        let mut i = 0;
        while i + 3 < points.len() {
            curves.push(CubicCurve::new(
                points[i],
                points[i + 1],
                points[i + 2],
                points[i + 3],
            ));
            i += 3;
        }
        Contour { curves }
    }

    pub fn reversed(&self) -> Self {
        Contour {
            curves: self.curves.iter().rev().map(CubicCurve::reversed).collect(),
        }
    }
}

/// Joins the two sides of a stroke into one closed contour: the out side,
/// a straight cap over to the end of the in side, the in side walked
/// backwards, and a straight cap home.
///
/// Caps are skipped where the sides already meet.
pub fn closed_outline(out: &Contour, inner: &Contour) -> Contour {
    let mut curves = out.curves.clone();

    let inner = inner.reversed();
    if let (Some(from), Some(to)) = (out.end(), inner.start()) {
        if from != to {
            curves.push(CubicCurve::line(from, to));
        }
    }
    curves.extend_from_slice(&inner.curves);

    if let (Some(from), Some(to)) = (curves.last().map(|c| c.p3), curves.first().map(|c| c.p0))
    {
        if from != to {
            curves.push(CubicCurve::line(from, to));
        }
    }

    Contour { curves }
}
