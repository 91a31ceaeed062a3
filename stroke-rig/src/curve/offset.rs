use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{
    config::ContourConfig,
    curve::{fit::fit, Contour},
    math::{
        bezier::{q, qprime, quadratic_to_cubic},
        left_normal,
    },
};

/// Where the stroke body sits relative to its skeleton.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OffsetMode {
    /// Half the width on either side.
    #[default]
    Centered,
    /// The whole width on the out side, the in side runs along the skeleton.
    Inner,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WidthVariation {
    #[default]
    Constant,
    Linear,
    Power {
        exponent: f64,
    },
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VariationDirection {
    /// Thin at the start, full width at the end.
    #[default]
    Forward,
    /// Full width at the start, thin at the end.
    Reverse,
}

/// How the stroke width changes along an arced segment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WidthProfile {
    pub variation: WidthVariation,
    pub direction: VariationDirection,
    /// Fraction of the full width at the thin end.
    pub min_ratio: f64,
}

impl Default for WidthProfile {
    fn default() -> Self {
        WidthProfile {
            variation: WidthVariation::Constant,
            direction: VariationDirection::Forward,
            min_ratio: 0.5,
        }
    }
}

impl WidthProfile {
    /// Width at parameter `t` of a stroke whose full width is `width`.
    pub fn width_at(&self, width: f64, t: f64) -> f64 {
        let s = match self.direction {
            VariationDirection::Forward => t,
            VariationDirection::Reverse => 1.0 - t,
        }
        .clamp(0.0, 1.0);

        let g = match self.variation {
            WidthVariation::Constant => return width,
            WidthVariation::Linear => s,
            WidthVariation::Power { exponent } => s.powf(exponent),
        };

        width * (self.min_ratio + (1.0 - self.min_ratio) * g)
    }
}

/// Per-segment options picked by whoever draws the stroke.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ContourOptions {
    pub mode: OffsetMode,
    /// Swaps the out and in sides.
    pub anticlockwise: bool,
    pub profile: WidthProfile,
}

impl ContourOptions {
    // Offsets `point` along the unit `normal` into its (out, in) pair.
    fn offset(&self, point: DVec2, normal: DVec2, width: f64) -> (DVec2, DVec2) {
        let (out, inner) = match self.mode {
            OffsetMode::Centered => (point + normal * (width / 2.0), point - normal * (width / 2.0)),
            OffsetMode::Inner => (point + normal * width, point),
        };

        if self.anticlockwise {
            (inner, out)
        } else {
            (out, inner)
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LineContours {
    pub out_start: DVec2,
    pub out_end: DVec2,
    pub in_start: DVec2,
    pub in_end: DVec2,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CurveContours {
    pub out_curves: Contour,
    pub out_points: Vec<DVec2>,
    pub in_curves: Contour,
    pub in_points: Vec<DVec2>,
}

/// Turns skeleton segments into the two boundary sides of a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourGenerator {
    samples: usize,
    tolerance: f64,
}

impl Default for ContourGenerator {
    fn default() -> Self {
        ContourGenerator::new(&ContourConfig::default())
    }
}

impl ContourGenerator {
    pub fn new(config: &ContourConfig) -> Self {
        ContourGenerator {
            samples: config.samples.max(1),
            tolerance: config.tolerance,
        }
    }

    /// Offsets the straight segment `start-end` by `width`.
    ///
    /// The out side lies to the left of the direction of travel unless
    /// `anticlockwise` is set. A zero length segment has no direction and
    /// collapses both sides onto the skeleton.
    pub fn line_contours(
        &self,
        start: DVec2,
        end: DVec2,
        width: f64,
        options: &ContourOptions,
    ) -> LineContours {
        let normal = left_normal(end - start);

        let (out_start, in_start) = options.offset(start, normal, options.profile.width_at(width, 0.0));
        let (out_end, in_end) = options.offset(end, normal, options.profile.width_at(width, 1.0));

        LineContours {
            out_start,
            out_end,
            in_start,
            in_end,
        }
    }

    /// Offsets the arc through `start`, `bend` and `end` by `width`, sampling it
    /// and fitting each side back into cubics.
    pub fn curve_contours(
        &self,
        start: DVec2,
        bend: DVec2,
        end: DVec2,
        width: f64,
        options: &ContourOptions,
    ) -> CurveContours {
        let cubic = quadratic_to_cubic(start, bend, end);
        let chord = end - start;

        let mut out_points = Vec::with_capacity(self.samples + 1);
        let mut in_points = Vec::with_capacity(self.samples + 1);

        for i in 0..=self.samples {
            let t = i as f64 / self.samples as f64;
            let point = q(&cubic, t);

            // The tangent vanishes where the bend sits on an endpoint.
            let tangent = match qprime(&cubic, t) {
                tangent if tangent.length_squared() > f64::EPSILON => tangent,
                _ => chord,
            };

            let (out, inner) = options.offset(
                point,
                left_normal(tangent),
                options.profile.width_at(width, t),
            );
            out_points.push(out);
            in_points.push(inner);
        }

        CurveContours {
            out_curves: fit(&out_points, self.tolerance).into(),
            out_points,
            in_curves: fit(&in_points, self.tolerance).into(),
            in_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn centered_line_offsets_half_the_width() {
        let contours = ContourGenerator::default().line_contours(
            dvec2(0.0, 0.0),
            dvec2(100.0, 0.0),
            20.0,
            &ContourOptions::default(),
        );

        assert_eq!(contours.out_start, dvec2(0.0, 10.0));
        assert_eq!(contours.in_start, dvec2(0.0, -10.0));
        assert_eq!(contours.out_end, dvec2(100.0, 10.0));
        assert_eq!(contours.in_end, dvec2(100.0, -10.0));
    }

    #[test]
    fn anticlockwise_swaps_sides() {
        let options = ContourOptions {
            anticlockwise: true,
            ..Default::default()
        };
        let contours = ContourGenerator::default().line_contours(
            dvec2(0.0, 0.0),
            dvec2(100.0, 0.0),
            20.0,
            &options,
        );

        assert_eq!(contours.out_start, dvec2(0.0, -10.0));
        assert_eq!(contours.in_end, dvec2(100.0, 10.0));
    }

    #[test]
    fn inner_mode_keeps_the_in_side_on_the_skeleton() {
        let options = ContourOptions {
            mode: OffsetMode::Inner,
            ..Default::default()
        };
        let contours = ContourGenerator::default().line_contours(
            dvec2(0.0, 0.0),
            dvec2(0.0, 100.0),
            20.0,
            &options,
        );

        assert_eq!(contours.out_start, dvec2(-20.0, 0.0));
        assert_eq!(contours.in_start, dvec2(0.0, 0.0));
        assert_eq!(contours.in_end, dvec2(0.0, 100.0));
    }

    #[test]
    fn width_profiles() {
        let linear = WidthProfile {
            variation: WidthVariation::Linear,
            ..Default::default()
        };
        assert_eq!(linear.width_at(20.0, 0.0), 10.0);
        assert_eq!(linear.width_at(20.0, 1.0), 20.0);

        let reverse = WidthProfile {
            direction: VariationDirection::Reverse,
            ..linear
        };
        assert_eq!(reverse.width_at(20.0, 0.0), 20.0);
        assert_eq!(reverse.width_at(20.0, 1.0), 10.0);

        let power = WidthProfile {
            variation: WidthVariation::Power { exponent: 2.0 },
            ..Default::default()
        };
        assert_eq!(power.width_at(20.0, 0.5), 12.5);

        assert_eq!(WidthProfile::default().width_at(20.0, 0.3), 20.0);
    }

    #[test]
    fn arc_sides_stay_half_a_width_from_the_arc() {
        let (start, bend, end) = (dvec2(0.0, 0.0), dvec2(50.0, 80.0), dvec2(100.0, 0.0));
        let generator = ContourGenerator::default();
        let contours = generator.curve_contours(start, bend, end, 20.0, &ContourOptions::default());

        assert_eq!(contours.out_points.len(), 101);
        assert_eq!(contours.in_points.len(), 101);

        let cubic = quadratic_to_cubic(start, bend, end);
        for (i, (out, inner)) in contours.out_points.iter().zip(&contours.in_points).enumerate() {
            let center = q(&cubic, i as f64 / 100.0);
            assert!((out.distance(center) - 10.0).abs() < 1e-9);
            assert!((inner.distance(center) - 10.0).abs() < 1e-9);
        }

        // The arc bulges upwards and is walked left to right, so the out side is on top.
        assert!(contours.out_points[50].y > contours.in_points[50].y);

        assert!(!contours.out_curves.is_empty());
        assert_eq!(contours.out_curves.start(), Some(contours.out_points[0]));
        assert_eq!(contours.in_curves.end(), Some(contours.in_points[100]));
        assert!(contours.out_curves.is_continuous(0.0));
    }

    #[test]
    fn collinear_arc_fits_a_single_curve_per_side() {
        let contours = ContourGenerator::default().curve_contours(
            dvec2(0.0, 0.0),
            dvec2(50.0, 0.0),
            dvec2(100.0, 0.0),
            20.0,
            &ContourOptions::default(),
        );

        assert_eq!(contours.out_curves.len(), 1);
        assert_eq!(contours.in_curves.len(), 1);
        assert!((contours.out_points[37].y - 10.0).abs() < 1e-12);
    }
}
