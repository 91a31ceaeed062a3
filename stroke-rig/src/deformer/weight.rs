use glam::DVec2;

use crate::{
    config::WeightConfig,
    curve::{intersect::line_curve, Contour},
    math::left_normal,
    skeleton::Bone,
};

// Width of the outline across `anchor`, probing `reach` along `normal` both ways.
fn width_at(anchor: DVec2, normal: DVec2, reach: f64, outline: &[DVec2]) -> Option<f64> {
    let up = line_curve(anchor, anchor + normal * reach, outline)?;
    let down = line_curve(anchor, anchor - normal * reach, outline)?;
    Some(up.point.distance(down.point))
}

/// Average stroke width of `outline` along `bones`.
///
/// Every bone is probed across its start and its end, and the bones are
/// combined weighted by length. Bones whose probes miss the outline are left
/// out; `None` means nothing could be measured at all.
pub fn measure_weight(outline: &Contour, bones: &[Bone], config: &WeightConfig) -> Option<f64> {
    let sampled = outline.sample(config.samples);

    let mut total = 0.0;
    let mut total_length = 0.0;
    for bone in bones {
        if bone.length <= 0.0 {
            continue;
        }

        let widths: Vec<f64> = [bone.start, bone.end]
            .into_iter()
            .filter_map(|anchor| width_at(anchor, bone.v_axis, config.reach, &sampled))
            .collect();
        if widths.is_empty() {
            log::trace!("probes across {} missed the outline", bone.id);
            continue;
        }

        let average = widths.iter().sum::<f64>() / widths.len() as f64;
        total += average * bone.length;
        total_length += bone.length;
    }

    (total_length > 0.0).then(|| total / total_length)
}

/// Pushes every curve of an editor control point array (`p0 c1 c2 p1 ...`)
/// sideways by `delta / 2`: a curve's start and first control along the
/// normal of its start tangent, its second control and end along the normal
/// of its end tangent.
///
/// Where curves share an endpoint the later curve decides its position.
/// Handles of zero length have no normal and stay where they are.
pub fn embolden(points: &[DVec2], delta: f64) -> Vec<DVec2> {
    let d = delta / 2.0;
    let mut moved = points.to_vec();

    let mut i = 0;
    while i + 3 < points.len() {
        let start_normal = left_normal(points[i + 1] - points[i]) * d;
        let end_normal = left_normal(points[i + 3] - points[i + 2]) * d;

        moved[i] = points[i] + start_normal;
        moved[i + 1] = points[i + 1] + start_normal;
        moved[i + 2] = points[i + 2] + end_normal;
        moved[i + 3] = points[i + 3] + end_normal;

        i += 3;
    }

    moved
}
