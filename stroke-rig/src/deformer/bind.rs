use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{
    config::BindConfig,
    math::{is_finite_point, rescale},
    skeleton::{Archetype, Armature, Bone},
};

/// Most bones a single point blends between.
pub const MAX_INFLUENCES: usize = 4;

// Keeps the weight of a point lying on a bone finite.
const DISTANCE_BIAS: f64 = 1e-3;

// Shorter bones have no direction and never take points.
const MIN_BONE_LENGTH: f64 = f64::EPSILON;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoneInfluence {
    /// Index into the bound bones.
    pub bone: usize,
    pub weight: f64,
    /// The point in the bone's frame at bind time.
    pub local: DVec2,
}

/// The bones one outline point follows. Weights sum to one unless the list is empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PointBinding {
    pub point: usize,
    pub influences: Vec<BoneInfluence>,
}

impl PointBinding {
    pub fn is_empty(&self) -> bool {
        self.influences.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.influences.iter().map(|i| i.weight).sum()
    }
}

/// Everything captured at bind time that a later deformation needs.
///
/// This is a plain value: keep it next to the outline it was made for and pass
/// it back in to deform. Rebind when the archetype or the number of points
/// changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SkinBinding {
    pub archetype: Archetype,
    pub bones: Vec<Bone>,
    pub original_points: Vec<DVec2>,
    pub points: Vec<PointBinding>,
}

impl SkinBinding {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Distance from `point` to `bone`, and `point` in the bone's frame.
///
/// Points beside the bone measure to the bone itself, points before its start
/// or past its end measure to that endpoint. A bone without length has no
/// frame and measures to its start.
pub fn bone_distance(point: DVec2, bone: &Bone) -> (f64, DVec2) {
    let local = bone.local(point);

    let distance = if bone.length <= MIN_BONE_LENGTH {
        point.distance(bone.start)
    } else if local.x < 0.0 {
        point.distance(bone.start)
    } else if local.x > bone.length {
        point.distance(bone.end)
    } else {
        local.y.abs()
    };

    (distance, local)
}

/// Parabola over the bone, 1 in the middle and 0.5 at either end. Positions
/// past the ends are clamped first.
pub fn falloff(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    1.0 - 2.0 * (x - 0.5) * (x - 0.5)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinBinder {
    distance_threshold: f64,
}

impl Default for SkinBinder {
    fn default() -> Self {
        SkinBinder::new(&BindConfig::default())
    }
}

impl SkinBinder {
    pub fn new(config: &BindConfig) -> Self {
        SkinBinder {
            distance_threshold: config.distance_threshold,
        }
    }

    /// Binds every point of an outline to the bones of `armature`.
    pub fn bind(&self, points: &[DVec2], armature: &Armature) -> SkinBinding {
        SkinBinding {
            archetype: armature.archetype,
            bones: armature.bones.clone(),
            original_points: points.to_vec(),
            points: points
                .iter()
                .enumerate()
                .map(|(index, point)| self.bind_point(index, *point, &armature.bones))
                .collect(),
        }
    }

    /// Weights `point` against `bones`.
    ///
    /// Bones within `distance_threshold` bone lengths are candidates. When none
    /// are, the single nearest bone takes the point. Bones without length are
    /// skipped. At most
    /// [`MAX_INFLUENCES`] of the heaviest candidates are kept.
    pub fn bind_point(&self, index: usize, point: DVec2, bones: &[Bone]) -> PointBinding {
        let mut binding = PointBinding {
            point: index,
            influences: Vec::new(),
        };

        if bones.is_empty() || !is_finite_point(point) {
            return binding;
        }

        let mut candidates = Vec::with_capacity(bones.len());
        let mut nearest: Option<(f64, BoneInfluence)> = None;

        for (bone_index, bone) in bones.iter().enumerate() {
            if !bone.length.is_finite() || bone.length <= MIN_BONE_LENGTH {
                continue;
            }

            let (distance, local) = bone_distance(point, bone);
            if !distance.is_finite() {
                continue;
            }

            let along = rescale(local.x, 0.0, bone.length);
            let influence = BoneInfluence {
                bone: bone_index,
                weight: falloff(along) / (distance + DISTANCE_BIAS),
                local,
            };

            if distance <= bone.length * self.distance_threshold {
                candidates.push(influence);
            }
            if nearest.map_or(true, |(best, _)| distance < best) {
                nearest = Some((distance, influence));
            }
        }

        if candidates.is_empty() {
            match nearest {
                Some((distance, influence)) => {
                    log::debug!(
                        "point {} is {} from every bone, binding to nearest bone {}",
                        index,
                        distance,
                        influence.bone
                    );
                    candidates.push(influence);
                }
                None => return binding,
            }
        }

        // Heaviest first, ties to the earlier bone.
        candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight).then(a.bone.cmp(&b.bone)));
        candidates.truncate(MAX_INFLUENCES);

        let total: f64 = candidates.iter().map(|c| c.weight).sum();
        if total > 0.0 && total.is_finite() {
            for candidate in &mut candidates {
                candidate.weight /= total;
            }
        } else {
            let share = 1.0 / candidates.len() as f64;
            for candidate in &mut candidates {
                candidate.weight = share;
            }
        }

        binding.influences = candidates;
        binding
    }
}
