use glam::{DAffine2, DVec2};

use crate::{
    config::BoneConfig,
    deformer::bind::SkinBinding,
    math::is_finite_point,
    skeleton::{bone::extract_as, classify, Bone, BoneMatrix, Skeleton},
    RigError,
};

// Bind frames flatter than this are not inverted.
const MIN_DETERMINANT: f64 = 1e-3;

/// Inverse of `matrix`, or the identity when it is (nearly) singular.
pub fn safe_inverse(matrix: &BoneMatrix) -> DAffine2 {
    let det = matrix.determinant();
    if !det.is_finite() || det.abs() < MIN_DETERMINANT {
        log::debug!("bone frame has determinant {}, using identity", det);
        return DAffine2::IDENTITY;
    }
    matrix.to_affine().inverse()
}

/// The transform taking a bind-time point along with `bone` as it moved from
/// `bound` to where it is now.
///
/// The bone's change in length scales the point uniformly about the bone's start.
pub fn bone_transform(bound: &Bone, bone: &Bone) -> DAffine2 {
    let scale = if bound.length > f64::EPSILON {
        bone.length / bound.length
    } else {
        1.0
    };

    bone.current_matrix.to_affine()
        * DAffine2::from_scale(DVec2::splat(scale))
        * safe_inverse(&bound.bind_matrix)
}

/// Moves bound outline points along with a changed skeleton.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SkinDeformer {
    bones: BoneConfig,
}

impl SkinDeformer {
    /// `bones` must be the configuration the binding's bones were extracted with.
    pub fn new(bones: &BoneConfig) -> Self {
        SkinDeformer {
            bones: bones.clone(),
        }
    }

    /// Blends every bound point between the transforms of its bones on `skeleton`,
    /// returning one position per bind-time point.
    ///
    /// The skeleton must still be of the bound archetype; anything else calls
    /// for a new binding. Points without influences, points whose blend is not
    /// finite and points bound to bones that do not exist keep their bind-time
    /// position.
    pub fn apply(&self, skeleton: &Skeleton, binding: &SkinBinding) -> Result<Vec<DVec2>, RigError> {
        let found = classify(skeleton);
        if found != binding.archetype {
            return Err(RigError::ArchetypeChanged {
                bound: binding.archetype,
                found,
            });
        }

        let mut armature = extract_as(skeleton, found, &self.bones);
        if armature.len() != binding.bones.len() {
            return Err(RigError::BoneCountChanged {
                bound: binding.bones.len(),
                found: armature.len(),
            });
        }

        let order: Vec<usize> = armature.hierarchy().collect();
        let mut transforms = vec![DAffine2::IDENTITY; armature.len()];
        for index in order {
            let bone = &mut armature.bones[index];
            bone.current_matrix = BoneMatrix::from_frame(bone.u_axis, bone.v_axis, bone.start);
            transforms[index] = bone_transform(&binding.bones[index], bone);
        }

        let mut deformed = binding.original_points.clone();
        for point_binding in &binding.points {
            let Some(&original) = binding.original_points.get(point_binding.point) else {
                log::debug!("binding refers to missing point {}", point_binding.point);
                continue;
            };
            if point_binding.is_empty() {
                continue;
            }

            let blended = point_binding
                .influences
                .iter()
                .try_fold(DVec2::ZERO, |acc, influence| {
                    let transform = transforms.get(influence.bone)?;
                    Some(acc + transform.transform_point2(original) * influence.weight)
                });

            match blended {
                Some(blended) if is_finite_point(blended) => deformed[point_binding.point] = blended,
                Some(_) => {}
                None => log::debug!(
                    "point {} is bound to a bone the skeleton does not have",
                    point_binding.point
                ),
            }
        }

        Ok(deformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{deformer::bind::SkinBinder, skeleton::extract};
    use glam::dvec2;

    fn line(start: DVec2, end: DVec2) -> Skeleton {
        Skeleton::new().with_joint("start", start).with_joint("end", end)
    }

    fn outline() -> Vec<DVec2> {
        vec![
            dvec2(0.0, 10.0),
            dvec2(30.0, 10.0),
            dvec2(70.0, 10.0),
            dvec2(100.0, 10.0),
            dvec2(100.0, -10.0),
            dvec2(50.0, -10.0),
            dvec2(0.0, -10.0),
        ]
    }

    fn bind(skeleton: &Skeleton, points: &[DVec2]) -> SkinBinding {
        SkinBinder::default().bind(points, &extract(skeleton, &BoneConfig::default()))
    }

    #[test]
    fn unchanged_skeleton_leaves_points_alone() {
        let skeleton = line(dvec2(0.0, 0.0), dvec2(100.0, 0.0));
        let points = outline();
        let binding = bind(&skeleton, &points);

        let deformed = SkinDeformer::default().apply(&skeleton, &binding).unwrap();
        for (a, b) in deformed.iter().zip(&points) {
            assert!(a.distance(*b) < 1e-9);
        }
    }

    #[test]
    fn translation_moves_every_point() {
        let skeleton = line(dvec2(0.0, 0.0), dvec2(100.0, 0.0));
        let points = outline();
        let binding = bind(&skeleton, &points);

        let offset = dvec2(12.0, -7.0);
        let deformed = SkinDeformer::default()
            .apply(&skeleton.translated(offset), &binding)
            .unwrap();
        for (a, b) in deformed.iter().zip(&points) {
            assert!(a.distance(*b + offset) < 1e-9);
        }
    }

    #[test]
    fn stretching_scales_about_the_start() {
        let points = outline();
        let binding = bind(&line(dvec2(0.0, 0.0), dvec2(100.0, 0.0)), &points);

        let deformed = SkinDeformer::default()
            .apply(&line(dvec2(0.0, 0.0), dvec2(200.0, 0.0)), &binding)
            .unwrap();
        for (a, b) in deformed.iter().zip(&points) {
            assert!(a.distance(*b * 2.0) < 1e-9);
        }
    }

    #[test]
    fn rotation_rotates_the_outline() {
        let points = outline();
        let binding = bind(&line(dvec2(0.0, 0.0), dvec2(100.0, 0.0)), &points);

        let deformed = SkinDeformer::default()
            .apply(&line(dvec2(0.0, 0.0), dvec2(0.0, 100.0)), &binding)
            .unwrap();
        for (a, b) in deformed.iter().zip(&points) {
            assert!(a.distance(b.perp()) < 1e-9);
        }
    }

    #[test]
    fn changing_archetype_needs_a_rebind() {
        let skeleton = line(dvec2(0.0, 0.0), dvec2(100.0, 0.0));
        let binding = bind(&skeleton, &outline());

        let curve = skeleton.with_joint("bend", dvec2(50.0, 30.0));
        assert!(matches!(
            SkinDeformer::default().apply(&curve, &binding),
            Err(RigError::ArchetypeChanged {
                bound: crate::skeleton::Archetype::Line,
                found: crate::skeleton::Archetype::Curve,
            })
        ));
    }

    #[test]
    fn different_bone_counts_need_a_rebind() {
        let skeleton = line(dvec2(0.0, 0.0), dvec2(100.0, 0.0));
        let binding = bind(&skeleton, &outline());

        let deformer = SkinDeformer::new(&BoneConfig {
            straight: 2,
            ..Default::default()
        });
        assert!(matches!(
            deformer.apply(&skeleton, &binding),
            Err(RigError::BoneCountChanged { bound: 4, found: 2 })
        ));
    }

    #[test]
    fn unbound_points_stay_put() {
        let skeleton = line(dvec2(0.0, 0.0), dvec2(100.0, 0.0));
        let mut binding = bind(&skeleton, &outline());
        binding.points[2].influences.clear();

        let deformed = SkinDeformer::default()
            .apply(&skeleton.translated(dvec2(5.0, 5.0)), &binding)
            .unwrap();
        assert_eq!(deformed[2], outline()[2]);
        assert!(deformed[3].distance(outline()[3] + dvec2(5.0, 5.0)) < 1e-9);
    }

    #[test]
    fn broken_bindings_keep_their_points() {
        let skeleton = line(dvec2(0.0, 0.0), dvec2(100.0, 0.0));
        let mut binding = bind(&skeleton, &outline());
        binding.points[1].influences[0].bone = 99;
        binding.points[4].point = 1000;

        let offset = dvec2(0.0, 3.0);
        let deformed = SkinDeformer::default()
            .apply(&skeleton.translated(offset), &binding)
            .unwrap();
        assert_eq!(deformed.len(), outline().len());
        assert_eq!(deformed[1], outline()[1]);
        assert_eq!(deformed[4], outline()[4]);
        assert!(deformed[0].distance(outline()[0] + offset) < 1e-9);
    }

    #[test]
    fn singular_frames_are_not_inverted() {
        let flat = BoneMatrix::from_frame(DVec2::ZERO, DVec2::ZERO, DVec2::ONE);
        assert_eq!(safe_inverse(&flat), DAffine2::IDENTITY);

        let turned = BoneMatrix::from_frame(dvec2(0.0, 1.0), dvec2(-1.0, 0.0), dvec2(5.0, 0.0));
        let local = safe_inverse(&turned).transform_point2(dvec2(5.0, 3.0));
        assert!(local.distance(dvec2(3.0, 0.0)) < 1e-12);
    }
}
