use bytemuck::{Pod, Zeroable};
use glam::{dvec2, DAffine2, DVec2};
use indextree::{Arena, NodeId};
use serde::{Deserialize, Serialize};

use crate::{
    config::BoneConfig,
    math::{bezier::quadratic_point, left_normal, normalize},
    skeleton::{
        archetype::{classify, Archetype, SegmentShape, SkeletonSegment},
        Skeleton,
    },
};

/// A bone frame as six numbers, `[u.x v.x u.y v.y tx ty]`.
///
/// Maps bone-local `(u, v)` to `u * u_axis + v * v_axis + origin`.
#[derive(Pod, Zeroable, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct BoneMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for BoneMatrix {
    fn default() -> Self {
        BoneMatrix::IDENTITY
    }
}

impl BoneMatrix {
    pub const IDENTITY: Self = BoneMatrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn from_frame(u_axis: DVec2, v_axis: DVec2, origin: DVec2) -> Self {
        BoneMatrix {
            a: u_axis.x,
            b: v_axis.x,
            c: u_axis.y,
            d: v_axis.y,
            tx: origin.x,
            ty: origin.y,
        }
    }

    pub fn from_affine(affine: &DAffine2) -> Self {
        BoneMatrix::from_frame(
            affine.matrix2.x_axis,
            affine.matrix2.y_axis,
            affine.translation,
        )
    }

    pub fn to_affine(&self) -> DAffine2 {
        DAffine2::from_cols(
            dvec2(self.a, self.c),
            dvec2(self.b, self.d),
            dvec2(self.tx, self.ty),
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn to_array(self) -> [f64; 6] {
        bytemuck::cast(self)
    }
}

/// A rigid piece of a skeleton used as a deformation handle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bone {
    pub id: String,
    pub start: DVec2,
    pub end: DVec2,
    pub length: f64,
    /// Unit direction from start to end.
    pub u_axis: DVec2,
    /// Unit left normal of `u_axis`.
    pub v_axis: DVec2,
    /// Length when the bone was extracted.
    pub bind_length: f64,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub bind_matrix: BoneMatrix,
    pub current_matrix: BoneMatrix,
}

impl Bone {
    pub fn new(id: impl Into<String>, start: DVec2, end: DVec2) -> Self {
        let direction = end - start;
        let u_axis = normalize(direction);
        let v_axis = left_normal(direction);
        let bind_matrix = BoneMatrix::from_frame(u_axis, v_axis, start);

        Bone {
            id: id.into(),
            start,
            end,
            length: direction.length(),
            u_axis,
            v_axis,
            bind_length: direction.length(),
            parent: None,
            children: Vec::new(),
            bind_matrix,
            current_matrix: bind_matrix,
        }
    }

    /// `point` in this bone's frame: distance along the bone from its start,
    /// and signed distance to its left.
    pub fn local(&self, point: DVec2) -> DVec2 {
        let to_point = point - self.start;
        dvec2(to_point.dot(self.u_axis), to_point.dot(self.v_axis))
    }
}

/// The bones of one skeleton, with their hierarchy.
#[derive(Debug, Clone)]
pub struct Armature {
    pub archetype: Archetype,
    pub bones: Vec<Bone>,
    pub roots: Vec<NodeId>,
    // Arena payloads are indices into `bones`.
    nodes: Arena<usize>,
    node_ids: Vec<NodeId>,
}

impl Armature {
    fn new(archetype: Archetype) -> Self {
        Armature {
            archetype,
            bones: Vec::new(),
            roots: Vec::new(),
            nodes: Arena::new(),
            node_ids: Vec::new(),
        }
    }

    fn push(&mut self, mut bone: Bone, parent: Option<usize>) -> usize {
        let index = self.bones.len();
        let node = self.nodes.new_node(index);

        match parent {
            Some(parent) => {
                self.node_ids[parent].append(node, &mut self.nodes);
                self.bones[parent].children.push(bone.id.clone());
            }
            None => self.roots.push(node),
        }

        bone.parent = parent.map(|p| self.bones[p].id.clone());

        self.bones.push(bone);
        self.node_ids.push(node);
        index
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        let parent = self.nodes[self.node_ids[index]].parent()?;
        Some(*self.nodes[parent].get())
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.node_ids[index]
            .children(&self.nodes)
            .map(|node| *self.nodes[node].get())
    }

    /// Bone indices parents first, following the chain from each root.
    pub fn hierarchy(&self) -> impl Iterator<Item = usize> + '_ {
        self.roots
            .iter()
            .flat_map(|root| root.descendants(&self.nodes))
            .map(|node| *self.nodes[node].get())
    }

    /// Total length of all bones.
    pub fn length(&self) -> f64 {
        self.bones.iter().map(|b| b.length).sum()
    }
}

/// Classifies `skeleton` and cuts it into bones.
///
/// Bones come out in segment order. Each bone's parent is the bone before it,
/// so the first bone of a segment hangs off the last bone of the previous one.
pub fn extract(skeleton: &Skeleton, config: &BoneConfig) -> Armature {
    extract_as(skeleton, classify(skeleton), config)
}

/// Cuts `skeleton` into bones following `archetype`, whatever its joints say.
///
/// Segments whose joints are missing are skipped.
pub fn extract_as(skeleton: &Skeleton, archetype: Archetype, config: &BoneConfig) -> Armature {
    let counts = config.counts(archetype);
    let mut armature = Armature::new(archetype);
    let mut previous = None;

    for segment in archetype.segments() {
        let Some(points) = segment_points(skeleton, segment, counts.straight, counts.arced) else {
            log::debug!(
                "skeleton is missing joints {:?} of {:?}",
                segment.joint_names(),
                archetype
            );
            continue;
        };

        let prefix = segment.bone_prefix();
        for (i, pair) in points.windows(2).enumerate() {
            let bone = Bone::new(format!("{prefix}_{i}"), pair[0], pair[1]);
            previous = Some(armature.push(bone, previous));
        }
    }

    armature
}

// Piece boundaries along one segment, `count + 1` points.
fn segment_points(
    skeleton: &Skeleton,
    segment: &SkeletonSegment,
    straight: usize,
    arced: usize,
) -> Option<Vec<DVec2>> {
    let start = skeleton.get(&segment.joint("start"))?;
    let end = skeleton.get(&segment.joint("end"))?;

    let bend = match segment.shape {
        SegmentShape::Straight => None,
        SegmentShape::Arced => Some(skeleton.get(&segment.joint("bend"))?),
        SegmentShape::Bendable => skeleton.get(&segment.joint("bend")),
    };

    let points = match bend {
        None => {
            let count = straight.max(1);
            (0..=count)
                .map(|i| start + (end - start) * (i as f64 / count as f64))
                .collect()
        }
        Some(bend) => {
            let count = arced.max(1);
            (0..=count)
                .map(|i| quadratic_point(start, bend, end, i as f64 / count as f64))
                .collect()
        }
    };

    Some(points)
}
