pub mod archetype;
pub mod bone;

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

pub use archetype::{classify, Archetype, SegmentShape, SkeletonSegment};
pub use bone::{extract, Armature, Bone, BoneMatrix};

/// Named joints describing the design intent of one stroke.
///
/// The set of names decides which [`Archetype`] the stroke is.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(transparent)]
pub struct Skeleton {
    joints: BTreeMap<String, DVec2>,
}

impl Skeleton {
    pub fn new() -> Self {
        Skeleton::default()
    }

    pub fn with_joint(mut self, name: impl Into<String>, position: DVec2) -> Self {
        self.insert(name, position);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, position: DVec2) -> Option<DVec2> {
        self.joints.insert(name.into(), position)
    }

    pub fn get(&self, name: &str) -> Option<DVec2> {
        self.joints.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.joints.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.joints.keys().map(String::as_str)
    }

    pub fn joints(&self) -> impl Iterator<Item = (&str, DVec2)> {
        self.joints.iter().map(|(name, p)| (name.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn archetype(&self) -> Archetype {
        classify(self)
    }

    /// The same skeleton with every joint moved by `offset`.
    pub fn translated(&self, offset: DVec2) -> Self {
        Skeleton {
            joints: self
                .joints
                .iter()
                .map(|(name, p)| (name.clone(), *p + offset))
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, DVec2)> for Skeleton {
    fn from_iter<T: IntoIterator<Item = (S, DVec2)>>(iter: T) -> Self {
        Skeleton {
            joints: iter
                .into_iter()
                .map(|(name, p)| (name.into(), p))
                .collect(),
        }
    }
}
