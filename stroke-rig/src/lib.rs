use skeleton::Archetype;
use thiserror::Error;

pub mod config;
pub mod curve;
pub mod deformer;
pub mod math;
pub mod skeleton;

pub use config::RigConfig;
pub use curve::{closed_outline, Contour, CubicCurve};
pub use deformer::{SkinBinder, SkinBinding, SkinDeformer};
pub use skeleton::{extract, Armature, Bone, Skeleton};

#[derive(Error, Debug)]
pub enum RigError {
    #[error("skeleton was bound as {bound:?} but is now {found:?}, it needs a new binding")]
    ArchetypeChanged { bound: Archetype, found: Archetype },
    #[error("skeleton was bound with {bound} bones but now has {found}, it needs a new binding")]
    BoneCountChanged { bound: usize, found: usize },
    #[error("could not parse config")]
    Config(#[from] serde_json::Error),
}
