pub mod bind;
pub mod skin;
pub mod weight;

pub use bind::{BoneInfluence, PointBinding, SkinBinder, SkinBinding, MAX_INFLUENCES};
pub use skin::SkinDeformer;
