//! Asset entity (patch application target).

pub mod model;
pub mod patch;

pub use model::Asset;
pub use patch::AssetPatch;
