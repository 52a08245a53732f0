//! Hierarchical block model for generalized disjunctive programs.

pub mod index;
pub mod model;
pub mod types;
pub mod uid;

pub use index::{Index, IndexValue};
pub use model::{
    BlockData, BlockInfo, Component, ComponentData, ComponentKind, DisjunctInfo,
    DisjunctionData, Found, LinearRepn, Model, ModelError, RelaxedBlockInfo, TransformationInfo,
};
pub use types::{
    Bounds, ConstraintData, Domain, Objective, Sense, Suffix, SuffixKey, SuffixValue, Variable,
};
pub use uid::ComponentUid;
