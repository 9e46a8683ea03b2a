//! Shared data types.

pub mod attribute;
pub mod layer;
pub mod tiler;
pub mod transition;

pub use attribute::{AttributeColumn, AttributeTable, AttributeValue};
pub use layer::{LayerKind, LayerSource, LayerValue};
pub use tiler::{
    BoundingBoxLayer, DisturbanceTilerLayer, TilerAttribute, TilerInput, TilerLayer,
    TransitionBinding,
};
pub use transition::{ClassifierAssignment, TransitionCategory, TransitionRule};
