//! Project preparation for wall-to-wall GCBM runs.
//!
//! Turns a project configuration into tiler descriptors, resolves disturbance
//! layers (year, type, transitions, overlap splitting) and assembles the
//! transition-rule table the input-database builder imports.

pub mod attributes;
pub mod bounding_box;
pub mod classifier;
pub mod disturbance;
pub mod layer;
pub mod project;
pub mod transitions;

pub use bounding_box::BoundingBox;
pub use classifier::Classifier;
pub use disturbance::{ConcreteDisturbanceLayer, Disturbance, DisturbanceSpec};
pub use layer::Layer;
pub use project::{Project, ProjectFactory, ProjectPaths};
pub use transitions::{TransitionRuleAssembler, TransitionRuleRegistry};
