//! Transition rules: registration during tiling and the merged table the
//! input database imports.

pub mod assembler;
pub mod columns;
pub mod registry;

pub use assembler::{PreparedTransitions, TransitionRuleAssembler};
pub use registry::TransitionRuleRegistry;
