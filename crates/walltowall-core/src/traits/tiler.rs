//! The external tiling engine.

use std::path::Path;

use crate::errors::TransitionError;
use crate::types::{BoundingBoxLayer, TilerInput, TransitionCategory, TransitionRule};

/// Resource limits for one tiling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilerOptions {
    pub workers: usize,
    pub total_mem_bytes: Option<u64>,
    /// Use the bounding box's resolution rather than each layer's native one.
    pub use_bounding_box_resolution: bool,
}

/// Shared side channel the tiler registers per-feature transition rules
/// through. Rules must be fully resolved (constant values only).
pub trait TransitionRuleSink: Send + Sync {
    /// Register a rule and return its id. Identical rules share an id.
    fn register(
        &self,
        category: TransitionCategory,
        rule: &TransitionRule,
    ) -> Result<u64, TransitionError>;
}

/// Turns prepared layers into aligned raster tiles under `output_path`.
pub trait Tiler {
    fn tile(
        &self,
        bounding_box: &BoundingBoxLayer,
        layers: &[TilerInput],
        output_path: &Path,
        options: &TilerOptions,
        rules: &dyn TransitionRuleSink,
    ) -> Result<(), String>;
}
