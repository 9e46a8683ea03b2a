//! Project orchestration: tiling, input database, rollback.

pub mod extra_data;
pub mod factory;
pub mod paths;
pub mod pipeline;
pub mod rollback;

pub use factory::ProjectFactory;
pub use paths::ProjectPaths;
pub use pipeline::{Cohort, Project};
pub use rollback::Rollback;
