//! Query modules.

pub mod disturbance_types;
