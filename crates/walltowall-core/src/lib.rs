//! Core types, traits, errors, configuration and tracing for walltowall.
//!
//! Everything the preparation pipeline shares with its external collaborators
//! (tiler, input-database builder, rollback engine, vector drivers) lives here
//! so that those collaborators can be implemented without depending on the
//! resolution engine itself.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;
