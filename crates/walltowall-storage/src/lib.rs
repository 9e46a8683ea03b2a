//! SQLite access to the archive index and GCBM input databases.
//!
//! Only the disturbance-type vocabulary is read here; building the input
//! database is the job of an external builder.

pub mod connection;
pub mod queries;
pub mod vocabulary;

pub use vocabulary::InputDatabase;
