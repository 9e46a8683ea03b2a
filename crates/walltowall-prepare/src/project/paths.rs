//! Output layout of a prepared project.

use std::path::{Path, PathBuf};

pub const TRANSITIONS_FILE: &str = "gcbmwalltowall_transitions.csv";
pub const ROLLBACK_TRANSITIONS_FILE: &str = "gcbmwalltowall_rollback_transitions.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tiler_output(&self) -> PathBuf {
        self.root.join("layers").join("tiled")
    }

    pub fn rollback_output(&self) -> PathBuf {
        self.root.join("layers").join("rollback")
    }

    /// Tiled output of the `index`th cohort, counting from 1.
    pub fn cohort_output(&self, index: usize) -> PathBuf {
        self.tiler_output().join("cohorts").join(index.to_string())
    }

    pub fn input_database_dir(&self) -> PathBuf {
        self.root.join("input_database")
    }

    pub fn input_db(&self) -> PathBuf {
        self.input_database_dir().join("gcbm_input.db")
    }

    pub fn rollback_input_db(&self) -> PathBuf {
        self.input_database_dir().join("rollback_gcbm_input.db")
    }

    pub fn transitions(&self) -> PathBuf {
        self.input_database_dir().join(TRANSITIONS_FILE)
    }

    pub fn rollback_transitions(&self) -> PathBuf {
        self.input_database_dir().join(ROLLBACK_TRANSITIONS_FILE)
    }
}
