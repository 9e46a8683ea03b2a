//! Disturbance-type vocabulary.

use std::collections::BTreeSet;

use crate::errors::StorageError;

/// Source of the disturbance type names the simulation knows about.
pub trait DisturbanceTypeSource: Send + Sync {
    fn disturbance_types(&self) -> Result<BTreeSet<String>, StorageError>;
}

impl DisturbanceTypeSource for BTreeSet<String> {
    fn disturbance_types(&self) -> Result<BTreeSet<String>, StorageError> {
        Ok(self.clone())
    }
}
