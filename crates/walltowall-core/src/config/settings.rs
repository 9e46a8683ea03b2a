//! Tool settings with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Settings file looked up in the project root.
pub const SETTINGS_FILE: &str = "walltowall.toml";

/// Resource settings for the preparation run.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `CliOverrides`)
/// 2. Environment variables (`WALLTOWALL_*`)
/// 3. Project settings (`walltowall.toml` in the project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareSettings {
    /// Maximum tiler workers. Default: available parallelism.
    pub max_workers: Option<usize>,
    /// Tiler memory budget in GB. Default: left to the tiler.
    pub max_mem_gb: Option<u64>,
}

/// CLI override arguments that can be applied to settings.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_workers: Option<usize>,
    pub max_mem_gb: Option<u64>,
}

impl PrepareSettings {
    /// Load settings with layered resolution.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        let settings_path = root.join(SETTINGS_FILE);
        if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path).map_err(|_| {
                ConfigError::FileNotFound {
                    path: settings_path.display().to_string(),
                }
            })?;
            let file_settings = Self::parse(&content, &settings_path.display().to_string())?;
            settings.merge(&file_settings);
        }

        settings.apply_env_overrides();

        if let Some(cli) = cli_overrides {
            settings.apply_cli_overrides(cli);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Self::parse(toml_str, "<string>")
    }

    fn parse(toml_str: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "max_workers".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.max_mem_gb == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "max_mem_gb".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Worker count for a run over `layer_count` layers: never more workers
    /// than layers, never fewer than one.
    pub fn effective_workers(&self, layer_count: usize) -> usize {
        let available = self.max_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        available.min(layer_count).max(1)
    }

    /// Tiler memory budget in bytes.
    pub fn total_mem_bytes(&self) -> Option<u64> {
        self.max_mem_gb.map(|gb| gb * 1024 * 1024 * 1024)
    }

    /// Rollback gets an eighth of the tiler's budget.
    pub fn rollback_mem_gb(&self) -> Option<u64> {
        self.max_mem_gb.map(|gb| gb / 8)
    }

    fn merge(&mut self, other: &PrepareSettings) {
        if other.max_workers.is_some() {
            self.max_workers = other.max_workers;
        }
        if other.max_mem_gb.is_some() {
            self.max_mem_gb = other.max_mem_gb;
        }
    }

    /// Pattern: `WALLTOWALL_MAX_WORKERS`, `WALLTOWALL_MAX_MEM_GB`.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("WALLTOWALL_MAX_WORKERS") {
            if let Ok(v) = val.parse::<usize>() {
                self.max_workers = Some(v);
            }
        }
        if let Ok(val) = std::env::var("WALLTOWALL_MAX_MEM_GB") {
            if let Ok(v) = val.parse::<u64>() {
                self.max_mem_gb = Some(v);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(v) = cli.max_workers {
            self.max_workers = Some(v);
        }
        if let Some(v) = cli.max_mem_gb {
            self.max_mem_gb = Some(v);
        }
    }
}
