//! Loaded project configuration plus the directories paths resolve against.

use std::path::{Path, PathBuf};

use super::ProjectConfig;
use crate::errors::ConfigError;

/// A project configuration bound to the directory it was read from and the
/// working (output) directory.
///
/// Relative paths in the configuration are relative to the config file's
/// directory. The working directory is searched first for override files.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub project: ProjectConfig,
    config_path: PathBuf,
    working_path: PathBuf,
}

impl Configuration {
    /// Read and parse the JSON project configuration at `config_file`.
    ///
    /// `working_path` defaults to the config file's directory.
    pub fn load(config_file: &Path, working_path: Option<&Path>) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(config_file).map_err(|_| ConfigError::FileNotFound {
            path: config_file.display().to_string(),
        })?;

        let text = decode_config_text(config_file, bytes);
        let project: ProjectConfig =
            serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(|e| {
                ConfigError::ParseError {
                    path: config_file.display().to_string(),
                    message: e.to_string(),
                }
            })?;

        let config_dir = absolute(config_file)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let working_path = working_path
            .map(absolute)
            .unwrap_or_else(|| config_dir.clone());

        let config = Self {
            project,
            config_path: config_dir,
            working_path,
        };
        config.validate()?;

        Ok(config)
    }

    /// Build a configuration from an already-parsed project (for testing and
    /// for builders that generate configuration in memory).
    pub fn new(project: ProjectConfig, config_path: &Path, working_path: Option<&Path>) -> Self {
        let config_path = absolute(config_path);
        let working_path = working_path
            .map(absolute)
            .unwrap_or_else(|| config_path.clone());
        Self {
            project,
            config_path,
            working_path,
        }
    }

    /// Check required keys and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.project_name.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "project_name".to_string(),
            });
        }
        if let Some(resolution) = self.project.bounding_box.resolution {
            if resolution < 0.0 {
                return Err(ConfigError::ValidationFailed {
                    field: "bounding_box.resolution".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let (Some(start), Some(end)) = (self.project.start_year, self.project.end_year) {
            if end < start {
                return Err(ConfigError::ValidationFailed {
                    field: "end_year".to_string(),
                    message: format!("{end} is before start_year {start}"),
                });
            }
        }
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    /// Resolve a configured path against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.config_path.join(normalize_separators(path))
    }

    /// Find the lookup table for a layer: `<stem>.csv` in the working
    /// directory, then the config directory, then next to the layer itself.
    pub fn find_lookup_table(&self, layer_path: &Path) -> Option<PathBuf> {
        let layer_path = absolute(&self.resolve(layer_path));
        let lookup_name = layer_path.with_extension("csv");
        let file_name = lookup_name.file_name()?;

        [
            self.working_path.join(file_name),
            self.config_path.join(file_name),
            lookup_name.clone(),
        ]
        .into_iter()
        .find(|candidate| candidate.is_file())
    }
}

/// Config files saved by desktop tools are often Windows-1252 rather than
/// UTF-8. Bytes that are not valid UTF-8 are decoded as Windows-1252.
fn decode_config_text(config_file: &Path, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                path = %config_file.display(),
                "config file is not valid UTF-8, decoding as Windows-1252"
            );
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            text.into_owned()
        }
    }
}

/// Accept Windows-style separators in configuration files on every platform.
pub fn normalize_separators(path: &Path) -> PathBuf {
    if cfg!(windows) {
        return path.to_path_buf();
    }
    PathBuf::from(path.to_string_lossy().replace('\\', "/"))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
