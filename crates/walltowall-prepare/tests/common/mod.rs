//! In-memory stand-ins for the GIS driver, tiler, database builder and
//! rollback engine.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use walltowall_core::errors::AttributeError;
use walltowall_core::traits::{
    ClassifierDefinition, DisturbanceTypeSource, InputDatabaseBuilder, RollbackEngine,
    RollbackRequest, Tiler, TilerOptions, TransitionRuleSink, VectorDataset,
};
use walltowall_core::types::{
    AttributeValue, BoundingBoxLayer, ClassifierAssignment, LayerValue, TilerInput,
    TransitionBinding, TransitionCategory, TransitionRule,
};
use walltowall_prepare::attributes::LayerSources;

pub type Fields = Vec<(String, Vec<AttributeValue>)>;

pub fn int(value: i64) -> AttributeValue {
    AttributeValue::Integer(value)
}

pub fn text(value: &str) -> AttributeValue {
    AttributeValue::Text(value.to_string())
}

pub fn fields(columns: &[(&str, Vec<AttributeValue>)]) -> Fields {
    columns
        .iter()
        .map(|(name, values)| (name.to_string(), values.clone()))
        .collect()
}

/// Create an empty file, and its parent directories.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

/// A temporary directory whose path contains no run of four digits, so
/// filename year parsing only ever sees the file names a test chooses.
pub fn digitless_tempdir() -> tempfile::TempDir {
    loop {
        let dir = tempfile::TempDir::new().unwrap();
        let mut run = 0;
        let has_year = dir.path().to_string_lossy().chars().any(|c| {
            run = if c.is_ascii_digit() { run + 1 } else { 0 };
            run >= 4
        });
        if !has_year {
            return dir;
        }
    }
}

/// Vector layers keyed by file name (and sublayer).
#[derive(Debug, Default)]
pub struct FakeDataset {
    layers: BTreeMap<(String, Option<String>), Fields>,
    containers: BTreeMap<String, Vec<String>>,
}

impl FakeDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, file_name: &str, columns: Fields) -> Self {
        self.layers.insert((file_name.to_string(), None), columns);
        self
    }

    pub fn with_sublayer(mut self, file_name: &str, sublayer: &str, columns: Fields) -> Self {
        self.containers
            .entry(file_name.to_string())
            .or_default()
            .push(sublayer.to_string());
        self.layers
            .insert((file_name.to_string(), Some(sublayer.to_string())), columns);
        self
    }

    pub fn into_sources(self) -> LayerSources {
        LayerSources::new(Arc::new(self))
    }

    fn lookup(&self, path: &Path, layer: Option<&str>) -> Result<&Fields, AttributeError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.layers
            .get(&(file_name, layer.map(str::to_string)))
            .ok_or_else(|| AttributeError::Driver {
                path: path.display().to_string(),
                message: "no such layer".to_string(),
            })
    }
}

impl VectorDataset for FakeDataset {
    fn layer_names(&self, path: &Path) -> Result<Vec<String>, AttributeError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.containers.get(&file_name).cloned().unwrap_or_default())
    }

    fn field_names(&self, path: &Path, layer: Option<&str>) -> Result<Vec<String>, AttributeError> {
        Ok(self
            .lookup(path, layer)?
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn distinct_values(
        &self,
        path: &Path,
        layer: Option<&str>,
        field: &str,
    ) -> Result<Vec<AttributeValue>, AttributeError> {
        let values = self
            .lookup(path, layer)?
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.clone())
            .unwrap_or_default();
        let mut distinct = Vec::new();
        for value in values {
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        Ok(distinct)
    }
}

pub fn vocabulary(names: &[&str]) -> Arc<dyn DisturbanceTypeSource> {
    Arc::new(names.iter().map(|n| n.to_string()).collect::<BTreeSet<String>>())
}

#[derive(Debug, Clone)]
pub struct TileCall {
    pub bounding_box: BoundingBoxLayer,
    pub inputs: Vec<TilerInput>,
    pub output_path: PathBuf,
    pub options: TilerOptions,
}

/// Records each call, writes a `<name>_moja.tiff` per input and registers
/// per-feature transitions with every classifier set to `"resolved"`.
#[derive(Debug, Default)]
pub struct FakeTiler {
    pub calls: Mutex<Vec<TileCall>>,
}

impl FakeTiler {
    pub fn calls(&self) -> Vec<TileCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn resolved(rule: &TransitionRule) -> TransitionRule {
    let classifiers = match &rule.classifiers {
        ClassifierAssignment::Spatial(names) => ClassifierAssignment::Static(
            names
                .iter()
                .map(|n| (n.clone(), "resolved".to_string()))
                .collect(),
        ),
        other => other.clone(),
    };
    let literal = |value: &Option<LayerValue>| {
        value.as_ref().map(|v| match v {
            LayerValue::Attribute(_) => LayerValue::Literal(AttributeValue::Integer(0)),
            other => other.clone(),
        })
    };
    TransitionRule {
        regen_delay: literal(&rule.regen_delay),
        age_after: literal(&rule.age_after),
        classifiers,
    }
}

impl Tiler for FakeTiler {
    fn tile(
        &self,
        bounding_box: &BoundingBoxLayer,
        layers: &[TilerInput],
        output_path: &Path,
        options: &TilerOptions,
        rules: &dyn TransitionRuleSink,
    ) -> Result<(), String> {
        std::fs::create_dir_all(output_path).map_err(|e| e.to_string())?;
        for input in layers {
            std::fs::write(output_path.join(format!("{}_moja.tiff", input.name())), b"")
                .map_err(|e| e.to_string())?;
            if let TilerInput::Disturbance(disturbance) = input {
                for (binding, category) in [
                    (&disturbance.transition, TransitionCategory::Disturbed),
                    (&disturbance.transition_undisturbed, TransitionCategory::Undisturbed),
                ] {
                    if let Some(TransitionBinding::PerFeature { rule }) = binding {
                        rules
                            .register(category, &resolved(rule))
                            .map_err(|e| e.to_string())?;
                    }
                }
            }
        }
        self.calls.lock().unwrap().push(TileCall {
            bounding_box: bounding_box.clone(),
            inputs: layers.to_vec(),
            output_path: output_path.to_path_buf(),
            options: *options,
        });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BuildCall {
    pub classifiers: Vec<ClassifierDefinition>,
    pub output_path: PathBuf,
    pub transition_rules: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct FakeBuilder {
    pub calls: Mutex<Vec<BuildCall>>,
}

impl FakeBuilder {
    pub fn calls(&self) -> Vec<BuildCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl InputDatabaseBuilder for FakeBuilder {
    fn create(
        &self,
        classifiers: &[ClassifierDefinition],
        output_path: &Path,
        transition_rules_path: Option<&Path>,
    ) -> Result<(), String> {
        std::fs::write(output_path, b"").map_err(|e| e.to_string())?;
        self.calls.lock().unwrap().push(BuildCall {
            classifiers: classifiers.to_vec(),
            output_path: output_path.to_path_buf(),
            transition_rules: transition_rules_path.map(Path::to_path_buf),
        });
        Ok(())
    }
}

/// Writes a one-rule `transition_rules.csv` into the rollback output.
#[derive(Debug, Default)]
pub struct FakeRollback {
    pub requests: Mutex<Vec<RollbackRequest>>,
}

impl RollbackEngine for FakeRollback {
    fn run(&self, request: &RollbackRequest) -> Result<(), String> {
        std::fs::create_dir_all(&request.output_path).map_err(|e| e.to_string())?;
        let mut header = vec!["id".to_string(), "regen_delay".to_string(), "age_after".to_string()];
        let mut row = vec!["1".to_string(), "0".to_string(), "0".to_string()];
        for classifier in &request.classifiers {
            header.push(classifier.name.clone());
            row.push("?".to_string());
        }
        let content = format!("{}\n{}\n", header.join(","), row.join(","));
        std::fs::write(request.output_path.join("transition_rules.csv"), content)
            .map_err(|e| e.to_string())?;
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}
