//! The prepared project and its three stages.

use std::path::{Path, PathBuf};

use walltowall_core::config::PrepareSettings;
use walltowall_core::errors::ProjectError;
use walltowall_core::traits::{
    AttributeSourceFactory, ClassifierDefinition, InputDatabaseBuilder, RollbackEngine, Tiler,
    TilerOptions,
};
use walltowall_core::types::TilerInput;

use super::extra_data::{concat_rule_based_disturbances, copy_disturbance_rules};
use super::{ProjectPaths, Rollback};
use crate::bounding_box::BoundingBox;
use crate::classifier::Classifier;
use crate::disturbance::Disturbance;
use crate::layer::Layer;
use crate::transitions::{PreparedTransitions, TransitionRuleAssembler, TransitionRuleRegistry};

/// Extra layers and classifiers tiled separately for cohort simulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cohort {
    pub layers: Vec<Layer>,
    pub classifiers: Vec<Classifier>,
}

pub struct Project {
    pub name: String,
    pub bounding_box: BoundingBox,
    pub classifiers: Vec<Classifier>,
    pub layers: Vec<Layer>,
    pub disturbances: Vec<Disturbance>,
    pub cohorts: Vec<Cohort>,
    pub rollback: Option<Rollback>,
    /// User-supplied rules merged with the tiler's.
    pub transition_rules: Option<PathBuf>,
    pub transition_rules_undisturbed: Option<PathBuf>,
    pub disturbance_rules: Option<PathBuf>,
    pub rule_based_disturbances: Vec<PathBuf>,
    pub settings: PrepareSettings,
    pub paths: ProjectPaths,
}

fn remove_dir(path: &Path) -> Result<(), ProjectError> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(ProjectError::io(path, e)),
        _ => Ok(()),
    }
}

fn create_dir(path: &Path) -> Result<(), ProjectError> {
    std::fs::create_dir_all(path).map_err(|e| ProjectError::io(path, e))
}

impl Project {
    pub fn new(name: impl Into<String>, bounding_box: BoundingBox, paths: ProjectPaths) -> Self {
        Self {
            name: name.into(),
            bounding_box,
            classifiers: Vec::new(),
            layers: Vec::new(),
            disturbances: Vec::new(),
            cohorts: Vec::new(),
            rollback: None,
            transition_rules: None,
            transition_rules_undisturbed: None,
            disturbance_rules: None,
            rule_based_disturbances: Vec::new(),
            settings: PrepareSettings::default(),
            paths,
        }
    }

    fn assembler(&self) -> TransitionRuleAssembler {
        TransitionRuleAssembler::new(self.classifiers.iter().map(|c| c.name.clone()).collect())
            .with_user_rules(self.transition_rules.clone())
            .with_user_rules_undisturbed(self.transition_rules_undisturbed.clone())
    }

    fn tiler_inputs<'a>(
        factory: &dyn AttributeSourceFactory,
        layers: impl IntoIterator<Item = &'a Layer>,
        classifiers: impl IntoIterator<Item = &'a Classifier>,
    ) -> Result<Vec<TilerInput>, ProjectError> {
        let mut inputs = Vec::new();
        for layer in layers {
            inputs.push(TilerInput::Layer(layer.to_tiler_layer(factory)?));
        }
        for classifier in classifiers {
            inputs.push(TilerInput::Layer(classifier.to_tiler_layer(factory)?));
        }
        Ok(inputs)
    }

    /// Resolve every layer and disturbance, hand them to the tiler, then
    /// write the rules registered along the way next to the tiles.
    ///
    /// Previous tiled and rollback output is removed first.
    pub fn tile(
        &self,
        factory: &dyn AttributeSourceFactory,
        tiler: &dyn Tiler,
    ) -> Result<(), ProjectError> {
        let tiler_output = self.paths.tiler_output();
        remove_dir(&tiler_output)?;
        remove_dir(&self.paths.rollback_output())?;
        create_dir(&tiler_output)?;

        let registry = TransitionRuleRegistry::new();

        tracing::info!("Preparing non-disturbance layers");
        let bounding_box = self.bounding_box.to_tiler_layer(factory)?;
        let mut inputs = Self::tiler_inputs(factory, &self.layers, &self.classifiers)?;
        tracing::info!("Finished preparing non-disturbance layers");

        for disturbance in &self.disturbances {
            let name = disturbance.display_name();
            tracing::info!("Preparing {name}");
            for layer in disturbance.resolve(factory)? {
                inputs.push(layer.render(&registry)?);
            }
            tracing::info!("Finished preparing {name}");
        }

        let options = TilerOptions {
            workers: self.settings.effective_workers(inputs.len()),
            total_mem_bytes: self.settings.total_mem_bytes(),
            use_bounding_box_resolution: true,
        };
        tracing::info!(
            layers = inputs.len(),
            workers = options.workers,
            "Starting up tiler..."
        );
        tiler
            .tile(&bounding_box, &inputs, &tiler_output, &options, &registry)
            .map_err(ProjectError::Tiler)?;

        for (i, cohort) in self.cohorts.iter().enumerate() {
            let cohort_output = self.paths.cohort_output(i + 1);
            let cohort_inputs = Self::tiler_inputs(factory, &cohort.layers, &cohort.classifiers)?;
            tracing::info!(cohort = i + 1, layers = cohort_inputs.len(), "tiling cohort");
            tiler
                .tile(&bounding_box, &cohort_inputs, &cohort_output, &options, &registry)
                .map_err(ProjectError::Tiler)?;
        }

        registry.write_rules(&tiler_output)?;
        Ok(())
    }

    pub fn classifier_definitions(
        &self,
        factory: &dyn AttributeSourceFactory,
    ) -> Result<Vec<ClassifierDefinition>, ProjectError> {
        self.classifiers.iter().map(|c| c.definition(factory)).collect()
    }

    /// Merge transition rules, build the input database and copy the extra
    /// rule files next to it.
    pub fn create_input_database(
        &self,
        factory: &dyn AttributeSourceFactory,
        builder: &dyn InputDatabaseBuilder,
    ) -> Result<PreparedTransitions, ProjectError> {
        let output_dir = self.paths.input_database_dir();
        create_dir(&output_dir)?;

        let transitions = self
            .assembler()
            .prepare(&self.paths.tiler_output(), &self.paths.transitions())?;

        let classifiers = self.classifier_definitions(factory)?;
        builder
            .create(&classifiers, &self.paths.input_db(), transitions.disturbed.as_deref())
            .map_err(ProjectError::InputDatabase)?;

        self.prepare_extra_data(&output_dir)?;
        Ok(transitions)
    }

    fn prepare_extra_data(&self, output_dir: &Path) -> Result<(), ProjectError> {
        if let Some(rules) = &self.disturbance_rules {
            copy_disturbance_rules(rules, output_dir)?;
        }
        if !self.rule_based_disturbances.is_empty() {
            concat_rule_based_disturbances(&self.rule_based_disturbances, output_dir)?;
        }
        Ok(())
    }

    /// Run the rollback engine when configured, then build the rollback
    /// input database from its transition output. Returns whether rollback ran.
    pub fn run_rollback(
        &self,
        factory: &dyn AttributeSourceFactory,
        engine: &dyn RollbackEngine,
        builder: &dyn InputDatabaseBuilder,
    ) -> Result<bool, ProjectError> {
        let Some(rollback) = &self.rollback else {
            return Ok(false);
        };

        let classifiers = self.classifier_definitions(factory)?;
        let rollback_output = self.paths.rollback_output();
        let request = rollback.request(
            classifiers.clone(),
            &self.paths.tiler_output(),
            &self.paths.input_db(),
            &rollback_output,
            self.settings.rollback_mem_gb(),
        )?;

        tracing::info!(rollback_year = request.rollback_year, "running rollback");
        engine.run(&request).map_err(ProjectError::Rollback)?;

        let transitions = self
            .assembler()
            .prepare(&rollback_output, &self.paths.rollback_transitions())?;
        builder
            .create(
                &classifiers,
                &self.paths.rollback_input_db(),
                transitions.disturbed.as_deref(),
            )
            .map_err(ProjectError::InputDatabase)?;

        Ok(true)
    }
}
