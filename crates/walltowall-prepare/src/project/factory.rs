//! Builds a [`Project`] from a loaded project configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walltowall_core::config::{ClassifierConfig, Configuration, LayerConfig, PrepareSettings};
use walltowall_core::errors::ProjectError;
use walltowall_core::traits::DisturbanceTypeSource;
use walltowall_storage::InputDatabase;

use super::{Cohort, Project, ProjectPaths, Rollback};
use crate::bounding_box::BoundingBox;
use crate::classifier::Classifier;
use crate::disturbance::{Disturbance, DisturbanceSpec};
use crate::layer::Layer;

pub struct ProjectFactory {
    config: Configuration,
    settings: PrepareSettings,
    vocabulary: Option<Arc<dyn DisturbanceTypeSource>>,
}

impl ProjectFactory {
    pub fn new(config: Configuration, settings: PrepareSettings) -> Self {
        Self {
            config,
            settings,
            vocabulary: None,
        }
    }

    /// Read disturbance types from `vocabulary` instead of the configured
    /// archive index database.
    pub fn with_vocabulary(mut self, vocabulary: Arc<dyn DisturbanceTypeSource>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn create(&self) -> Result<Project, ProjectError> {
        let project = &self.config.project;
        tracing::debug!(project = %project.project_name, "creating project");

        let bbox_config = &project.bounding_box;
        let bbox_layer = self.layer(
            "bounding_box",
            &bbox_config.layer,
            bbox_config.attribute.as_deref(),
            None,
        );
        let bounding_box = BoundingBox::configured(bbox_layer, bbox_config);

        let mut result = Project::new(
            project.project_name.clone(),
            bounding_box,
            ProjectPaths::new(self.config.working_path()),
        );
        result.layers = self.layers(&project.layers);
        result.classifiers = self.classifiers(&project.classifiers);
        result.cohorts = project
            .cohorts
            .iter()
            .map(|cohort| Cohort {
                layers: self.layers(&cohort.layers),
                classifiers: self.classifiers(&cohort.classifiers),
            })
            .collect();

        let vocabulary = self.vocabulary.clone().unwrap_or_else(|| {
            Arc::new(InputDatabase::new(self.config.resolve(&project.input_db.aidb)))
        });
        result.disturbances = project
            .disturbances
            .iter()
            .map(|(pattern, config)| {
                let pattern = self.config.resolve(Path::new(pattern));
                let lookup_table = match &config.lookup_table {
                    Some(path) => Some(self.config.resolve(path)),
                    None => self.config.find_lookup_table(&pattern),
                };
                let spec = DisturbanceSpec::from_config(pattern, config, lookup_table);
                Disturbance::new(spec, Arc::clone(&vocabulary))
            })
            .collect();

        result.rollback = project.rollback.as_ref().map(|rollback| {
            Rollback::from_config(rollback, self.config.resolve(&rollback.age_distribution))
        });
        result.transition_rules = project
            .transition_rules
            .as_ref()
            .map(|path| self.config.resolve(path));
        result.transition_rules_undisturbed = project
            .transition_rules_undisturbed
            .as_ref()
            .map(|path| self.config.resolve(path));
        result.disturbance_rules = project
            .disturbance_rules
            .as_ref()
            .map(|path| self.config.resolve(path));
        result.rule_based_disturbances = project
            .rule_based_disturbances
            .iter()
            .map(|path| self.config.resolve(path))
            .collect();
        result.settings = self.settings.clone();

        Ok(result)
    }

    fn layer(
        &self,
        name: &str,
        path: &Path,
        attribute: Option<&str>,
        lookup_table: Option<&PathBuf>,
    ) -> Layer {
        let mut layer = Layer::new(name, self.config.resolve(path));
        if let Some(attribute) = attribute {
            layer = layer.with_attribute(attribute);
        }
        let lookup_table = match lookup_table {
            Some(path) => Some(self.config.resolve(path)),
            None => self.config.find_lookup_table(path),
        };
        if let Some(lookup_table) = lookup_table {
            layer = layer.with_lookup_table(lookup_table);
        }
        layer
    }

    fn layers(&self, configs: &BTreeMap<String, LayerConfig>) -> Vec<Layer> {
        configs
            .iter()
            .map(|(name, config)| {
                self.layer(name, config.path(), config.attribute(), config.lookup_table())
                    .with_options(config.extra())
            })
            .collect()
    }

    fn classifiers(&self, configs: &BTreeMap<String, ClassifierConfig>) -> Vec<Classifier> {
        configs
            .iter()
            .map(|(name, config)| {
                let layer = self.layer(
                    name,
                    &config.layer,
                    config.attribute.as_deref(),
                    config.lookup_table.as_ref(),
                );
                let mut classifier = Classifier::new(name.clone(), layer);
                if let Some(values_path) = &config.values_path {
                    classifier = classifier.with_values(self.config.resolve(values_path));
                }
                classifier.values_col = config.values_col.clone();
                classifier.yield_col = config.yield_col.clone();
                classifier
            })
            .collect()
    }
}
