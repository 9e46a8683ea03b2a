//! Disturbance resolution: one configured pattern → concrete tiler layers.

pub mod concrete;
pub mod filter;
pub mod resolver;
pub mod spec;
pub mod split;
pub mod transition;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use walltowall_core::config::{SplitDimension, SublayerSelector};
use walltowall_core::errors::DisturbanceError;
use walltowall_core::traits::{AttributeSource, AttributeSourceFactory, DisturbanceTypeSource};
use walltowall_core::types::layer::is_container;
use walltowall_core::types::{AttributeTable, AttributeValue, LayerSource, LayerValue};

pub use concrete::ConcreteDisturbanceLayer;
pub use spec::DisturbanceSpec;

use concrete::AttributeSelection;
use filter::{accepts, parse_filter};
use resolver::{configured_or_default, resolve_disturbance_type, resolve_year, ResolutionContext};
use split::{cartesian_product, split_values};
use transition::{make_transition, LayerTransition};

/// A configured disturbance pattern bound to the disturbance-type vocabulary.
///
/// The vocabulary is fetched at most once per instance, the first time a
/// layer needs its type inferred.
pub struct Disturbance {
    spec: DisturbanceSpec,
    vocabulary_source: Arc<dyn DisturbanceTypeSource>,
    vocabulary: OnceLock<BTreeSet<String>>,
}

/// Everything resolved for one file or sublayer, shared by every layer
/// emitted from it.
struct ResolvedSource {
    source: LayerSource,
    year: LayerValue,
    disturbance_type: LayerValue,
    proportion: Option<LayerValue>,
    transition: Option<LayerTransition>,
    transition_undisturbed: Option<LayerTransition>,
    selection: AttributeSelection,
}

impl Disturbance {
    pub fn new(spec: DisturbanceSpec, vocabulary_source: Arc<dyn DisturbanceTypeSource>) -> Self {
        Self {
            spec,
            vocabulary_source,
            vocabulary: OnceLock::new(),
        }
    }

    pub fn spec(&self) -> &DisturbanceSpec {
        &self.spec
    }

    /// Configured name, or the pattern.
    pub fn display_name(&self) -> String {
        self.spec
            .name
            .clone()
            .unwrap_or_else(|| self.spec.pattern.display().to_string())
    }

    fn vocabulary(&self) -> Result<&BTreeSet<String>, DisturbanceError> {
        if let Some(vocabulary) = self.vocabulary.get() {
            return Ok(vocabulary);
        }
        let vocabulary = self.vocabulary_source.disturbance_types()?;
        Ok(self.vocabulary.get_or_init(|| vocabulary))
    }

    /// Expand the pattern and resolve every match into tiler-ready layers.
    ///
    /// A missing pattern directory, or a year or type that cannot be
    /// resolved for any match, fails the whole pattern.
    pub fn resolve(
        &self,
        factory: &dyn AttributeSourceFactory,
    ) -> Result<Vec<ConcreteDisturbanceLayer>, DisturbanceError> {
        let pattern = std::path::absolute(&self.spec.pattern)
            .unwrap_or_else(|_| self.spec.pattern.clone());
        let pattern_root = pattern.parent().unwrap_or_else(|| Path::new("."));
        if !pattern_root.is_dir() {
            let err = DisturbanceError::PatternDirectoryMissing {
                pattern: pattern.display().to_string(),
                directory: pattern_root.display().to_string(),
            };
            tracing::error!("{err}");
            return Err(err);
        }

        let invalid = |message: String| DisturbanceError::InvalidPattern {
            pattern: pattern.display().to_string(),
            message,
        };
        let file_pattern = pattern
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| invalid("pattern has no file name".to_string()))?;
        let full_pattern = PathBuf::from(glob::Pattern::escape(&pattern_root.to_string_lossy()))
            .join(file_pattern);
        let matches = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| invalid(e.to_string()))?;

        let mut layers = Vec::new();
        for entry in matches {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(pattern = %pattern.display(), "skipping unreadable match: {e}");
                    continue;
                }
            };

            match (&self.spec.layers, is_container(&path)) {
                (Some(selector), true) => {
                    for sublayer in self.select_sublayers(factory, &path, selector)? {
                        layers.extend(self.resolve_source(factory, &path, Some(sublayer.as_str()))?);
                    }
                }
                _ => layers.extend(self.resolve_source(factory, &path, None)?),
            }
        }

        Ok(layers)
    }

    fn select_sublayers(
        &self,
        factory: &dyn AttributeSourceFactory,
        path: &Path,
        selector: &SublayerSelector,
    ) -> Result<Vec<String>, DisturbanceError> {
        match selector {
            SublayerSelector::Names(names) => Ok(names.clone()),
            SublayerSelector::Pattern(wildcard) => {
                let matcher = glob::Pattern::new(wildcard).map_err(|e| {
                    DisturbanceError::InvalidPattern {
                        pattern: wildcard.clone(),
                        message: e.to_string(),
                    }
                })?;
                Ok(factory
                    .sublayer_names(path)?
                    .into_iter()
                    .filter(|name| matcher.matches(name))
                    .collect())
            }
        }
    }

    /// `<name or file stem>[_<sublayer>][_<split index>]`
    fn tiler_name(&self, path: &Path, sublayer: Option<&str>, index: Option<usize>) -> String {
        let base = self.spec.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let mut parts = vec![base];
        parts.extend(sublayer.map(str::to_string));
        parts.extend(index.map(|i| i.to_string()));
        parts.join("_")
    }

    fn resolve_source(
        &self,
        factory: &dyn AttributeSourceFactory,
        path: &Path,
        sublayer: Option<&str>,
    ) -> Result<Vec<ConcreteDisturbanceLayer>, DisturbanceError> {
        let mut source = LayerSource::new(path);
        if let Some(sublayer) = sublayer {
            source = source.with_sublayer(sublayer);
        }

        let attributes = factory.open(&source, self.spec.lookup_table.as_deref())?;
        let table = attributes.unique_values(None)?;
        let ctx = ResolutionContext { path, table: &table };

        let transition = make_transition(&table, self.spec.transition.as_ref());
        let transition_undisturbed =
            make_transition(&table, self.spec.transition_undisturbed.as_ref());

        let disturbance_type = resolve_disturbance_type(
            self.spec.disturbance_type.as_deref(),
            &ctx,
            || self.vocabulary(),
        )?;
        let year = resolve_year(self.spec.year.as_ref(), &ctx)?;
        let proportion = configured_or_default(&table, "proportion", self.spec.proportion.as_ref());

        let mut resolved = ResolvedSource {
            source,
            year,
            disturbance_type,
            proportion,
            transition,
            transition_undisturbed,
            selection: AttributeSelection::default(),
        };
        self.select_attributes(&mut resolved, &table);
        let filters = self.map_filters(&mut resolved, &table)?;

        for attribute in resolved.selection.iter_mut() {
            attribute.values = table.get(&attribute.name).map(<[_]>::to_vec);
        }

        if resolved.source.is_raster() {
            self.emit_raster(&resolved, attributes.as_ref(), sublayer, path, &filters)
        } else {
            self.emit_vector(&resolved, attributes.as_ref(), &table, sublayer, path, &filters)
        }
    }

    /// Year, type, proportion, transition and metadata attributes present on
    /// the layer, plus classifier aliases for spatial transitions.
    fn select_attributes(&self, resolved: &mut ResolvedSource, table: &AttributeTable) {
        let transitions: Vec<&LayerTransition> = resolved
            .transition
            .iter()
            .chain(resolved.transition_undisturbed.iter())
            .collect();

        let mut wanted: Vec<String> = [
            Some(&resolved.year),
            Some(&resolved.disturbance_type),
            resolved.proportion.as_ref(),
        ]
        .into_iter()
        .flatten()
        .filter_map(LayerValue::attribute_name)
        .map(str::to_string)
        .collect();
        for transition in &transitions {
            wanted.extend(transition.rule.attribute_names().into_iter().map(str::to_string));
        }
        wanted.extend(self.spec.metadata_attributes.iter().cloned());

        for name in &wanted {
            if table.contains(name) {
                resolved.selection.select(name);
            } else {
                tracing::debug!(attribute = %name, "attribute not on layer, not carried");
            }
        }

        if transitions.iter().any(|t| t.is_spatial()) {
            for transition in &transitions {
                for (attribute, classifier) in &transition.classifier_aliases {
                    resolved.selection.rename(attribute, classifier);
                }
            }
        }
    }

    /// Map configured filters onto layer attributes. Filters on `year` and
    /// `disturbance_type` apply only when that dimension is read from an
    /// attribute; other keys must name an attribute of the layer.
    fn map_filters(
        &self,
        resolved: &mut ResolvedSource,
        table: &AttributeTable,
    ) -> Result<BTreeMap<String, Vec<AttributeValue>>, DisturbanceError> {
        let mut filters = BTreeMap::new();
        for (key, config) in &self.spec.filters {
            let target = match key.as_str() {
                "year" => resolved.year.attribute_name(),
                "disturbance_type" => resolved.disturbance_type.attribute_name(),
                attribute if table.contains(attribute) => Some(attribute),
                attribute => {
                    return Err(DisturbanceError::FilterAttributeMissing {
                        attribute: attribute.to_string(),
                        path: resolved.source.path.display().to_string(),
                    })
                }
            }
            .map(str::to_string);

            let Some(target) = target else {
                // A raster's literal year is checked against the filter at emission.
                if !(key == "year" && resolved.source.is_raster()) {
                    tracing::warn!(
                        filter = %key,
                        layer = %resolved.source.path.display(),
                        "filter dropped: {key} is a constant for this layer"
                    );
                }
                continue;
            };

            let values = parse_filter(key, config)?;
            resolved.selection.select(&target);
            filters.insert(target, values);
        }
        Ok(filters)
    }

    /// Translate user-facing filter values into the values stored in the layer.
    fn stored_filters(
        attributes: &dyn AttributeSource,
        filters: &BTreeMap<String, Vec<AttributeValue>>,
    ) -> Result<BTreeMap<String, Vec<AttributeValue>>, DisturbanceError> {
        filters
            .iter()
            .map(|(attribute, values)| {
                Ok((attribute.clone(), attributes.original_values(attribute, values)?))
            })
            .collect()
    }

    fn emit(
        &self,
        resolved: &ResolvedSource,
        name: String,
        raw: bool,
        filters: &BTreeMap<String, Vec<AttributeValue>>,
    ) -> ConcreteDisturbanceLayer {
        ConcreteDisturbanceLayer {
            name,
            source: resolved.source.clone(),
            raw,
            year: resolved.year.clone(),
            disturbance_type: resolved.disturbance_type.clone(),
            proportion: resolved.proportion.clone(),
            transition: resolved.transition.as_ref().map(|t| t.rule.clone()),
            transition_undisturbed: resolved.transition_undisturbed.as_ref().map(|t| t.rule.clone()),
            attributes: resolved.selection.with_filters(filters),
            lookup_table: self.spec.lookup_table.clone(),
            options: self.spec.extra.clone(),
        }
    }

    /// Rasters cannot be filtered per feature: a literal year outside the
    /// year filter drops the whole layer.
    fn emit_raster(
        &self,
        resolved: &ResolvedSource,
        attributes: &dyn AttributeSource,
        sublayer: Option<&str>,
        path: &Path,
        filters: &BTreeMap<String, Vec<AttributeValue>>,
    ) -> Result<Vec<ConcreteDisturbanceLayer>, DisturbanceError> {
        if let (Some(year_filter), Some(year)) =
            (self.spec.filters.get("year"), resolved.year.literal())
        {
            if !accepts(&parse_filter("year", year_filter)?, year) {
                tracing::info!("  skipping {}: year {year} outside filter", path.display());
                return Ok(Vec::new());
            }
        }

        let stored = Self::stored_filters(attributes, filters)?;
        let name = self.tiler_name(path, sublayer, None);
        Ok(vec![self.emit(resolved, name, true, &stored)])
    }

    /// Vector layers are split into one layer per combination of year and
    /// type values so overlapping features never land in the same pass.
    fn emit_vector(
        &self,
        resolved: &ResolvedSource,
        attributes: &dyn AttributeSource,
        table: &AttributeTable,
        sublayer: Option<&str>,
        path: &Path,
        filters: &BTreeMap<String, Vec<AttributeValue>>,
    ) -> Result<Vec<ConcreteDisturbanceLayer>, DisturbanceError> {
        let mut split_attributes: Vec<String> = Vec::new();
        for (dimension, value) in [
            (SplitDimension::Year, &resolved.year),
            (SplitDimension::DisturbanceType, &resolved.disturbance_type),
        ] {
            if let Some(attribute) = value.attribute_name() {
                if self.spec.splits_on(dimension)
                    && table.contains(attribute)
                    && !split_attributes.iter().any(|a| a == attribute)
                {
                    split_attributes.push(attribute.to_string());
                }
            }
        }

        if split_attributes.is_empty() {
            let stored = Self::stored_filters(attributes, filters)?;
            let name = self.tiler_name(path, sublayer, None);
            return Ok(vec![self.emit(resolved, name, false, &stored)]);
        }

        tracing::info!("  splitting on: {}", split_attributes.join(", "));
        let dimensions: Vec<Vec<AttributeValue>> = split_attributes
            .iter()
            .map(|attribute| {
                split_values(
                    path,
                    attribute,
                    table.get(attribute).unwrap_or_default(),
                    filters.get(attribute).map(Vec::as_slice),
                )
            })
            .collect();

        let non_splitting: BTreeMap<String, Vec<AttributeValue>> = filters
            .iter()
            .filter(|(attribute, _)| !split_attributes.contains(*attribute))
            .map(|(attribute, values)| (attribute.clone(), values.clone()))
            .collect();

        let mut layers = Vec::new();
        for (i, combination) in cartesian_product(&dimensions).into_iter().enumerate() {
            let mut partition = non_splitting.clone();
            for (attribute, value) in split_attributes.iter().zip(combination) {
                partition.insert(attribute.clone(), vec![value]);
            }
            tracing::info!("    split {i}: {partition:?}");

            let stored = Self::stored_filters(attributes, &partition)?;
            let name = self.tiler_name(path, sublayer, Some(i));
            layers.push(self.emit(resolved, name, false, &stored));
        }

        Ok(layers)
    }
}
