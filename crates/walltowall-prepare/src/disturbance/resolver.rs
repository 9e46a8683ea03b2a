//! Year, disturbance-type and proportion resolution.
//!
//! Each dimension is resolved by an ordered list of strategies; the first
//! one that produces something other than `Unresolved` wins.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use walltowall_core::config::YearSpec;
use walltowall_core::errors::DisturbanceError;
use walltowall_core::types::{AttributeTable, AttributeValue, LayerValue};

/// Outcome of one resolution strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Literal(AttributeValue),
    FromAttribute(String),
    FromFilename(i64),
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// The per-layer value the tiler sees, or `None` when unresolved.
    pub fn into_layer_value(self) -> Option<LayerValue> {
        match self {
            Self::Literal(value) => Some(LayerValue::Literal(value)),
            Self::FromAttribute(name) => Some(LayerValue::Attribute(name)),
            Self::FromFilename(year) => Some(LayerValue::Literal(AttributeValue::Integer(year))),
            Self::Unresolved => None,
        }
    }
}

/// What a strategy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub path: &'a Path,
    pub table: &'a AttributeTable,
}

impl ResolutionContext<'_> {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// A configured value that names an attribute of the layer refers to
    /// that attribute; anything else is a constant.
    fn configured(&self, value: &AttributeValue) -> Resolution {
        match value {
            AttributeValue::Text(name) if self.table.contains(name) => {
                Resolution::FromAttribute(name.clone())
            }
            other => Resolution::Literal(other.clone()),
        }
    }
}

type YearStrategy =
    fn(Option<&YearSpec>, &ResolutionContext<'_>) -> Result<Resolution, DisturbanceError>;

const YEAR_STRATEGIES: &[YearStrategy] = &[configured_year, year_like_attribute, year_from_filename];

fn year_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("[0-9]{4}").ok()).as_ref()
}

/// The last four-digit run anywhere in the path.
pub fn parse_year_from_path(path: &Path) -> Option<i64> {
    let text = path.to_string_lossy();
    year_pattern()?
        .find_iter(&text)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

/// Four characters, an integer, and strictly between 1000 and 2500. Reals
/// render with a fraction and never qualify.
pub fn looks_like_year(value: &AttributeValue) -> bool {
    let text = value.as_text();
    if text.chars().count() != 4 {
        return false;
    }
    matches!(text.trim().parse::<i64>(), Ok(year) if year > 1000 && year < 2500)
}

fn configured_year(
    config: Option<&YearSpec>,
    ctx: &ResolutionContext<'_>,
) -> Result<Resolution, DisturbanceError> {
    match config {
        Some(YearSpec::Filename) => {
            let year = parse_year_from_path(ctx.path).ok_or_else(|| {
                DisturbanceError::YearNotInFilename {
                    path: ctx.path.display().to_string(),
                }
            })?;
            tracing::info!("  using value from filename: {year}");
            Ok(Resolution::FromFilename(year))
        }
        Some(YearSpec::Value(value)) => {
            tracing::info!("  using configured value: {value}");
            Ok(ctx.configured(value))
        }
        None => Ok(Resolution::Unresolved),
    }
}

fn year_like_attribute(
    _config: Option<&YearSpec>,
    ctx: &ResolutionContext<'_>,
) -> Result<Resolution, DisturbanceError> {
    for column in ctx.table.iter() {
        let mut non_null = column.values.iter().filter(|v| !v.is_null()).peekable();
        if non_null.peek().is_none() {
            continue;
        }
        if non_null.all(looks_like_year) {
            tracing::info!("  using attribute: {}", column.name);
            return Ok(Resolution::FromAttribute(column.name.clone()));
        }
    }
    Ok(Resolution::Unresolved)
}

fn year_from_filename(
    _config: Option<&YearSpec>,
    ctx: &ResolutionContext<'_>,
) -> Result<Resolution, DisturbanceError> {
    Ok(match parse_year_from_path(ctx.path) {
        Some(year) => {
            tracing::info!("  using value from filename: {year}");
            Resolution::FromFilename(year)
        }
        None => Resolution::Unresolved,
    })
}

/// Resolve the disturbance year of one layer.
pub fn resolve_year(
    config: Option<&YearSpec>,
    ctx: &ResolutionContext<'_>,
) -> Result<LayerValue, DisturbanceError> {
    tracing::info!("  checking for disturbance year in {}...", ctx.file_name());
    for strategy in YEAR_STRATEGIES {
        if let Some(value) = strategy(config, ctx)?.into_layer_value() {
            return Ok(value);
        }
    }

    let err = DisturbanceError::YearUnresolved {
        path: ctx.path.display().to_string(),
    };
    tracing::error!("{err}");
    Err(err)
}

/// The first attribute whose every distinct value is a known disturbance type.
pub fn vocabulary_attribute(table: &AttributeTable, vocabulary: &BTreeSet<String>) -> Resolution {
    table
        .iter()
        .find(|column| {
            !column.values.is_empty()
                && column.values.iter().all(|v| vocabulary.contains(&v.as_text()))
        })
        .map(|column| {
            tracing::info!("  using attribute: {}", column.name);
            Resolution::FromAttribute(column.name.clone())
        })
        .unwrap_or(Resolution::Unresolved)
}

/// Resolve the disturbance type of one layer. The vocabulary is only
/// requested when no type is configured.
pub fn resolve_disturbance_type<'v, F>(
    config: Option<&str>,
    ctx: &ResolutionContext<'_>,
    vocabulary: F,
) -> Result<LayerValue, DisturbanceError>
where
    F: FnOnce() -> Result<&'v BTreeSet<String>, DisturbanceError>,
{
    tracing::info!("  checking for disturbance type in {}...", ctx.file_name());
    let resolution = match config {
        Some(configured) => {
            tracing::info!("  using configured value: {configured}");
            ctx.configured(&AttributeValue::Text(configured.to_string()))
        }
        None => vocabulary_attribute(ctx.table, vocabulary()?),
    };

    resolution.into_layer_value().ok_or_else(|| {
        let err = DisturbanceError::DisturbanceTypeUnresolved {
            path: ctx.path.display().to_string(),
        };
        tracing::error!("{err}");
        err
    })
}

/// The configured value, else an attribute literally named `default_attribute`.
pub fn configured_or_default(
    table: &AttributeTable,
    default_attribute: &str,
    configured: Option<&AttributeValue>,
) -> Option<LayerValue> {
    let ctx = ResolutionContext {
        path: Path::new(""),
        table,
    };
    let resolution = match configured {
        Some(value) => ctx.configured(value),
        None if table.contains(default_attribute) => {
            Resolution::FromAttribute(default_attribute.to_string())
        }
        None => Resolution::Unresolved,
    };
    resolution.into_layer_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(path: &'a Path, table: &'a AttributeTable) -> ResolutionContext<'a> {
        ResolutionContext { path, table }
    }

    #[test]
    fn year_heuristic() {
        assert!(looks_like_year(&AttributeValue::Integer(1998)));
        assert!(looks_like_year(&AttributeValue::Text("2003".into())));
        assert!(!looks_like_year(&AttributeValue::Integer(1000)));
        assert!(!looks_like_year(&AttributeValue::Integer(2500)));
        assert!(!looks_like_year(&AttributeValue::Integer(99)));
        assert!(!looks_like_year(&AttributeValue::Real(1998.0)));
        assert!(!looks_like_year(&AttributeValue::Text("abcd".into())));
    }

    #[test]
    fn filename_year_takes_last_match() {
        assert_eq!(parse_year_from_path(Path::new("/data/2020/fire_1998.shp")), Some(1998));
        assert_eq!(parse_year_from_path(Path::new("/data/fire.shp")), None);
        assert_eq!(parse_year_from_path(Path::new("cut_199.shp")), None);
    }

    #[test]
    fn strategies_run_in_order() {
        let table = AttributeTable::new()
            .with("FID", vec![1i64.into(), 2i64.into()])
            .with("YEAR_", vec![2001i64.into(), AttributeValue::Null, 2004i64.into()]);
        let path = Path::new("harvest_1995.shp");

        assert_eq!(
            resolve_year(None, &ctx(path, &table)).unwrap(),
            LayerValue::Attribute("YEAR_".into())
        );
        assert_eq!(
            resolve_year(Some(&YearSpec::Filename), &ctx(path, &table)).unwrap(),
            LayerValue::Literal(AttributeValue::Integer(1995))
        );
        assert_eq!(
            resolve_year(Some(&YearSpec::Value(1980i64.into())), &ctx(path, &table)).unwrap(),
            LayerValue::Literal(AttributeValue::Integer(1980))
        );
        assert_eq!(
            resolve_year(Some(&YearSpec::Value("FID".into())), &ctx(path, &table)).unwrap(),
            LayerValue::Attribute("FID".into())
        );
    }

    #[test]
    fn all_null_attribute_is_not_a_year() {
        let table = AttributeTable::new().with("EMPTY", vec![AttributeValue::Null]);
        let err = resolve_year(None, &ctx(Path::new("fire.shp"), &table)).unwrap_err();
        assert!(matches!(err, DisturbanceError::YearUnresolved { .. }));
    }

    #[test]
    fn configured_type_skips_vocabulary() {
        let table = AttributeTable::new();
        let value = resolve_disturbance_type(Some("Wildfire"), &ctx(Path::new("a.shp"), &table), || {
            panic!("vocabulary should not be read")
        })
        .unwrap();
        assert_eq!(value, LayerValue::Literal("Wildfire".into()));
    }

    #[test]
    fn proportion_defaults_to_named_attribute() {
        let table = AttributeTable::new().with("proportion", vec![AttributeValue::Real(0.5)]);
        assert_eq!(
            configured_or_default(&table, "proportion", None),
            Some(LayerValue::Attribute("proportion".into()))
        );
        assert_eq!(
            configured_or_default(&table, "proportion", Some(&AttributeValue::Real(0.25))),
            Some(LayerValue::Literal(AttributeValue::Real(0.25)))
        );
        assert_eq!(configured_or_default(&AttributeTable::new(), "proportion", None), None);
    }
}
