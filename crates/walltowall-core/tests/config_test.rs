//! Tests for project configuration loading and settings resolution.

use std::sync::Mutex;

use walltowall_core::config::{
    CliOverrides, Configuration, FilterConfig, LayerConfig, PrepareSettings, SplitDimension,
    YearSpec,
};
use walltowall_core::errors::ConfigError;
use walltowall_core::types::AttributeValue;

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env_vars() {
    for key in ["WALLTOWALL_MAX_WORKERS", "WALLTOWALL_MAX_MEM_GB"] {
        std::env::remove_var(key);
    }
}

const PROJECT_JSON: &str = r#"{
    "project_name": "demo",
    "bounding_box": {"layer": "layers\\inventory.shp", "resolution": 0.00025},
    "classifiers": {
        "LdSpp": {"layer": "layers/inventory.shp", "attribute": "LdSpp", "values_col": 1}
    },
    "layers": {
        "initial_age": {"layer": "layers/inventory.shp", "attribute": "Age"},
        "mean_annual_temperature": "layers/mat.tif"
    },
    "disturbances": {
        "disturbances/fire_*.shp": {"year": "filename", "disturbance_type": "Wildfire"},
        "disturbances/harvest.shp": {
            "split_on": ["year", "disturbance_type"],
            "filters": {"year": "(1990,2000)", "status": ["A", "B"]},
            "transition": {"regen_delay": 0, "age_after": 0, "classifiers": {"LdSpp": "new_spp"}}
        }
    },
    "input_db": {"aidb": "aidb.db", "yields": "yields.csv"},
    "start_year": 1990,
    "end_year": 2020
}"#;

#[test]
fn load_project_configuration() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_file = dir.path().join("demo.json");
    std::fs::write(&config_file, PROJECT_JSON).unwrap();

    let config = Configuration::load(&config_file, None).unwrap();
    let project = &config.project;
    assert_eq!(project.project_name, "demo");
    assert_eq!(project.bounding_box.effective_resolution(), 0.00025);
    assert_eq!(project.bounding_box.effective_epsg(), 4326);
    assert_eq!(project.input_db.effective_yield_interval(), 10);

    assert!(matches!(
        project.layers.get("mean_annual_temperature"),
        Some(LayerConfig::Path(_))
    ));
    assert_eq!(
        project.layers.get("initial_age").and_then(|l| l.attribute()),
        Some("Age")
    );

    let fire = &project.disturbances["disturbances/fire_*.shp"];
    assert_eq!(fire.year, Some(YearSpec::Filename));
    assert_eq!(fire.disturbance_type.as_deref(), Some("Wildfire"));

    let harvest = &project.disturbances["disturbances/harvest.shp"];
    assert_eq!(
        harvest.effective_split_on(),
        vec![SplitDimension::Year, SplitDimension::DisturbanceType]
    );
    assert_eq!(
        harvest.filters.get("year"),
        Some(&FilterConfig::Single(AttributeValue::Text("(1990,2000)".into())))
    );
    assert_eq!(
        harvest.filters.get("status"),
        Some(&FilterConfig::List(vec!["A".into(), "B".into()]))
    );
    let transition = harvest.transition.as_ref().unwrap();
    assert_eq!(transition.classifiers.get("LdSpp").map(String::as_str), Some("new_spp"));
}

#[test]
fn backslash_paths_resolve_against_config_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_file = dir.path().join("demo.json");
    std::fs::write(&config_file, PROJECT_JSON).unwrap();

    let config = Configuration::load(&config_file, None).unwrap();
    let resolved = config.resolve(&config.project.bounding_box.layer);
    if !cfg!(windows) {
        assert!(resolved.ends_with("layers/inventory.shp"));
    }
    assert!(resolved.starts_with(config.config_path()));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = Configuration::load(&dir.path().join("nope.json"), None);
    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_file = dir.path().join("bad.json");
    std::fs::write(&config_file, "{ not json").unwrap();
    let result = Configuration::load(&config_file, None);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn missing_required_key_is_a_parse_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_file = dir.path().join("partial.json");
    std::fs::write(&config_file, r#"{"project_name": "x"}"#).unwrap();
    let result = Configuration::load(&config_file, None);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn lookup_table_prefers_working_dir() {
    let config_dir = tempfile::TempDir::new().unwrap();
    let working_dir = tempfile::TempDir::new().unwrap();
    let config_file = config_dir.path().join("demo.json");
    std::fs::write(&config_file, PROJECT_JSON).unwrap();

    std::fs::create_dir_all(config_dir.path().join("layers")).unwrap();
    std::fs::write(config_dir.path().join("layers/inventory.csv"), "a,b\n").unwrap();

    let config = Configuration::load(&config_file, Some(working_dir.path())).unwrap();
    let found = config
        .find_lookup_table(std::path::Path::new("layers/inventory.shp"))
        .unwrap();
    assert!(found.ends_with("layers/inventory.csv"));

    std::fs::write(config_dir.path().join("inventory.csv"), "a,b\n").unwrap();
    let found = config
        .find_lookup_table(std::path::Path::new("layers/inventory.shp"))
        .unwrap();
    assert_eq!(found, config.config_path().join("inventory.csv"));

    std::fs::write(working_dir.path().join("inventory.csv"), "a,b\n").unwrap();
    let found = config
        .find_lookup_table(std::path::Path::new("layers/inventory.shp"))
        .unwrap();
    assert_eq!(found, config.working_path().join("inventory.csv"));
}

#[test]
fn windows_1252_config_is_decoded() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_file = dir.path().join("quebec.json");
    let mut bytes = br#"{"project_name": "Qu"#.to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(
        br#"bec", "bounding_box": {"layer": "a.shp"}, "input_db": {"aidb": "aidb.db"}}"#,
    );
    std::fs::write(&config_file, bytes).unwrap();

    let config = Configuration::load(&config_file, None).unwrap();
    assert_eq!(config.project.project_name, "Qu\u{e9}bec");
}

#[test]
fn unknown_keys_are_ignored() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_file = dir.path().join("demo.json");
    std::fs::write(
        &config_file,
        r#"{"project_name": "x", "bounding_box": {"layer": "a.shp"},
            "input_db": {"aidb": "aidb.db"}, "disturbance_order": "order.txt"}"#,
    )
    .unwrap();
    assert!(Configuration::load(&config_file, None).is_ok());
}

#[test]
fn settings_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("walltowall.toml"),
        "max_workers = 4\nmax_mem_gb = 16\n",
    )
    .unwrap();

    std::env::set_var("WALLTOWALL_MAX_MEM_GB", "32");
    let cli = CliOverrides {
        max_workers: Some(2),
        ..Default::default()
    };

    let settings = PrepareSettings::load(dir.path(), Some(&cli)).unwrap();
    assert_eq!(settings.max_workers, Some(2));
    assert_eq!(settings.max_mem_gb, Some(32));
    assert_eq!(settings.total_mem_bytes(), Some(32 * 1024 * 1024 * 1024));
    assert_eq!(settings.rollback_mem_gb(), Some(4));

    clear_env_vars();
}

#[test]
fn settings_defaults_without_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    let settings = PrepareSettings::load(dir.path(), None).unwrap();
    assert_eq!(settings, PrepareSettings::default());
    assert_eq!(settings.total_mem_bytes(), None);
    assert_eq!(settings.effective_workers(0), 1);
}

#[test]
fn effective_workers_bounded_by_layer_count() {
    let settings = PrepareSettings {
        max_workers: Some(8),
        max_mem_gb: None,
    };
    assert_eq!(settings.effective_workers(3), 3);
    assert_eq!(settings.effective_workers(20), 8);
}

#[test]
fn zero_workers_fails_validation() {
    let settings = PrepareSettings::from_toml("max_workers = 0").unwrap();
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::ValidationFailed { .. })
    ));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let result = PrepareSettings::from_toml("max_workers = [[[");
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}
