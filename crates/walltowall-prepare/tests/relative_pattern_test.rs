//! Resolution of a disturbance pattern given relative to the current
//! directory. Kept in its own binary because it changes the process cwd.

mod common;

use walltowall_core::config::YearSpec;
use walltowall_core::types::{AttributeValue, LayerValue};
use walltowall_prepare::{Disturbance, DisturbanceSpec};

use common::{digitless_tempdir, fields, int, touch, vocabulary, FakeDataset};

#[test]
fn relative_pattern_resolves_against_current_dir() {
    let dir = digitless_tempdir();
    touch(&dir.path().join("fire_1998.shp"));
    let sources = FakeDataset::new()
        .with_layer("fire_1998.shp", fields(&[("AREA", vec![AttributeValue::Real(1.5)])]))
        .into_sources();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let mut spec = DisturbanceSpec::new("fire_*.shp");
    spec.year = Some(YearSpec::Filename);
    spec.disturbance_type = Some("Wildfire".to_string());
    let result = Disturbance::new(spec, vocabulary(&["Wildfire"])).resolve(&sources);

    std::env::set_current_dir(previous).unwrap();

    let layers = result.unwrap();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].name, "fire_1998");
    assert_eq!(layers[0].year, LayerValue::Literal(int(1998)));
    assert!(layers[0].source.path.is_absolute());
    assert!(layers[0].source.path.ends_with("fire_1998.shp"));
}
