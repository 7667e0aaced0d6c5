use reachforest::{Config, ForestError};
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_json_file() {
    let file = temp_config(
        ".json",
        r#"{ "grid_size": 80, "time_range_km": 2.5, "neighbor_radius_km": 0.3 }"#,
    );
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.grid_size, 80);
    assert_eq!(config.time_range_km, 2.5);
    assert_eq!(config.neighbor_radius_km, 0.3);
    assert_eq!(config.bbox_padding_deg, 0.002);
    assert_eq!(config.probability_threshold, 0.0);
}

#[test]
fn test_load_rejects_invalid_values() {
    let file = temp_config(".json", r#"{ "probability_threshold": 1.5 }"#);
    assert!(matches!(
        Config::load(file.path()),
        Err(ForestError::InvalidConfig(_))
    ));
}

#[test]
fn test_load_rejects_unknown_fields() {
    let file = temp_config(".json", r#"{ "grid": 80 }"#);
    assert!(matches!(Config::load(file.path()), Err(ForestError::Json(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(Config::load(missing), Err(ForestError::Io(_))));
}

#[test]
fn test_saved_json_loads_back() {
    let config = Config::default()
        .with_grid_size(25)
        .with_time_range(Config::time_range_for(30.0, 5.0));
    let file = temp_config(".json", &config.to_json().unwrap());
    assert_eq!(Config::load(file.path()).unwrap(), config);
}

#[cfg(feature = "toml")]
#[test]
fn test_load_toml_file() {
    let file = temp_config(
        ".toml",
        "grid_size = 64\nprobability_threshold = 0.05\n",
    );
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.grid_size, 64);
    assert_eq!(config.probability_threshold, 0.05);
}

#[cfg(not(feature = "toml"))]
#[test]
fn test_load_toml_without_feature() {
    let file = temp_config(".toml", "grid_size = 64\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(ForestError::InvalidConfig(_))
    ));
}
