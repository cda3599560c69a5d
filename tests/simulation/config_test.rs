/*!
 * Config file loading
 */

use pretty_assertions::assert_eq;
use sched_sim::{ConfigError, SimConfig, SimulationBuilder};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_partial_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"cores": 3, "seed": 5, "consumer": {{"min_latency_ms": 1, "max_latency_ms": 2}}}}"#
    )
    .unwrap();

    let config = SimConfig::load(file.path()).unwrap();
    assert_eq!(config.cores, 3);
    assert_eq!(config.seed, Some(5));
    assert_eq!(config.consumer.max_latency_ms, 2);
    assert_eq!(config.buffer_capacity, 5);

    let sim = SimulationBuilder::new().with_config(config).build().unwrap();
    assert_eq!(sim.cores().len(), 3);
}

#[test]
fn test_load_reports_parse_errors() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "cores = 3").unwrap();
    assert!(matches!(
        SimConfig::load(file.path()),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(matches!(
        SimConfig::load(&missing),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_config_round_trips_through_file() {
    let mut config = SimConfig::default();
    config.memory_capacity = 32;
    config.spawn.io_probability = 0.25;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string_pretty(&config).unwrap().as_bytes())
        .unwrap();
    assert_eq!(SimConfig::load(file.path()).unwrap(), config);
}
