#![allow(missing_docs)]

use std::fs;

use hintlist::{ConfigError, HintlistConfig};
use tempfile::tempdir;

#[test]
fn loads_a_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("hintlist.toml");
    fs::write(
        &path,
        "[registry]\ncapacity = 64\n\n[oracle]\nreport_expiry_seconds = 90\nmax_oracles = 5\n",
    )?;
    let config = HintlistConfig::load(&path)?;
    assert_eq!(config.registry.capacity, Some(64));
    assert_eq!(config.oracle.report_expiry_seconds, 90);
    assert_eq!(config.oracle.max_oracles, Some(5));
    assert_eq!(config.registry_options().capacity, 64);
    assert_eq!(config.report_book(None).report_expiry_seconds(), 90);
    Ok(())
}

#[test]
fn partial_oracle_table_keeps_default_expiry() -> Result<(), ConfigError> {
    let config = HintlistConfig::from_toml_str("[oracle]\nmax_oracles = 3\n")?;
    assert_eq!(config.oracle.report_expiry_seconds, 300);
    Ok(())
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");
    match HintlistConfig::load(&path) {
        Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn parse_errors_carry_the_path() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[oracle]\nreport_expiry_seconds = \"soon\"\n")?;
    let err = HintlistConfig::load(&path).expect_err("string is not a duration");
    assert!(matches!(err, ConfigError::Parse { path: Some(ref p), .. } if *p == path));
    assert!(err.to_string().contains("broken.toml"));
    Ok(())
}
