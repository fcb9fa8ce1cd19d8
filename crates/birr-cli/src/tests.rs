//! End-to-end CLI command tests against a temporary data directory

use std::fs;
use std::path::Path;

use crate::commands;
use birr_core::Dataset;

const RAW: &str = "\
id,record_type,date,pillar,category,indicator,value,event_ref,indicator_ref,lag_months,effect,target_value,target_date,source,description
OBS-001,observation,2014,Access,,ACC_OWNERSHIP,22,,,,,,,Findex,
OBS-002,observation,2017,Access,,ACC_OWNERSHIP,35,,,,,,,Findex,
OBS-003,observation,2021,Access,,ACC_OWNERSHIP,46,,,,,,,Findex,
OBS-004,observation,2017,Usage,,USG_DIGITAL_PAYMENT,11.9,,,,,,,Findex,
OBS-005,observation,2021,Usage,,USG_DIGITAL_PAYMENT,20.3,,,,,,,Findex,
EVT-001,event,2021-05,,product_launch,,,,,,,,,,Telebirr launched
IMP-001,impact_link,,,,,,EVT-001,Usage,12,2.5,,,,Onboarding surge
TGT-001,target,,,,ACC_OWNERSHIP,,,,,,60,2027-12-31,NFIS-II,Headline target
";

const ADDITIONS: &str = "\
id,record_type,date,pillar,category,indicator,value,event_ref,indicator_ref,lag_months,effect,target_value,target_date,source,description
OBS-006,observation,2023,Usage,,USG_DIGITAL_PAYMENT,24.6,,,,,,,NBE,
EVT-002,event,2023-08,,product_launch,,,,,,,,,,M-Pesa Ethiopia launched
IMP-002,impact_link,,,,,,EVT-002,Usage,18,1.2,,,,
";

fn seed(data_dir: &Path) {
    fs::create_dir_all(data_dir.join("raw")).unwrap();
    fs::write(commands::raw_path(data_dir), RAW).unwrap();
    fs::write(commands::default_additions_path(data_dir), ADDITIONS).unwrap();
}

#[test]
fn test_enrich_writes_processed_and_log() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path();
    seed(data_dir);

    commands::cmd_enrich(data_dir, None, None, None, None).unwrap();

    let processed = Dataset::from_path(&commands::processed_path(data_dir)).unwrap();
    assert_eq!(processed.len(), 11);

    let log = fs::read_to_string(commands::change_log_path(data_dir)).unwrap();
    assert!(log.contains("Rows appended: 3"));
    assert!(log.contains("+ OBS-006"));

    // Re-running over the same additions appends nothing
    commands::cmd_enrich(data_dir, None, None, None, None).unwrap();
    let again = Dataset::from_path(&commands::processed_path(data_dir)).unwrap();
    assert_eq!(again.len(), 11);
}

#[test]
fn test_enrich_fails_on_missing_raw() {
    let dir = tempfile::tempdir().unwrap();
    let err = commands::cmd_enrich(dir.path(), None, None, None, None).unwrap_err();
    assert!(err.to_string().contains("raw"));
}

#[test]
fn test_validate_clean_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path();
    seed(data_dir);

    commands::cmd_validate(data_dir, None).unwrap();
}

#[test]
fn test_validate_fails_on_broken_reference() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path();
    fs::create_dir_all(data_dir.join("raw")).unwrap();

    let broken = RAW.replace(",,EVT-001,Usage,", ",,EVT-404,Usage,");
    fs::write(commands::raw_path(data_dir), broken).unwrap();

    let err = commands::cmd_validate(data_dir, None).unwrap_err();
    assert!(err.to_string().contains("validation failed"));
}

#[test]
fn test_forecast_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path();
    seed(data_dir);

    commands::cmd_enrich(data_dir, None, None, None, None).unwrap();
    commands::cmd_forecast(data_dir, None, None, None).unwrap();

    let long = fs::read_to_string(commands::forecast_long_path(data_dir)).unwrap();
    assert!(long.starts_with("indicator,year,scenario,forecast_value,lower,upper"));
    // 2 indicators x 3 years x 3 scenarios + header
    assert_eq!(long.lines().count(), 19);

    let wide = fs::read_to_string(commands::forecast_wide_path(data_dir)).unwrap();
    assert_eq!(wide.lines().count(), 7);
}

#[test]
fn test_impact_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path();
    seed(data_dir);

    commands::cmd_impact(data_dir, None).unwrap();

    let features = fs::read_to_string(commands::features_path(data_dir)).unwrap();
    assert!(features.starts_with("month,event_effect_USG_DIGITAL_PAYMENT"));

    let matrix = fs::read_to_string(commands::matrix_path(data_dir)).unwrap();
    assert!(matrix.contains("EVT-001"));
}
