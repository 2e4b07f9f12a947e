//! Loading fit configuration from JSON files.

use lmcurve::models::PolynomialModel;
use lmcurve::{DiffMethod, FitConfig, FitError, FitSession};
use ndarray::array;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("lmcurve-{}-{}.json", name, std::process::id()))
}

#[test]
fn test_file_round_trip() {
    let config = FitConfig::default()
        .with_max_iterations(42)
        .with_lambda(0.01)
        .with_diff_method(DiffMethod::FiniteDifference);
    let path = temp_path("round-trip");

    std::fs::write(&path, config.to_json_string().unwrap()).unwrap();
    let loaded = FitConfig::from_json_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.unwrap(), config);
}

#[test]
fn test_loaded_config_drives_session() {
    let path = temp_path("drives-session");
    std::fs::write(&path, r#"{ "max_iterations": 2, "diff_method": "FiniteDifference" }"#)
        .unwrap();
    let config = FitConfig::from_json_file(&path);
    std::fs::remove_file(&path).unwrap();
    let config = config.unwrap();

    let model = PolynomialModel::new(1);
    let mut session = FitSession::builder(&model, array![0.0, 1.0, 2.0], array![1.0, 0.0, 4.0])
        .with_config(config)
        .build()
        .unwrap();
    session.fit();

    assert!(!session.uses_analytic_derivatives());
    assert!(session.iterations() <= 2);
    assert_eq!(session.config().initial_lambda, 1e-3);
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        FitConfig::from_json_str("{ max_iterations: }"),
        Err(FitError::JsonError(_))
    ));
    assert!(matches!(
        FitConfig::from_json_str(r#"{ "diff_method": "Symbolic" }"#),
        Err(FitError::JsonError(_))
    ));
}
