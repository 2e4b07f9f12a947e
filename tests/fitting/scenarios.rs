use approx::assert_relative_eq;
use lmcurve::lm::FitSessionBuilder;
use lmcurve::models::{ExponentialModel, GaussianModel, PolynomialModel};
use lmcurve::{ConvergenceStatus, DiffMethod, FitConfig, FitError, FitSession, FnModel, Model};
use ndarray::{array, Array1};

use crate::test_helpers::noisy_samples;

#[test]
fn test_linear_data_converges_quickly() {
    let model = PolynomialModel::new(1);
    let x = array![0.0, 1.0, 2.0, 3.0, 4.0];
    let y = x.mapv(|x_val| 2.0 + 3.0 * x_val);

    let mut session = FitSession::builder(&model, x, y)
        .with_initial_parameters(array![0.0, 0.0])
        .build()
        .unwrap();
    let status = session.fit();

    assert_eq!(status, ConvergenceStatus::DeltaChi2);
    assert!(session.iterations() < 10, "took {} iterations", session.iterations());
    assert_relative_eq!(session.parameters()[0], 2.0, epsilon = 1e-9);
    assert_relative_eq!(session.parameters()[1], 3.0, epsilon = 1e-9);
    assert!(session.chi_squared() < 1e-20);
}

#[test]
fn test_two_exact_points_recover_line() {
    // No closed-form derivatives: the numerical path must recover the line too
    let model = FnModel::new(array![0.0, 0.0], |p, x| p[0] + p[1] * x);
    let mut session = FitSession::new(&model, array![1.0, 3.0], array![5.0, 11.0]).unwrap();

    session.fit();

    assert!(!session.uses_analytic_derivatives());
    assert_relative_eq!(session.parameters()[0], 2.0, epsilon = 1e-9);
    assert_relative_eq!(session.parameters()[1], 3.0, epsilon = 1e-9);
}

#[test]
fn test_length_mismatch_rejected_before_fit() {
    let model = PolynomialModel::new(1);
    let result = FitSession::new(
        &model,
        array![0.0, 1.0, 2.0, 3.0, 4.0],
        array![2.0, 5.0, 8.0, 11.0],
    );

    match result {
        Err(FitError::DimensionMismatch(msg)) => assert!(msg.contains('5') && msg.contains('4')),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("mismatched samples accepted"),
    }
}

#[test]
fn test_non_finite_model_stops_with_numerical_error() {
    // sqrt of a negative start is NaN everywhere
    let model = FnModel::new(array![-4.0, 1.0], |p, x| p[0].sqrt() + p[1] * x);
    let start = model.initial_parameters();
    let mut session =
        FitSession::new(&model, array![0.0, 1.0, 2.0], array![1.0, 2.0, 3.0]).unwrap();

    let status = session.fit();

    assert_eq!(status, ConvergenceStatus::NumericalError);
    assert_eq!(session.status(), ConvergenceStatus::NumericalError);
    assert_eq!(session.iterations(), 1);
    assert_eq!(session.parameters(), &start);
}

#[test]
fn test_overflowing_trial_is_rejected() {
    // The first Gauss-Newton step from p = 0 overshoots to exp(~8600) = inf
    let model = FnModel::new(array![0.0], |p, x| (p[0] * x).exp())
        .with_derivatives(|p, x, mut out| out[0] = x * (p[0] * x).exp());
    let x = Array1::linspace(0.0, 100.0, 11);
    let y = x.mapv(|x_val: f64| (0.1 * x_val).exp());

    let mut session = FitSession::builder(&model, x.clone(), y.clone())
        .with_config(FitConfig::default().with_max_iterations(1))
        .build()
        .unwrap();
    let start_chi2 = session.chi_squared();

    assert_eq!(session.fit(), ConvergenceStatus::MaxIterationsReached);
    assert_eq!(session.parameters()[0], 0.0);
    assert_eq!(session.chi_squared(), start_chi2);
    assert_relative_eq!(session.lambda(), 1e-2, max_relative = 1e-12);

    let mut session = FitSession::new(&model, x, y).unwrap();
    let status = session.fit();

    assert!(status.is_converged(), "status: {}", status);
    assert_relative_eq!(session.parameters()[0], 0.1, epsilon = 1e-9);
}

#[test]
fn test_status_before_fit() {
    let model = PolynomialModel::new(1);
    let session = FitSession::new(&model, array![0.0, 1.0], array![0.0, 1.0]).unwrap();

    assert_eq!(session.status(), ConvergenceStatus::NotStarted);
    assert_eq!(session.iterations(), 0);
    assert_eq!(session.lambda(), 1e-3);
    // chi-squared of the starting parameters [1, 0]
    assert_relative_eq!(session.chi_squared(), 1.0);
}

fn noisy_exponential_session(model: &ExponentialModel) -> FitSessionBuilder<'_, ExponentialModel> {
    let x = Array1::linspace(0.0, 6.0, 40);
    let y = noisy_samples(model, &array![3.0, 1.5], &x, 0.02, 7);
    FitSession::builder(model, x, y).with_initial_parameters(array![1.0, 1.0])
}

#[test]
fn test_accepted_chi_squared_never_increases() {
    let model = ExponentialModel::new();
    let mut session = noisy_exponential_session(&model)
        .with_config(FitConfig::default().with_max_iterations(1))
        .build()
        .unwrap();

    let mut previous_chi2 = session.chi_squared();
    let mut previous_lambda = session.lambda();
    for _ in 0..30 {
        session.fit();
        let chi2 = session.chi_squared();
        let lambda = session.lambda();

        assert!(chi2 <= previous_chi2, "{} > {}", chi2, previous_chi2);
        if chi2 < previous_chi2 {
            assert_relative_eq!(lambda, previous_lambda / 10.0, max_relative = 1e-12);
        } else {
            assert_relative_eq!(lambda, previous_lambda * 10.0, max_relative = 1e-12);
        }

        previous_chi2 = chi2;
        previous_lambda = lambda;
    }
}

#[test]
fn test_noisy_exponential_fit() {
    let model = ExponentialModel::new();
    let mut session = noisy_exponential_session(&model).build().unwrap();

    let status = session.fit();

    assert!(status.is_terminated());
    assert_ne!(status, ConvergenceStatus::NumericalError);
    assert_relative_eq!(session.parameters()[0], 3.0, epsilon = 0.05);
    assert_relative_eq!(session.parameters()[1], 1.5, epsilon = 0.05);
}

#[test]
fn test_relative_stop_is_opt_in() {
    let model = ExponentialModel::new();
    let mut session = noisy_exponential_session(&model)
        .with_config(FitConfig::default().with_relative_delta_chi2(1e-12))
        .build()
        .unwrap();

    let status = session.fit();

    assert!(status.is_converged(), "status: {}", status);
    assert!(session.iterations() < 100);
    assert_relative_eq!(session.parameters()[0], 3.0, epsilon = 0.05);
    assert_relative_eq!(session.parameters()[1], 1.5, epsilon = 0.05);
}

#[test]
fn test_numerical_and_analytic_fits_agree() {
    let model = ExponentialModel::new();
    let mut analytic = noisy_exponential_session(&model).build().unwrap();
    let mut numerical = noisy_exponential_session(&model)
        .with_config(FitConfig::default().with_diff_method(DiffMethod::FiniteDifference))
        .build()
        .unwrap();

    analytic.fit();
    numerical.fit();

    assert!(analytic.uses_analytic_derivatives());
    assert!(!numerical.uses_analytic_derivatives());
    for (a, n) in analytic.parameters().iter().zip(numerical.parameters()) {
        assert_relative_eq!(*a, *n, epsilon = 2e-3);
    }
}

#[test]
fn test_fixed_parameter_is_bit_identical() {
    let model = GaussianModel::new();
    let x = Array1::linspace(-5.0, 5.0, 101);
    let y = model.predict(&array![3.0, 0.5, 1.0], &x);

    // Exact center: the free parameters are recovered
    let mut session = FitSession::builder(&model, x.clone(), y.clone())
        .with_initial_parameters(array![1.0, 0.5, 2.0])
        .with_fixed(&[1])
        .build()
        .unwrap();
    session.fit();

    assert_eq!(session.parameters()[1].to_bits(), 0.5_f64.to_bits());
    assert_relative_eq!(session.parameters()[0], 3.0, epsilon = 1e-8);
    assert_relative_eq!(session.parameters()[2], 1.0, epsilon = 1e-8);

    // A wrong held value is kept all the same
    let held = 0.123_456_789_f64;
    let mut session = FitSession::builder(&model, x, y)
        .with_initial_parameters(array![1.0, held, 2.0])
        .with_fixed(&[1])
        .build()
        .unwrap();
    session.fit();

    assert_eq!(session.parameters()[1].to_bits(), held.to_bits());
}

#[test]
fn test_report_lists_parameters() {
    let model = ExponentialModel::new();
    let mut session = noisy_exponential_session(&model).build().unwrap();
    session.fit();

    let report = session.report();
    assert_eq!(report.names, vec!["amplitude", "decay"]);
    assert_eq!(report.iterations, session.iterations());
    assert_eq!(report.status, session.status());

    let text = report.to_string();
    assert!(text.contains("amplitude"));
    assert!(text.contains("decay"));
    assert!(text.contains("analytic"));
}

#[cfg(feature = "parallel")]
#[test]
fn test_batch_fit_matches_sequential() {
    use lmcurve::lm::fit_batch;

    let model = PolynomialModel::new(2);
    let x = Array1::linspace(-2.0, 2.0, 25);
    let datasets: Vec<_> = (0..6)
        .map(|seed| {
            let y = noisy_samples(&model, &array![1.0, -0.5, 0.25], &x, 0.01, seed);
            (x.clone(), y)
        })
        .collect();

    let batch = fit_batch(&model, &datasets, &FitConfig::default());

    for ((x, y), result) in datasets.iter().zip(&batch) {
        let mut session = FitSession::new(&model, x.clone(), y.clone()).unwrap();
        session.fit();
        let report = result.as_ref().unwrap();
        assert_eq!(&report.params, session.parameters());
        assert_eq!(report.chi_squared, session.chi_squared());
    }
}
