use approx::assert_relative_eq;
use lmcurve::models::{ExponentialModel, PolynomialModel};
use lmcurve::utils::finite_difference::{derivative, DEFAULT_THRESHOLD, SHRINK_FACTOR};
use lmcurve::{FitConfig, FitSession, Model};
use ndarray::{array, Array1};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fixed_parameters_survive_any_position(
        truth in prop::collection::vec(-3.0f64..3.0, 4),
        offsets in prop::collection::vec(-2.0f64..2.0, 4),
        mask in prop::collection::vec(any::<bool>(), 4),
    ) {
        let model = PolynomialModel::new(3);
        let truth = Array1::from(truth);
        let x = Array1::linspace(-1.5, 1.5, 12);
        let y = model.predict(&truth, &x);

        // Held entries start at their true value, free ones are perturbed
        let fixed: Vec<usize> = (0..4).filter(|&i| mask[i]).collect();
        let start = Array1::from_iter(
            (0..4).map(|i| if mask[i] { truth[i] } else { truth[i] + offsets[i] }),
        );

        let mut session = FitSession::builder(&model, x, y)
            .with_initial_parameters(start.clone())
            .with_fixed(&fixed)
            .build()
            .unwrap();
        session.fit();

        let params = session.parameters();
        for i in 0..4 {
            if mask[i] {
                prop_assert_eq!(params[i].to_bits(), start[i].to_bits());
            } else {
                assert_relative_eq!(params[i], truth[i], epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn accepted_chi_squared_is_monotone(
        amplitude in 0.1f64..5.0,
        decay in 0.2f64..5.0,
    ) {
        let model = ExponentialModel::new();
        let x = Array1::linspace(0.0, 4.0, 25);
        let y = model.predict(&array![2.0, 1.3], &x);

        let mut session = FitSession::builder(&model, x, y)
            .with_initial_parameters(array![amplitude, decay])
            .with_config(FitConfig::default().with_max_iterations(1))
            .build()
            .unwrap();

        let mut previous = session.chi_squared();
        for _ in 0..15 {
            session.fit();
            prop_assert!(session.chi_squared() <= previous);
            prop_assert!(session.parameters()[1] > 0.0);
            prop_assert!(session.lambda() > 0.0);
            previous = session.chi_squared();
        }
    }

    #[test]
    fn numerical_derivative_tracks_analytic(
        amplitude in 0.5f64..5.0,
        decay in 1.0f64..3.0,
        fraction in 0.0f64..1.0,
    ) {
        // Within x <= 2 * decay the curvature in decay keeps one sign over
        // the probed interval
        let model = ExponentialModel::new();
        let params = array![amplitude, decay];
        let x = 2.0 * decay * fraction;

        let mut analytic = Array1::zeros(2);
        model
            .derivative()
            .unwrap()
            .eval_derivatives(&params, x, analytic.view_mut());

        let tolerance = 2.0 * DEFAULT_THRESHOLD / (SHRINK_FACTOR - 1.0);
        for j in 0..2 {
            let numerical = derivative(&model, &params, j, x, DEFAULT_THRESHOLD);
            prop_assert!(
                (numerical - analytic[j]).abs() <= tolerance,
                "d/dp{} at x = {}: {} vs {}",
                j,
                x,
                numerical,
                analytic[j]
            );
        }
    }
}
