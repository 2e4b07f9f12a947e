use approx::assert_relative_eq;
use lmcurve::lm::linear_solver::solve_in_place;
use lmcurve::lm::normal_equations::assemble;
use ndarray::{Array1, Array2};
use proptest::prelude::*;

/// Square, strictly diagonally dominant matrix with its size.
fn dominant_matrix() -> impl Strategy<Value = Array2<f64>> {
    (1usize..7).prop_flat_map(|n| {
        prop::collection::vec(-1.0f64..1.0, n * n).prop_map(move |values| {
            let mut matrix = Array2::from_shape_vec((n, n), values).unwrap();
            for i in 0..n {
                let off: f64 = (0..n).filter(|&j| j != i).map(|j| matrix[[i, j]].abs()).sum();
                matrix[[i, i]] = off + 1.0 + matrix[[i, i]].abs();
            }
            matrix
        })
    })
}

proptest! {
    #[test]
    fn solver_recovers_reference_solution(
        matrix in dominant_matrix(),
        seed in prop::collection::vec(-10.0f64..10.0, 6),
    ) {
        let n = matrix.nrows();
        let expected = Array1::from_iter(seed.into_iter().take(n));
        let mut rhs = matrix.dot(&expected);
        let mut work = matrix.clone();
        let mut solution = Array1::zeros(n);

        let rank = solve_in_place(&mut work, &mut rhs, &mut solution);

        prop_assert_eq!(rank, n);
        for (s, e) in solution.iter().zip(expected.iter()) {
            assert_relative_eq!(*s, *e, epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[test]
    fn solver_handles_held_rows_anywhere(
        matrix in dominant_matrix(),
        mask in prop::collection::vec(any::<bool>(), 6),
        seed in prop::collection::vec(-10.0f64..10.0, 6),
    ) {
        let n = matrix.nrows();
        let held: Vec<bool> = mask.into_iter().take(n).collect();
        let mut matrix = matrix;
        let mut expected = Array1::from_iter(seed.into_iter().take(n));
        for (i, &is_held) in held.iter().enumerate() {
            if is_held {
                matrix.row_mut(i).fill(0.0);
                matrix.column_mut(i).fill(0.0);
                expected[i] = 0.0;
            }
        }
        let mut rhs = matrix.dot(&expected);
        let mut work = matrix.clone();
        let mut solution = Array1::from_elem(n, f64::NAN);

        let rank = solve_in_place(&mut work, &mut rhs, &mut solution);

        prop_assert_eq!(rank, held.iter().filter(|&&h| !h).count());
        for (i, &is_held) in held.iter().enumerate() {
            if is_held {
                prop_assert_eq!(solution[i], 0.0);
            } else {
                assert_relative_eq!(solution[i], expected[i], epsilon = 1e-9, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn damped_hessian_is_symmetric(
        (rows, cols, values) in (1usize..12, 1usize..6)
            .prop_flat_map(|(r, c)| (Just(r), Just(c), prop::collection::vec(-5.0f64..5.0, r * c))),
        lambda in 1e-8f64..1e4,
    ) {
        let derivs = Array2::from_shape_vec((rows, cols), values).unwrap();
        let y = Array1::linspace(0.0, 1.0, rows);
        let estimates = Array1::zeros(rows);
        let mut hessian = Array2::zeros((cols, cols));
        let mut gradient = Array1::zeros(cols);

        assemble(&derivs, &y, &estimates, lambda, &mut hessian, &mut gradient);

        for r in 0..cols {
            let column = derivs.column(r);
            assert_relative_eq!(
                hessian[[r, r]],
                column.dot(&column) * (1.0 + lambda),
                max_relative = 1e-12
            );
            for c in 0..cols {
                prop_assert_eq!(hessian[[r, c]], hessian[[c, r]]);
            }
        }
    }
}
