//! Dense linear solve for the damped normal equations.
//!
//! Gaussian elimination with partial pivoting followed by back-substitution,
//! working in place on the caller's buffers.
//!
//! Held parameters contribute rows and columns that are exactly zero. A
//! column whose best pivot is exactly zero is skipped without consuming a
//! pivot row, and its unknown is set to zero, so zero rows and columns may
//! sit at any index.

use ndarray::{Array1, Array2};

/// Solve `matrix * solution = rhs`.
///
/// `matrix` and `rhs` are overwritten with the eliminated system. Unknowns
/// whose column has no usable pivot are set to zero.
///
/// # Arguments
///
/// * `matrix` - Square coefficient matrix, destroyed
/// * `rhs` - Right-hand side, destroyed
/// * `solution` - Output, same length as `rhs`
///
/// # Returns
///
/// * The number of pivots found (the numerical rank)
pub fn solve_in_place(
    matrix: &mut Array2<f64>,
    rhs: &mut Array1<f64>,
    solution: &mut Array1<f64>,
) -> usize {
    let n = matrix.nrows();
    solution.fill(0.0);

    // Forward elimination with partial pivoting
    let mut row = 0;
    for col in 0..n {
        if row == n {
            break;
        }

        let mut best_row = row;
        let mut best_abs = matrix[[row, col]].abs();
        for r in (row + 1)..n {
            let candidate = matrix[[r, col]].abs();
            if candidate > best_abs {
                best_abs = candidate;
                best_row = r;
            }
        }

        if best_abs == 0.0 {
            continue;
        }

        if best_row != row {
            for c in 0..n {
                matrix.swap([row, c], [best_row, c]);
            }
            rhs.swap(row, best_row);
        }

        let pivot = matrix[[row, col]];
        for r in (row + 1)..n {
            let factor = matrix[[r, col]] / pivot;
            // Cleared even when the factor underflows, so back substitution
            // sees an exact zero left of every pivot
            matrix[[r, col]] = 0.0;
            if factor == 0.0 {
                continue;
            }
            for c in (col + 1)..n {
                matrix[[r, c]] -= factor * matrix[[row, c]];
            }
            rhs[r] -= factor * rhs[row];
        }

        row += 1;
    }

    // Back substitution; every entry left of a row's pivot is exactly zero
    let rank = row;
    for r in (0..rank).rev() {
        let Some(col) = (0..n).find(|&c| matrix[[r, c]] != 0.0) else {
            continue;
        };
        let mut sum = rhs[r];
        for c in (col + 1)..n {
            sum -= matrix[[r, c]] * solution[c];
        }
        solution[col] = sum / matrix[[r, col]];
    }

    rank
}
