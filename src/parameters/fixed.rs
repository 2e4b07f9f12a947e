//! Parameters held at their starting value during a fit.

use crate::error::{FitError, Result};

/// Turn a list of held parameter indices into a per-position mask.
///
/// Duplicate indices are accepted. An index outside `0..parameter_count` is
/// an [`FitError::InvalidParameter`].
///
/// # Examples
///
/// ```
/// use lmcurve::parameters::fixed_mask;
///
/// assert_eq!(fixed_mask(&[2, 0], 3).unwrap(), vec![true, false, true]);
/// assert!(fixed_mask(&[3], 3).is_err());
/// ```
pub fn fixed_mask(indices: &[usize], parameter_count: usize) -> Result<Vec<bool>> {
    let mut mask = vec![false; parameter_count];
    for &index in indices {
        let slot = mask.get_mut(index).ok_or_else(|| {
            FitError::InvalidParameter(format!(
                "fixed parameter index {} out of range for {} parameters",
                index, parameter_count
            ))
        })?;
        *slot = true;
    }
    Ok(mask)
}
