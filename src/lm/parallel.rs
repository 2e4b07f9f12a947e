//! Parallel fitting of independent datasets.
//!
//! Each dataset gets its own [`FitSession`]; sessions share nothing but the
//! model, so they run on the rayon thread pool without synchronisation.

use ndarray::Array1;
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::model::Model;

use super::algorithm::{FitReport, FitSession};
use super::config::FitConfig;

/// Fit `model` to every `(x, y)` pair in `datasets`.
///
/// Results come back in dataset order. A dataset that fails validation yields
/// its error without affecting the others.
///
/// # Arguments
///
/// * `model` - The model, shared by all fits
/// * `datasets` - Sample sets as `(x, y)` pairs
/// * `config` - Configuration used for every fit
///
/// # Returns
///
/// * One fit report or error per dataset
pub fn fit_batch<M>(
    model: &M,
    datasets: &[(Array1<f64>, Array1<f64>)],
    config: &FitConfig,
) -> Vec<Result<FitReport>>
where
    M: Model + Sync + ?Sized,
{
    debug!(datasets = datasets.len(), "starting batch fit");

    datasets
        .par_iter()
        .map(|(x, y)| {
            let mut session = FitSession::builder(model, x.clone(), y.clone())
                .with_config(config.clone())
                .build()?;
            session.fit();
            Ok(session.report())
        })
        .collect()
}
