//! Fit an exponential decay to noisy samples and print the result.
//!
//! Set `RUST_LOG=lmcurve=debug` to follow the fit iteration by iteration.

use lmcurve::models::{ExponentialModel, SigmoidModel};
use lmcurve::{FitConfig, FitSession, Model};
use ndarray::{array, Array1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::Level;

fn init_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}

fn noisy<M: Model>(
    model: &M,
    params: &Array1<f64>,
    x: &Array1<f64>,
    rng: &mut ChaCha8Rng,
) -> Result<Array1<f64>, rand_distr::NormalError> {
    let normal = Normal::new(0.0, 0.05)?;
    Ok(x.mapv(|x_val| model.eval(params, x_val) + normal.sample(&mut *rng)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    println!("1. Exponential decay, closed-form derivatives");
    println!("---------------------------------------------");
    let model = ExponentialModel::new();
    let x = Array1::linspace(0.0, 8.0, 60);
    let y = noisy(&model, &array![5.0, 2.0], &x, &mut rng)?;

    let guess = model.guess(&x, &y)?;
    println!("Initial guess: {}", guess);

    let mut session = FitSession::builder(&model, x, y)
        .with_initial_parameters(guess)
        .build()?;
    session.fit();
    println!("{}", session.report());

    let uncertainties = session.uncertainties()?;
    for (name, (value, error)) in model
        .parameter_names()
        .iter()
        .zip(session.parameters().iter().zip(uncertainties.standard_errors.iter()))
    {
        println!("  {:<10} = {:.4} ± {:.4}", name, value, error);
    }
    println!("  reduced chi-square = {:.4e}\n", uncertainties.reduced_chi_squared);

    println!("2. Sigmoid step, numerical derivatives");
    println!("--------------------------------------");
    let model = SigmoidModel::new();
    let x = Array1::linspace(-6.0, 6.0, 80);
    let y = noisy(&model, &array![3.0, 0.5, 0.7], &x, &mut rng)?;

    let guess = model.guess(&x, &y)?;
    let mut session = FitSession::builder(&model, x, y)
        .with_initial_parameters(guess)
        .with_config(FitConfig::default().with_max_iterations(200))
        .build()?;
    session.fit();
    println!("{}", session.report());

    Ok(())
}
