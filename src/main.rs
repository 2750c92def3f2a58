use std::{env, io};

use log::{error, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use rprop_trainer::{
    ConvergenceWindow, GradientSource, Outcome, StopToken, Trainer, TrainingConfig,
    objectives::LogisticSource,
};
use tokio::{signal, task};

const FEATURES: usize = 10_000;
const SAMPLES: usize = 20_000;
const ACTIVE: usize = 200;
const L2: f64 = 1e-4;
const SEED: u64 = 42;

/// Trains a synthetic sparse logistic model, blocking the calling thread.
fn train(config: TrainingConfig, stop: StopToken) -> rprop_trainer::Result<Outcome> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut source = LogisticSource::synthetic(&mut rng, FEATURES, SAMPLES, ACTIVE)
        .with_penalties(config.rprop.rho1, L2);

    let mut trainer = Trainer::new(source.features(), &config)?;
    let mut monitor = ConvergenceWindow::new(&config.convergence);
    let mut weights = vec![0.; source.features()];

    let outcome = trainer.run(&mut weights, &mut source, &mut monitor, &stop)?;

    let active = weights.iter().filter(|&&w| w != 0.).count();
    info!(
        "active features: {active}/{}, training accuracy: {:.4}",
        weights.len(),
        source.accuracy(&weights)
    );

    Ok(outcome)
}

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => TrainingConfig::from_path(&path)?,
        None => TrainingConfig {
            max_iterations: 200,
            ..Default::default()
        },
    };

    let stop = StopToken::new();
    let token = stop.clone();
    let mut training = task::spawn_blocking(move || train(config, token));

    let joined = tokio::select! {
        res = &mut training => res,
        _ = signal::ctrl_c() => {
            warn!("interrupt received, stopping after the current iteration");
            stop.request();
            training.await
        }
    };

    let outcome = joined
        .map_err(|e| io::Error::other(format!("training join error: {e}")))?
        .inspect_err(|e| error!("training failed: {e}"))?;

    info!(
        "{} after {} iterations, objective {:?}",
        outcome.status, outcome.iterations, outcome.objective
    );

    Ok(())
}
