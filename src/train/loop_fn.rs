use std::time::Instant;

use anyhow::{anyhow, bail, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::activation::activation::ActivationFunction;
use crate::data::source::SampleSource;
use crate::network::gradients::Gradients;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::{EpochStats, TrainReport};
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with mini-batch SGD for `config.epochs` epochs.
///
/// Every epoch visits each row of `source` once in a freshly shuffled order,
/// split into contiguous batches of `config.batch_size` (the last one may be
/// shorter). After each batch the averaged gradient is applied in place.
///
/// # Errors
/// - invalid configuration, or an empty `source`
/// - `source` returning no sample for an index inside `0..len()`; that means
///   the dataset and the loop disagree about its size and training stops
/// - any I/O error raised by `source`
///
/// # Early termination
/// If the `progress_tx` receiver has been dropped, the loop stops after the
/// epoch whose stats could not be delivered.
pub fn train_loop<S: SampleSource + ?Sized>(
    network: &mut Network,
    source: &mut S,
    config: &TrainConfig,
) -> Result<TrainReport> {
    config.validate()?;
    let dataset_len = source.len();
    if dataset_len == 0 {
        bail!("training dataset is empty");
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let optimizer = Sgd::new(config.learning_rate);

    info!(
        "Training model: {} samples, {} epochs, batch size {}, learning rate {}, {} activation",
        dataset_len, config.epochs, config.batch_size, config.learning_rate, config.activation
    );

    let run_start = Instant::now();
    let mut epoch_losses = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let mean_loss = run_one_epoch(
            network,
            source,
            &optimizer,
            config.batch_size,
            config.activation,
            &mut rng,
        )?;
        epoch_losses.push(mean_loss);
        network.loss = Some(mean_loss);

        let elapsed_ms = t_start.elapsed().as_millis() as u64;
        info!("Finished epoch {} of {} with loss: {:.4}", epoch, config.epochs, mean_loss);

        // ── Emit progress ─────────────────────────────────────────────────
        if let Some(ref tx) = config.progress_tx {
            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                mean_loss,
                elapsed_ms,
            };
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                info!("Progress receiver dropped; stopping after epoch {}", epoch);
                break;
            }
        }
    }

    let elapsed = run_start.elapsed();
    info!("Finished training in {:.2}s", elapsed.as_secs_f64());

    Ok(TrainReport { epoch_losses, elapsed })
}

/// A random permutation of `0..n`.
pub fn shuffle_indexes<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices
}

/// Mean gradient over the samples at `indices`.
///
/// The weight and bias gradients are divided by `indices.len()`, the batch's
/// real size; `loss` stays the sum of the per-sample losses.
pub fn batch_gradient<S: SampleSource + ?Sized>(
    network: &Network,
    source: &mut S,
    indices: &[usize],
    activation: ActivationFunction,
) -> Result<Gradients> {
    if indices.is_empty() {
        bail!("cannot compute the gradient of an empty batch");
    }

    let mut acc = Gradients::zeros_like(network);
    for &idx in indices {
        let sample = source
            .sample_at(idx)?
            .ok_or_else(|| anyhow!("No sample was found for row {}", idx))?;
        acc.accumulate(&network.backward(&sample, activation));
    }

    acc.scale(1.0 / indices.len() as f64);
    Ok(acc)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs one full epoch of mini-batch SGD over `source`.
/// Returns the mean loss over all samples.
fn run_one_epoch<S: SampleSource + ?Sized, R: Rng + ?Sized>(
    network: &mut Network,
    source: &mut S,
    optimizer: &Sgd,
    batch_size: usize,
    activation: ActivationFunction,
    rng: &mut R,
) -> Result<f64> {
    let n = source.len();
    let indices = shuffle_indexes(n, rng);
    let mut epoch_loss = 0.0;

    for (b, batch) in indices.chunks(batch_size).enumerate() {
        let grads = batch_gradient(network, source, batch, activation)?;
        optimizer.step(network, &grads);
        epoch_loss += grads.loss;
        debug!("batch {}: {} samples, loss {:.6}", b, batch.len(), grads.loss / batch.len() as f64);
    }

    Ok(epoch_loss / n as f64)
}
