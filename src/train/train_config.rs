use std::sync::mpsc;

use anyhow::{bail, Result};

use crate::activation::activation::ActivationFunction;
use crate::train::epoch_stats::EpochStats;

pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
pub const DEFAULT_EPOCHS: usize = 10;
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `learning_rate`: SGD step size, must be positive
/// - `epochs`: total number of full passes over the training data
/// - `batch_size`: samples per mini-batch; use `1` for online SGD
/// - `activation`: hidden-layer nonlinearity (must match how the
///   network was initialized)
/// - `seed`: seeds the per-epoch shuffle; `None` draws from entropy
/// - `progress_tx`: optional channel sender; one `EpochStats` is sent per
///   completed epoch. If the receiver is dropped the loop
///   stops after the current epoch.
#[derive(Debug)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub activation: ActivationFunction,
    pub seed: Option<u64>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with no seed and no progress channel.
    pub fn new(learning_rate: f64, epochs: usize, batch_size: usize, activation: ActivationFunction) -> Self {
        TrainConfig {
            learning_rate,
            epochs,
            batch_size,
            activation,
            seed: None,
            progress_tx: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            bail!("learning rate must be a positive number, got {}", self.learning_rate);
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        Ok(())
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(
            DEFAULT_LEARNING_RATE,
            DEFAULT_EPOCHS,
            DEFAULT_BATCH_SIZE,
            ActivationFunction::default(),
        )
    }
}
