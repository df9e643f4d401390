use anyhow::{anyhow, Result};
use log::info;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::data::source::SampleSource;
use crate::data::stream::{DatasetPaths, IdxStream};
use crate::network::network::Network;

/// Prediction tally over a labelled dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub samples: usize,
    pub success_count: usize,
    pub error_count: usize,
}

impl BenchmarkResult {
    /// Fraction of samples predicted correctly; 0 for an empty run.
    pub fn accuracy(&self) -> f64 {
        ratio(self.success_count, self.samples)
    }

    pub fn error_rate(&self) -> f64 {
        ratio(self.error_count, self.samples)
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { count as f64 / total as f64 }
}

/// Predicts every sample of `source` (arg-max of softmax over the output
/// logits) and counts hits and misses against the true labels.
///
/// A missing row inside `0..len()` is fatal, as in training.
pub fn benchmark<S: SampleSource + ?Sized>(
    network: &Network,
    source: &mut S,
    activation: ActivationFunction,
) -> Result<BenchmarkResult> {
    let n = source.len();
    info!("Predicting {} samples", n);

    let mut result = BenchmarkResult { samples: n, ..Default::default() };
    for i in 0..n {
        let sample = source
            .sample_at(i)?
            .ok_or_else(|| anyhow!("No sample was found for row {}", i))?;
        if network.predict(&sample.input, activation) == sample.label {
            result.success_count += 1;
        } else {
            result.error_count += 1;
        }
    }

    info!("Accuracy: {:.4} ({} / {})", result.accuracy(), result.success_count, n);
    Ok(result)
}

/// `benchmark` over an IDX dataset on disk; the stream is closed afterwards
/// even if evaluation fails.
pub fn benchmark_idx(
    network: &Network,
    paths: &DatasetPaths,
    activation: ActivationFunction,
) -> Result<BenchmarkResult> {
    let mut stream = IdxStream::new(paths.clone());
    stream.using(|stream| benchmark(network, stream, activation))
}
