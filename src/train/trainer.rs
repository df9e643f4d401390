use anyhow::Result;

use crate::data::stream::{DatasetPaths, IdxStream};
use crate::network::network::Network;
use crate::train::epoch_stats::TrainReport;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::TrainConfig;

/// Trains `network` on an IDX dataset read straight from disk.
///
/// The stream is open only for the duration of the run and is closed on
/// every exit path, including errors raised mid-epoch.
pub fn train_network(
    network: &mut Network,
    paths: &DatasetPaths,
    config: &TrainConfig,
) -> Result<TrainReport> {
    let mut stream = IdxStream::new(paths.clone());
    stream.using(|stream| train_loop(network, stream, config))
}
