use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ferrite_digits::data::{DatasetPaths, Split};
use ferrite_digits::eval::benchmark_idx;
use ferrite_digits::network::store::{DEFAULT_MODEL_DIR, DEFAULT_MODEL_NAME};
use ferrite_digits::train::train_config::{DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE};
use ferrite_digits::{ActivationFunction, ModelStore, Network, NetworkSpec, TrainConfig, train_network};

const DEFAULT_DATA_DIR: &str = "data";

/// Handwritten digit classifier trained on MNIST IDX files
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Train the stored model for the chosen activation, creating it if needed
    Train {
        #[command(flatten)]
        common: CommonArgs,
        /// Training epochs
        #[arg(long, default_value_t = DEFAULT_EPOCHS)]
        epochs: usize,
        /// Mini-batch size
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// SGD step size
        #[arg(long, default_value_t = DEFAULT_LEARNING_RATE)]
        learning_rate: f64,
        /// Seed initialization and shuffling
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Measure accuracy of the stored model on the test split
    Benchmark {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Directory holding the IDX files
    #[arg(long = "data", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Model directory
    #[arg(long = "models", default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,
    /// Model name
    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    name: String,
    /// Hidden-layer activation: relu or sigmoid
    #[arg(long, default_value_t = ActivationFunction::default())]
    activation: ActivationFunction,
}

impl CommonArgs {
    fn store(&self) -> ModelStore {
        ModelStore::new(&self.model_dir, &self.name)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Train { common, epochs, batch_size, learning_rate, seed } => {
            let mut config = TrainConfig::new(learning_rate, epochs, batch_size, common.activation);
            config.seed = seed;
            run_train(&common, &config)
        }
        Command::Benchmark { common } => run_benchmark(&common),
    }
}

fn run_train(common: &CommonArgs, config: &TrainConfig) -> Result<()> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let store = common.store();
    let spec = NetworkSpec::preset(common.activation);
    let mut network = Network::load_or_create(&store, &spec, &mut rng)?;

    let paths = DatasetPaths::split(&common.data_dir, Split::Train);
    let report = train_network(&mut network, &paths, config)?;

    println!("\nEpochs Loss:");
    println!("{:>7}  {:>10}", "Epoch", "Loss");
    println!("{}", "-".repeat(19));
    for (i, loss) in report.epoch_losses.iter().enumerate() {
        println!("{:>7}  {:>10.4}", i + 1, loss);
    }
    println!("\n{}", format_elapsed(report.elapsed));

    network.save(&store, common.activation)?;
    println!("Model saved to {}", store.path_for(common.activation).display());
    Ok(())
}

fn run_benchmark(common: &CommonArgs) -> Result<()> {
    let store = common.store();
    let path = store.path_for(common.activation);
    let network = Network::load(&store, common.activation)?
        .ok_or_else(|| anyhow!("no trained model at {}", path.display()))?;

    let paths = DatasetPaths::split(&common.data_dir, Split::Test);
    let result = benchmark_idx(&network, &paths, common.activation)?;

    println!("\nBenchmark Results:");
    println!("{:<24} {:>10}", "Total Samples", result.samples);
    println!("{:<24} {:>10}", "Predicted Successfully", result.success_count);
    println!("{:<24} {:>10}", "Predicted Errorfully", result.error_count);
    println!("{:<24} {:>10.4}", "Accuracy", result.accuracy());
    println!("{:<24} {:>10.4}", "Error Rate", result.error_rate());
    Ok(())
}

/// Whole minutes plus the remaining seconds, truncated to hundredths.
fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hundredths = elapsed.subsec_millis() / 10;
    format!(
        "Executed in {} minutes and {}.{:02} seconds",
        total / 60,
        total % 60,
        hundredths
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn train_accepts_equals_and_space_forms() {
        let cli = Cli::try_parse_from([
            "ferrite-digits", "train", "--epochs=5", "--batch-size", "32",
            "--learning-rate=0.1", "--activation", "sigmoid", "--seed", "7",
        ])
        .unwrap();
        match cli.command {
            Command::Train { common, epochs, batch_size, learning_rate, seed } => {
                assert_eq!(epochs, 5);
                assert_eq!(batch_size, 32);
                assert_eq!(learning_rate, 0.1);
                assert_eq!(seed, Some(7));
                assert_eq!(common.activation, ActivationFunction::Sigmoid);
                assert_eq!(common.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
            }
            Command::Benchmark { .. } => panic!("expected the train command"),
        }
    }

    #[test]
    fn defaults_match_training_constants() {
        let cli = Cli::try_parse_from(["ferrite-digits", "train"]).unwrap();
        match cli.command {
            Command::Train { common, epochs, batch_size, learning_rate, seed } => {
                assert_eq!(epochs, DEFAULT_EPOCHS);
                assert_eq!(batch_size, DEFAULT_BATCH_SIZE);
                assert_eq!(learning_rate, DEFAULT_LEARNING_RATE);
                assert_eq!(seed, None);
                assert_eq!(common.activation, ActivationFunction::ReLU);
                assert_eq!(common.name, DEFAULT_MODEL_NAME);
            }
            Command::Benchmark { .. } => panic!("expected the train command"),
        }
    }

    #[test]
    fn unknown_activation_is_rejected() {
        let err = Cli::try_parse_from(["ferrite-digits", "benchmark", "--activation", "tanh"]).unwrap_err();
        assert!(err.to_string().contains("tanh"));
    }

    #[test]
    fn elapsed_never_rounds_up_to_sixty_seconds() {
        assert_eq!(
            format_elapsed(Duration::from_millis(119_999)),
            "Executed in 1 minutes and 59.99 seconds"
        );
        assert_eq!(
            format_elapsed(Duration::from_millis(61_050)),
            "Executed in 1 minutes and 1.05 seconds"
        );
        assert_eq!(format_elapsed(Duration::ZERO), "Executed in 0 minutes and 0.00 seconds");
    }
}
