pub mod math;
pub mod activation;
pub mod loss;
pub mod layers;
pub mod network;
pub mod optim;
pub mod data;
pub mod train;
pub mod eval;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::{Layer, Neuron};
pub use network::{ForwardCache, Gradients, ModelStore, Network, NetworkSpec, LayerSpec};
pub use loss::{CrossEntropyLoss, softmax, one_hot};
pub use optim::sgd::Sgd;
pub use data::{DatasetPaths, IdxError, IdxStream, InMemoryDataset, MnistRow, Sample, SampleSource, Split};
pub use train::{train_loop, train_network, TrainConfig, TrainReport, EpochStats};
pub use eval::{benchmark, BenchmarkResult};
