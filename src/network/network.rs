use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::data::sample::Sample;
use crate::layers::dense::Layer;
use crate::loss::softmax::{argmax, softmax};
use crate::network::backward::backward;
use crate::network::forward::{forward, ForwardCache};
use crate::network::gradients::Gradients;
use crate::network::spec::NetworkSpec;
use crate::network::store::ModelStore;

/// A multi-layer perceptron.
///
/// Invariant: there is at least one layer and `layers[i].input_size()` equals
/// `layers[i - 1].size()`. The shape is fixed once built; training only
/// changes parameter values. Every constructor and the JSON decoder check it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRecord", into = "NetworkRecord")]
pub struct Network {
    layers: Vec<Layer>,
    /// Mean loss of the last training epoch, if the model has been trained.
    pub loss: Option<f64>,
}

impl Network {
    /// Builds a randomly initialized network from `spec`.
    pub fn new(spec: &NetworkSpec) -> Result<Network> {
        Network::with_rng(spec, &mut rand::thread_rng())
    }

    /// Same as `new`, drawing every initial parameter from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate().map_err(|e| anyhow!(e))?;
        info!(
            "Initializing new model with {} activation function ({} layers)",
            spec.activation,
            spec.layers.len()
        );
        let layers = spec.layers.iter()
            .map(|l| Layer::new(l.size, l.input_size, spec.activation, rng))
            .collect();
        Ok(Network { layers, loss: None })
    }

    /// Wraps existing layers after checking that their widths chain up.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Network> {
        check_shape(&layers).map_err(|e| anyhow!(e))?;
        Ok(Network { layers, loss: None })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to the parameters. The layer count cannot change.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Layer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Layer::size)
    }

    /// Forward pass; see `network::forward::forward`.
    pub fn forward(&self, input: &[f64], activation: ActivationFunction) -> ForwardCache {
        forward(self, input, activation)
    }

    /// Per-sample gradients; see `network::backward::backward`.
    pub fn backward(&self, sample: &Sample, activation: ActivationFunction) -> Gradients {
        backward(self, sample, activation)
    }

    /// Class probabilities: softmax over the output logits.
    pub fn classify(&self, input: &[f64], activation: ActivationFunction) -> Vec<f64> {
        softmax(self.forward(input, activation).logits())
    }

    /// Most likely class for `input`.
    pub fn predict(&self, input: &[f64], activation: ActivationFunction) -> usize {
        argmax(&self.classify(input, activation))
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create model directory {}", dir.display()))?;
        }
        let file = fs::File::create(path)
            .with_context(|| format!("cannot create model file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("cannot write model to {}", path.display()))
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    /// The layer shapes are validated while decoding.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .with_context(|| format!("cannot open model file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("invalid model file {}", path.display()))
    }

    /// Loads the model stored for `activation`, or `None` if there is no file.
    pub fn load(store: &ModelStore, activation: ActivationFunction) -> Result<Option<Network>> {
        let path = store.path_for(activation);
        if !path.exists() {
            warn!("Model not found at {}", path.display());
            return Ok(None);
        }
        Network::load_json(&path).map(Some)
    }

    /// Loads the stored model for `spec.activation` or builds a fresh one from
    /// `spec` when none exists.
    ///
    /// A stored model whose shape differs from `spec` is returned as is.
    pub fn load_or_create<R: Rng + ?Sized>(
        store: &ModelStore,
        spec: &NetworkSpec,
        rng: &mut R,
    ) -> Result<Network> {
        match Network::load(store, spec.activation)? {
            Some(network) => {
                info!("Loaded model from {}", store.path_for(spec.activation).display());
                Ok(network)
            }
            None => Network::with_rng(spec, rng),
        }
    }

    /// Writes the model to its slot in `store`.
    pub fn save(&self, store: &ModelStore, activation: ActivationFunction) -> Result<()> {
        self.save_json(store.path_for(activation))
    }
}

fn check_shape(layers: &[Layer]) -> Result<(), String> {
    if layers.is_empty() {
        return Err("network must have at least one layer".to_owned());
    }
    for i in 1..layers.len() {
        if layers[i].input_size() != layers[i - 1].size() {
            return Err(format!(
                "layer {} has {} weights per neuron but layer {} has {} neurons",
                i,
                layers[i].input_size(),
                i - 1,
                layers[i - 1].size()
            ));
        }
    }
    Ok(())
}

/// Serialized shape of a network.
#[derive(Serialize, Deserialize)]
struct NetworkRecord {
    layers: Vec<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loss: Option<f64>,
}

impl TryFrom<NetworkRecord> for Network {
    type Error = String;

    fn try_from(record: NetworkRecord) -> Result<Self, Self::Error> {
        check_shape(&record.layers)?;
        Ok(Network { layers: record.layers, loss: record.loss })
    }
}

impl From<Network> for NetworkRecord {
    fn from(network: Network) -> Self {
        NetworkRecord { layers: network.layers, loss: network.loss }
    }
}
