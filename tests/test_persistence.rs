// Tests for JSON model persistence and load-or-create behaviour.

use std::fs;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use ferrite_digits::{ActivationFunction, LayerSpec, ModelStore, Network, NetworkSpec};

fn tiny_spec(activation: ActivationFunction) -> NetworkSpec {
    NetworkSpec {
        activation,
        layers: vec![
            LayerSpec { input_size: 3, size: 2 },
            LayerSpec { input_size: 2, size: 2 },
        ],
    }
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path().join("models"), "digits");
    let mut network = Network::with_rng(&tiny_spec(ActivationFunction::ReLU), &mut StdRng::seed_from_u64(1)).unwrap();
    network.loss = Some(0.25);

    network.save(&store, ActivationFunction::ReLU).unwrap();
    assert!(store.path_for(ActivationFunction::ReLU).exists());

    let loaded = Network::load(&store, ActivationFunction::ReLU).unwrap().unwrap();
    assert_eq!(loaded, network);
}

#[test]
fn test_json_layout_uses_layers_neurons_weights_bias() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");
    let network = Network::with_rng(&tiny_spec(ActivationFunction::Sigmoid), &mut StdRng::seed_from_u64(2)).unwrap();
    network.save_json(&path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let layers = value["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 2);
    let neurons = layers[0]["neurons"].as_array().unwrap();
    assert_eq!(neurons.len(), 2);
    assert_eq!(neurons[0]["weights"].as_array().unwrap().len(), 3);
    assert!(neurons[0]["bias"].is_f64());
    // Untrained models carry no loss field.
    assert!(value.get("loss").is_none());
}

#[test]
fn test_hand_written_model_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, r#"{
  "layers": [
    { "neurons": [ { "weights": [1.0, 2.0], "bias": 0.5 } ] },
    { "neurons": [ { "weights": [1.0], "bias": 0.0 }, { "weights": [-1.0], "bias": 0.0 } ] }
  ],
  "loss": 0.7
}"#).unwrap();

    let network = Network::load_json(&path).unwrap();
    assert_eq!(network.input_size(), 2);
    assert_eq!(network.output_size(), 2);
    assert_eq!(network.loss, Some(0.7));
    assert_eq!(network.layers()[0].biases, vec![0.5]);
}

#[test]
fn test_inconsistent_shapes_are_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");

    // Ragged neurons within a layer.
    fs::write(&path, r#"{ "layers": [ { "neurons": [
        { "weights": [1.0, 2.0], "bias": 0.0 },
        { "weights": [1.0], "bias": 0.0 } ] } ] }"#).unwrap();
    assert!(Network::load_json(&path).is_err());

    // Second layer expects 3 inputs but the first has 1 neuron.
    fs::write(&path, r#"{ "layers": [
        { "neurons": [ { "weights": [1.0], "bias": 0.0 } ] },
        { "neurons": [ { "weights": [1.0, 1.0, 1.0], "bias": 0.0 } ] } ] }"#).unwrap();
    assert!(Network::load_json(&path).is_err());
}

#[test]
fn test_empty_network_cannot_be_built() {
    assert!(Network::from_layers(vec![]).is_err());
    assert!(serde_json::from_str::<Network>(r#"{ "layers": [] }"#).is_err());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, r#"{ "layers": [], "loss": 0.1 }"#).unwrap();
    assert!(Network::load_json(&path).is_err());
}

#[test]
fn test_layers_mut_edits_parameters_in_place() {
    let mut network = Network::with_rng(&tiny_spec(ActivationFunction::ReLU), &mut StdRng::seed_from_u64(6)).unwrap();
    network.layers_mut()[1].biases[0] = 3.0;
    assert_eq!(network.layers().len(), 2);
    assert_eq!(network.layers()[1].biases[0], 3.0);
    assert_eq!((network.input_size(), network.output_size()), (3, 2));
}

#[test]
fn test_load_or_create_falls_back_to_fresh_model() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path(), "default");
    let spec = tiny_spec(ActivationFunction::Sigmoid);

    assert!(Network::load(&store, ActivationFunction::Sigmoid).unwrap().is_none());
    let fresh = Network::load_or_create(&store, &spec, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(fresh.input_size(), 3);
    assert_eq!(fresh.loss, None);
    // Sigmoid networks start from uniform weights in [-1, 1).
    assert!(fresh.layers().iter().all(|l| l.weights.as_slice().iter().all(|w| (-1.0..1.0).contains(w))));

    fresh.save(&store, ActivationFunction::Sigmoid).unwrap();
    let reloaded = Network::load_or_create(&store, &spec, &mut StdRng::seed_from_u64(4)).unwrap();
    assert_eq!(reloaded, fresh);
}

#[test]
fn test_models_are_stored_per_activation() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path(), "default");
    let relu = Network::with_rng(&tiny_spec(ActivationFunction::ReLU), &mut StdRng::seed_from_u64(5)).unwrap();
    relu.save(&store, ActivationFunction::ReLU).unwrap();

    assert!(Network::load(&store, ActivationFunction::Sigmoid).unwrap().is_none());
    assert!(Network::load(&store, ActivationFunction::ReLU).unwrap().is_some());
}

#[test]
fn test_invalid_spec_is_rejected() {
    let spec = NetworkSpec { activation: ActivationFunction::ReLU, layers: vec![] };
    assert!(Network::with_rng(&spec, &mut StdRng::seed_from_u64(0)).is_err());
}
