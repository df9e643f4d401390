pub mod activation;

pub use activation::{ActivationFunction, UnknownActivation};
