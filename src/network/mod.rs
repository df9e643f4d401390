pub mod backward;
pub mod forward;
pub mod gradients;
pub mod network;
pub mod spec;
pub mod store;

pub use forward::ForwardCache;
pub use gradients::Gradients;
pub use network::Network;
pub use spec::{NetworkSpec, LayerSpec};
pub use store::ModelStore;
