pub mod cross_entropy;
pub mod softmax;

pub use cross_entropy::{CrossEntropyLoss, one_hot};
pub use softmax::{softmax, argmax};
