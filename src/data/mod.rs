pub mod idx;
pub mod sample;
pub mod source;
pub mod stream;

pub use idx::IdxError;
pub use sample::{MnistRow, Sample};
pub use source::{InMemoryDataset, SampleSource};
pub use stream::{DatasetPaths, IdxStream, Split};
