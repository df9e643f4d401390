use anyhow::Result;

use crate::data::sample::Sample;

/// Random-access supply of labelled samples.
///
/// `sample_at` returns `Ok(None)` for an index outside `0..len()`; whether
/// that ends a stream or signals a bug is the caller's decision.
pub trait SampleSource {
    fn len(&self) -> usize;

    fn sample_at(&mut self, index: usize) -> Result<Option<Sample>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Samples held in memory. Handy for synthetic data and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    pub samples: Vec<Sample>,
}

impl InMemoryDataset {
    pub fn new(samples: Vec<Sample>) -> InMemoryDataset {
        InMemoryDataset { samples }
    }
}

impl SampleSource for InMemoryDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn sample_at(&mut self, index: usize) -> Result<Option<Sample>> {
        Ok(self.samples.get(index).cloned())
    }
}
