pub mod benchmark;

pub use benchmark::{benchmark, benchmark_idx, BenchmarkResult};
