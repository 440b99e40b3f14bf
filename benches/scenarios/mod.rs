//! Full-chain benchmarks.

mod pipeline;

pub use pipeline::bench_pipeline;
