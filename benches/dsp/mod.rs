//! Benchmarks for individual chain stages.

mod distortion;
mod echo;
mod filter;
mod resample;

pub use distortion::bench_distortion;
pub use echo::bench_echo;
pub use filter::bench_filter;
pub use resample::bench_resample;
