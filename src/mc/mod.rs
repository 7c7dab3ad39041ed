//! Monte Carlo engine: per-path kernel, execution strategies, aggregation.

pub mod aggregate;
#[cfg(feature = "cuda")]
pub mod cuda;
pub mod engine;
pub mod kernel;
pub mod strategy;
