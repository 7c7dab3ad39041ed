//! # barrier-mc: Monte Carlo Pricing Across Execution Strategies
//!
//! A Rust library for Monte Carlo pricing of an average-price knockout
//! option, with one shared path kernel executed serially, across a
//! shared-memory worker pool, or on a device-style grid of lightweight
//! execution units (plus an optional CUDA backend).
//!
//! ## Key Features
//!
//! - **One kernel, many engines**: the per-path algorithm is implemented
//!   exactly once and shared by every execution strategy, so strategy choice
//!   affects throughput, never result semantics
//! - **Deterministic draws**: a seeded, injected random source materializes
//!   one read-only `(paths, steps)` draw matrix shared by all strategies
//! - **Lock-free by construction**: exclusive per-path slot ownership means
//!   no locks or atomics anywhere in the kernel
//! - **Stable aggregation**: pairwise double-precision mean of the payoff
//!   buffer
//! - **Validated input**: malformed parameters and buffers fail fast before
//!   any path is simulated
//!
//! ## Quick Start
//!
//! ```rust
//! use barrier_mc::mc::engine::price_barrier_option;
//! use barrier_mc::mc::kernel::SimConfig;
//! use barrier_mc::mc::strategy::Strategy;
//! use barrier_mc::rng::{normal_draw_matrix, SeededNormal};
//!
//! // Configure the average-price knockout call
//! let cfg = SimConfig {
//!     paths: 10_000,
//!     steps: 32,
//!     ..Default::default()
//! };
//!
//! // One shared draw matrix, priced by the strategy of your choice
//! let draws = normal_draw_matrix(&SeededNormal::new(42), cfg.paths, cfg.steps)
//!     .expect("valid dimensions");
//! let price = price_barrier_option(&cfg, &draws, &Strategy::Threaded)
//!     .expect("valid configuration");
//! assert!(price > 0.0);
//! ```
//!
//! ## Mathematical Foundation
//!
//! Paths follow geometric Brownian motion under an Euler discretization. The
//! running arithmetic average of the simulated prices knocks the option out
//! the moment it touches the barrier from above; the discounted payoff is
//! `max(avg - strike, 0) * exp(-rT)` on the last computed average.

// Module declarations
pub mod error;
pub mod rng;
pub mod math_utils;
pub mod mc;
pub mod analytics;
pub mod output;

// Re-export commonly used types for convenience
pub use error::{McError, McResult};
