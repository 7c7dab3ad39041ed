// src/mc/kernel.rs
//! Per-Path Simulation Kernel
//!
//! # Mathematical Framework
//!
//! The underlying follows geometric Brownian motion under an Euler
//! discretization:
//! ```text
//! S_{n+1} = S_n + μ S_n Δt + σ S_n √Δt Z_n,   Z_n ~ N(0,1)
//! ```
//!
//! The contract is an average-price knockout call: the running arithmetic
//! average A_n of the simulated prices is tracked as a streaming mean,
//! ```text
//! A_n = A_{n-1} + (S_n - A_{n-1}) / n
//! ```
//! and the path is knocked out the moment A_n falls to or below the barrier
//! level. The discounted payoff is
//! ```text
//! max(A - K, 0) * e^(-rT)
//! ```
//! where A is the last computed running average, whether the loop ran to
//! completion or exited early on a breach.
//!
//! This function is the single shared implementation of the per-path
//! algorithm; every execution strategy (serial, threaded, device grid, CUDA)
//! prices paths through exactly these arithmetic operations so that strategy
//! choice affects throughput, never result semantics.

use crate::error::{validation::*, McResult};
use ndarray::ArrayView1;

/// Simulation parameters, fixed for one pricing run.
///
/// # Knockout Semantics
///
/// The payoff is a single formula `max(avg - strike, 0)` evaluated once
/// after the path loop, using the running average at the point the loop
/// ended. A knocked-out path therefore pays zero only because its average
/// already sits at or below `barrier`, which is below `strike` in any sane
/// parameterization. A configuration with `barrier >= strike` will pay out
/// on knocked-out paths; such configurations are accepted but economically
/// meaningless for a true knockout contract.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Number of simulated paths
    pub paths: usize,
    /// Time steps per path
    pub steps: usize,
    /// Initial spot price
    pub s0: f64,
    /// Drift rate of the underlying
    pub mu: f64,
    /// Volatility
    pub sigma: f64,
    /// Risk-free rate used for discounting
    pub r: f64,
    /// Time to maturity in years
    pub t: f64,
    /// Strike on the average price
    pub strike: f64,
    /// Knockout level on the running average
    pub barrier: f64,
}

impl SimConfig {
    /// Validate the simulation parameters; fails before any path is run.
    pub fn validate(&self) -> McResult<()> {
        validate_paths(self.paths)?;
        validate_steps(self.steps)?;
        validate_positive("s0", self.s0)?;
        validate_finite("mu", self.mu)?;
        validate_positive("sigma", self.sigma)?;
        validate_finite("r", self.r)?;
        validate_positive("t", self.t)?;
        validate_positive("strike", self.strike)?;
        validate_finite("barrier", self.barrier)?;
        validate_non_negative("barrier", self.barrier)?;
        Ok(())
    }

    /// Discount factor applied to every path payoff.
    pub fn discount(&self) -> f64 {
        (-self.r * self.t).exp()
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            paths: 100_000,
            steps: 252,
            s0: 100.0,
            mu: 0.05,
            sigma: 0.2,
            r: 0.05,
            t: 1.0,
            strike: 100.0,
            barrier: 80.0,
        }
    }
}

/// Simulate one path and return its discounted payoff.
///
/// `draws` is the path's row of the shared standard-normal matrix; its
/// length is the step count. A breach on the very first step leaves the
/// running average equal to the first simulated price.
pub fn discounted_payoff(cfg: &SimConfig, draws: ArrayView1<'_, f64>) -> f64 {
    let dt = cfg.t / cfg.steps as f64;
    let sqrt_dt = dt.sqrt();

    let mut s = cfg.s0;
    let mut avg = 0.0;

    for (step, &z) in draws.iter().enumerate() {
        s += cfg.mu * dt * s + cfg.sigma * s * sqrt_dt * z;
        avg += (s - avg) / (step as f64 + 1.0);
        if avg <= cfg.barrier {
            break;
        }
    }

    (avg - cfg.strike).max(0.0) * cfg.discount()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(got: f64, want: f64, tol: f64, label: &str) {
        let diff = (got - want).abs();
        assert!(
            diff < tol,
            "{label} mismatch: expected {want}, got {got}, diff {diff}"
        );
    }

    fn two_step_cfg() -> SimConfig {
        SimConfig {
            paths: 1,
            steps: 2,
            s0: 100.0,
            mu: 0.04,
            sigma: 0.2,
            r: 0.03,
            t: 0.5,
            strike: 95.0,
            barrier: 50.0,
        }
    }

    #[test]
    fn test_two_step_path_by_hand() {
        let cfg = two_step_cfg();
        let draws = array![0.5, -0.25];

        // Recompute the two Euler steps and the streaming mean by hand.
        let dt = cfg.t / 2.0;
        let sqrt_dt = dt.sqrt();
        let s1 = 100.0 + cfg.mu * dt * 100.0 + cfg.sigma * 100.0 * sqrt_dt * 0.5;
        let s2 = s1 + cfg.mu * dt * s1 + cfg.sigma * s1 * sqrt_dt * (-0.25);
        let avg = (s1 + s2) / 2.0;
        let want = (avg - cfg.strike).max(0.0) * (-cfg.r * cfg.t).exp();

        let got = discounted_payoff(&cfg, draws.view());
        assert_close(got, want, 1e-12, "two-step payoff");
    }

    #[test]
    fn test_breach_stops_the_loop() {
        // First draw crashes the price so the average lands at or below the
        // barrier; the enormous second draw must never be consumed.
        let cfg = SimConfig {
            steps: 2,
            barrier: 80.0,
            strike: 95.0,
            ..two_step_cfg()
        };
        let dt = cfg.t / 2.0;
        let sqrt_dt = dt.sqrt();

        // Choose z so that s1 = 70 < barrier: solve the Euler step for z.
        let z_crash = (70.0 - 100.0 - cfg.mu * dt * 100.0) / (cfg.sigma * 100.0 * sqrt_dt);
        let draws = array![z_crash, 1.0e9];

        let s1 = 100.0 + cfg.mu * dt * 100.0 + cfg.sigma * 100.0 * sqrt_dt * z_crash;
        let want = (s1 - cfg.strike).max(0.0) * (-cfg.r * cfg.t).exp();

        let got = discounted_payoff(&cfg, draws.view());
        assert_close(got, want, 1e-9, "knocked-out payoff");
        assert_eq!(got, 0.0, "average below barrier sits below strike");
    }

    #[test]
    fn test_knocked_out_path_keeps_single_formula() {
        // barrier above strike: the literal formula pays on the breached
        // path instead of forcing zero. Documented contract behavior.
        let cfg = SimConfig {
            steps: 1,
            s0: 100.0,
            mu: 0.0,
            barrier: 120.0,
            strike: 95.0,
            ..two_step_cfg()
        };
        let draws = array![0.0];

        // Flat step keeps s = avg = 100 <= barrier, an immediate knockout.
        let want = (100.0 - cfg.strike) * (-cfg.r * cfg.t).exp();
        let got = discounted_payoff(&cfg, draws.view());
        assert_close(got, want, 1e-12, "literal payoff on breach");
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(SimConfig::default().validate().is_ok());

        let mut cfg = SimConfig::default();
        cfg.paths = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.steps = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.sigma = -0.2;
        assert!(cfg.validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.mu = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.barrier = -1.0;
        assert!(cfg.validate().is_err());
    }
}
