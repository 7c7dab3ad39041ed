// src/analytics/reference.rs
//! Closed-form reference prices.
//!
//! The average-price knockout contract has no closed form, so the harness
//! and tests lean on two anchors instead:
//!
//! - [`bs_call_price`]: the Black-Scholes vanilla call on the same
//!   parameters. Averaging dampens the payoff and the knockout only removes
//!   value, so under a risk-neutral drift the Monte Carlo price must sit
//!   below this number.
//! - [`flat_path_price`]: the degenerate all-zero-draw, zero-drift case,
//!   where the path is pinned at spot and the price collapses to
//!   `max(s0 - strike, 0) * e^(-rT)` whether or not the barrier is hit.

use crate::math_utils::norm_cdf;
use crate::mc::kernel::SimConfig;

/// Black-Scholes European call price
///
/// # Formula
/// ```text
/// C(S,K,r,σ,T) = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let d2 = d1 - sigma * t.sqrt();
    s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}

/// Exact price when every draw is zero and the drift is zero: the path never
/// leaves spot, the running average equals spot at every step, and the
/// knockout decision is `s0 <= barrier` analytically.
pub fn flat_path_price(cfg: &SimConfig) -> f64 {
    (cfg.s0 - cfg.strike).max(0.0) * cfg.discount()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bs_call_known_value() {
        // Canonical at-the-money point: S=K=100, r=5%, sigma=20%, T=1.
        let price = bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0);
        assert!(
            (price - 10.4506).abs() < 1e-3,
            "BS call price {} far from 10.4506",
            price
        );
    }

    #[test]
    fn test_bs_call_deep_in_the_money_approaches_forward() {
        let price = bs_call_price(1000.0, 100.0, 0.05, 0.2, 1.0);
        let intrinsic = 1000.0 - 100.0 * (-0.05f64).exp();
        assert!((price - intrinsic).abs() < 1e-6);
    }

    #[test]
    fn test_flat_path_price() {
        let cfg = SimConfig {
            s0: 110.0,
            strike: 100.0,
            r: 0.03,
            t: 2.0,
            ..Default::default()
        };
        let want = 10.0 * (-0.06f64).exp();
        assert!((flat_path_price(&cfg) - want).abs() < 1e-12);

        let otm = SimConfig {
            s0: 90.0,
            strike: 100.0,
            ..cfg
        };
        assert_eq!(flat_path_price(&otm), 0.0);
    }
}
