// src/mc/engine.rs
//! Pricing engine: validation, strategy dispatch, aggregation.
//!
//! The outward contract is a single operation,
//! [`price_barrier_option`]`(cfg, draws, strategy) -> expected price`. The
//! buffer-level entry points exist for harnesses and tests that want to
//! inspect per-path payoffs or reuse a caller-owned output buffer.
//!
//! # Invariant
//!
//! For a fixed configuration and a fixed draw matrix, every strategy fills
//! the output buffer with the same values up to floating-point rounding, so
//! the aggregate price is strategy-independent. The CPU strategies share one
//! kernel and agree bitwise; the CUDA backend agrees within rounding noise.

use crate::error::{McError, McResult};
use crate::mc::aggregate;
use crate::mc::kernel::SimConfig;
use crate::mc::strategy::{Strategy, StrategySet};
use ndarray::Array2;

/// Price computed by one strategy in a comparison run.
#[derive(Debug, Clone)]
pub struct StrategyPrice {
    pub name: &'static str,
    pub price: f64,
}

fn check_draws(cfg: &SimConfig, draws: &Array2<f64>) -> McResult<()> {
    let expected = (cfg.paths, cfg.steps);
    let actual = draws.dim();
    if actual != expected {
        return Err(McError::DrawBufferShape { expected, actual });
    }
    Ok(())
}

/// Fill a caller-owned output buffer with one discounted payoff per path.
///
/// Fails fast on invalid parameters, a mis-shaped draw matrix, or an output
/// slice whose length differs from the path count; nothing is simulated in
/// any error case.
pub fn fill_path_payoffs(
    cfg: &SimConfig,
    draws: &Array2<f64>,
    strategy: &Strategy,
    out: &mut [f64],
) -> McResult<()> {
    cfg.validate()?;
    strategy.validate()?;
    check_draws(cfg, draws)?;
    if out.len() != cfg.paths {
        return Err(McError::InvalidConfiguration {
            field: "out".to_string(),
            reason: format!(
                "output buffer holds {} slots but the run has {} paths",
                out.len(),
                cfg.paths
            ),
        });
    }

    strategy.run(cfg, draws, out)
}

/// Simulate every path and return the discounted payoff buffer.
pub fn path_payoffs(
    cfg: &SimConfig,
    draws: &Array2<f64>,
    strategy: &Strategy,
) -> McResult<Vec<f64>> {
    let mut out = vec![0.0; cfg.paths];
    fill_path_payoffs(cfg, draws, strategy, &mut out)?;
    Ok(out)
}

/// Price the average-price knockout option under the given strategy.
pub fn price_barrier_option(
    cfg: &SimConfig,
    draws: &Array2<f64>,
    strategy: &Strategy,
) -> McResult<f64> {
    let payoffs = path_payoffs(cfg, draws, strategy)?;
    let price = aggregate::mean(&payoffs);

    if !price.is_finite() {
        return Err(McError::NumericalInstability {
            method: format!("{} Monte Carlo", strategy.name()),
            reason: format!("price estimate is not finite: {}", price),
        });
    }

    Ok(price)
}

/// Price with every strategy in `set` over the same draws.
pub fn compare_strategies(
    cfg: &SimConfig,
    draws: &Array2<f64>,
    set: StrategySet,
) -> McResult<Vec<StrategyPrice>> {
    let mut results = Vec::new();
    for strategy in set.strategies() {
        let price = price_barrier_option(cfg, draws, &strategy)?;
        results.push(StrategyPrice {
            name: strategy.name(),
            price,
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{normal_draw_matrix, SeededNormal};

    #[test]
    fn test_shape_mismatch_is_rejected_before_simulation() {
        let cfg = SimConfig {
            paths: 100,
            steps: 12,
            ..Default::default()
        };
        let draws = normal_draw_matrix(&SeededNormal::new(1), 100, 8).unwrap();

        let err = price_barrier_option(&cfg, &draws, &Strategy::Serial).unwrap_err();
        assert!(matches!(err, McError::DrawBufferShape { .. }));
    }

    #[test]
    fn test_output_length_mismatch_is_rejected() {
        let cfg = SimConfig {
            paths: 16,
            steps: 4,
            ..Default::default()
        };
        let draws = normal_draw_matrix(&SeededNormal::new(1), 16, 4).unwrap();
        let mut out = vec![0.0; 8];

        let err = fill_path_payoffs(&cfg, &draws, &Strategy::Serial, &mut out).unwrap_err();
        assert!(matches!(err, McError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_compare_strategies_reports_each_selected_strategy() {
        let cfg = SimConfig {
            paths: 200,
            steps: 8,
            barrier: 60.0,
            ..Default::default()
        };
        let draws = normal_draw_matrix(&SeededNormal::new(5), cfg.paths, cfg.steps).unwrap();

        let all = StrategySet::SERIAL | StrategySet::THREADED | StrategySet::DEVICE_GRID;
        let results = compare_strategies(&cfg, &draws, all).unwrap();

        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(
                (pair[0].price - pair[1].price).abs() < 1e-12,
                "{} and {} disagree: {} vs {}",
                pair[0].name,
                pair[1].name,
                pair[0].price,
                pair[1].price
            );
        }
    }
}
