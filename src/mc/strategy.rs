// src/mc/strategy.rs
//! Execution Strategies
//!
//! Every strategy prices paths through the one shared kernel in
//! [`crate::mc::kernel`]; the only thing a strategy decides is how the path
//! index range is walked and by how many workers. Output-buffer slots are
//! owned exclusively by their path, so no strategy needs locks or atomics;
//! the single synchronization point is the completion barrier before the
//! aggregator reads the buffer.

use crate::error::{McError, McResult};
use crate::mc::kernel::{discounted_payoff, SimConfig};
use bitflags::bitflags;
use ndarray::Array2;
use rayon::prelude::*;

bitflags! {
    /// Selects which strategies a comparison run executes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StrategySet: u32 {
        const SERIAL      = 1 << 0;
        const THREADED    = 1 << 1;
        const DEVICE_GRID = 1 << 2;
    }
}

/// Grid width used when a device-grid strategy is built from a [`StrategySet`].
pub const DEFAULT_GRID_UNITS: usize = 4096;

/// How the path range is iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Paths 0..n in order on the calling thread.
    Serial,
    /// Disjoint contiguous chunks across the rayon worker pool.
    Threaded,
    /// Device-style launch emulated in process: `units` lightweight tasks,
    /// each covering paths `unit, unit + units, unit + 2*units, ...`
    /// (grid-stride), joined by a completion barrier before results are
    /// written back.
    DeviceGrid { units: usize },
    /// CUDA backend: the same kernel compiled for the GPU, one thread per
    /// path index with a grid-stride loop.
    #[cfg(feature = "cuda")]
    Cuda { device: usize },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Serial => "serial",
            Strategy::Threaded => "threaded",
            Strategy::DeviceGrid { .. } => "device-grid",
            #[cfg(feature = "cuda")]
            Strategy::Cuda { .. } => "cuda",
        }
    }

    pub(crate) fn validate(&self) -> McResult<()> {
        match self {
            Strategy::DeviceGrid { units: 0 } => Err(McError::InvalidConfiguration {
                field: "units".to_string(),
                reason: "device grid needs at least one execution unit".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Fill `out` with one discounted payoff per path. Callers have already
    /// validated the configuration and buffer shapes.
    pub(crate) fn run(
        &self,
        cfg: &SimConfig,
        draws: &Array2<f64>,
        out: &mut [f64],
    ) -> McResult<()> {
        match self {
            Strategy::Serial => {
                run_serial(cfg, draws, out);
                Ok(())
            }
            Strategy::Threaded => {
                run_threaded(cfg, draws, out);
                Ok(())
            }
            Strategy::DeviceGrid { units } => {
                run_device_grid(cfg, draws, out, *units);
                Ok(())
            }
            #[cfg(feature = "cuda")]
            Strategy::Cuda { device } => crate::mc::cuda::run_cuda(cfg, draws, out, *device),
        }
    }
}

impl StrategySet {
    /// Expand the set into concrete strategies, in a fixed order.
    pub fn strategies(self) -> Vec<Strategy> {
        let mut out = Vec::new();
        if self.contains(StrategySet::SERIAL) {
            out.push(Strategy::Serial);
        }
        if self.contains(StrategySet::THREADED) {
            out.push(Strategy::Threaded);
        }
        if self.contains(StrategySet::DEVICE_GRID) {
            out.push(Strategy::DeviceGrid {
                units: DEFAULT_GRID_UNITS,
            });
        }
        out
    }
}

fn run_serial(cfg: &SimConfig, draws: &Array2<f64>, out: &mut [f64]) {
    for (path, slot) in out.iter_mut().enumerate() {
        *slot = discounted_payoff(cfg, draws.row(path));
    }
}

fn run_threaded(cfg: &SimConfig, draws: &Array2<f64>, out: &mut [f64]) {
    let threads = rayon::current_num_threads().max(1);
    // chunk by paths to keep per-worker work sizable
    let chunk = (cfg.paths / (threads * 4).max(1)).max(1);

    out.par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(chunk_idx, chunk_out)| {
            let base = chunk_idx * chunk;
            for (offset, slot) in chunk_out.iter_mut().enumerate() {
                *slot = discounted_payoff(cfg, draws.row(base + offset));
            }
        });
}

fn run_device_grid(cfg: &SimConfig, draws: &Array2<f64>, out: &mut [f64], units: usize) {
    let paths = cfg.paths;
    let per_unit_cap = (paths + units - 1) / units;

    // Launch phase: every unit walks its strided slice of the path range.
    // Units past the path count simply produce nothing.
    let per_unit: Vec<Vec<f64>> = (0..units)
        .into_par_iter()
        .map(|unit| {
            let mut local = Vec::with_capacity(per_unit_cap);
            let mut path = unit;
            while path < paths {
                local.push(discounted_payoff(cfg, draws.row(path)));
                path += units;
            }
            local
        })
        .collect();

    // The collect above is the completion barrier; only after every unit has
    // finished does the host scatter the strided results back.
    for (unit, local) in per_unit.iter().enumerate() {
        for (k, &payoff) in local.iter().enumerate() {
            out[unit + k * units] = payoff;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{normal_draw_matrix, SeededNormal};

    fn small_cfg(paths: usize, steps: usize) -> SimConfig {
        SimConfig {
            paths,
            steps,
            barrier: 60.0,
            ..Default::default()
        }
    }

    fn payoffs(cfg: &SimConfig, draws: &Array2<f64>, strategy: Strategy) -> Vec<f64> {
        let mut out = vec![0.0; cfg.paths];
        strategy.run(cfg, draws, &mut out).unwrap();
        out
    }

    #[test]
    fn test_single_unit_grid_matches_serial() {
        let cfg = small_cfg(37, 8);
        let draws = normal_draw_matrix(&SeededNormal::new(11), cfg.paths, cfg.steps).unwrap();

        let serial = payoffs(&cfg, &draws, Strategy::Serial);
        let grid = payoffs(&cfg, &draws, Strategy::DeviceGrid { units: 1 });

        assert_eq!(serial, grid);
    }

    #[test]
    fn test_more_units_than_paths_matches_serial() {
        let cfg = small_cfg(5, 8);
        let draws = normal_draw_matrix(&SeededNormal::new(11), cfg.paths, cfg.steps).unwrap();

        let serial = payoffs(&cfg, &draws, Strategy::Serial);
        let grid = payoffs(&cfg, &draws, Strategy::DeviceGrid { units: 64 });

        assert_eq!(serial, grid);
    }

    #[test]
    fn test_zero_units_is_invalid() {
        assert!(Strategy::DeviceGrid { units: 0 }.validate().is_err());
        assert!(Strategy::DeviceGrid { units: 3 }.validate().is_ok());
        assert!(Strategy::Serial.validate().is_ok());
    }

    #[test]
    fn test_strategy_set_expansion_order() {
        let all = StrategySet::SERIAL | StrategySet::THREADED | StrategySet::DEVICE_GRID;
        let names: Vec<_> = all.strategies().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["serial", "threaded", "device-grid"]);

        let one = StrategySet::THREADED.strategies();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].name(), "threaded");
    }
}
