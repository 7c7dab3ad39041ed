// demos/demo.rs
use barrier_mc::analytics::reference;
use barrier_mc::math_utils::Timer;
use barrier_mc::mc::engine::{compare_strategies, path_payoffs};
use barrier_mc::mc::kernel::SimConfig;
use barrier_mc::mc::strategy::{Strategy, StrategySet};
use barrier_mc::output;
use barrier_mc::rng::{normal_draw_matrix, SeededNormal};

fn main() {
    println!("Running barrier-mc Monte Carlo Demo\n");

    let cfg = SimConfig {
        paths: 100_000,
        steps: 252,
        s0: 100.0,
        mu: 0.05,
        sigma: 0.2,
        r: 0.05,
        t: 1.0,
        strike: 100.0,
        barrier: 80.0,
    };

    println!("--- Configuration ---");
    println!(
        "paths={}, steps={}, s0={}, mu={}, sigma={}, r={}, t={}, strike={}, barrier={}\n",
        cfg.paths, cfg.steps, cfg.s0, cfg.mu, cfg.sigma, cfg.r, cfg.t, cfg.strike, cfg.barrier
    );

    // One shared draw matrix for every strategy.
    let mut timer = Timer::new();
    timer.start();
    let draws =
        normal_draw_matrix(&SeededNormal::new(12345), cfg.paths, cfg.steps).expect("valid shape");
    println!(
        "Generated {}x{} draw matrix in {:.1} ms\n",
        cfg.paths,
        cfg.steps,
        timer.elapsed_ms()
    );

    // --- Strategy Comparison ---
    println!("--- Strategy Comparison ---");
    let all = StrategySet::SERIAL | StrategySet::THREADED | StrategySet::DEVICE_GRID;
    timer.start();
    let results = compare_strategies(&cfg, &draws, all).expect("valid configuration");
    let compare_ms = timer.elapsed_ms();

    for result in &results {
        println!("MC Price ({}): {:.6}", result.name, result.price);
    }
    let max_dev = results
        .iter()
        .map(|r| (r.price - results[0].price).abs())
        .fold(0.0f64, f64::max);
    println!("Max cross-strategy deviation: {:.3e}", max_dev);
    println!("Total comparison time: {:.1} ms\n", compare_ms);

    // --- Reference Values ---
    println!("--- Reference Values ---");
    let vanilla = reference::bs_call_price(cfg.s0, cfg.strike, cfg.r, cfg.sigma, cfg.t);
    println!("Vanilla Black-Scholes call: {:.6}", vanilla);
    println!("(the averaged, knockable contract must price below the vanilla call)\n");

    // --- CSV Output ---
    let payoffs =
        path_payoffs(&cfg, &draws, &Strategy::Threaded).expect("valid configuration");

    if let Err(e) = std::fs::create_dir_all("results") {
        eprintln!("Error creating results directory: {}", e);
        return;
    }

    let payoffs_csv_filename = "results/payoffs.csv";
    match output::write_payoffs_to_csv(payoffs_csv_filename, &payoffs) {
        Ok(_) => println!("Payoff data written to {}", payoffs_csv_filename),
        Err(e) => eprintln!("Error writing payoff data: {}", e),
    }

    let price_strs: Vec<(String, String)> = results
        .iter()
        .map(|r| (format!("mc_price_{}", r.name), r.price.to_string()))
        .collect();
    let vanilla_str = vanilla.to_string();
    let max_dev_str = max_dev.to_string();

    let mut summary_data: Vec<(&str, &str)> = vec![("metric", "value")];
    for (key, value) in &price_strs {
        summary_data.push((key, value));
    }
    summary_data.push(("bs_vanilla_call", &vanilla_str));
    summary_data.push(("max_cross_strategy_deviation", &max_dev_str));

    let summary_csv_filename = "results/summary.csv";
    match output::write_summary_to_csv(summary_csv_filename, &summary_data) {
        Ok(_) => println!("Summary data written to {}", summary_csv_filename),
        Err(e) => eprintln!("Error writing summary data: {}", e),
    }
}
