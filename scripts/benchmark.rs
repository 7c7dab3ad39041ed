// scripts/benchmark.rs
use barrier_mc::analytics::reference;
use barrier_mc::math_utils::Timer;
use barrier_mc::mc::engine::price_barrier_option;
use barrier_mc::mc::kernel::SimConfig;
use barrier_mc::mc::strategy::{Strategy, DEFAULT_GRID_UNITS};
use barrier_mc::rng::{normal_draw_matrix, SeededNormal};
use std::env;
use std::fs::File;
use std::io::Write;
use std::process::Command;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        let os = env::consts::OS.to_string();
        let cpu_cores = num_cpus::get();
        let rust_version = Command::new("rustc")
            .arg("--version")
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown Rust version".to_string());
        let rustc_flags = env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string());
        let rayon_threads = rayon::current_num_threads();

        Self {
            os,
            cpu_cores,
            rust_version,
            rustc_flags,
            rayon_threads,
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    strategy: &'static str,
    paths: usize,
    time_ms: f64,
    throughput_paths_per_sec: f64,
    price: f64,
}

fn strategies_under_test() -> Vec<Strategy> {
    let mut strategies = vec![
        Strategy::Serial,
        Strategy::Threaded,
        Strategy::DeviceGrid {
            units: DEFAULT_GRID_UNITS,
        },
    ];

    #[cfg(feature = "cuda")]
    if barrier_mc::mc::cuda::is_cuda_available() {
        strategies.push(Strategy::Cuda { device: 0 });
    }

    strategies
}

fn run_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();

    let paths_configs = [10_000, 100_000, 1_000_000];

    for &paths in &paths_configs {
        println!("Running benchmarks with {} paths...", paths);

        let cfg = SimConfig {
            paths,
            steps: 64,
            barrier: 70.0,
            ..Default::default()
        };

        let draws = normal_draw_matrix(&SeededNormal::new(42), cfg.paths, cfg.steps)
            .expect("valid dimensions");

        let mut prices = Vec::new();
        for strategy in strategies_under_test() {
            let mut timer = Timer::new();
            timer.start();
            let price = price_barrier_option(&cfg, &draws, &strategy)
                .expect("valid configuration");
            let time_ms = timer.elapsed_ms();
            let throughput = paths as f64 / (time_ms / 1000.0);

            prices.push(price);
            results.push(BenchmarkResult {
                strategy: strategy.name(),
                paths,
                time_ms,
                throughput_paths_per_sec: throughput,
                price,
            });
        }

        // Strategy choice must never move the price.
        let max_dev = prices
            .iter()
            .map(|p| (p - prices[0]).abs())
            .fold(0.0f64, f64::max);
        println!("  max cross-strategy deviation: {:.3e}", max_dev);
    }

    results
}

fn write_results_to_csv(results: &[BenchmarkResult], system_info: &SystemInfo, filename: &str) {
    let mut file = File::create(filename).expect("Could not create CSV file");

    // Write system information as comments
    writeln!(file, "# System Information").unwrap();
    writeln!(file, "# OS: {}", system_info.os).unwrap();
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores).unwrap();
    writeln!(file, "# Rust Version: {}", system_info.rust_version).unwrap();
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags).unwrap();
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads).unwrap();
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
    .unwrap();
    writeln!(file, "#").unwrap();

    writeln!(
        file,
        "Strategy,Paths,Time_ms,Throughput_paths_per_sec,Price"
    )
    .unwrap();

    for result in results {
        writeln!(
            file,
            "{},{},{:.2},{:.0},{:.6}",
            result.strategy,
            result.paths,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.price,
        )
        .unwrap();
    }

    println!("Results written to {}", filename);
}

fn main() {
    println!("barrier-mc Strategy Benchmark Suite");
    println!("===================================\n");

    println!("Gathering system information...");
    let system_info = SystemInfo::gather();

    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let results = run_benchmarks();

    // Vanilla call on the same parameters, as context for the table.
    let cfg = SimConfig::default();
    let vanilla = reference::bs_call_price(cfg.s0, cfg.strike, cfg.r, cfg.sigma, cfg.t);

    println!("\n{:=<72}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<72}", "");
    println!(
        "{:<14} {:>10} {:>12} {:>18} {:>12}",
        "Strategy", "Paths", "Time (ms)", "Throughput (p/s)", "Price"
    );
    println!("{:-<72}", "");

    for result in &results {
        println!(
            "{:<14} {:>10} {:>12.2} {:>18.0} {:>12.4}",
            result.strategy,
            result.paths,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.price,
        );
    }

    println!("{:=<72}", "");
    println!(
        "Vanilla Black-Scholes call on the same parameters: {:.4}",
        vanilla
    );
    println!("(averaging and the knockout both remove value, so MC prices sit below it)");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    write_results_to_csv(&results, &system_info, &filename);

    println!("\nBenchmark complete!");
    println!("To reproduce: cargo run --bin benchmark --release");
}
