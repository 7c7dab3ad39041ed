// src/output.rs
use std::fs::File;
use std::io::{self, Write};

pub fn write_payoffs_to_csv(filename: &str, payoffs: &[f64]) -> io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, "path_id,discounted_payoff")?;
    for (i, payoff) in payoffs.iter().enumerate() {
        writeln!(file, "{},{}", i, payoff)?;
    }
    Ok(())
}

pub fn write_summary_to_csv(filename: &str, summary_data: &[(&str, &str)]) -> io::Result<()> {
    let mut file = File::create(filename)?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key, value)?;
    }
    Ok(())
}
