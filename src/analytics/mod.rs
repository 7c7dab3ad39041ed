//! Reference values used to sanity-check Monte Carlo output.

pub mod reference;
