//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use microgrid_sim::config::MicrogridConfig;
use microgrid_sim::sim::{Sample, SimState, initialize};

/// Absolute tolerance for floating-point bounds checks.
pub const EPS: f64 = 1e-9;

/// Baseline configuration shortened to `hours`.
pub fn baseline_for(hours: f64) -> MicrogridConfig {
    let mut cfg = MicrogridConfig::baseline();
    cfg.simulation.horizon_hours = hours;
    cfg
}

/// Initializes `config` and runs `steps` ticks of `dt_s`.
///
/// Returns the initial state, the final state, and every sample produced.
pub fn run_steps(config: MicrogridConfig, steps: usize, dt_s: f64) -> (SimState, SimState, Vec<Sample>) {
    let initial = initialize(config).expect("fixture config should be valid");
    let mut state = initial.clone();
    let samples = (0..steps)
        .map(|_| state.step(dt_s).expect("step should succeed"))
        .collect();
    (initial, state, samples)
}

/// Frequencies including the initial value, for tick-to-tick delta checks.
pub fn frequency_series(initial: &SimState, samples: &[Sample]) -> Vec<f64> {
    std::iter::once(initial.frequency_hz)
        .chain(samples.iter().map(|s| s.frequency_hz))
        .collect()
}

/// Diesel totals including the initial fleet output.
pub fn diesel_series(initial: &SimState, samples: &[Sample]) -> Vec<f64> {
    std::iter::once(initial.fleet.total_power_mw())
        .chain(samples.iter().map(|s| s.diesel_mw))
        .collect()
}
