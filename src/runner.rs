//! Batch driver that runs a configuration to its horizon.

use std::time::Instant;

use tracing::info;

use crate::config::MicrogridConfig;
use crate::error::SimError;
use crate::sim::engine::{initialize, kpis};
use crate::sim::kpi::KpiSnapshot;
use crate::sim::types::SimState;

/// Result of a completed batch run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Final simulation state, including the retained trajectory.
    pub state: SimState,
    pub kpis: KpiSnapshot,
    pub steps: usize,
}

/// Number of `dt_s` ticks needed to cover `horizon_hours`.
pub fn total_steps(config: &MicrogridConfig) -> usize {
    let horizon_s = config.simulation.horizon_hours * 3600.0;
    (horizon_s / config.simulation.dt_s).ceil().max(0.0) as usize
}

/// Initializes `config` and steps it to the configured horizon.
///
/// # Errors
///
/// Returns `SimError::Config` for an invalid configuration, or the first
/// step error encountered.
pub fn run(config: MicrogridConfig) -> Result<RunOutput, SimError> {
    let steps = total_steps(&config);
    let dt_s = config.simulation.dt_s;
    let mut state = initialize(config)?;

    info!(steps, dt_s, "run started");
    let started = Instant::now();
    for _ in 0..steps {
        state.step(dt_s)?;
    }
    let kpis = kpis(&state);
    info!(
        steps,
        elapsed_ms = started.elapsed().as_millis() as u64,
        fuel_used_l = kpis.fuel_used_l,
        renewable_share_pct = kpis.renewable_share_pct,
        n1_ok = kpis.n1_ok,
        tripped = kpis.protection_tripped,
        "run finished"
    );

    Ok(RunOutput { state, kpis, steps })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_cover_horizon() {
        let mut cfg = MicrogridConfig::baseline();
        cfg.simulation.horizon_hours = 0.5;
        cfg.simulation.dt_s = 0.7;
        assert_eq!(total_steps(&cfg), 2572);
    }

    #[test]
    fn run_reaches_horizon() {
        let mut cfg = MicrogridConfig::baseline();
        cfg.simulation.horizon_hours = 0.25;
        let out = run(cfg).expect("valid config");
        assert_eq!(out.steps, 900);
        assert_eq!(out.state.version, 900);
        assert!((out.kpis.elapsed_s - 900.0).abs() < 1e-6);
    }

    #[test]
    fn run_rejects_invalid_config() {
        let mut cfg = MicrogridConfig::baseline();
        cfg.simulation.dt_s = 0.0;
        assert!(matches!(run(cfg), Err(SimError::Config(_))));
    }
}
