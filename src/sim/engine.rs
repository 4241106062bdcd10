//! Simulation engine: initialization, the per-tick step, and read-only queries.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::MicrogridConfig;
use crate::devices::{Device, DeviceContext};
use crate::error::{SimError, StepError};

use super::controller::{BatteryState, VsgInput};
use super::dispatch::{DieselFleet, FleetChange, FleetInput};
use super::event::load_multiplier_at;
use super::frequency::FrequencyModel;
use super::kpi::{
    ContingencyInput, EnergyAccount, KpiSnapshot, baseline_fuel_rate_l_per_h,
    fleet_fuel_rate_l_per_h, n1_secure,
};
use super::power_balance::{bus_mismatch_mw, curtailment_split};
use super::protection::ProtectionState;
use super::trajectory::Trajectory;
use super::types::{Profiles, Sample, SimState};

/// Validates the configuration and builds the state at `t = 0`.
///
/// Calling this twice with the same configuration yields equal states.
///
/// # Errors
///
/// Returns `SimError::Config` with every violated constraint.
pub fn initialize(config: impl Into<Arc<MicrogridConfig>>) -> Result<SimState, SimError> {
    let config: Arc<MicrogridConfig> = config.into();
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(SimError::Config(errors));
    }

    let fleet = DieselFleet::from_config(&config.diesel);
    let profiles = Profiles::from_config(&config);
    info!(
        devices = ?profiles.device_types(),
        units = fleet.units.len(),
        online = fleet.online_count(),
        battery_mw = config.battery.power_mw,
        seed = config.simulation.seed,
        "microgrid initialized"
    );

    Ok(SimState {
        version: 0,
        time_s: 0.0,
        frequency_hz: config.system.f0_hz,
        rocof_hz_per_s: 0.0,
        battery: BatteryState::from_config(&config.battery),
        fleet,
        protection: ProtectionState::new(),
        energy: EnergyAccount::new(config.system.f0_hz),
        trajectory: Trajectory::with_capacity(config.simulation.trajectory_capacity),
        profiles,
        config,
    })
}

/// Advances `state` by `dt_s` seconds. See [`SimState::step`].
///
/// # Errors
///
/// Returns `SimError::InvalidStep` for a bad `dt_s`, or
/// `SimError::NumericOverflow` if the frequency update is not finite.
pub fn step(state: &mut SimState, dt_s: f64) -> Result<Sample, SimError> {
    state.step(dt_s)
}

/// Retained samples, oldest first. Never mutates the state.
pub fn trajectory(state: &SimState) -> Vec<Sample> {
    state.trajectory.to_vec()
}

/// KPI snapshot of the run so far. Never mutates the state.
pub fn kpis(state: &SimState) -> KpiSnapshot {
    KpiSnapshot::from_account(&state.energy, state.protection.is_tripped())
}

impl SimState {
    /// Executes one tick and returns its sample.
    ///
    /// Order: profiles at `t + dt`, diesel dispatch, battery VSG control,
    /// curtailment, frequency update, protection, then accounting. All new
    /// values are computed before anything is written back, so an error
    /// leaves the state untouched.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidStep` if `dt_s` is not a finite positive
    /// number, or `SimError::NumericOverflow` if the frequency update is not
    /// finite.
    pub fn step(&mut self, dt_s: f64) -> Result<Sample, SimError> {
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return Err(StepError::NonPositiveDt(dt_s).into());
        }
        let cfg = Arc::clone(&self.config);
        let tick = self.version + 1;
        let t = self.time_s + dt_s;
        let f0 = cfg.system.f0_hz;
        let freq_error_hz = f0 - self.frequency_hz;

        // 1. Resource profiles
        let ctx = DeviceContext::new(t, tick, cfg.simulation.seed);
        let pv_avail = self.profiles.pv.power_mw(&ctx);
        let wind_avail = self.profiles.wind.power_mw(&ctx);
        let load = self.profiles.load.power_mw(&ctx) * load_multiplier_at(&self.profiles.disturbances, t);
        let residual = load - pv_avail - wind_avail;

        // 2. Diesel fleet
        let (fleet, fleet_decision) = self.fleet.dispatch(
            &FleetInput {
                residual_mw: residual,
                soc_bias_mw: self.battery.soc_bias_mw(&cfg.battery),
                freq_error_hz,
                f0_hz: f0,
                dt_s,
            },
            &cfg.diesel,
        );
        let diesel = fleet_decision.power_mw;

        // 3. Battery
        let (battery, battery_decision) = self.battery.control(
            &VsgInput {
                uncovered_mw: residual - diesel,
                freq_error_hz,
                rocof_hz_per_s: self.rocof_hz_per_s,
                f0_hz: f0,
                dt_s,
            },
            &cfg.battery,
        );
        let battery_mw = battery_decision.power_mw;

        // 4. Curtailment; surplus is kept while under-frequency to aid recovery
        let surplus = pv_avail + wind_avail + diesel + battery_mw - load;
        let (pv_curtailed, wind_curtailed) = if freq_error_hz > 0.0 {
            (0.0, 0.0)
        } else {
            curtailment_split(surplus, pv_avail, wind_avail)
        };
        let pv = pv_avail - pv_curtailed;
        let wind = wind_avail - wind_curtailed;

        // 5. Frequency
        let mismatch = bus_mismatch_mw(pv, wind, diesel, battery_mw, load);
        let update = FrequencyModel::from_config(&cfg).advance(self.frequency_hz, mismatch, dt_s)?;

        // 6. Protection
        let (protection, newly_tripped) = self.protection.evaluate(
            update.frequency_hz,
            update.rocof_hz_per_s,
            t,
            dt_s,
            &cfg.protection,
        );

        // 7. Accounting inputs
        let fuel_rate = fleet_fuel_rate_l_per_h(&cfg.fuel, &fleet);
        let fallback_unit = if cfg.diesel.large_unit_mw > 0.0 {
            cfg.diesel.large_unit_mw
        } else {
            cfg.diesel.small_unit_mw
        };
        let baseline_rate =
            baseline_fuel_rate_l_per_h(&cfg.fuel, load, &fleet.ratings(), fallback_unit);
        let n1_ok = n1_secure(
            &fleet,
            &ContingencyInput {
                pv_avail_mw: pv_avail,
                wind_avail_mw: wind_avail,
                load_mw: load,
                battery_mw,
                battery_capability_mw: battery
                    .storage
                    .power_mw
                    .min(battery.storage.max_discharge_mw(dt_s)),
                ramp_up_mw_per_s: cfg.diesel.ramp_up_mw_per_s,
                dt_s,
            },
        );

        let sample = Sample {
            t_s: t,
            pv_mw: pv,
            wind_mw: wind,
            load_mw: load,
            diesel_mw: diesel,
            battery_mw,
            frequency_hz: update.frequency_hz,
            rocof_hz_per_s: update.rocof_hz_per_s,
            soc: battery.soc(),
            fuel_rate_l_per_h: fuel_rate,
            pv_curtailed_mw: pv_curtailed,
            wind_curtailed_mw: wind_curtailed,
            mismatch_mw: mismatch,
            unmet_mw: battery_decision.unmet_mw,
            diesel_online: fleet.online_count(),
            n1_ok,
            tripped: protection.is_tripped(),
        };

        // Events are logged against the committed tick
        match fleet_decision.change {
            Some(FleetChange::Start { id, rating_mw }) => {
                info!(unit = id, rating_mw, t_s = t, "diesel unit starting");
            }
            Some(FleetChange::Stop { id, rating_mw }) => {
                info!(unit = id, rating_mw, t_s = t, "diesel unit stopping");
            }
            None => {}
        }
        if battery_decision.emergency_entered {
            warn!(
                t_s = t,
                deviation_hz = freq_error_hz,
                "battery emergency overload engaged"
            );
        }
        let was_short = self.trajectory.latest().is_some_and(|s| s.unmet_mw.abs() > 1e-9);
        if battery_decision.unmet_mw.abs() > 1e-9 && !was_short {
            warn!(
                t_s = t,
                soc = battery.soc(),
                unmet_mw = battery_decision.unmet_mw,
                "battery at SOC limit"
            );
        }
        for stage in &newly_tripped {
            warn!(
                t_s = t,
                ?stage,
                frequency_hz = update.frequency_hz,
                rocof_hz_per_s = update.rocof_hz_per_s,
                "protection relay tripped"
            );
        }
        debug!(
            t_s = t,
            pv_mw = pv,
            wind_mw = wind,
            load_mw = load,
            diesel_mw = diesel,
            battery_mw,
            frequency_hz = update.frequency_hz,
            soc = sample.soc,
            "tick"
        );

        // 8. Commit
        self.version = tick;
        self.time_s = t;
        self.frequency_hz = update.frequency_hz;
        self.rocof_hz_per_s = update.rocof_hz_per_s;
        self.fleet = fleet;
        self.battery = battery;
        self.protection = protection;
        self.energy.record(&sample, baseline_rate, dt_s);
        self.trajectory.push(sample.clone());

        Ok(sample)
    }
}

/// Host wrapper that owns at most one simulation instance.
///
/// Mirrors the remote protocol: initialize, reset, step, and read-only
/// queries. Every query before the first successful initialize fails with
/// `StepError::NotInitialized`.
#[derive(Debug, Default)]
pub struct Engine {
    state: Option<SimState>,
}

impl Engine {
    /// Creates an engine with no simulation loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current instance with a fresh one built from `config`.
    ///
    /// On error the previous instance, if any, is kept.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if the configuration is invalid.
    pub fn initialize(&mut self, config: impl Into<Arc<MicrogridConfig>>) -> Result<&SimState, SimError> {
        let state = initialize(config)?;
        Ok(&*self.state.insert(state))
    }

    /// Re-initializes from the current configuration, discarding history.
    ///
    /// # Errors
    ///
    /// Returns `StepError::NotInitialized` if nothing has been initialized.
    pub fn reset(&mut self) -> Result<&SimState, SimError> {
        let config = Arc::clone(&self.require()?.config);
        info!("simulation reset");
        self.initialize(config)
    }

    /// Advances the instance by one tick.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidStep` for a bad `dt_s` or when nothing has
    /// been initialized.
    pub fn step(&mut self, dt_s: f64) -> Result<Sample, SimError> {
        let state = self.state.as_mut().ok_or(StepError::NotInitialized)?;
        state.step(dt_s)
    }

    /// Runs `steps` ticks of `dt_s` and returns their samples.
    ///
    /// # Errors
    ///
    /// Stops at the first failing tick and returns its error.
    pub fn run(&mut self, steps: usize, dt_s: f64) -> Result<Vec<Sample>, SimError> {
        let state = self.state.as_mut().ok_or(StepError::NotInitialized)?;
        let mut samples = Vec::with_capacity(steps);
        for _ in 0..steps {
            samples.push(state.step(dt_s)?);
        }
        Ok(samples)
    }

    /// Current instance, if initialized.
    pub fn state(&self) -> Option<&SimState> {
        self.state.as_ref()
    }

    /// # Errors
    ///
    /// Returns `StepError::NotInitialized` if nothing has been initialized.
    pub fn kpis(&self) -> Result<KpiSnapshot, SimError> {
        Ok(kpis(self.require()?))
    }

    /// # Errors
    ///
    /// Returns `StepError::NotInitialized` if nothing has been initialized.
    pub fn trajectory(&self) -> Result<Vec<Sample>, SimError> {
        Ok(trajectory(self.require()?))
    }

    fn require(&self) -> Result<&SimState, SimError> {
        self.state
            .as_ref()
            .ok_or(SimError::InvalidStep(StepError::NotInitialized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SimState {
        initialize(MicrogridConfig::baseline()).expect("baseline is valid")
    }

    #[test]
    fn initial_state_is_nominal() {
        let s = state();
        assert_eq!(s.version, 0);
        assert_eq!(s.time_s, 0.0);
        assert_eq!(s.frequency_hz, 60.0);
        assert_eq!(s.battery.soc(), 0.6);
        assert!(s.trajectory.is_empty());
        assert!(!s.protection.is_tripped());
    }

    #[test]
    fn profile_devices_are_labelled() {
        assert_eq!(state().profiles.device_types(), ["SolarPV", "Wind", "SiteLoad"]);
    }

    #[test]
    fn initialize_is_idempotent() {
        assert_eq!(state(), state());
    }

    #[test]
    fn initialize_rejects_invalid_config() {
        let mut cfg = MicrogridConfig::baseline();
        cfg.system.damping = 0.0;
        cfg.battery.energy_mwh = -1.0;
        match initialize(cfg) {
            Err(SimError::Config(errors)) => assert!(errors.len() >= 2),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_dt_rejected_without_mutation() {
        let mut s = state();
        s.step(1.0).expect("step");
        let before = s.clone();
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = s.step(dt);
            assert!(matches!(
                err,
                Err(SimError::InvalidStep(StepError::NonPositiveDt(_)))
            ));
        }
        assert_eq!(s, before);
    }

    #[test]
    fn step_advances_time_and_records_sample() {
        let mut s = state();
        let sample = s.step(0.5).expect("step");
        assert_eq!(sample.t_s, 0.5);
        assert_eq!(s.version, 1);
        assert_eq!(s.trajectory.len(), 1);
        assert_eq!(s.trajectory.latest(), Some(&sample));
    }

    #[test]
    fn sample_mismatch_matches_signed_sum() {
        let mut s = state();
        for _ in 0..120 {
            let x = s.step(1.0).expect("step");
            let sum = x.pv_mw + x.wind_mw + x.diesel_mw + x.battery_mw - x.load_mw;
            assert!((sum - x.mismatch_mw).abs() < 1e-9);
        }
    }

    #[test]
    fn queries_do_not_mutate() {
        let mut s = state();
        s.step(1.0).expect("step");
        let before = s.clone();
        let _ = trajectory(&s);
        let _ = kpis(&s);
        assert_eq!(s, before);
    }

    #[test]
    fn trajectory_bounded_by_capacity() {
        let mut cfg = MicrogridConfig::baseline();
        cfg.simulation.trajectory_capacity = 10;
        let mut s = initialize(cfg).expect("valid");
        for _ in 0..25 {
            s.step(1.0).expect("step");
        }
        let tr = trajectory(&s);
        assert_eq!(tr.len(), 10);
        assert_eq!(tr[0].t_s, 16.0);
    }

    #[test]
    fn engine_requires_initialize() {
        let mut engine = Engine::new();
        assert!(matches!(
            engine.step(1.0),
            Err(SimError::InvalidStep(StepError::NotInitialized))
        ));
        assert!(engine.kpis().is_err());
        assert!(engine.reset().is_err());
    }

    #[test]
    fn engine_reset_discards_history() {
        let mut engine = Engine::new();
        engine.initialize(MicrogridConfig::baseline()).expect("valid");
        engine.run(30, 1.0).expect("run");
        let fresh = initialize(MicrogridConfig::baseline()).expect("valid");
        let reset = engine.reset().expect("reset").clone();
        assert_eq!(reset, fresh);
        assert!(engine.trajectory().expect("initialized").is_empty());
    }

    #[test]
    fn engine_keeps_state_on_failed_initialize() {
        let mut engine = Engine::new();
        engine.initialize(MicrogridConfig::baseline()).expect("valid");
        engine.step(1.0).expect("step");
        let mut bad = MicrogridConfig::baseline();
        bad.system.f0_hz = -1.0;
        assert!(engine.initialize(bad).is_err());
        assert_eq!(engine.state().map(|s| s.version), Some(1));
    }

    #[test]
    fn energy_totals_accumulate() {
        let mut s = state();
        for _ in 0..3600 {
            s.step(1.0).expect("step");
        }
        let k = kpis(&s);
        assert!((k.elapsed_s - 3600.0).abs() < 1e-6);
        assert!(k.load_energy_mwh > 11.0 && k.load_energy_mwh < 13.0);
        assert!(k.fuel_used_l > 0.0);
        assert!(k.fuel_baseline_l > k.fuel_used_l);
    }
}
