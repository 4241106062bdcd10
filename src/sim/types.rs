//! Core simulation types: the per-tick sample and the owned simulation state.

use std::sync::Arc;

use serde::Serialize;

use crate::config::MicrogridConfig;
use crate::devices::{Device, SiteLoad, SolarPv, WindFarm};

use super::controller::BatteryState;
use super::dispatch::DieselFleet;
use super::event::LoadDisturbance;
use super::kpi::EnergyAccount;
use super::protection::ProtectionState;
use super::trajectory::Trajectory;

/// One tick of simulation output. Immutable once produced.
///
/// Sign convention: generation and battery discharge are positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Simulated time at the end of the tick (s).
    pub t_s: f64,
    /// Delivered PV power after curtailment (MW).
    pub pv_mw: f64,
    /// Delivered wind power after curtailment (MW).
    pub wind_mw: f64,
    /// Site load including any active disturbance (MW).
    pub load_mw: f64,
    /// Aggregate diesel power (MW).
    pub diesel_mw: f64,
    /// Battery power (MW, positive = discharging).
    pub battery_mw: f64,
    /// Frequency at the end of the tick (Hz).
    pub frequency_hz: f64,
    pub rocof_hz_per_s: f64,
    /// Battery state of charge (0.0–1.0).
    pub soc: f64,
    /// Instantaneous diesel fuel rate (L/h).
    pub fuel_rate_l_per_h: f64,
    pub pv_curtailed_mw: f64,
    pub wind_curtailed_mw: f64,
    /// `pv + wind + diesel + battery − load` fed to the frequency model (MW).
    pub mismatch_mw: f64,
    /// Battery command the SOC limits prevented (MW).
    pub unmet_mw: f64,
    /// Diesel units online during the tick.
    pub diesel_online: usize,
    /// N−1 contingency check for the tick.
    pub n1_ok: bool,
    /// Any protection stage tripped or reclosing.
    pub tripped: bool,
}

/// Resource profiles derived from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Profiles {
    pub pv: SolarPv,
    pub wind: WindFarm,
    pub load: SiteLoad,
    pub disturbances: Vec<LoadDisturbance>,
}

impl Profiles {
    pub fn from_config(cfg: &MicrogridConfig) -> Self {
        let start_hour = cfg.simulation.start_hour;
        Self {
            pv: SolarPv::from_config(&cfg.pv, start_hour),
            wind: WindFarm::from_config(&cfg.wind),
            load: SiteLoad::from_config(&cfg.load, start_hour),
            disturbances: cfg.disturbance.iter().map(LoadDisturbance::from).collect(),
        }
    }

    /// Type labels of the profile devices, in PV, wind, load order.
    pub fn device_types(&self) -> [&'static str; 3] {
        [
            self.pv.device_type(),
            self.wind.device_type(),
            self.load.device_type(),
        ]
    }
}

/// The complete, owned simulation state.
///
/// Advanced only by [`SimState::step`]. Every instance owns its own
/// configuration handle and history, so independent instances never share
/// mutable data.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub config: Arc<MicrogridConfig>,
    /// Completed ticks.
    pub version: u64,
    /// Elapsed simulated time (s).
    pub time_s: f64,
    pub frequency_hz: f64,
    /// ROCOF from the last tick (Hz/s).
    pub rocof_hz_per_s: f64,
    pub battery: BatteryState,
    pub fleet: DieselFleet,
    pub protection: ProtectionState,
    pub energy: EnergyAccount,
    pub trajectory: Trajectory,
    pub profiles: Profiles,
}

/// Serializable snapshot of the mutable state for hosts.
#[derive(Debug, Clone, Serialize)]
pub struct StateView<'a> {
    pub version: u64,
    pub time_s: f64,
    pub frequency_hz: f64,
    pub rocof_hz_per_s: f64,
    pub battery: &'a BatteryState,
    pub fleet: &'a DieselFleet,
    pub protection: &'a ProtectionState,
    pub energy: &'a EnergyAccount,
    pub trajectory_len: usize,
}

impl SimState {
    /// Borrowing view of the state suitable for serialization.
    pub fn view(&self) -> StateView<'_> {
        StateView {
            version: self.version,
            time_s: self.time_s,
            frequency_hz: self.frequency_hz,
            rocof_hz_per_s: self.rocof_hz_per_s,
            battery: &self.battery,
            fleet: &self.fleet,
            protection: &self.protection,
            energy: &self.energy,
            trajectory_len: self.trajectory.len(),
        }
    }
}
