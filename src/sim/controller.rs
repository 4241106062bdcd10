//! Battery virtual-synchronous-generator (VSG) controller.

use serde::Serialize;

use crate::config::BatteryConfig;
use crate::devices::StorageUnit;

/// Inputs the battery controller needs for one tick.
#[derive(Debug, Clone, Copy)]
pub struct VsgInput {
    /// Residual demand not covered by diesel (MW).
    pub uncovered_mw: f64,
    /// `f0 − f` from the previous tick (Hz).
    pub freq_error_hz: f64,
    /// ROCOF from the previous tick (Hz/s).
    pub rocof_hz_per_s: f64,
    pub f0_hz: f64,
    pub dt_s: f64,
}

/// Outcome of one battery control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryDecision {
    /// Command after the rating (or emergency rating) clamp (MW).
    pub command_mw: f64,
    /// Power delivered after SOC limits (MW, positive = discharging).
    pub power_mw: f64,
    /// `command_mw − power_mw`; folded into the bus mismatch.
    pub unmet_mw: f64,
    /// Emergency overload became active on this tick.
    pub emergency_entered: bool,
}

/// Battery state carried between ticks: SOC physics plus the emergency
/// overload budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryState {
    #[serde(flatten)]
    pub storage: StorageUnit,
    /// Continuous time spent in emergency overload (s).
    pub overload_used_s: f64,
    /// Emergency overload active on the last tick.
    pub emergency: bool,
}

impl BatteryState {
    pub fn from_config(cfg: &BatteryConfig) -> Self {
        Self {
            storage: StorageUnit::from_config(cfg),
            overload_used_s: 0.0,
            emergency: false,
        }
    }

    pub fn soc(&self) -> f64 {
        self.storage.soc
    }

    /// SOC recovery bias (MW) handed to the diesel dispatcher.
    ///
    /// Positive above the band (diesel backs off so the battery discharges),
    /// negative below it (diesel picks up the recharge), zero inside.
    pub fn soc_bias_mw(&self, cfg: &BatteryConfig) -> f64 {
        let soc = self.storage.soc;
        let high = cfg.soc_target + cfg.soc_band / 2.0;
        let low = cfg.soc_target - cfg.soc_band / 2.0;
        let gain = cfg.soc_recovery_gain * self.storage.power_mw;
        if soc > high {
            gain * (soc - high)
        } else if soc < low {
            -gain * (low - soc)
        } else {
            0.0
        }
    }

    /// Present power limit in MW, raised by the overload multiplier while
    /// the emergency condition holds and budget remains.
    fn power_limit(&self, freq_error_hz: f64, cfg: &BatteryConfig) -> (f64, bool) {
        let rated = self.storage.power_mw;
        let deviated = freq_error_hz.abs() > cfg.emergency_threshold_hz;
        if deviated && self.overload_used_s < cfg.overload_duration_s {
            (rated * cfg.overload_multiplier, true)
        } else {
            (rated, false)
        }
    }

    /// Computes the VSG command and applies it to the storage, returning the
    /// next battery state without mutating `self`.
    ///
    /// Command is residual tracking plus droop `Kb·(f0 − f)` with
    /// `Kb = P_rated / (droop·f0)`, minus the inertial term
    /// `2H·P_rated/f0 · ROCOF`.
    pub fn control(&self, input: &VsgInput, cfg: &BatteryConfig) -> (Self, BatteryDecision) {
        let rated = self.storage.power_mw;
        let droop_gain = rated / (cfg.droop_pu * input.f0_hz);
        let inertia_gain = 2.0 * cfg.inertia_h_s * rated / input.f0_hz;
        let raw = input.uncovered_mw + droop_gain * input.freq_error_hz
            - inertia_gain * input.rocof_hz_per_s;

        let (limit, emergency) = self.power_limit(input.freq_error_hz, cfg);
        let command_mw = raw.clamp(-limit, limit);
        let outcome = self.storage.dispatch(command_mw, input.dt_s);

        let deviated = input.freq_error_hz.abs() > cfg.emergency_threshold_hz;
        let overload_used_s = match (deviated, emergency) {
            (false, _) => 0.0,
            (true, true) => self.overload_used_s + input.dt_s,
            (true, false) => self.overload_used_s,
        };

        let next = Self {
            storage: StorageUnit {
                soc: outcome.soc,
                ..self.storage.clone()
            },
            overload_used_s,
            emergency,
        };
        let decision = BatteryDecision {
            command_mw,
            power_mw: outcome.power_mw,
            unmet_mw: command_mw - outcome.power_mw,
            emergency_entered: emergency && !self.emergency,
        };
        (next, decision)
    }
}
