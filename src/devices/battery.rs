use serde::Serialize;

use crate::config::BatteryConfig;

/// Result of asking the storage unit for a power level over one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageOutcome {
    /// Power actually delivered in MW (positive = discharging).
    pub power_mw: f64,
    /// State of charge after the tick (0.0–1.0).
    pub soc: f64,
}

/// A battery energy storage system with SOC-bounded charge and discharge.
///
/// `StorageUnit` owns the SOC physics only. Power limits from the inverter
/// rating and emergency overload are applied by the controller before the
/// command reaches [`StorageUnit::dispatch`].
///
/// # Power Flow Convention
/// - Positive power: discharging (supplying the bus)
/// - Negative power: charging (absorbing from the bus)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageUnit {
    /// Rated inverter power in MW.
    pub power_mw: f64,
    /// Usable energy capacity in MWh.
    pub energy_mwh: f64,
    /// State of charge as a fraction (0.0 to 1.0).
    pub soc: f64,
    /// One-way efficiency, `sqrt(round_trip_efficiency)`.
    pub eta_leg: f64,
}

impl StorageUnit {
    /// Creates the storage unit from its configuration section.
    pub fn from_config(cfg: &BatteryConfig) -> Self {
        Self {
            power_mw: cfg.power_mw.max(0.0),
            energy_mwh: cfg.energy_mwh.max(0.0),
            soc: cfg.initial_soc.clamp(0.0, 1.0),
            eta_leg: cfg.round_trip_efficiency.clamp(f64::MIN_POSITIVE, 1.0).sqrt(),
        }
    }

    /// Largest discharge power (MW) the stored energy can sustain for `dt_s`.
    pub fn max_discharge_mw(&self, dt_s: f64) -> f64 {
        let dt_h = dt_s / 3600.0;
        (self.soc * self.energy_mwh * self.eta_leg / dt_h).max(0.0)
    }

    /// Largest charge power (MW) the remaining headroom can absorb for `dt_s`.
    pub fn max_charge_mw(&self, dt_s: f64) -> f64 {
        let dt_h = dt_s / 3600.0;
        ((1.0 - self.soc) * self.energy_mwh / (self.eta_leg * dt_h)).max(0.0)
    }

    /// Applies SOC limits to a signed power command without mutating the unit.
    ///
    /// # Arguments
    ///
    /// * `command_mw` - Requested power, already limited to the inverter rating
    /// * `dt_s` - Tick length in seconds (> 0)
    ///
    /// # Returns
    ///
    /// The delivered power and the resulting SOC. The difference between
    /// `command_mw` and the delivered power is unmet by storage.
    pub fn dispatch(&self, command_mw: f64, dt_s: f64) -> StorageOutcome {
        if self.energy_mwh <= 0.0 {
            return StorageOutcome {
                power_mw: 0.0,
                soc: self.soc,
            };
        }
        let dt_h = dt_s / 3600.0;

        if command_mw > 0.0 {
            let actual = command_mw.min(self.max_discharge_mw(dt_s));
            let soc = self.soc - actual * dt_h / (self.energy_mwh * self.eta_leg);
            StorageOutcome {
                power_mw: actual,
                soc: soc.clamp(0.0, 1.0),
            }
        } else if command_mw < 0.0 {
            let actual = (-command_mw).min(self.max_charge_mw(dt_s));
            let soc = self.soc + actual * dt_h * self.eta_leg / self.energy_mwh;
            StorageOutcome {
                power_mw: -actual,
                soc: soc.clamp(0.0, 1.0),
            }
        } else {
            StorageOutcome {
                power_mw: 0.0,
                soc: self.soc,
            }
        }
    }
}
