//! First-order frequency dynamics driven by bus power mismatch.

use crate::config::MicrogridConfig;
use crate::error::SimError;

/// Fraction of nominal frequency the integrator may wander from `f0`.
const GUARD_BAND_PU: f64 = 0.25;

/// Frequency model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyModel {
    pub f0_hz: f64,
    /// System damping `D` (s).
    pub damping: f64,
    /// Load frequency sensitivity `alpha` (pu/Hz).
    pub load_damping: f64,
    /// Installed capacity used to normalise the mismatch (MW).
    pub system_capacity_mw: f64,
    /// Largest allowed `|Δf| / dt` (Hz/s).
    pub roc_max_hz_per_s: f64,
}

/// Result of one frequency update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyUpdate {
    pub frequency_hz: f64,
    pub delta_hz: f64,
    pub rocof_hz_per_s: f64,
}

impl FrequencyModel {
    pub fn from_config(cfg: &MicrogridConfig) -> Self {
        Self {
            f0_hz: cfg.system.f0_hz,
            damping: cfg.system.damping,
            load_damping: cfg.system.load_damping_pu_per_hz,
            system_capacity_mw: cfg.system_capacity_mw(),
            roc_max_hz_per_s: cfg.system.roc_max_hz_per_s,
        }
    }

    /// Advances frequency by one tick.
    ///
    /// `Δf = (mismatch / capacity − alpha·(f − f0)) / D · dt`, clamped to
    /// `±roc_max·dt`, then held inside a guard band around `f0`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::NumericOverflow` if the update is not finite.
    pub fn advance(&self, f_prev_hz: f64, mismatch_mw: f64, dt_s: f64) -> Result<FrequencyUpdate, SimError> {
        let pu = mismatch_mw / self.system_capacity_mw;
        let raw = (pu - self.load_damping * (f_prev_hz - self.f0_hz)) / self.damping * dt_s;
        if !raw.is_finite() {
            return Err(SimError::NumericOverflow("frequency"));
        }
        let step_limit = self.roc_max_hz_per_s * dt_s;
        let band = GUARD_BAND_PU * self.f0_hz;
        let frequency_hz = (f_prev_hz + raw.clamp(-step_limit, step_limit))
            .clamp(self.f0_hz - band, self.f0_hz + band);
        let delta_hz = frequency_hz - f_prev_hz;
        let rocof_hz_per_s = delta_hz / dt_s;
        if !(frequency_hz.is_finite() && rocof_hz_per_s.is_finite()) {
            return Err(SimError::NumericOverflow("frequency"));
        }
        Ok(FrequencyUpdate {
            frequency_hz,
            delta_hz,
            rocof_hz_per_s,
        })
    }
}
