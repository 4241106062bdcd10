use crate::config::DisturbanceConfig;

/// Scheduled multiplicative load disturbance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadDisturbance {
    /// Start time in seconds (inclusive).
    pub start_s: f64,
    /// End time in seconds (exclusive).
    pub end_s: f64,
    /// Load multiplier while the event is active.
    pub multiplier: f64,
}

impl LoadDisturbance {
    /// Creates a disturbance spanning `[start_s, start_s + duration_s)`.
    pub fn new(start_s: f64, duration_s: f64, multiplier: f64) -> Self {
        Self {
            start_s,
            end_s: start_s + duration_s,
            multiplier,
        }
    }

    /// Returns `true` when `time_s` falls within the active window.
    pub fn is_active(&self, time_s: f64) -> bool {
        time_s >= self.start_s && time_s < self.end_s
    }
}

impl From<&DisturbanceConfig> for LoadDisturbance {
    fn from(cfg: &DisturbanceConfig) -> Self {
        Self::new(cfg.start_s, cfg.duration_s, cfg.multiplier)
    }
}

/// Product of the multipliers of every disturbance active at `time_s`.
///
/// Returns `1.0` when none is active.
pub fn load_multiplier_at(events: &[LoadDisturbance], time_s: f64) -> f64 {
    events
        .iter()
        .filter(|e| e.is_active(time_s))
        .map(|e| e.multiplier)
        .product()
}
