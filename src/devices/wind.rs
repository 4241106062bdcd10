use std::f64::consts::PI;

use crate::config::WindConfig;
use crate::devices::types::{Device, DeviceContext, bounded_jitter, stream};

/// A wind farm driven by a smooth two-period speed signal and a cubic power
/// curve.
#[derive(Debug, Clone, PartialEq)]
pub struct WindFarm {
    /// Installed capacity in MW.
    pub capacity_mw: f64,
    /// Mean hub-height speed (m/s).
    pub mean_speed_ms: f64,
    /// Scales both oscillatory speed terms.
    pub variability: f64,
    pub cut_in_ms: f64,
    pub rated_speed_ms: f64,
    pub cut_out_ms: f64,
    /// Standard deviation of the speed jitter (m/s).
    pub noise_std: f64,
}

impl WindFarm {
    pub fn from_config(cfg: &WindConfig) -> Self {
        Self {
            capacity_mw: cfg.capacity_mw.max(0.0),
            mean_speed_ms: cfg.mean_speed_ms.max(0.0),
            variability: cfg.variability.max(0.0),
            cut_in_ms: cfg.cut_in_ms,
            rated_speed_ms: cfg.rated_speed_ms,
            cut_out_ms: cfg.cut_out_ms,
            noise_std: cfg.noise_std.max(0.0),
        }
    }

    /// Hub-height wind speed (m/s) at the given context.
    pub fn speed_ms(&self, ctx: &DeviceContext) -> f64 {
        let t = ctx.time_s;
        let osc = 0.6 * (2.0 * PI * t / 1200.0 + 1.2).sin() + 0.4 * (2.0 * PI * t / 5400.0).sin();
        let jitter = bounded_jitter(ctx.seed, ctx.tick, stream::WIND, self.noise_std);
        (self.mean_speed_ms * (1.0 + self.variability * osc) + jitter).max(0.0)
    }

    /// Fraction of capacity produced at wind speed `v` (0.0–1.0).
    pub fn power_fraction(&self, v: f64) -> f64 {
        if v < self.cut_in_ms || v > self.cut_out_ms {
            return 0.0;
        }
        if v >= self.rated_speed_ms {
            return 1.0;
        }
        let x = (v - self.cut_in_ms) / (self.rated_speed_ms - self.cut_in_ms);
        (x * x * x).clamp(0.0, 1.0)
    }
}

impl Device for WindFarm {
    fn power_mw(&self, ctx: &DeviceContext) -> f64 {
        self.capacity_mw * self.power_fraction(self.speed_ms(ctx))
    }

    fn device_type(&self) -> &'static str {
        "Wind"
    }
}
