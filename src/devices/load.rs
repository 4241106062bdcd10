use std::f64::consts::PI;

use crate::config::LoadConfig;
use crate::devices::solar::local_hour;
use crate::devices::types::{Device, DeviceContext, bounded_jitter, stream};

/// Site demand with a daily cycle peaking mid-afternoon and a fifteen-minute
/// process oscillation.
///
/// Disturbance multipliers are applied by the engine, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLoad {
    /// Base demand in MW.
    pub base_mw: f64,
    /// Variability as a fraction of base.
    pub variability: f64,
    /// Jitter standard deviation as a fraction of base.
    pub noise_std: f64,
    /// Local solar hour at `t = 0`.
    pub start_hour: f64,
}

impl SiteLoad {
    pub fn from_config(cfg: &LoadConfig, start_hour: f64) -> Self {
        Self {
            base_mw: cfg.base_mw.max(0.0),
            variability: cfg.variability.clamp(0.0, 1.0),
            noise_std: cfg.noise_std.max(0.0),
            start_hour,
        }
    }
}

impl Device for SiteLoad {
    fn power_mw(&self, ctx: &DeviceContext) -> f64 {
        let h = local_hour(self.start_hour, ctx.time_s);
        let shape = 0.6 * (2.0 * PI * (h - 9.0) / 24.0).sin()
            + 0.4 * (2.0 * PI * ctx.time_s / 900.0).sin();
        let jitter = bounded_jitter(ctx.seed, ctx.tick, stream::LOAD, self.noise_std);
        (self.base_mw * (1.0 + self.variability * shape + jitter)).max(0.0)
    }

    fn device_type(&self) -> &'static str {
        "SiteLoad"
    }
}
