use std::f64::consts::PI;

use crate::config::PvConfig;
use crate::devices::types::{Device, DeviceContext, bounded_jitter, stream};

/// Period of the smooth cloud oscillation (s).
const CLOUD_PERIOD_S: f64 = 1800.0;

/// Sunrise and sunset in local solar hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise_h: f64,
    pub sunset_h: f64,
}

impl SunTimes {
    /// Hours of daylight (0.0–24.0).
    pub fn day_length_h(&self) -> f64 {
        self.sunset_h - self.sunrise_h
    }
}

/// Computes sunrise and sunset from latitude and day of year using the
/// standard solar declination approximation.
///
/// Polar day yields `0.0..24.0`; polar night yields an empty window at noon.
pub fn sun_times(latitude_deg: f64, day_of_year: u16) -> SunTimes {
    let decl = 23.44_f64.to_radians() * (2.0 * PI * (284.0 + f64::from(day_of_year)) / 365.0).sin();
    let x = -latitude_deg.to_radians().tan() * decl.tan();
    let day_length = if x <= -1.0 {
        24.0
    } else if x >= 1.0 {
        0.0
    } else {
        24.0 * x.acos() / PI
    };
    SunTimes {
        sunrise_h: 12.0 - day_length / 2.0,
        sunset_h: 12.0 + day_length / 2.0,
    }
}

/// A solar PV plant with a diurnal sine-power profile between sunrise and
/// sunset, attenuated by clouds and soiling.
///
/// Returns available (pre-curtailment) power in MW.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarPv {
    /// Installed capacity in MW.
    pub capacity_mw: f64,
    /// Exponent applied to the diurnal sine shape.
    pub shape_exponent: f64,
    /// Mean cloud attenuation (0.0–1.0).
    pub cloudiness: f64,
    /// Soiling loss fraction (0.0–1.0).
    pub soiling: f64,
    /// Standard deviation of the cloud jitter.
    pub noise_std: f64,
    /// Local solar hour at `t = 0`.
    pub start_hour: f64,
    /// Daylight window for the configured site and day.
    pub sun: SunTimes,
}

impl SolarPv {
    /// Builds the plant from its configuration section.
    ///
    /// # Arguments
    ///
    /// * `cfg` - PV configuration
    /// * `start_hour` - Local solar hour at simulated `t = 0`
    pub fn from_config(cfg: &PvConfig, start_hour: f64) -> Self {
        Self {
            capacity_mw: cfg.capacity_mw.max(0.0),
            shape_exponent: cfg.shape_exponent.max(0.0),
            cloudiness: cfg.cloudiness.clamp(0.0, 1.0),
            soiling: cfg.soiling.clamp(0.0, 1.0),
            noise_std: cfg.noise_std.max(0.0),
            start_hour,
            sun: sun_times(cfg.latitude_deg, cfg.day_of_year),
        }
    }

    /// Fraction of the daylight window elapsed at local hour `h`, or `None`
    /// outside daylight.
    fn daylight_frac(&self, hour: f64) -> Option<f64> {
        let len = self.sun.day_length_h();
        if len <= 0.0 || hour <= self.sun.sunrise_h || hour >= self.sun.sunset_h {
            return None;
        }
        Some((hour - self.sun.sunrise_h) / len)
    }

    /// Cloud attenuation at the given context (0.0–1.0).
    pub fn cloud_attenuation(&self, ctx: &DeviceContext) -> f64 {
        let osc = (2.0 * PI * ctx.time_s / CLOUD_PERIOD_S).sin();
        let jitter = bounded_jitter(ctx.seed, ctx.tick, stream::PV, self.noise_std);
        (self.cloudiness * (0.75 + 0.25 * osc) + jitter).clamp(0.0, 1.0)
    }
}

impl Device for SolarPv {
    fn power_mw(&self, ctx: &DeviceContext) -> f64 {
        let hour = local_hour(self.start_hour, ctx.time_s);
        let Some(frac) = self.daylight_frac(hour) else {
            return 0.0;
        };
        let shape = (PI * frac).sin().max(0.0).powf(self.shape_exponent);
        let mw = self.capacity_mw * shape * (1.0 - self.cloud_attenuation(ctx)) * (1.0 - self.soiling);
        mw.max(0.0)
    }

    fn device_type(&self) -> &'static str {
        "SolarPV"
    }
}

/// Local solar hour (0.0–24.0) at simulated time `time_s`.
pub fn local_hour(start_hour: f64, time_s: f64) -> f64 {
    (start_hour + time_s / 3600.0).rem_euclid(24.0)
}
