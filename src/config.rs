//! TOML-based microgrid configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use crate::error::ConfigError;

/// Top-level microgrid configuration parsed from TOML.
///
/// Immutable for the lifetime of a run. All fields have defaults matching
/// the baseline 12 MW mining microgrid. Load from TOML with
/// [`MicrogridConfig::from_toml_file`] or use [`MicrogridConfig::baseline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MicrogridConfig {
    /// Step size, horizon, seed, and trajectory retention.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Nominal frequency and the first-order frequency model.
    #[serde(default)]
    pub system: SystemConfig,
    /// Site load profile.
    #[serde(default)]
    pub load: LoadConfig,
    /// Photovoltaic plant.
    #[serde(default)]
    pub pv: PvConfig,
    /// Wind farm.
    #[serde(default)]
    pub wind: WindConfig,
    /// Diesel generator fleet.
    #[serde(default)]
    pub diesel: DieselConfig,
    /// Battery energy storage system.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Frequency protection relays.
    #[serde(default)]
    pub protection: ProtectionConfig,
    /// Specific fuel consumption curve.
    #[serde(default)]
    pub fuel: FuelConfig,
    /// Scheduled load disturbances.
    #[serde(default)]
    pub disturbance: Vec<DisturbanceConfig>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Default step size in seconds used by the batch runner (must be > 0).
    pub dt_s: f64,
    /// Batch run horizon in hours (must be > 0).
    pub horizon_hours: f64,
    /// Seed for the bounded profile jitter.
    pub seed: u64,
    /// Local solar hour at `t = 0` (0.0–24.0).
    pub start_hour: f64,
    /// Number of samples retained in the trajectory ring buffer.
    pub trajectory_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_s: 1.0,
            horizon_hours: 24.0,
            seed: 42,
            start_hour: 0.0,
            trajectory_capacity: 86_400,
        }
    }
}

/// Nominal frequency and first-order frequency model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Nominal frequency (Hz).
    pub f0_hz: f64,
    /// System damping `D` (s). Larger values slow the frequency response.
    pub damping: f64,
    /// Load frequency sensitivity `alpha` (per-unit power per Hz).
    pub load_damping_pu_per_hz: f64,
    /// Maximum frequency change rate the integrator may apply (Hz/s).
    pub roc_max_hz_per_s: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            f0_hz: 60.0,
            damping: 2.0,
            load_damping_pu_per_hz: 0.025,
            roc_max_hz_per_s: 2.0,
        }
    }
}

/// Site load profile parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Base load (MW).
    pub base_mw: f64,
    /// Periodic variability as a fraction of base (0.0–1.0).
    pub variability: f64,
    /// Optional jitter standard deviation as a fraction of base.
    pub noise_std: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_mw: 12.0,
            variability: 0.05,
            noise_std: 0.0,
        }
    }
}

/// Photovoltaic plant parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PvConfig {
    /// Installed capacity (MW).
    pub capacity_mw: f64,
    /// Exponent applied to the diurnal sine shape.
    pub shape_exponent: f64,
    /// Mean cloud attenuation (0.0 = clear, 1.0 = overcast).
    pub cloudiness: f64,
    /// Site latitude (degrees, north positive).
    pub latitude_deg: f64,
    /// Day of year (1–366).
    pub day_of_year: u16,
    /// Soiling loss fraction (0.0–1.0).
    pub soiling: f64,
    /// Optional jitter standard deviation on cloud attenuation.
    pub noise_std: f64,
}

impl Default for PvConfig {
    fn default() -> Self {
        Self {
            capacity_mw: 5.0,
            shape_exponent: 1.2,
            cloudiness: 0.1,
            latitude_deg: 25.0,
            day_of_year: 172,
            soiling: 0.03,
            noise_std: 0.0,
        }
    }
}

/// Wind farm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindConfig {
    /// Installed capacity (MW).
    pub capacity_mw: f64,
    /// Mean hub-height wind speed (m/s).
    pub mean_speed_ms: f64,
    /// Variability coefficient applied to the oscillatory speed terms.
    pub variability: f64,
    /// Cut-in speed (m/s).
    pub cut_in_ms: f64,
    /// Rated speed (m/s).
    pub rated_speed_ms: f64,
    /// Cut-out speed (m/s).
    pub cut_out_ms: f64,
    /// Optional jitter standard deviation on wind speed (m/s).
    pub noise_std: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            capacity_mw: 6.0,
            mean_speed_ms: 8.0,
            variability: 0.2,
            cut_in_ms: 3.0,
            rated_speed_ms: 12.0,
            cut_out_ms: 25.0,
            noise_std: 0.0,
        }
    }
}

/// Diesel generator fleet parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DieselConfig {
    /// Number of large units.
    pub large_count: usize,
    /// Rating of one large unit (MW).
    pub large_unit_mw: f64,
    /// Number of small units.
    pub small_count: usize,
    /// Rating of one small unit (MW).
    pub small_unit_mw: f64,
    /// Governor droop (per-unit, 0.05 = 5 %).
    pub droop_pu: f64,
    /// Minimum loading of an online unit (fraction of rating).
    pub min_loading_pu: f64,
    /// Fleet ramp-up limit (MW/s).
    pub ramp_up_mw_per_s: f64,
    /// Fleet ramp-down limit (MW/s).
    pub ramp_down_mw_per_s: f64,
    /// Start/stop delay and minimum spacing between fleet transitions (s).
    pub start_stop_delay_s: f64,
    /// Hysteresis band below the online floor before a unit is released (MW).
    pub hysteresis_mw: f64,
    /// Whether the fleet may run with zero units online.
    pub allow_all_off: bool,
    /// Units online at initialization (largest first).
    pub initial_online: usize,
}

impl Default for DieselConfig {
    fn default() -> Self {
        Self {
            large_count: 6,
            large_unit_mw: 3.3,
            small_count: 2,
            small_unit_mw: 1.25,
            droop_pu: 0.05,
            min_loading_pu: 0.3,
            ramp_up_mw_per_s: 0.5,
            ramp_down_mw_per_s: 0.5,
            start_stop_delay_s: 30.0,
            hysteresis_mw: 0.5,
            allow_all_off: false,
            initial_online: 2,
        }
    }
}

impl DieselConfig {
    /// Total number of units in the fleet.
    pub fn unit_count(&self) -> usize {
        self.large_count + self.small_count
    }

    /// Installed fleet capacity (MW).
    pub fn fleet_capacity_mw(&self) -> f64 {
        self.large_count as f64 * self.large_unit_mw + self.small_count as f64 * self.small_unit_mw
    }
}

/// Battery energy storage parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Rated inverter power (MW).
    pub power_mw: f64,
    /// Usable energy capacity (MWh).
    pub energy_mwh: f64,
    /// Initial state of charge (0.0–1.0).
    pub initial_soc: f64,
    /// VSG droop (per-unit, 0.02 = 2 %).
    pub droop_pu: f64,
    /// Virtual inertia constant `H` (s).
    pub inertia_h_s: f64,
    /// SOC target (0.0–1.0).
    pub soc_target: f64,
    /// Width of the SOC dead band centred on the target.
    pub soc_band: f64,
    /// Restoring gain outside the SOC band (rated power per unit SOC).
    pub soc_recovery_gain: f64,
    /// Round-trip efficiency (0.0–1.0], split evenly over both legs.
    pub round_trip_efficiency: f64,
    /// Frequency deviation that arms the emergency overload (Hz).
    pub emergency_threshold_hz: f64,
    /// Rating multiplier during emergency overload.
    pub overload_multiplier: f64,
    /// Maximum continuous emergency overload (s).
    pub overload_duration_s: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            power_mw: 8.0,
            energy_mwh: 24.0,
            initial_soc: 0.6,
            droop_pu: 0.02,
            inertia_h_s: 4.0,
            soc_target: 0.6,
            soc_band: 0.2,
            soc_recovery_gain: 1.0,
            round_trip_efficiency: 0.9,
            emergency_threshold_hz: 0.5,
            overload_multiplier: 1.5,
            overload_duration_s: 10.0,
        }
    }
}

/// Frequency protection relay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtectionConfig {
    /// ROCOF trip limit (Hz/s).
    pub rocof_trip_hz_per_s: f64,
    /// Over-frequency stage 1 pickup (Hz).
    pub of1_hz: f64,
    /// Over-frequency stage 1 delay (s).
    pub of1_delay_s: f64,
    /// Over-frequency stage 2 pickup (Hz), above stage 1.
    pub of2_hz: f64,
    /// Over-frequency stage 2 delay (s), no longer than stage 1.
    pub of2_delay_s: f64,
    /// Under-frequency stage 1 pickup (Hz).
    pub uf1_hz: f64,
    /// Under-frequency stage 1 delay (s).
    pub uf1_delay_s: f64,
    /// Under-frequency stage 2 pickup (Hz), below stage 1.
    pub uf2_hz: f64,
    /// Under-frequency stage 2 delay (s), no longer than stage 1.
    pub uf2_delay_s: f64,
    /// Time after a trip before the relay reports reclosing (s).
    pub reclose_delay_s: f64,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            rocof_trip_hz_per_s: 1.0,
            of1_hz: 61.0,
            of1_delay_s: 10.0,
            of2_hz: 61.8,
            of2_delay_s: 0.5,
            uf1_hz: 59.0,
            uf1_delay_s: 10.0,
            uf2_hz: 58.2,
            uf2_delay_s: 0.5,
            reclose_delay_s: 30.0,
        }
    }
}

/// Piecewise specific fuel consumption curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelConfig {
    /// Loading breakpoints (fraction of rating, strictly increasing).
    pub loading_pu: Vec<f64>,
    /// Specific fuel consumption at each breakpoint (g/kWh).
    pub sfc_g_per_kwh: Vec<f64>,
    /// Fuel density (kg/L).
    pub density_kg_per_l: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            loading_pu: vec![0.25, 0.5, 0.75, 1.0],
            sfc_g_per_kwh: vec![300.0, 240.0, 220.0, 215.0],
            density_kg_per_l: 0.84,
        }
    }
}

/// A scheduled multiplicative load disturbance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisturbanceConfig {
    /// Simulated time the disturbance starts (s, inclusive).
    pub start_s: f64,
    /// Duration (s).
    pub duration_s: f64,
    /// Load multiplier while active.
    pub multiplier: f64,
}

impl Default for MicrogridConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl MicrogridConfig {
    /// Returns the baseline mining microgrid scenario.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            system: SystemConfig::default(),
            load: LoadConfig::default(),
            pv: PvConfig::default(),
            wind: WindConfig::default(),
            diesel: DieselConfig::default(),
            battery: BatteryConfig::default(),
            protection: ProtectionConfig::default(),
            fuel: FuelConfig::default(),
            disturbance: Vec::new(),
        }
    }

    /// One simulated hour from local solar noon with the diesel fleet removed.
    pub fn solar_noon() -> Self {
        Self {
            simulation: SimulationConfig {
                horizon_hours: 1.0,
                start_hour: 12.0,
                ..SimulationConfig::default()
            },
            load: LoadConfig {
                base_mw: 12.0,
                ..LoadConfig::default()
            },
            pv: PvConfig {
                capacity_mw: 5.0,
                latitude_deg: 25.0,
                day_of_year: 172,
                ..PvConfig::default()
            },
            wind: WindConfig {
                capacity_mw: 6.0,
                ..WindConfig::default()
            },
            diesel: DieselConfig {
                large_count: 0,
                small_count: 0,
                allow_all_off: true,
                initial_online: 0,
                ..DieselConfig::default()
            },
            battery: BatteryConfig {
                power_mw: 8.0,
                energy_mwh: 24.0,
                initial_soc: 0.8,
                ..BatteryConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Single-tick 3x load spike against a slow-ramping diesel fleet.
    pub fn load_spike() -> Self {
        Self {
            simulation: SimulationConfig {
                horizon_hours: 0.5,
                start_hour: 10.0,
                ..SimulationConfig::default()
            },
            diesel: DieselConfig {
                ramp_up_mw_per_s: 0.2,
                initial_online: 4,
                ..DieselConfig::default()
            },
            disturbance: vec![DisturbanceConfig {
                start_s: 600.0,
                duration_s: 1.0,
                multiplier: 3.0,
            }],
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "solar_noon", "load_spike"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "solar_noon" => Ok(Self::solar_noon()),
            "load_spike" => Ok(Self::load_spike()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Sum of installed capacities used to normalise the power mismatch (MW).
    pub fn system_capacity_mw(&self) -> f64 {
        self.pv.capacity_mw
            + self.wind.capacity_mw
            + self.diesel.fleet_capacity_mw()
            + self.battery.power_mw
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut positive = |field: &str, value: f64| {
            if !(value.is_finite() && value > 0.0) {
                errors.push(ConfigError::new(field, format!("must be > 0, got {value}")));
            }
        };

        let s = &self.simulation;
        positive("simulation.dt_s", s.dt_s);
        positive("simulation.horizon_hours", s.horizon_hours);

        let sys = &self.system;
        positive("system.f0_hz", sys.f0_hz);
        positive("system.damping", sys.damping);
        positive("system.roc_max_hz_per_s", sys.roc_max_hz_per_s);

        let d = &self.diesel;
        if d.large_count > 0 {
            positive("diesel.large_unit_mw", d.large_unit_mw);
        }
        if d.small_count > 0 {
            positive("diesel.small_unit_mw", d.small_unit_mw);
        }
        positive("diesel.droop_pu", d.droop_pu);
        positive("diesel.ramp_up_mw_per_s", d.ramp_up_mw_per_s);
        positive("diesel.ramp_down_mw_per_s", d.ramp_down_mw_per_s);

        let b = &self.battery;
        if b.power_mw > 0.0 {
            positive("battery.energy_mwh", b.energy_mwh);
        }
        positive("battery.droop_pu", b.droop_pu);
        positive("battery.round_trip_efficiency", b.round_trip_efficiency);
        positive("battery.emergency_threshold_hz", b.emergency_threshold_hz);

        let p = &self.protection;
        positive("protection.rocof_trip_hz_per_s", p.rocof_trip_hz_per_s);
        positive("protection.of1_delay_s", p.of1_delay_s);
        positive("protection.of2_delay_s", p.of2_delay_s);
        positive("protection.uf1_delay_s", p.uf1_delay_s);
        positive("protection.uf2_delay_s", p.uf2_delay_s);

        positive("fuel.density_kg_per_l", self.fuel.density_kg_per_l);

        if s.trajectory_capacity == 0 {
            errors.push(ConfigError::new(
                "simulation.trajectory_capacity",
                "must be > 0",
            ));
        }
        if !(0.0..=24.0).contains(&s.start_hour) {
            errors.push(ConfigError::new(
                "simulation.start_hour",
                "must be in [0.0, 24.0]",
            ));
        }
        if !(sys.load_damping_pu_per_hz.is_finite() && sys.load_damping_pu_per_hz >= 0.0) {
            errors.push(ConfigError::new(
                "system.load_damping_pu_per_hz",
                "must be >= 0",
            ));
        }
        if self.system_capacity_mw() <= 0.0 {
            errors.push(ConfigError::new(
                "system",
                "total installed capacity must be > 0",
            ));
        }

        errors.extend(self.validate_sources());
        errors.extend(self.validate_diesel());
        errors.extend(self.validate_battery());
        errors.extend(self.validate_protection());
        errors.extend(self.validate_fuel());

        for (i, ev) in self.disturbance.iter().enumerate() {
            if !(ev.start_s.is_finite() && ev.start_s >= 0.0) {
                errors.push(ConfigError::new(
                    format!("disturbance[{i}].start_s"),
                    "must be >= 0",
                ));
            }
            if !(ev.duration_s.is_finite() && ev.duration_s > 0.0) {
                errors.push(ConfigError::new(
                    format!("disturbance[{i}].duration_s"),
                    "must be > 0",
                ));
            }
            if !(ev.multiplier.is_finite() && ev.multiplier >= 0.0) {
                errors.push(ConfigError::new(
                    format!("disturbance[{i}].multiplier"),
                    "must be >= 0",
                ));
            }
        }

        errors
    }

    fn validate_sources(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let non_negative = [
            ("load.base_mw", self.load.base_mw),
            ("load.noise_std", self.load.noise_std),
            ("pv.capacity_mw", self.pv.capacity_mw),
            ("pv.shape_exponent", self.pv.shape_exponent),
            ("pv.noise_std", self.pv.noise_std),
            ("wind.capacity_mw", self.wind.capacity_mw),
            ("wind.mean_speed_ms", self.wind.mean_speed_ms),
            ("wind.variability", self.wind.variability),
            ("wind.noise_std", self.wind.noise_std),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError::new(field, format!("must be >= 0, got {value}")));
            }
        }

        let fractions = [
            ("load.variability", self.load.variability),
            ("pv.cloudiness", self.pv.cloudiness),
            ("pv.soiling", self.pv.soiling),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }

        if !(-90.0..=90.0).contains(&self.pv.latitude_deg) {
            errors.push(ConfigError::new("pv.latitude_deg", "must be in [-90, 90]"));
        }
        if !(1..=366).contains(&self.pv.day_of_year) {
            errors.push(ConfigError::new("pv.day_of_year", "must be in [1, 366]"));
        }

        let w = &self.wind;
        if !(w.cut_in_ms >= 0.0 && w.cut_in_ms < w.rated_speed_ms && w.rated_speed_ms < w.cut_out_ms)
        {
            errors.push(ConfigError::new(
                "wind.rated_speed_ms",
                "must satisfy 0 <= cut_in_ms < rated_speed_ms < cut_out_ms",
            ));
        }
        errors
    }

    fn validate_diesel(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let d = &self.diesel;
        if !(0.0..1.0).contains(&d.min_loading_pu) {
            errors.push(ConfigError::new(
                "diesel.min_loading_pu",
                "must be in [0.0, 1.0)",
            ));
        }
        if !(d.start_stop_delay_s.is_finite() && d.start_stop_delay_s >= 0.0) {
            errors.push(ConfigError::new(
                "diesel.start_stop_delay_s",
                "must be >= 0",
            ));
        }
        if !(d.hysteresis_mw.is_finite() && d.hysteresis_mw >= 0.0) {
            errors.push(ConfigError::new("diesel.hysteresis_mw", "must be >= 0"));
        }
        if d.initial_online > d.unit_count() {
            errors.push(ConfigError::new(
                "diesel.initial_online",
                format!("must be <= unit count ({})", d.unit_count()),
            ));
        }
        if d.unit_count() == 0 && !d.allow_all_off {
            errors.push(ConfigError::new(
                "diesel.allow_all_off",
                "an empty fleet cannot keep a unit online; set allow_all_off = true",
            ));
        }
        errors
    }

    fn validate_battery(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let b = &self.battery;
        if !(b.power_mw.is_finite() && b.power_mw >= 0.0) {
            errors.push(ConfigError::new("battery.power_mw", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&b.initial_soc) {
            errors.push(ConfigError::new(
                "battery.initial_soc",
                "must be in [0.0, 1.0]",
            ));
        }
        if !(0.0..=1.0).contains(&b.soc_target) {
            errors.push(ConfigError::new("battery.soc_target", "must be in [0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&b.soc_band) {
            errors.push(ConfigError::new("battery.soc_band", "must be in [0.0, 1.0]"));
        }
        if b.round_trip_efficiency > 1.0 {
            errors.push(ConfigError::new(
                "battery.round_trip_efficiency",
                "must be <= 1.0",
            ));
        }
        if !(b.inertia_h_s.is_finite() && b.inertia_h_s >= 0.0) {
            errors.push(ConfigError::new("battery.inertia_h_s", "must be >= 0"));
        }
        if !(b.soc_recovery_gain.is_finite() && b.soc_recovery_gain >= 0.0) {
            errors.push(ConfigError::new(
                "battery.soc_recovery_gain",
                "must be >= 0",
            ));
        }
        if !(b.overload_multiplier.is_finite() && b.overload_multiplier >= 1.0) {
            errors.push(ConfigError::new(
                "battery.overload_multiplier",
                "must be >= 1.0",
            ));
        }
        if !(b.overload_duration_s.is_finite() && b.overload_duration_s >= 0.0) {
            errors.push(ConfigError::new(
                "battery.overload_duration_s",
                "must be >= 0",
            ));
        }
        errors
    }

    fn validate_protection(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let p = &self.protection;
        let f0 = self.system.f0_hz;
        // Written as `!(finite && ok)` so NaN fails every check.
        if !(p.rocof_trip_hz_per_s.is_finite() && p.rocof_trip_hz_per_s < self.system.roc_max_hz_per_s) {
            errors.push(ConfigError::new(
                "protection.rocof_trip_hz_per_s",
                "must be < system.roc_max_hz_per_s",
            ));
        }
        if !(p.of1_hz.is_finite() && p.of1_hz > f0) {
            errors.push(ConfigError::new("protection.of1_hz", "must be > system.f0_hz"));
        }
        if !(p.of2_hz.is_finite() && p.of2_hz > p.of1_hz) {
            errors.push(ConfigError::new("protection.of2_hz", "must be > protection.of1_hz"));
        }
        if !(p.of2_delay_s.is_finite() && p.of2_delay_s <= p.of1_delay_s) {
            errors.push(ConfigError::new(
                "protection.of2_delay_s",
                "must be <= protection.of1_delay_s",
            ));
        }
        if !(p.uf1_hz.is_finite() && p.uf1_hz < f0) {
            errors.push(ConfigError::new("protection.uf1_hz", "must be < system.f0_hz"));
        }
        if !(p.uf2_hz.is_finite() && p.uf2_hz < p.uf1_hz) {
            errors.push(ConfigError::new("protection.uf2_hz", "must be < protection.uf1_hz"));
        }
        if !(p.uf2_delay_s.is_finite() && p.uf2_delay_s <= p.uf1_delay_s) {
            errors.push(ConfigError::new(
                "protection.uf2_delay_s",
                "must be <= protection.uf1_delay_s",
            ));
        }
        if !(p.reclose_delay_s.is_finite() && p.reclose_delay_s >= 0.0) {
            errors.push(ConfigError::new("protection.reclose_delay_s", "must be >= 0"));
        }
        errors
    }

    fn validate_fuel(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let fuel = &self.fuel;
        if fuel.loading_pu.len() < 2 || fuel.loading_pu.len() != fuel.sfc_g_per_kwh.len() {
            errors.push(ConfigError::new(
                "fuel.loading_pu",
                "needs >= 2 breakpoints, one per sfc_g_per_kwh entry",
            ));
            return errors;
        }
        let increasing = fuel.loading_pu.windows(2).all(|w| w[0] < w[1]);
        let in_range = fuel.loading_pu.iter().all(|&x| x > 0.0 && x <= 1.0);
        if !(increasing && in_range) {
            errors.push(ConfigError::new(
                "fuel.loading_pu",
                "must be strictly increasing within (0.0, 1.0]",
            ));
        }
        if !fuel.sfc_g_per_kwh.iter().all(|&x| x.is_finite() && x > 0.0) {
            errors.push(ConfigError::new("fuel.sfc_g_per_kwh", "must all be > 0"));
        }
        errors
    }
}
