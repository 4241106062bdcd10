//! Command-line options for the batch host.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{ConfigError, MicrogridConfig};

/// Islanded microgrid power-frequency dispatch simulator.
///
/// If neither `--scenario` nor `--preset` is given, the baseline preset is used.
#[derive(Debug, Clone, Parser)]
#[command(name = "microgrid-sim", version, about)]
pub struct Cli {
    /// Load the scenario from a TOML file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, solar_noon, load_spike).
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Override the jitter seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the run horizon in hours.
    #[arg(long, value_name = "HOURS")]
    pub hours: Option<f64>,

    /// Override the step size in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub dt: Option<f64>,

    /// Export the retained trajectory to CSV.
    #[arg(long, value_name = "PATH")]
    pub telemetry_out: Option<PathBuf>,

    /// Print the KPI snapshot as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON lines.
    #[arg(long, env = "MICROGRID_LOG_JSON")]
    pub log_json: bool,

    /// Start the HTTP API instead of running a batch.
    #[cfg(feature = "api")]
    #[arg(long)]
    pub serve: bool,

    /// API server port.
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

impl Cli {
    /// Resolves the configuration source and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed, or the
    /// preset is unknown. Range checks happen later in `initialize`.
    pub fn load_config(&self) -> Result<MicrogridConfig, ConfigError> {
        let mut config = match (&self.scenario, &self.preset) {
            (Some(path), _) => MicrogridConfig::from_toml_file(Path::new(path))?,
            (None, Some(name)) => MicrogridConfig::from_preset(name)?,
            (None, None) => MicrogridConfig::baseline(),
        };
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(hours) = self.hours {
            config.simulation.horizon_hours = hours;
        }
        if let Some(dt) = self.dt {
            config.simulation.dt_s = dt;
        }
        Ok(config)
    }
}
