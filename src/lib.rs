//! Islanded microgrid power-frequency dispatch simulator.
//!
//! A fixed-step simulation of PV, wind, a diesel fleet and a grid-forming
//! battery on an isolated bus, with frequency dynamics, protection relays and
//! fuel/renewable KPIs.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod devices;
pub mod error;
pub mod io;
pub mod runner;
/// Simulation engine, dispatch, control, frequency and protection modules.
pub mod sim;
pub mod telemetry;

pub use config::MicrogridConfig;
pub use error::{ConfigError, SimError, StepError};
pub use sim::{Engine, KpiSnapshot, Sample, SimState, initialize, kpis, step, trajectory};
