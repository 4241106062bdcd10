//! Resource profile generators and storage physics.

/// Battery energy storage SOC model.
pub mod battery;
/// Site demand profile.
pub mod load;
/// Solar photovoltaic generation model.
pub mod solar;
pub mod types;
/// Wind farm generation model.
pub mod wind;

pub use battery::{StorageOutcome, StorageUnit};
pub use load::SiteLoad;
pub use solar::{SolarPv, SunTimes, sun_times};
pub use types::Device;
pub use types::DeviceContext;
pub use wind::WindFarm;
