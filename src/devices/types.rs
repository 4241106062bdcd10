//! Common types and traits for resource profile components.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Contextual information passed to devices when evaluating a profile.
///
/// # Fields
/// * `time_s` - Simulated time the profile is evaluated at (seconds since t = 0)
/// * `tick` - Index of the tick being computed (1 for the first step)
/// * `seed` - Run seed used to derive per-tick jitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceContext {
    pub time_s: f64,
    pub tick: u64,
    pub seed: u64,
}

impl DeviceContext {
    /// Creates a new DeviceContext for the given time, tick and seed.
    pub fn new(time_s: f64, tick: u64, seed: u64) -> Self {
        Self { time_s, tick, seed }
    }
}

/// Trait defining a resource whose power is a function of simulated time.
///
/// Profiles carry no state between ticks, so evaluating the same context
/// twice always yields the same value.
pub trait Device {
    /// Returns the available power at the given context.
    ///
    /// # Arguments
    ///
    /// * `context` - Simulated time, tick index and run seed
    ///
    /// # Returns
    ///
    /// Power in megawatts (MW), never negative.
    fn power_mw(&self, context: &DeviceContext) -> f64;

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Gaussian jitter bounded to ±3σ, drawn from a generator seeded by
/// `(seed, tick, stream)`.
///
/// No generator state survives the call, so a tick's jitter depends only on
/// its inputs and never on how many ticks came before.
pub fn bounded_jitter(seed: u64, tick: u64, stream: u64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let mixed = seed
        ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ stream.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    let mut rng = StdRng::seed_from_u64(mixed);
    let bound = 3.0 * std_dev;
    gaussian_noise(&mut rng, std_dev).clamp(-bound, bound)
}

/// Jitter stream identifiers, one per profile.
pub(crate) mod stream {
    pub const PV: u64 = 1;
    pub const WIND: u64 = 2;
    pub const LOAD: u64 = 3;
}
