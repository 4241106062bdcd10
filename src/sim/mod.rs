/// Battery VSG controller.
pub mod controller;
/// Diesel fleet commitment and dispatch.
pub mod dispatch;
pub mod engine;
/// Scheduled load disturbances.
pub mod event;
pub mod frequency;
pub mod kpi;
pub mod power_balance;
pub mod protection;
pub mod trajectory;
pub mod types;

pub use engine::{Engine, initialize, kpis, step, trajectory};
pub use kpi::KpiSnapshot;
pub use types::{Sample, SimState};
