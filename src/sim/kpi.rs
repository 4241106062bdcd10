//! Fuel, renewable energy and contingency accounting.

use std::fmt;

use serde::Serialize;

use crate::config::FuelConfig;

use super::dispatch::DieselFleet;
use super::types::Sample;

/// Specific fuel consumption (g/kWh) at `loading` (fraction of rating).
///
/// Linear interpolation between breakpoints, flat outside them.
pub fn sfc_g_per_kwh(cfg: &FuelConfig, loading: f64) -> f64 {
    let xs = &cfg.loading_pu;
    let ys = &cfg.sfc_g_per_kwh;
    let (Some(&x_first), Some(&x_last)) = (xs.first(), xs.last()) else {
        return 0.0;
    };
    if loading <= x_first {
        return ys[0];
    }
    if loading >= x_last {
        return ys[ys.len() - 1];
    }
    for i in 1..xs.len() {
        if loading <= xs[i] {
            let frac = (loading - xs[i - 1]) / (xs[i] - xs[i - 1]);
            return ys[i - 1] + frac * (ys[i] - ys[i - 1]);
        }
    }
    ys[ys.len() - 1]
}

/// Fuel rate (L/h) of one unit producing `power_mw` out of `rating_mw`.
pub fn unit_fuel_rate_l_per_h(cfg: &FuelConfig, power_mw: f64, rating_mw: f64) -> f64 {
    if power_mw <= 0.0 || rating_mw <= 0.0 {
        return 0.0;
    }
    // MW * g/kWh = kg/h
    power_mw * sfc_g_per_kwh(cfg, power_mw / rating_mw) / cfg.density_kg_per_l
}

/// Fuel rate (L/h) of the whole fleet at its committed unit powers.
pub fn fleet_fuel_rate_l_per_h(cfg: &FuelConfig, fleet: &DieselFleet) -> f64 {
    fleet
        .units
        .iter()
        .map(|u| unit_fuel_rate_l_per_h(cfg, u.power_mw, u.rating_mw))
        .sum()
}

/// Fuel rate (L/h) if the whole load were served by diesel alone.
///
/// Uses the smallest largest-first subset of `ratings` whose capacity covers
/// the load, sharing it pro rata. With an empty fleet, hypothetical units of
/// `fallback_unit_mw` are used instead.
pub fn baseline_fuel_rate_l_per_h(
    cfg: &FuelConfig,
    load_mw: f64,
    ratings: &[f64],
    fallback_unit_mw: f64,
) -> f64 {
    if load_mw <= 0.0 {
        return 0.0;
    }
    let capacity = if ratings.is_empty() {
        if fallback_unit_mw <= 0.0 {
            return 0.0;
        }
        (load_mw / fallback_unit_mw).ceil() * fallback_unit_mw
    } else {
        let mut sorted = ratings.to_vec();
        sorted.sort_by(|a, b| b.total_cmp(a));
        let mut cap = 0.0;
        for r in sorted {
            cap += r;
            if cap >= load_mw {
                break;
            }
        }
        cap
    };
    // Every unit in the subset runs at the same loading
    unit_fuel_rate_l_per_h(cfg, load_mw, capacity.max(load_mw))
}

/// Inputs for the N−1 check of one tick.
#[derive(Debug, Clone, Copy)]
pub struct ContingencyInput {
    pub pv_avail_mw: f64,
    pub wind_avail_mw: f64,
    pub load_mw: f64,
    pub battery_mw: f64,
    /// What the battery could deliver this tick (rating and SOC limited).
    pub battery_capability_mw: f64,
    pub ramp_up_mw_per_s: f64,
    pub dt_s: f64,
}

/// N−1 check: drop the largest online source (diesel unit or battery,
/// whichever is producing more) and test whether the rest can still carry
/// the load within capacity and ramp limits.
pub fn n1_secure(fleet: &DieselFleet, input: &ContingencyInput) -> bool {
    let online: Vec<_> = fleet.units.iter().filter(|u| u.is_online()).collect();
    let largest_unit = online
        .iter()
        .copied()
        .max_by(|a, b| a.power_mw.total_cmp(&b.power_mw));
    let battery_out = input.battery_mw.max(0.0);

    let (diesel_cap, diesel_power, battery_cap) = match largest_unit {
        Some(unit) if unit.power_mw >= battery_out => (
            fleet.online_capacity_mw() - unit.rating_mw,
            fleet.total_power_mw() - unit.power_mw,
            input.battery_capability_mw,
        ),
        _ => (fleet.online_capacity_mw(), fleet.total_power_mw(), 0.0),
    };
    let diesel_available = diesel_cap.min(diesel_power + input.ramp_up_mw_per_s * input.dt_s).max(0.0);
    let supply = input.pv_avail_mw + input.wind_avail_mw + diesel_available + battery_cap;
    supply >= input.load_mw
}

/// Running energy and fuel totals carried in the simulation state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyAccount {
    pub fuel_l: f64,
    pub baseline_fuel_l: f64,
    pub pv_energy_mwh: f64,
    pub wind_energy_mwh: f64,
    pub pv_curtailed_mwh: f64,
    pub wind_curtailed_mwh: f64,
    pub load_energy_mwh: f64,
    pub diesel_energy_mwh: f64,
    /// N−1 result of the most recent tick.
    pub n1_ok: bool,
    pub n1_violation_ticks: u64,
    pub frequency_min_hz: f64,
    pub frequency_max_hz: f64,
    pub elapsed_s: f64,
}

impl EnergyAccount {
    pub fn new(f0_hz: f64) -> Self {
        Self {
            fuel_l: 0.0,
            baseline_fuel_l: 0.0,
            pv_energy_mwh: 0.0,
            wind_energy_mwh: 0.0,
            pv_curtailed_mwh: 0.0,
            wind_curtailed_mwh: 0.0,
            load_energy_mwh: 0.0,
            diesel_energy_mwh: 0.0,
            n1_ok: true,
            n1_violation_ticks: 0,
            frequency_min_hz: f0_hz,
            frequency_max_hz: f0_hz,
            elapsed_s: 0.0,
        }
    }

    /// Integrates one tick (rectangular rule over `dt_s`).
    pub fn record(&mut self, sample: &Sample, baseline_rate_l_per_h: f64, dt_s: f64) {
        let dt_h = dt_s / 3600.0;
        self.fuel_l += sample.fuel_rate_l_per_h * dt_h;
        self.baseline_fuel_l += baseline_rate_l_per_h * dt_h;
        self.pv_energy_mwh += sample.pv_mw * dt_h;
        self.wind_energy_mwh += sample.wind_mw * dt_h;
        self.pv_curtailed_mwh += sample.pv_curtailed_mw * dt_h;
        self.wind_curtailed_mwh += sample.wind_curtailed_mw * dt_h;
        self.load_energy_mwh += sample.load_mw * dt_h;
        self.diesel_energy_mwh += sample.diesel_mw * dt_h;
        self.n1_ok = sample.n1_ok;
        if !sample.n1_ok {
            self.n1_violation_ticks += 1;
        }
        self.frequency_min_hz = self.frequency_min_hz.min(sample.frequency_hz);
        self.frequency_max_hz = self.frequency_max_hz.max(sample.frequency_hz);
        self.elapsed_s += dt_s;
    }
}

/// Read-only KPI aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSnapshot {
    pub fuel_used_l: f64,
    pub fuel_baseline_l: f64,
    pub fuel_saved_l: f64,
    /// Saved fuel relative to baseline (%).
    pub fuel_saved_pct: f64,
    /// Delivered renewable energy over load energy (%, capped at 100).
    pub renewable_share_pct: f64,
    pub pv_energy_mwh: f64,
    pub wind_energy_mwh: f64,
    pub curtailed_energy_mwh: f64,
    pub load_energy_mwh: f64,
    pub n1_ok: bool,
    pub n1_violation_ticks: u64,
    pub protection_tripped: bool,
    pub frequency_min_hz: f64,
    pub frequency_max_hz: f64,
    pub elapsed_s: f64,
}

impl KpiSnapshot {
    /// Derives the snapshot from the running totals.
    pub fn from_account(acc: &EnergyAccount, protection_tripped: bool) -> Self {
        let fuel_saved_l = acc.baseline_fuel_l - acc.fuel_l;
        let fuel_saved_pct = if acc.baseline_fuel_l > 0.0 {
            100.0 * fuel_saved_l / acc.baseline_fuel_l
        } else {
            0.0
        };
        let renewable = acc.pv_energy_mwh + acc.wind_energy_mwh;
        let renewable_share_pct = if acc.load_energy_mwh > 0.0 {
            (100.0 * renewable / acc.load_energy_mwh).min(100.0)
        } else {
            0.0
        };
        Self {
            fuel_used_l: acc.fuel_l,
            fuel_baseline_l: acc.baseline_fuel_l,
            fuel_saved_l,
            fuel_saved_pct,
            renewable_share_pct,
            pv_energy_mwh: acc.pv_energy_mwh,
            wind_energy_mwh: acc.wind_energy_mwh,
            curtailed_energy_mwh: acc.pv_curtailed_mwh + acc.wind_curtailed_mwh,
            load_energy_mwh: acc.load_energy_mwh,
            n1_ok: acc.n1_ok,
            n1_violation_ticks: acc.n1_violation_ticks,
            protection_tripped,
            frequency_min_hz: acc.frequency_min_hz,
            frequency_max_hz: acc.frequency_max_hz,
            elapsed_s: acc.elapsed_s,
        }
    }
}

impl fmt::Display for KpiSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ({:.0} s) ---", self.elapsed_s)?;
        writeln!(f, "Fuel used:             {:.1} L", self.fuel_used_l)?;
        writeln!(f, "Fuel baseline:         {:.1} L", self.fuel_baseline_l)?;
        writeln!(
            f,
            "Fuel saved:            {:.1} L ({:.1}%)",
            self.fuel_saved_l, self.fuel_saved_pct
        )?;
        writeln!(f, "Renewable share:       {:.1}%", self.renewable_share_pct)?;
        writeln!(f, "PV energy:             {:.3} MWh", self.pv_energy_mwh)?;
        writeln!(f, "Wind energy:           {:.3} MWh", self.wind_energy_mwh)?;
        writeln!(f, "Curtailed:             {:.3} MWh", self.curtailed_energy_mwh)?;
        writeln!(
            f,
            "Frequency range:       {:.3} .. {:.3} Hz",
            self.frequency_min_hz, self.frequency_max_hz
        )?;
        writeln!(
            f,
            "N-1:                   {} ({} violating ticks)",
            if self.n1_ok { "OK" } else { "FAIL" },
            self.n1_violation_ticks
        )?;
        write!(
            f,
            "Protection:            {}",
            if self.protection_tripped { "TRIPPED" } else { "armed" }
        )
    }
}
