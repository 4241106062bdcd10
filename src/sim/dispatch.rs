//! Diesel fleet unit commitment and power dispatch.

use serde::Serialize;

use crate::config::DieselConfig;

/// Commitment state of one diesel unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Offline,
    Starting,
    Online,
    Stopping,
}

/// One diesel generator set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DieselUnit {
    /// Position in the configured fleet (large units first).
    pub id: usize,
    /// Rated power in MW.
    pub rating_mw: f64,
    pub status: UnitStatus,
    /// Time spent in the current `Starting`/`Stopping` state (s).
    pub timer_s: f64,
    /// Power committed on the last tick (MW).
    pub power_mw: f64,
}

impl DieselUnit {
    pub fn is_online(&self) -> bool {
        self.status == UnitStatus::Online
    }
}

/// A commitment decision taken on a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FleetChange {
    /// Unit `id` began starting.
    Start { id: usize, rating_mw: f64 },
    /// Unit `id` began stopping.
    Stop { id: usize, rating_mw: f64 },
}

/// Inputs the fleet needs for one tick.
#[derive(Debug, Clone, Copy)]
pub struct FleetInput {
    /// Load minus delivered-available renewables (MW).
    pub residual_mw: f64,
    /// SOC recovery bias from the battery controller (MW, positive = battery
    /// wants to discharge more).
    pub soc_bias_mw: f64,
    /// `f0 − f` from the previous tick (Hz).
    pub freq_error_hz: f64,
    pub f0_hz: f64,
    pub dt_s: f64,
}

/// Outcome of one dispatch tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetDecision {
    /// Aggregate diesel power for the tick (MW).
    pub power_mw: f64,
    /// Commitment change taken this tick, if any.
    pub change: Option<FleetChange>,
}

/// The diesel fleet: per-unit state machines plus fleet-wide timers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DieselFleet {
    pub units: Vec<DieselUnit>,
    /// Time since the last commitment change (s).
    pub since_transition_s: f64,
    /// Time the dispatch demand has stayed below the online floor minus
    /// hysteresis (s).
    pub low_residual_s: f64,
}

impl DieselFleet {
    /// Builds the fleet and brings `initial_online` units online largest
    /// first, each at its minimum-loading floor.
    ///
    /// When `initial_online` is zero and `allow_all_off` is false the
    /// smallest unit is forced online.
    pub fn from_config(cfg: &DieselConfig) -> Self {
        let ratings = std::iter::repeat_n(cfg.large_unit_mw, cfg.large_count)
            .chain(std::iter::repeat_n(cfg.small_unit_mw, cfg.small_count));
        let mut units: Vec<DieselUnit> = ratings
            .enumerate()
            .map(|(id, rating_mw)| DieselUnit {
                id,
                rating_mw,
                status: UnitStatus::Offline,
                timer_s: 0.0,
                power_mw: 0.0,
            })
            .collect();

        let mut order: Vec<usize> = (0..units.len()).collect();
        order.sort_by(|&a, &b| units[b].rating_mw.total_cmp(&units[a].rating_mw).then(a.cmp(&b)));

        let mut to_start: Vec<usize> = order.iter().copied().take(cfg.initial_online).collect();
        if to_start.is_empty() && !cfg.allow_all_off {
            if let Some(&smallest) = order.last() {
                to_start.push(smallest);
            }
        }
        for idx in to_start {
            let unit = &mut units[idx];
            unit.status = UnitStatus::Online;
            unit.power_mw = cfg.min_loading_pu * unit.rating_mw;
        }

        Self {
            units,
            since_transition_s: cfg.start_stop_delay_s,
            low_residual_s: 0.0,
        }
    }

    /// Rated capacity of units currently online (MW).
    pub fn online_capacity_mw(&self) -> f64 {
        self.units.iter().filter(|u| u.is_online()).map(|u| u.rating_mw).sum()
    }

    /// Rated capacity of online and starting units (MW).
    pub fn committed_capacity_mw(&self) -> f64 {
        self.units
            .iter()
            .filter(|u| matches!(u.status, UnitStatus::Online | UnitStatus::Starting))
            .map(|u| u.rating_mw)
            .sum()
    }

    /// Aggregate minimum-loading floor of online units (MW).
    pub fn floor_mw(&self, min_loading_pu: f64) -> f64 {
        min_loading_pu * self.online_capacity_mw()
    }

    /// Aggregate power committed on the last tick (MW).
    pub fn total_power_mw(&self) -> f64 {
        self.units.iter().map(|u| u.power_mw).sum()
    }

    pub fn online_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_online()).count()
    }

    /// Unit ratings in configured order.
    pub fn ratings(&self) -> Vec<f64> {
        self.units.iter().map(|u| u.rating_mw).collect()
    }

    /// Advances the fleet by one tick without mutating `self`.
    ///
    /// Order: starting/stopping timers, commitment (start largest offline
    /// unit or stop smallest online unit), then the aggregate power command
    /// clamped to the floor and capacity of the online set and ramp limited
    /// against last tick's total. Online units share power pro rata to rating.
    ///
    /// # Returns
    ///
    /// The next fleet state and the decision taken.
    pub fn dispatch(&self, input: &FleetInput, cfg: &DieselConfig) -> (Self, FleetDecision) {
        let dt = input.dt_s;
        let delay = cfg.start_stop_delay_s;
        let mut next = self.clone();
        next.since_transition_s += dt;

        for unit in &mut next.units {
            match unit.status {
                UnitStatus::Starting => {
                    unit.timer_s += dt;
                    if unit.timer_s >= delay {
                        unit.status = UnitStatus::Online;
                        unit.timer_s = 0.0;
                    }
                }
                UnitStatus::Stopping => {
                    unit.timer_s += dt;
                    if unit.timer_s >= delay {
                        unit.status = UnitStatus::Offline;
                        unit.timer_s = 0.0;
                    }
                }
                UnitStatus::Offline | UnitStatus::Online => {}
            }
        }

        let demand = input.residual_mw - input.soc_bias_mw;
        let spacing_ok = next.since_transition_s >= delay;
        let mut change = None;

        if demand > next.committed_capacity_mw() && spacing_ok {
            if let Some(idx) = next.largest_with(UnitStatus::Offline) {
                let unit = &mut next.units[idx];
                unit.status = UnitStatus::Starting;
                unit.timer_s = 0.0;
                change = Some(FleetChange::Start {
                    id: unit.id,
                    rating_mw: unit.rating_mw,
                });
            }
        }

        let floor = next.floor_mw(cfg.min_loading_pu);
        if next.online_count() > 0 && demand < floor - cfg.hysteresis_mw {
            next.low_residual_s += dt;
        } else {
            next.low_residual_s = 0.0;
        }

        let may_stop = next.online_count() > 1 || cfg.allow_all_off;
        if change.is_none() && spacing_ok && may_stop && next.low_residual_s >= delay {
            if let Some(idx) = next.smallest_online() {
                let unit = &mut next.units[idx];
                unit.status = UnitStatus::Stopping;
                unit.timer_s = 0.0;
                unit.power_mw = 0.0;
                change = Some(FleetChange::Stop {
                    id: unit.id,
                    rating_mw: unit.rating_mw,
                });
                next.low_residual_s = 0.0;
            }
        }

        if change.is_some() {
            next.since_transition_s = 0.0;
        }

        let cap = next.online_capacity_mw();
        let power_mw = if cap > 0.0 {
            let floor = cfg.min_loading_pu * cap;
            let droop_gain = cap / (cfg.droop_pu * input.f0_hz);
            let target = demand + droop_gain * input.freq_error_hz;
            let prev = self.total_power_mw();
            target
                .clamp(floor, cap)
                .clamp(prev - cfg.ramp_down_mw_per_s * dt, prev + cfg.ramp_up_mw_per_s * dt)
                .min(cap)
                .max(0.0)
        } else {
            0.0
        };

        for unit in &mut next.units {
            unit.power_mw = if unit.is_online() && cap > 0.0 {
                power_mw * unit.rating_mw / cap
            } else {
                0.0
            };
        }

        (next, FleetDecision { power_mw, change })
    }

    /// Largest unit in `status`; ties resolve to the lowest id.
    fn largest_with(&self, status: UnitStatus) -> Option<usize> {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.status == status)
            .max_by(|(ia, a), (ib, b)| a.rating_mw.total_cmp(&b.rating_mw).then(ib.cmp(ia)))
            .map(|(i, _)| i)
    }

    /// Smallest online unit; ties resolve to the highest id.
    fn smallest_online(&self) -> Option<usize> {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.is_online())
            .min_by(|(ia, a), (ib, b)| a.rating_mw.total_cmp(&b.rating_mw).then(ib.cmp(ia)))
            .map(|(i, _)| i)
    }
}
