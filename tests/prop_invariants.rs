//! Property-based tests for step invariants using proptest.
//!
//! Covers: SOC bounds, frequency slew limit, diesel ramp, floor and capacity
//! limits, battery rating, bus balance bookkeeping, failed-step atomicity.

mod common;

use microgrid_sim::config::{DisturbanceConfig, MicrogridConfig};
use microgrid_sim::sim::initialize;
use proptest::prelude::*;

prop_compose! {
    /// Valid configurations spanning fleet size, resource mix and storage sizing.
    fn arb_config()(
        seed in any::<u64>(),
        start_hour in 0.0f64..24.0,
        load_mw in 1.0f64..25.0,
        load_noise in 0.0f64..0.1,
        pv_mw in 0.0f64..10.0,
        pv_noise in 0.0f64..0.1,
        wind_mw in 0.0f64..10.0,
        large_count in 0usize..5,
        small_count in 0usize..3,
        online_frac in 0.0f64..=1.0,
        ramp_up in 0.05f64..2.0,
        battery_mw in 0.5f64..10.0,
        energy_mwh in 0.1f64..30.0,
        initial_soc in 0.0f64..=1.0,
        spike in 0.0f64..3.0,
        spike_at in 0.0f64..200.0,
    ) -> MicrogridConfig {
        let mut cfg = MicrogridConfig::baseline();
        cfg.simulation.seed = seed;
        cfg.simulation.start_hour = start_hour;
        cfg.load.base_mw = load_mw;
        cfg.load.noise_std = load_noise;
        cfg.pv.capacity_mw = pv_mw;
        cfg.pv.noise_std = pv_noise;
        cfg.wind.capacity_mw = wind_mw;
        cfg.diesel.large_count = large_count;
        cfg.diesel.small_count = small_count;
        let units = large_count + small_count;
        cfg.diesel.initial_online = (online_frac * units as f64).floor() as usize;
        cfg.diesel.allow_all_off = units == 0;
        cfg.diesel.ramp_up_mw_per_s = ramp_up;
        cfg.battery.power_mw = battery_mw;
        cfg.battery.energy_mwh = energy_mwh;
        cfg.battery.initial_soc = initial_soc;
        cfg.disturbance = vec![DisturbanceConfig {
            start_s: spike_at,
            duration_s: 5.0,
            multiplier: spike,
        }];
        cfg
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// SOC stays in [0, 1] on every tick.
    #[test]
    fn soc_stays_in_unit_interval(
        cfg in arb_config(),
        dt in 0.1f64..5.0,
        steps in 10usize..300,
    ) {
        let (initial, _, samples) = common::run_steps(cfg, steps, dt);
        prop_assert!((0.0..=1.0).contains(&initial.battery.soc()));
        for s in &samples {
            prop_assert!((0.0..=1.0).contains(&s.soc), "soc {} at t={}", s.soc, s.t_s);
        }
    }

    /// Frequency never moves more than `roc_max · dt` in one tick.
    #[test]
    fn frequency_slew_is_bounded(
        cfg in arb_config(),
        dt in 0.1f64..5.0,
        steps in 10usize..300,
    ) {
        let limit = cfg.system.roc_max_hz_per_s * dt;
        let (initial, _, samples) = common::run_steps(cfg, steps, dt);
        let freq = common::frequency_series(&initial, &samples);
        for w in freq.windows(2) {
            prop_assert!((w[1] - w[0]).abs() <= limit + common::EPS);
        }
        for s in &samples {
            prop_assert!(s.frequency_hz.is_finite());
        }
    }

    /// Diesel output never rises faster than the ramp limit and never exceeds
    /// installed fleet capacity.
    #[test]
    fn diesel_respects_ramp_and_capacity(
        cfg in arb_config(),
        dt in 0.1f64..5.0,
        steps in 10usize..300,
    ) {
        let ramp = cfg.diesel.ramp_up_mw_per_s * dt;
        let capacity = cfg.diesel.fleet_capacity_mw();
        let (initial, _, samples) = common::run_steps(cfg, steps, dt);
        let diesel = common::diesel_series(&initial, &samples);
        for w in diesel.windows(2) {
            prop_assert!(w[1] - w[0] <= ramp + common::EPS, "rose {} > {}", w[1] - w[0], ramp);
        }
        for s in &samples {
            prop_assert!(s.diesel_mw >= 0.0);
            prop_assert!(s.diesel_mw <= capacity + common::EPS);
        }
    }

    /// While any unit is online the fleet holds its minimum-loading floor,
    /// except where the ramp limit has not yet reached it.
    #[test]
    fn diesel_holds_floor_within_ramp(
        cfg in arb_config(),
        dt in 0.1f64..5.0,
        steps in 10usize..300,
    ) {
        let min_loading = cfg.diesel.min_loading_pu;
        let ramp = cfg.diesel.ramp_up_mw_per_s * dt;
        let mut state = initialize(cfg).expect("generated config should be valid");
        for _ in 0..steps {
            let prev = state.fleet.total_power_mw();
            let sample = state.step(dt).expect("step");
            if state.fleet.online_count() > 0 {
                let floor = state.fleet.floor_mw(min_loading);
                prop_assert!(
                    sample.diesel_mw >= floor.min(prev + ramp) - common::EPS,
                    "diesel {} below floor {} at t={}",
                    sample.diesel_mw,
                    floor,
                    sample.t_s
                );
            }
        }
    }

    /// Battery power stays within its rating, extended only by the
    /// emergency overload multiplier.
    #[test]
    fn battery_within_overload_rating(
        cfg in arb_config(),
        dt in 0.1f64..5.0,
        steps in 10usize..300,
    ) {
        let limit = cfg.battery.power_mw * cfg.battery.overload_multiplier;
        let (_, _, samples) = common::run_steps(cfg, steps, dt);
        for s in &samples {
            prop_assert!(s.battery_mw.abs() <= limit + common::EPS);
        }
    }

    /// Sample bookkeeping: mismatch is the signed bus sum, curtailment is
    /// non-negative and delivered renewables never exceed installed capacity.
    #[test]
    fn bus_bookkeeping_is_consistent(
        cfg in arb_config(),
        dt in 0.1f64..5.0,
        steps in 10usize..200,
    ) {
        let pv_cap = cfg.pv.capacity_mw;
        let wind_cap = cfg.wind.capacity_mw;
        let (_, _, samples) = common::run_steps(cfg, steps, dt);
        for s in &samples {
            let sum = s.pv_mw + s.wind_mw + s.diesel_mw + s.battery_mw - s.load_mw;
            prop_assert!((sum - s.mismatch_mw).abs() < 1e-6);
            prop_assert!(s.pv_curtailed_mw >= 0.0 && s.wind_curtailed_mw >= 0.0);
            prop_assert!(s.pv_mw >= 0.0 && s.pv_mw + s.pv_curtailed_mw <= pv_cap + common::EPS);
            prop_assert!(s.wind_mw >= 0.0 && s.wind_mw + s.wind_curtailed_mw <= wind_cap + common::EPS);
            prop_assert!(s.fuel_rate_l_per_h >= 0.0);
        }
    }

    /// A rejected step leaves the state exactly as it was.
    #[test]
    fn rejected_step_does_not_mutate(
        cfg in arb_config(),
        warmup in 0usize..50,
        bad_dt in prop_oneof![Just(0.0), -100.0f64..0.0, Just(f64::NAN)],
    ) {
        let mut state = initialize(cfg).expect("generated config should be valid");
        for _ in 0..warmup {
            state.step(1.0).expect("step");
        }
        let before = state.clone();
        prop_assert!(state.step(bad_dt).is_err());
        prop_assert_eq!(state, before);
    }
}
