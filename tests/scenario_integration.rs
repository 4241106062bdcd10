//! End-to-end scenarios over the built-in presets.

mod common;

use microgrid_sim::config::MicrogridConfig;
use microgrid_sim::io::export::{HEADER, write_csv};
use microgrid_sim::sim::protection::RelayStage;
use microgrid_sim::sim::{Engine, initialize, kpis, trajectory};

#[test]
fn solar_noon_battery_carries_deficit() {
    let cfg = MicrogridConfig::solar_noon();
    let soc0 = cfg.battery.initial_soc;
    let (_, state, samples) = common::run_steps(cfg, 3600, 1.0);

    assert_eq!(samples.len(), 3600);
    assert!(samples.iter().all(|s| s.pv_mw > 0.0), "PV should produce all hour");
    assert!(samples.iter().all(|s| s.diesel_mw == 0.0 && s.diesel_online == 0));
    assert!(
        state.battery.soc() < soc0 - 0.1,
        "SOC should fall while the battery covers the deficit: {} -> {}",
        soc0,
        state.battery.soc()
    );
    for s in &samples {
        assert!(
            (s.frequency_hz - 60.0).abs() <= 0.5,
            "frequency {} at t={} outside +/-0.5 Hz",
            s.frequency_hz,
            s.t_s
        );
    }
    assert!(!state.protection.is_tripped());
}

#[test]
fn empty_battery_deficit_trips_under_frequency_protection() {
    let mut cfg = MicrogridConfig::solar_noon();
    cfg.battery.initial_soc = 0.0;
    let f0 = cfg.system.f0_hz;
    let uf1 = cfg.protection.uf1_hz;
    let (_, state, samples) = common::run_steps(cfg, 600, 1.0);

    assert!(
        samples.iter().all(|s| s.mismatch_mw < 0.0),
        "renewables alone never cover the load"
    );
    assert!(samples.iter().all(|s| s.battery_mw <= 0.0), "empty battery cannot discharge");
    assert!(samples.iter().all(|s| s.unmet_mw > 0.0), "shortfall must be reported");

    let first_trip = samples
        .iter()
        .find(|s| s.tripped)
        .expect("sustained deficit should trip a relay");
    assert!(first_trip.frequency_hz < f0, "trip on falling frequency");
    assert!(first_trip.t_s < 60.0, "tripped only at t={}", first_trip.t_s);

    let last = samples.last().expect("samples");
    assert!(last.frequency_hz < uf1, "frequency {} should stay depressed", last.frequency_hz);
    let stages = state.protection.tripped_stages();
    assert!(
        stages.contains(&RelayStage::UnderFrequency1) || stages.contains(&RelayStage::UnderFrequency2),
        "{stages:?}"
    );

    let k = kpis(&state);
    assert!(k.protection_tripped);
    assert!(k.frequency_min_hz < uf1);
}

#[test]
fn load_spike_respects_ramp_rating_and_rocof_limits() {
    let cfg = MicrogridConfig::load_spike();
    let ramp_up = cfg.diesel.ramp_up_mw_per_s;
    let roc_max = cfg.system.roc_max_hz_per_s;
    let battery_limit = cfg.battery.power_mw * cfg.battery.overload_multiplier;
    let dt = cfg.simulation.dt_s;
    let (initial, _, samples) = common::run_steps(cfg, 900, dt);

    let spike = samples
        .iter()
        .find(|s| (s.t_s - 600.0).abs() < 1e-9)
        .expect("tick at 600 s");
    let before = samples
        .iter()
        .find(|s| (s.t_s - 599.0).abs() < 1e-9)
        .expect("tick at 599 s");
    assert!(spike.load_mw > 2.5 * before.load_mw, "disturbance should triple load");
    assert!(spike.battery_mw > before.battery_mw, "battery should pick up the spike");

    let diesel = common::diesel_series(&initial, &samples);
    for w in diesel.windows(2) {
        assert!(
            w[1] - w[0] <= ramp_up * dt + common::EPS,
            "diesel rose {} MW in one tick",
            w[1] - w[0]
        );
    }

    let freq = common::frequency_series(&initial, &samples);
    for w in freq.windows(2) {
        assert!((w[1] - w[0]).abs() <= roc_max * dt + common::EPS);
    }

    for s in &samples {
        assert!(s.battery_mw.abs() <= battery_limit + common::EPS);
    }
}

#[test]
fn identical_config_gives_identical_trajectory() {
    let mut cfg = common::baseline_for(0.25);
    cfg.load.noise_std = 0.1;
    cfg.pv.noise_std = 0.05;
    let (_, a, _) = common::run_steps(cfg.clone(), 900, 1.0);
    let (_, b, _) = common::run_steps(cfg, 900, 1.0);
    assert_eq!(trajectory(&a), trajectory(&b));
    assert_eq!(kpis(&a), kpis(&b));
}

#[test]
fn seed_changes_noisy_trajectory() {
    let mut cfg = common::baseline_for(0.25);
    cfg.load.noise_std = 0.1;
    let (_, a, _) = common::run_steps(cfg.clone(), 300, 1.0);
    cfg.simulation.seed += 1;
    let (_, b, _) = common::run_steps(cfg, 300, 1.0);
    assert_ne!(trajectory(&a), trajectory(&b));
}

#[test]
fn initialize_twice_is_identical() {
    let a = initialize(MicrogridConfig::load_spike()).expect("valid");
    let b = initialize(MicrogridConfig::load_spike()).expect("valid");
    assert_eq!(a, b);
}

#[test]
fn independent_engines_do_not_share_state() {
    let mut a = Engine::new();
    let mut b = Engine::new();
    a.initialize(MicrogridConfig::baseline()).expect("valid");
    b.initialize(MicrogridConfig::baseline()).expect("valid");
    a.run(120, 1.0).expect("run");
    assert_eq!(a.trajectory().map(|t| t.len()).ok(), Some(120));
    assert_eq!(b.trajectory().map(|t| t.len()).ok(), Some(0));
}

#[test]
fn baseline_hour_saves_fuel_against_diesel_only() {
    let mut cfg = common::baseline_for(1.0);
    cfg.simulation.start_hour = 11.0;
    let (_, state, samples) = common::run_steps(cfg, 3600, 1.0);
    let k = kpis(&state);
    assert!(k.renewable_share_pct > 0.0 && k.renewable_share_pct <= 100.0);
    assert!(k.fuel_saved_l > 0.0, "renewables should save fuel: {k:?}");
    assert!(samples.iter().all(|s| s.diesel_online >= 1));
}

#[test]
fn csv_export_has_header_and_row_per_sample() {
    let (_, state, _) = common::run_steps(common::baseline_for(0.1), 60, 1.0);
    let mut buf = Vec::new();
    write_csv(&trajectory(&state), &mut buf).expect("write");
    let text = String::from_utf8(buf).expect("utf8");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(HEADER));
    assert_eq!(lines.count(), 60);
}

#[test]
fn scenario_files_match_presets() {
    for name in MicrogridConfig::PRESETS {
        let path = format!("scenarios/{name}.toml");
        let from_file = MicrogridConfig::from_toml_file(std::path::Path::new(&path))
            .unwrap_or_else(|e| panic!("{path}: {e}"));
        let preset = MicrogridConfig::from_preset(name).expect("known preset");
        assert_eq!(from_file, preset, "{path} should match the {name} preset");
    }
}
