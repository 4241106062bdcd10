//! Bus power balance arithmetic.

/// Net bus mismatch from signed source outputs.
///
/// All sources use the generation convention: PV, wind and diesel are
/// non-negative, battery is positive when discharging. Load is positive.
///
/// # Returns
///
/// `pv + wind + diesel + battery − load` in MW. Positive means surplus
/// generation (frequency rises).
pub fn bus_mismatch_mw(pv_mw: f64, wind_mw: f64, diesel_mw: f64, battery_mw: f64, load_mw: f64) -> f64 {
    pv_mw + wind_mw + diesel_mw + battery_mw - load_mw
}

/// Renewable curtailment needed to remove a positive surplus.
///
/// The surplus is shed from PV and wind pro rata to their available output,
/// never more than their sum.
///
/// # Returns
///
/// `(pv_curtailed_mw, wind_curtailed_mw)`, both non-negative.
pub fn curtailment_split(surplus_mw: f64, pv_avail_mw: f64, wind_avail_mw: f64) -> (f64, f64) {
    let renewable = pv_avail_mw + wind_avail_mw;
    if surplus_mw <= 0.0 || renewable <= 0.0 {
        return (0.0, 0.0);
    }
    let shed = surplus_mw.min(renewable);
    let pv = shed * pv_avail_mw / renewable;
    (pv, shed - pv)
}
