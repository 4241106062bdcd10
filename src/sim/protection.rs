//! ROCOF and two-stage over/under-frequency relays.

use serde::Serialize;

use crate::config::ProtectionConfig;

/// Relay stages monitored every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayStage {
    Rocof,
    OverFrequency1,
    OverFrequency2,
    UnderFrequency1,
    UnderFrequency2,
}

impl RelayStage {
    pub const ALL: [RelayStage; 5] = [
        RelayStage::Rocof,
        RelayStage::OverFrequency1,
        RelayStage::OverFrequency2,
        RelayStage::UnderFrequency1,
        RelayStage::UnderFrequency2,
    ];

    /// Whether the stage's pickup condition holds, and its time delay.
    fn pickup(self, frequency_hz: f64, rocof_hz_per_s: f64, cfg: &ProtectionConfig) -> (bool, f64) {
        match self {
            Self::Rocof => (rocof_hz_per_s.abs() > cfg.rocof_trip_hz_per_s, 0.0),
            Self::OverFrequency1 => (frequency_hz > cfg.of1_hz, cfg.of1_delay_s),
            Self::OverFrequency2 => (frequency_hz > cfg.of2_hz, cfg.of2_delay_s),
            Self::UnderFrequency1 => (frequency_hz < cfg.uf1_hz, cfg.uf1_delay_s),
            Self::UnderFrequency2 => (frequency_hz < cfg.uf2_hz, cfg.uf2_delay_s),
        }
    }
}

/// Relay state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayState {
    Armed,
    Timing,
    Tripped,
    Reclosing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relay {
    pub stage: RelayStage,
    pub state: RelayState,
    /// Time the pickup condition has held (s).
    pub timer_s: f64,
    /// Simulated time of the trip, if tripped.
    pub tripped_at_s: Option<f64>,
    /// Time elapsed since the trip (s).
    pub since_trip_s: f64,
}

impl Relay {
    fn new(stage: RelayStage) -> Self {
        Self {
            stage,
            state: RelayState::Armed,
            timer_s: 0.0,
            tripped_at_s: None,
            since_trip_s: 0.0,
        }
    }

    pub fn is_tripped(&self) -> bool {
        matches!(self.state, RelayState::Tripped | RelayState::Reclosing)
    }
}

/// All protection relays. Only re-initialization clears a trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtectionState {
    pub relays: Vec<Relay>,
}

impl Default for ProtectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtectionState {
    pub fn new() -> Self {
        Self {
            relays: RelayStage::ALL.into_iter().map(Relay::new).collect(),
        }
    }

    /// True if any stage is tripped or reclosing.
    pub fn is_tripped(&self) -> bool {
        self.relays.iter().any(Relay::is_tripped)
    }

    /// Stages currently tripped or reclosing.
    pub fn tripped_stages(&self) -> Vec<RelayStage> {
        self.relays
            .iter()
            .filter(|r| r.is_tripped())
            .map(|r| r.stage)
            .collect()
    }

    /// Evaluates every relay against the tick's frequency and ROCOF.
    ///
    /// # Returns
    ///
    /// The next protection state and the stages that tripped on this tick.
    pub fn evaluate(
        &self,
        frequency_hz: f64,
        rocof_hz_per_s: f64,
        time_s: f64,
        dt_s: f64,
        cfg: &ProtectionConfig,
    ) -> (Self, Vec<RelayStage>) {
        let mut next = self.clone();
        let mut newly_tripped = Vec::new();

        for relay in &mut next.relays {
            match relay.state {
                RelayState::Armed | RelayState::Timing => {
                    let (picked_up, delay_s) = relay.stage.pickup(frequency_hz, rocof_hz_per_s, cfg);
                    if !picked_up {
                        relay.state = RelayState::Armed;
                        relay.timer_s = 0.0;
                        continue;
                    }
                    relay.timer_s += dt_s;
                    if relay.stage == RelayStage::Rocof || relay.timer_s >= delay_s {
                        relay.state = RelayState::Tripped;
                        relay.tripped_at_s = Some(time_s);
                        relay.since_trip_s = 0.0;
                        newly_tripped.push(relay.stage);
                    } else {
                        relay.state = RelayState::Timing;
                    }
                }
                RelayState::Tripped => {
                    relay.since_trip_s += dt_s;
                    if relay.since_trip_s >= cfg.reclose_delay_s {
                        relay.state = RelayState::Reclosing;
                    }
                }
                RelayState::Reclosing => relay.since_trip_s += dt_s,
            }
        }

        (next, newly_tripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ProtectionConfig {
        ProtectionConfig::default()
    }

    fn run(p: &ProtectionState, f: f64, rocof: f64, ticks: usize, dt: f64) -> ProtectionState {
        let mut s = p.clone();
        for i in 0..ticks {
            s = s.evaluate(f, rocof, i as f64 * dt, dt, &cfg()).0;
        }
        s
    }

    fn relay(p: &ProtectionState, stage: RelayStage) -> &Relay {
        p.relays.iter().find(|r| r.stage == stage).expect("every stage has a relay")
    }

    #[test]
    fn nominal_frequency_stays_armed() {
        let p = run(&ProtectionState::new(), 60.0, 0.0, 100, 1.0);
        assert!(!p.is_tripped());
        assert!(p.relays.iter().all(|r| r.state == RelayState::Armed));
    }

    #[test]
    fn rocof_trips_instantly() {
        let (p, tripped) = ProtectionState::new().evaluate(59.0, -1.5, 1.0, 1.0, &cfg());
        assert_eq!(tripped, vec![RelayStage::Rocof]);
        assert!(p.is_tripped());
    }

    #[test]
    fn over_frequency_stage1_times_before_trip() {
        let p = run(&ProtectionState::new(), 61.2, 0.0, 9, 1.0);
        assert_eq!(relay(&p, RelayStage::OverFrequency1).state, RelayState::Timing);
        let p = run(&p, 61.2, 0.0, 1, 1.0);
        assert_eq!(relay(&p, RelayStage::OverFrequency1).state, RelayState::Tripped);
        assert_eq!(relay(&p, RelayStage::OverFrequency2).state, RelayState::Armed);
    }

    #[test]
    fn stage2_trips_faster() {
        let (p, tripped) = ProtectionState::new().evaluate(62.0, 0.0, 0.5, 0.5, &cfg());
        assert_eq!(tripped, vec![RelayStage::OverFrequency2]);
        assert_eq!(relay(&p, RelayStage::OverFrequency1).state, RelayState::Timing);
    }

    #[test]
    fn timer_resets_when_frequency_recovers() {
        let p = run(&ProtectionState::new(), 58.9, 0.0, 5, 1.0);
        assert_eq!(relay(&p, RelayStage::UnderFrequency1).state, RelayState::Timing);
        let p = run(&p, 59.5, 0.0, 1, 1.0);
        let r = relay(&p, RelayStage::UnderFrequency1);
        assert_eq!(r.state, RelayState::Armed);
        assert_eq!(r.timer_s, 0.0);
    }

    #[test]
    fn trip_latches_then_reports_reclosing() {
        let (p, _) = ProtectionState::new().evaluate(60.0, 2.0, 0.0, 1.0, &cfg());
        let p = run(&p, 60.0, 0.0, 29, 1.0);
        assert_eq!(relay(&p, RelayStage::Rocof).state, RelayState::Tripped);
        let p = run(&p, 60.0, 0.0, 1, 1.0);
        assert_eq!(relay(&p, RelayStage::Rocof).state, RelayState::Reclosing);
        assert!(p.is_tripped());
        assert_eq!(p.tripped_stages(), vec![RelayStage::Rocof]);
    }
}
