//! Bounded trajectory buffer with windowed queries.

use std::collections::VecDeque;

use serde::Serialize;

use super::types::Sample;

/// Ring buffer of the most recent samples; the oldest is evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    samples: VecDeque<Sample>,
    capacity: usize,
}

/// Summary statistics over a trajectory window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    pub samples: usize,
    pub frequency_min_hz: f64,
    pub frequency_max_hz: f64,
    /// Largest battery power magnitude (MW).
    pub battery_abs_max_mw: f64,
}

impl Trajectory {
    /// Creates an empty buffer holding at most `capacity` samples (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Retained samples, oldest first.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    /// Samples with `from_s <= t_s <= to_s`, oldest first.
    pub fn window(&self, from_s: f64, to_s: f64) -> Vec<Sample> {
        self.samples
            .iter()
            .filter(|s| s.t_s >= from_s && s.t_s <= to_s)
            .cloned()
            .collect()
    }

    /// Statistics over the samples in `[from_s, to_s]`, or `None` if the
    /// window is empty.
    pub fn window_stats(&self, from_s: f64, to_s: f64) -> Option<WindowStats> {
        let mut stats: Option<WindowStats> = None;
        for s in self.samples.iter().filter(|s| s.t_s >= from_s && s.t_s <= to_s) {
            let st = stats.get_or_insert(WindowStats {
                samples: 0,
                frequency_min_hz: f64::INFINITY,
                frequency_max_hz: f64::NEG_INFINITY,
                battery_abs_max_mw: 0.0,
            });
            st.samples += 1;
            st.frequency_min_hz = st.frequency_min_hz.min(s.frequency_hz);
            st.frequency_max_hz = st.frequency_max_hz.max(s.frequency_hz);
            st.battery_abs_max_mw = st.battery_abs_max_mw.max(s.battery_mw.abs());
        }
        stats
    }
}
