//! Gesture timing measurements
//!
//! Debug-level instrumentation for the phases of the edit loop (scan,
//! drag, flush). Durations come from the embedder's clock.

use std::collections::HashMap;

/// Accumulates per-phase duration samples.
pub struct GestureTimer {
    samples: HashMap<String, Vec<f64>>,
}

impl GestureTimer {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
        }
    }

    pub fn record(&mut self, phase: &str, duration_ms: f64) {
        self.samples
            .entry(phase.to_string())
            .or_insert_with(Vec::new)
            .push(duration_ms);
    }

    pub fn average_ms(&self, phase: &str) -> Option<f64> {
        self.samples.get(phase).map(|times| {
            if times.is_empty() {
                0.0
            } else {
                times.iter().sum::<f64>() / times.len() as f64
            }
        })
    }

    pub fn sample_count(&self, phase: &str) -> usize {
        self.samples.get(phase).map(|t| t.len()).unwrap_or(0)
    }
}

impl Default for GestureTimer {
    fn default() -> Self {
        Self::new()
    }
}
