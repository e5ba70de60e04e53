//! Hall-effect flow sensor: interrupt pulse counter and rate estimator.
//!
//! The sensor emits one pulse per fixed volume of water.  A GPIO ISR
//! increments [`FlowPulseCounter`] on every rising edge; once per sampling
//! window the control loop swaps the count out and [`FlowMeter`] turns it
//! into a flow rate (L/min) and a running volume total (mL).
//!
//! The ISR and the control loop run at different priorities, so the
//! counter is an `AtomicU32`: the ISR only ever increments it and the loop
//! only ever performs a single `swap(0)`, which cannot lose a pulse that
//! lands between "read" and "reset".  A 32-bit count cannot overflow within
//! any plausible window (the sensor tops out well below 1 kHz).

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::SystemConfig;
use crate::timing::elapsed_ms;

// ---------------------------------------------------------------------------
// Pulse counter (shared with interrupt context)
// ---------------------------------------------------------------------------

/// Pulse accumulator shared between the flow ISR and the control loop.
///
/// Constructed once at boot and handed to the ISR registration as a
/// `&'static` reference.
#[derive(Debug, Default)]
pub struct FlowPulseCounter {
    pulses: AtomicU32,
}

impl FlowPulseCounter {
    pub const fn new() -> Self {
        Self {
            pulses: AtomicU32::new(0),
        }
    }

    /// Record one pulse.  Called from interrupt context: no logging, no
    /// allocation, no blocking.
    ///
    /// `Relaxed` is enough because the count publishes no other data.
    #[inline]
    pub fn on_pulse(&self) {
        self.pulses.fetch_add(1, Ordering::Relaxed);
    }

    /// Atomically read the pulses counted so far and restart from zero.
    #[inline]
    pub fn take_and_reset(&self) -> u32 {
        self.pulses.swap(0, Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Rate estimation
// ---------------------------------------------------------------------------

/// Flow rate in L/min for `pulses` counted over `elapsed_ms`.
///
/// Scales by the *measured* window length, so a late tick does not
/// inflate the rate.  A zero-length window yields 0.
pub fn flow_rate_l_per_min(pulses: u32, elapsed_ms: u32, calibration_factor: f32) -> f32 {
    if elapsed_ms == 0 || calibration_factor <= 0.0 {
        return 0.0;
    }
    (1000.0 / elapsed_ms as f32) * pulses as f32 / calibration_factor
}

/// Volume in mL moved at `rate_l_per_min` over `elapsed_ms`.
fn window_volume_ml(rate_l_per_min: f32, elapsed_ms: u32) -> f64 {
    // (L/min / 60) * 1000 = mL/s, times the measured window in seconds.
    f64::from(rate_l_per_min) / 60.0 * 1000.0 * (f64::from(elapsed_ms) / 1000.0)
}

/// Result of one closed sampling window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowSample {
    /// Pulses counted in the window.
    pub pulses: u32,
    /// Measured window length (ms).
    pub window_ms: u32,
    /// Flow rate over the window (L/min).
    pub rate_l_per_min: f32,
    /// Total volume since boot (mL).  Never decreases.
    pub total_volume_ml: f64,
}

/// Converts windowed pulse counts into flow rate and cumulative volume.
pub struct FlowMeter {
    calibration_factor: f32,
    window_ms: u32,
    last_sample_ms: u32,
    last: FlowSample,
}

impl FlowMeter {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            calibration_factor: config.flow_calibration_factor,
            window_ms: config.flow_window_ms,
            last_sample_ms: 0,
            last: FlowSample::default(),
        }
    }

    /// Anchor the first window at `now_ms`.
    pub fn start(&mut self, now_ms: u32) {
        self.last_sample_ms = now_ms;
    }

    /// Close the window if the nominal interval has passed.
    ///
    /// `take_pulses` is only invoked when the window closes, so pulses keep
    /// accumulating in the counter between windows.
    pub fn poll(&mut self, now_ms: u32, take_pulses: impl FnOnce() -> u32) -> Option<FlowSample> {
        let elapsed = elapsed_ms(now_ms, self.last_sample_ms);
        if elapsed < self.window_ms {
            return None;
        }
        let pulses = take_pulses();
        self.last_sample_ms = now_ms;
        Some(self.record(pulses, elapsed))
    }

    /// Fold one window of `pulses` measured over `elapsed_ms` into the
    /// running state.
    pub fn record(&mut self, pulses: u32, elapsed_ms: u32) -> FlowSample {
        let rate = flow_rate_l_per_min(pulses, elapsed_ms, self.calibration_factor);
        let total = self.last.total_volume_ml + window_volume_ml(rate, elapsed_ms);

        self.last = FlowSample {
            pulses,
            window_ms: elapsed_ms,
            rate_l_per_min: rate,
            total_volume_ml: total,
        };
        self.last
    }

    /// Flow rate from the most recent window (L/min).
    pub fn rate_l_per_min(&self) -> f32 {
        self.last.rate_l_per_min
    }

    /// Volume moved since boot (mL).
    pub fn total_volume_ml(&self) -> f64 {
        self.last.total_volume_ml
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rate_matches_formula(
            pulses in 0u32..10_000,
            elapsed in 1u32..100_000,
            cal in 0.1f32..100.0,
        ) {
            let expected = (1000.0 / elapsed as f32) * pulses as f32 / cal;
            let got = flow_rate_l_per_min(pulses, elapsed, cal);
            prop_assert!((got - expected).abs() <= expected.abs() * 1e-5 + 1e-6);
        }

        #[test]
        fn zero_elapsed_never_divides(pulses in any::<u32>(), cal in 0.1f32..100.0) {
            prop_assert_eq!(flow_rate_l_per_min(pulses, 0, cal), 0.0);
        }

        #[test]
        fn total_volume_never_decreases(
            windows in proptest::collection::vec((0u32..500, 0u32..5_000), 1..50),
        ) {
            let mut m = FlowMeter::new(&SystemConfig::default());
            let mut prev = m.total_volume_ml();
            for (pulses, elapsed) in windows {
                let s = m.record(pulses, elapsed);
                prop_assert!(s.total_volume_ml >= prev);
                prev = s.total_volume_ml;
            }
        }
    }
}
