//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! [`HardwareSensors`] owns the one-wire probe bus and a handle to the
//! ISR pulse counter and exposes them through [`SensorPort`]; the pump
//! relay driver is exposed through [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  Bus failures never
//! escape: they are logged and folded into the disconnect sentinel.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::onewire::Ds18b20Bus;
use crate::drivers::pump::PumpRelay;
use crate::sensors::flow::FlowPulseCounter;
use crate::sensors::temperature::{DISCONNECTED_C, SensorAddress};

/// Temperature probes plus flow counter behind [`SensorPort`].
pub struct HardwareSensors<P, D> {
    probes: Ds18b20Bus<P, D>,
    flow: &'static FlowPulseCounter,
    /// A conversion was started by the previous poll.
    conversion_pending: bool,
    /// Scratchpads hold a conversion that finished since the last poll.
    results_ready: bool,
}

impl<P, D> HardwareSensors<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(probes: Ds18b20Bus<P, D>, flow: &'static FlowPulseCounter) -> Self {
        Self {
            probes,
            flow,
            conversion_pending: false,
            results_ready: false,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P, D> SensorPort for HardwareSensors<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn request_conversions(&mut self) {
        // Polls are at least a conversion time apart, so the conversion
        // started last time is complete and is what the reads return.
        self.results_ready = self.conversion_pending;
        self.conversion_pending = match self.probes.start_conversion() {
            Ok(()) => true,
            Err(e) => {
                debug!("one-wire: CONVERT T failed: {e}");
                false
            }
        };
    }

    fn read_channel(&mut self, address: &SensorAddress) -> f32 {
        if !self.results_ready {
            return DISCONNECTED_C;
        }
        match self.probes.read_celsius(address) {
            Ok(c) => c,
            Err(e) => {
                debug!("one-wire: {:02X?}: {e}", address);
                DISCONNECTED_C
            }
        }
    }

    fn take_flow_pulses(&mut self) -> u32 {
        self.flow.take_and_reset()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for PumpRelay {
    fn set_pump(&mut self, on: bool) {
        self.set(on);
    }
}
