//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensor bus, pump relay, event sinks, clock) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the control core never touches hardware directly
//! and every transition can be exercised on the host.

use crate::sensors::temperature::SensorAddress;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain raw measurements.
pub trait SensorPort {
    /// Ask every temperature probe on the bus to start a conversion.
    fn request_conversions(&mut self);

    /// Read one temperature probe in °C.  Returns
    /// [`DISCONNECTED_C`](crate::sensors::temperature::DISCONNECTED_C)
    /// when the probe does not answer or its data is corrupt.
    fn read_channel(&mut self, address: &SensorAddress) -> f32;

    /// Swap out the flow pulses counted since the previous call.
    fn take_flow_pulses(&mut self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the single binary pump relay.
pub trait ActuatorPort {
    /// Energise (`true`) or release (`false`) the pump relay.
    /// Idempotent; no feedback.
    fn set_pump(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, web
/// status page, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; consumers must use
/// [`crate::timing`] for every duration.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}
