//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, serve on a status
//! page, etc.

use crate::fsm::StateId;
use crate::sensors::temperature::Channel;

use super::status::StatusSnapshot;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A probe that had been answering returned the disconnect sentinel.
    SensorDisconnected(Channel),

    /// A previously disconnected probe answered again.
    SensorRecovered(Channel),

    /// A probe has not produced a reading since boot.
    SensorAbsent(Channel),

    /// The maintenance period ran out; the pump stays off until released.
    MaintenanceExpired,

    /// Periodic status snapshot.
    Telemetry(StatusSnapshot),
}
