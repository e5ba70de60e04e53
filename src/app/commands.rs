//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (serial console,
//! web page, service technician) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Stop the pump and suspend automatic control, from any state.
    EnterMaintenance,

    /// Leave maintenance and restart from `Initializing`.
    /// Ignored outside maintenance.
    ExitMaintenance,
}
