//! Read-only status view for the serial console and status page.

use serde::Serialize;

use crate::fsm::StateId;

/// Firmware version reported in every snapshot.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Point-in-time view of the controller.  Temperatures are the last valid
/// readings; `None` means the probe has not answered since boot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub state: StateId,
    /// Time since the current state was entered.
    pub state_age_ms: u32,
    pub input_temp_c: Option<f32>,
    pub output_temp_c: Option<f32>,
    pub enclosure_temp_c: Option<f32>,
    pub target_temp_c: f32,
    /// Inlet temperature recorded by the last Active evaluation.
    pub pool_temp_c: Option<f32>,
    pub pool_temp_age_ms: Option<u32>,
    pub flow_l_per_min: f32,
    pub total_volume_ml: f64,
    pub power_w: f32,
    pub pump_on: bool,
    pub uptime_ms: u64,
    /// Time left before maintenance is reported as overdue; `Some(0)` once
    /// it has, `None` outside maintenance.
    pub maintenance_remaining_ms: Option<u32>,
    pub firmware_version: &'static str,
}

impl StatusSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
