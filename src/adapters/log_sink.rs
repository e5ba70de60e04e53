//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  A status page
//! adapter would implement the same trait.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn fmt_temp(t: Option<f32>) -> heapless::String<12> {
    use core::fmt::Write;
    let mut s = heapless::String::new();
    // Worst case "-127.0°C" fits; a failed write just leaves it short.
    let _ = match t {
        Some(c) => write!(s, "{c:.1}\u{00b0}C"),
        None => write!(s, "--"),
    };
    s
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={} | in={} out={} box={} | pool={} | \
                     flow={:.2}L/min vol={:.0}mL | power={:.0}W | pump={} | up={}s",
                    t.state,
                    fmt_temp(t.input_temp_c),
                    fmt_temp(t.output_temp_c),
                    fmt_temp(t.enclosure_temp_c),
                    fmt_temp(t.pool_temp_c),
                    t.flow_l_per_min,
                    t.total_volume_ml,
                    t.power_w,
                    if t.pump_on { "ON" } else { "OFF" },
                    t.uptime_ms / 1_000,
                );
                if let Ok(json) = t.to_json() {
                    debug!("STATUS | {json}");
                }
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::SensorDisconnected(ch) => {
                warn!("SENSOR | {} disconnected", ch.name());
            }
            AppEvent::SensorRecovered(ch) => {
                info!("SENSOR | {} recovered", ch.name());
            }
            AppEvent::SensorAbsent(ch) => {
                warn!("SENSOR | {} absent since boot", ch.name());
            }
            AppEvent::MaintenanceExpired => {
                warn!("MAINT | period elapsed, pump still disabled");
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
        }
    }
}
