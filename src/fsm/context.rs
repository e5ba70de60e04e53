//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It contains the clock reading for this evaluation, the
//! latest sensor snapshot, the interval timers, the pump command, and the
//! configuration.  A handler is therefore a pure function of the context:
//! no hardware, no globals, and every transition can be driven from a test
//! by setting fields and calling `tick`.

use crate::config::SystemConfig;
use crate::timing::elapsed_ms;

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to state handlers; written by the service)
// ---------------------------------------------------------------------------

/// Measurements for one evaluation.  Temperatures are the last known-good
/// values (`None` until a probe has answered at least once).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Collector inlet / pool water (°C).
    pub input_c: Option<f32>,
    /// Collector outlet (°C).
    pub output_c: Option<f32>,
    /// Controller enclosure (°C).
    pub enclosure_c: Option<f32>,
    /// Loop flow rate (L/min).
    pub flow_l_per_min: f32,
    /// Volume pumped since boot (mL).
    pub total_volume_ml: f64,
    /// Thermal power being captured (W).
    pub power_w: f32,
}

// ---------------------------------------------------------------------------
// Timers (owned by the state machine)
// ---------------------------------------------------------------------------

/// "Last event" timestamps.  Each one is written only by the transition
/// that starts the interval it measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timers {
    /// When the pump was (re)started and readings became untrusted.
    pub stability_start_ms: u32,
    /// When the current hibernation began.
    pub hibernation_entry_ms: u32,
    /// Start of the current uninterrupted run of low-power evaluations.
    pub low_energy_since_ms: Option<u32>,
    /// When maintenance mode was last entered or left.
    pub last_maintenance_toggle_ms: Option<u32>,
    /// Set once the maintenance period has run out in the current visit.
    pub maintenance_expired: bool,
}

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request actuator actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorCommands {
    /// Desired pump relay state.
    pub pump_on: bool,
}

impl ActuatorCommands {
    /// Pump off.
    pub fn all_off() -> Self {
        Self::default()
    }
}

/// Last pool temperature observed while circulating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolTemp {
    pub celsius: f32,
    pub recorded_ms: u32,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Clock reading for the evaluation in progress.
    pub now_ms: u32,
    /// Interval timers.
    pub timers: Timers,

    // -- Sensor data --
    /// Latest measurements.  Updated before each FSM tick.
    pub sensors: SensorSnapshot,
    /// Pool temperature recorded by the last Active evaluation.
    pub last_pool_temp: Option<PoolTemp>,

    // -- Actuator outputs --
    /// Commands to be applied to actuators after the FSM tick.
    pub commands: ActuatorCommands,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            now_ms: 0,
            timers: Timers::default(),
            sensors: SensorSnapshot::default(),
            last_pool_temp: None,
            commands: ActuatorCommands::all_off(),
            config,
        }
    }

    /// Milliseconds from `stamp` to the current evaluation.
    pub fn ms_since(&self, stamp: u32) -> u32 {
        elapsed_ms(self.now_ms, stamp)
    }
}
