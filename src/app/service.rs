//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM, the sensor samplers, and the shared
//! context.  It exposes a clean, hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService          │
//! ActuatorPort ◀──│ Temps · Flow · Energy · FSM  │
//!                 └──────────────────────────────┘
//! ```

use log::{debug, info};

use crate::config::SystemConfig;
use crate::control::energy;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId, Transition};
use crate::sensors::flow::FlowMeter;
use crate::sensors::temperature::{
    PollOutcome, SensorAddress, TemperatureReading, TemperatureSampler,
};
use crate::timing::{elapsed_ms, has_elapsed};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort};
use super::status::{FIRMWARE_VERSION, StatusSnapshot};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    temps: TemperatureSampler,
    flow: FlowMeter,
    /// Last FSM evaluation; `None` until the first tick.
    last_eval_ms: Option<u32>,
    last_tick_ms: Option<u32>,
    last_telemetry_ms: u32,
    /// Accumulated across clock wraps.
    uptime_ms: u64,
}

impl AppService {
    /// Construct the service from configuration and the probe ROM codes
    /// (input, output, enclosure).
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, addresses: [SensorAddress; 3]) -> Self {
        let temps = TemperatureSampler::new(&config, addresses);
        let flow = FlowMeter::new(&config);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Initializing);

        Self {
            fsm,
            ctx,
            temps,
            flow,
            last_eval_ms: None,
            last_tick_ms: None,
            last_telemetry_ms: 0,
            uptime_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `Initializing` and anchor every interval at `now_ms`.
    pub fn start(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        self.ctx.now_ms = now_ms;
        self.flow.start(now_ms);
        self.last_telemetry_ms = now_ms;
        self.last_tick_ms = Some(now_ms);
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!(
            "AppService started in {} (firmware {})",
            self.fsm.current_state(),
            FIRMWARE_VERSION
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one superloop iteration: temperatures → flow → energy → FSM →
    /// pump.  Each stage is gated by its own interval.
    pub fn tick(
        &mut self,
        now_ms: u32,
        sensors: &mut impl SensorPort,
        actuator: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        if let Some(last) = self.last_tick_ms {
            self.uptime_ms += u64::from(elapsed_ms(now_ms, last));
        }
        self.last_tick_ms = Some(now_ms);
        self.ctx.now_ms = now_ms;

        // 1. Temperatures
        if let PollOutcome::Sampled {
            lost,
            recovered,
            absent,
        } = self.temps.poll(now_ms, sensors)
        {
            for ch in lost {
                sink.emit(&AppEvent::SensorDisconnected(ch));
            }
            for ch in recovered {
                sink.emit(&AppEvent::SensorRecovered(ch));
            }
            for ch in absent {
                sink.emit(&AppEvent::SensorAbsent(ch));
            }
        }

        // 2. Flow window
        if let Some(sample) = self.flow.poll(now_ms, || sensors.take_flow_pulses()) {
            debug!(
                "flow: {} pulses / {} ms = {:.2} L/min",
                sample.pulses, sample.window_ms, sample.rate_l_per_min
            );
        }

        // 3. Energy
        self.refresh_snapshot();

        // 4. State machine
        let due = self
            .last_eval_ms
            .is_none_or(|last| has_elapsed(now_ms, last, self.ctx.config.control_interval_ms));
        if due {
            self.last_eval_ms = Some(now_ms);
            let expired_before = self.ctx.timers.maintenance_expired;

            let transition = self.fsm.tick(&mut self.ctx);
            self.emit_transition(transition, sink);

            if !expired_before && self.ctx.timers.maintenance_expired {
                sink.emit(&AppEvent::MaintenanceExpired);
            }

            // 5. Actuator
            actuator.set_pump(self.ctx.commands.pump_on);
        }

        // Telemetry
        if has_elapsed(now_ms, self.last_telemetry_ms, self.ctx.config.telemetry_interval_ms) {
            self.last_telemetry_ms = now_ms;
            sink.emit(&AppEvent::Telemetry(self.status(now_ms)));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.  The pump is updated immediately.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u32,
        actuator: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        match cmd {
            AppCommand::EnterMaintenance => {
                let transition = self.fsm.force_transition(StateId::Maintenance, &mut self.ctx);
                self.emit_transition(transition, sink);
            }
            AppCommand::ExitMaintenance => {
                if self.fsm.current_state() != StateId::Maintenance {
                    info!("ExitMaintenance ignored in {}", self.fsm.current_state());
                    return;
                }
                let transition = self.fsm.force_transition(StateId::Initializing, &mut self.ctx);
                self.emit_transition(transition, sink);
            }
        }
        actuator.set_pump(self.ctx.commands.pump_on);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot as of `now_ms`.  No side effects.
    pub fn status(&self, now_ms: u32) -> StatusSnapshot {
        let since_tick = self
            .last_tick_ms
            .map_or(0, |last| u64::from(elapsed_ms(now_ms, last)));
        let state = self.fsm.current_state();
        let cfg = &self.ctx.config;

        let maintenance_remaining_ms = if state == StateId::Maintenance {
            self.ctx
                .timers
                .last_maintenance_toggle_ms
                .map(|t| cfg.maintenance_period_ms.saturating_sub(elapsed_ms(now_ms, t)))
        } else {
            None
        };

        StatusSnapshot {
            state,
            state_age_ms: elapsed_ms(now_ms, self.fsm.state_entered_ms()),
            input_temp_c: self.ctx.sensors.input_c,
            output_temp_c: self.ctx.sensors.output_c,
            enclosure_temp_c: self.ctx.sensors.enclosure_c,
            target_temp_c: cfg.target_temp_c,
            pool_temp_c: self.ctx.last_pool_temp.map(|p| p.celsius),
            pool_temp_age_ms: self.ctx.last_pool_temp.map(|p| elapsed_ms(now_ms, p.recorded_ms)),
            flow_l_per_min: self.ctx.sensors.flow_l_per_min,
            total_volume_ml: self.ctx.sensors.total_volume_ml,
            power_w: self.ctx.sensors.power_w,
            pump_on: self.ctx.commands.pump_on,
            uptime_ms: self.uptime_ms + since_tick,
            maintenance_remaining_ms,
            firmware_version: FIRMWARE_VERSION,
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Latest per-channel temperature readings.
    pub fn temperatures(&self) -> TemperatureReading {
        self.temps.reading()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Copy the latest measurements into the FSM context and recompute
    /// captured power.
    fn refresh_snapshot(&mut self) {
        let reading = self.temps.reading();
        let snap = &mut self.ctx.sensors;
        snap.input_c = reading.input.celsius;
        snap.output_c = reading.output.celsius;
        snap.enclosure_c = reading.enclosure.celsius;
        snap.flow_l_per_min = self.flow.rate_l_per_min();
        snap.total_volume_ml = self.flow.total_volume_ml();
        snap.power_w = energy::estimate(
            snap.flow_l_per_min,
            snap.input_c,
            snap.output_c,
            self.ctx.config.specific_heat_j_per_l_k,
        );
    }

    fn emit_transition(&self, transition: Option<Transition>, sink: &mut impl EventSink) {
        if let Some(Transition { from, to }) = transition {
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }
}
