//! Mock hardware adapters for integration tests.
//!
//! Records every pump call so tests can assert on the full command
//! history, and serves scripted probe temperatures and flow pulses in
//! place of the one-wire bus and the ISR counter.

use std::collections::HashMap;

use poolheat::app::events::AppEvent;
use poolheat::app::ports::{ActuatorPort, EventSink, SensorPort};
use poolheat::app::service::AppService;
use poolheat::config::SystemConfig;
use poolheat::fsm::StateId;
use poolheat::pins;
use poolheat::sensors::temperature::{Channel, DISCONNECTED_C, SensorAddress};

pub const ADDRESSES: [SensorAddress; 3] = [
    pins::INPUT_TEMP_ROM,
    pins::OUTPUT_TEMP_ROM,
    pins::ENCLOSURE_TEMP_ROM,
];

/// Pulses per second giving ~6.01 L/min at the default calibration.
pub const NOMINAL_PULSES_PER_SEC: u32 = 44;

// ── MockSensors ───────────────────────────────────────────────

pub struct MockSensors {
    temps: HashMap<SensorAddress, f32>,
    pub pending_pulses: u32,
    pub conversions: u32,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn new(input: f32, output: f32, enclosure: f32) -> Self {
        let mut sensors = Self {
            temps: HashMap::new(),
            pending_pulses: 0,
            conversions: 0,
        };
        sensors.set(Channel::Input, input);
        sensors.set(Channel::Output, output);
        sensors.set(Channel::Enclosure, enclosure);
        sensors
    }

    pub fn set(&mut self, ch: Channel, celsius: f32) {
        let addr = match ch {
            Channel::Input => ADDRESSES[0],
            Channel::Output => ADDRESSES[1],
            Channel::Enclosure => ADDRESSES[2],
        };
        self.temps.insert(addr, celsius);
    }

    pub fn disconnect(&mut self, ch: Channel) {
        self.set(ch, DISCONNECTED_C);
    }
}

impl SensorPort for MockSensors {
    fn request_conversions(&mut self) {
        self.conversions += 1;
    }

    fn read_channel(&mut self, address: &SensorAddress) -> f32 {
        self.temps.get(address).copied().unwrap_or(DISCONNECTED_C)
    }

    fn take_flow_pulses(&mut self) -> u32 {
        std::mem::take(&mut self.pending_pulses)
    }
}

// ── MockPump ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPump {
    pub calls: Vec<bool>,
}

#[allow(dead_code)]
impl MockPump {
    pub fn is_on(&self) -> bool {
        self.calls.last().copied().unwrap_or(false)
    }
}

impl ActuatorPort for MockPump {
    fn set_pump(&mut self, on: bool) {
        self.calls.push(on);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn transitions(&self) -> Vec<(StateId, StateId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig: service + mocks + simulated clock ────────────────────

pub struct Rig {
    pub app: AppService,
    pub sensors: MockSensors,
    pub pump: MockPump,
    pub sink: RecordingSink,
    pub now: u32,
    /// Flow pulses the mock sensor produces per simulated second.
    pub pulses_per_sec: u32,
}

#[allow(dead_code)]
impl Rig {
    /// Warm collector (5 K rise) with nominal flow, started at `now`.
    pub fn started_at(now: u32) -> Self {
        Self::with_config(SystemConfig::default(), now)
    }

    pub fn with_config(config: SystemConfig, now: u32) -> Self {
        let mut rig = Self {
            app: AppService::new(config, ADDRESSES),
            sensors: MockSensors::new(20.0, 25.0, 35.0),
            pump: MockPump::default(),
            sink: RecordingSink::default(),
            now,
            pulses_per_sec: NOMINAL_PULSES_PER_SEC,
        };
        rig.app.start(now, &mut rig.sink);
        rig.tick();
        rig
    }

    pub fn tick(&mut self) {
        self.app
            .tick(self.now, &mut self.sensors, &mut self.pump, &mut self.sink);
    }

    /// Advance one simulated second and tick.
    pub fn step(&mut self) {
        self.now = self.now.wrapping_add(1_000);
        self.sensors.pending_pulses += self.pulses_per_sec;
        self.tick();
    }

    /// Step until `ms` of simulated time have passed.
    pub fn advance(&mut self, ms: u32) {
        for _ in 0..ms / 1_000 {
            self.step();
        }
    }

    pub fn state(&self) -> StateId {
        self.app.state()
    }

    /// Boot and run until the controller is Active.
    pub fn active() -> Self {
        let mut rig = Self::started_at(0);
        rig.advance(SystemConfig::default().stability_delay_ms);
        assert_eq!(rig.state(), StateId::Active);
        rig
    }
}
