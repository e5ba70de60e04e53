//! End-to-end control loop scenarios: sensors → energy → FSM → pump.

use crate::mock_hw::{ADDRESSES, MockPump, MockSensors, RecordingSink, Rig};

use poolheat::app::events::AppEvent;
use poolheat::app::service::AppService;
use poolheat::config::SystemConfig;
use poolheat::fsm::StateId;
use poolheat::sensors::temperature::{Channel, DISCONNECTED_C};

// ── Startup ──────────────────────────────────────────────────

#[test]
fn boot_runs_pump_and_stabilizes_before_active() {
    let mut rig = Rig::started_at(0);
    assert_eq!(rig.state(), StateId::Stabilizing);
    assert!(rig.pump.is_on(), "pump must run from boot");

    rig.advance(119_000);
    assert_eq!(rig.state(), StateId::Stabilizing);

    rig.step();
    assert_eq!(rig.state(), StateId::Active);
    assert!(rig.pump.is_on());
    assert_eq!(
        rig.sink.transitions(),
        vec![
            (StateId::Initializing, StateId::Stabilizing),
            (StateId::Stabilizing, StateId::Active),
        ]
    );
}

#[test]
fn first_tick_samples_temperatures() {
    let rig = Rig::started_at(0);
    assert_eq!(rig.sensors.conversions, 1);
    let t = rig.app.temperatures();
    assert_eq!(t.input.celsius, Some(20.0));
    assert_eq!(t.output.celsius, Some(25.0));
    assert_eq!(t.enclosure.celsius, Some(35.0));
}

// ── Active operation ─────────────────────────────────────────

#[test]
fn productive_collector_stays_active() {
    let mut rig = Rig::active();
    rig.advance(10 * 60_000);
    assert_eq!(rig.state(), StateId::Active);

    let status = rig.app.status(rig.now);
    assert!((status.flow_l_per_min - 6.0117).abs() < 1e-3);
    assert!((status.power_w - 2_094.0).abs() < 2.0, "got {}", status.power_w);
    assert_eq!(status.pool_temp_c, Some(20.0));
    assert_eq!(status.pool_temp_age_ms, Some(0));
}

#[test]
fn pool_at_target_keeps_heating() {
    let mut rig = Rig::active();
    rig.sensors.set(Channel::Input, 30.0);
    rig.advance(6_000);
    assert_eq!(rig.state(), StateId::Active);
}

#[test]
fn pool_above_target_hibernates_on_next_evaluation() {
    let mut rig = Rig::active();
    rig.sensors.set(Channel::Input, 30.1);
    rig.sensors.set(Channel::Output, 35.0);
    rig.advance(3_000);
    assert_eq!(rig.state(), StateId::Hibernating);
    assert!(!rig.pump.is_on());
}

#[test]
fn low_power_hibernates_after_trigger_delay() {
    let mut rig = Rig::active(); // Active at 120 s
    rig.sensors.set(Channel::Output, 20.0); // zero delta-T, zero power

    // First low evaluation at 123 s; must hold until 153 s.
    rig.advance(32_000);
    assert_eq!(rig.now, 152_000);
    assert_eq!(rig.state(), StateId::Active);

    rig.step();
    assert_eq!(rig.state(), StateId::Hibernating);
    assert!(!rig.pump.is_on());
}

#[test]
fn single_good_reading_restarts_low_power_wait() {
    let mut rig = Rig::active();
    rig.sensors.set(Channel::Output, 20.0);
    rig.advance(27_000); // low since 123 s, now 147 s

    rig.sensors.set(Channel::Output, 25.0);
    rig.advance(3_000); // good evaluation at 150 s
    rig.sensors.set(Channel::Output, 20.0); // low again from 153 s

    rig.advance(30_000);
    assert_eq!(rig.now, 180_000);
    assert_eq!(rig.state(), StateId::Active, "wait must restart from 153 s");

    rig.advance(3_000);
    assert_eq!(rig.state(), StateId::Hibernating);
}

#[test]
fn no_flow_means_no_power() {
    let mut rig = Rig::active();
    rig.pulses_per_sec = 0;
    rig.advance(40_000);
    assert_eq!(rig.state(), StateId::Hibernating);
    assert_eq!(rig.app.status(rig.now).flow_l_per_min, 0.0);
}

// ── Hibernation cycle ────────────────────────────────────────

#[test]
fn hibernation_cycles_back_through_stabilizing() {
    let mut rig = Rig::active();
    rig.sensors.set(Channel::Input, 31.0);
    rig.advance(3_000); // hibernating from 123 s
    assert_eq!(rig.state(), StateId::Hibernating);
    rig.sensors.set(Channel::Input, 25.0);
    rig.pulses_per_sec = 0; // pump off, no flow

    let period = SystemConfig::default().hibernation_period_ms;
    rig.advance(period - 1_000);
    assert_eq!(rig.state(), StateId::Hibernating);
    assert!(!rig.pump.is_on());

    rig.step();
    assert_eq!(rig.state(), StateId::Stabilizing);
    assert!(rig.pump.is_on(), "loop must circulate to re-read the collector");

    rig.pulses_per_sec = 44;
    rig.advance(SystemConfig::default().stability_delay_ms);
    assert_eq!(rig.state(), StateId::Active);
}

// ── Sensor faults ────────────────────────────────────────────

#[test]
fn disconnected_sensor_holds_last_value() {
    let mut rig = Rig::active();
    rig.sensors.disconnect(Channel::Output);
    rig.advance(1_000);

    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::SensorDisconnected(Channel::Output)),
        1
    );
    let status = rig.app.status(rig.now);
    assert_eq!(status.output_temp_c, Some(25.0));
    assert!(status.power_w > 2_000.0, "power uses the held value");

    rig.advance(60_000);
    assert_eq!(rig.state(), StateId::Active);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::SensorDisconnected(Channel::Output)),
        1,
        "reported once per outage"
    );

    rig.sensors.set(Channel::Output, 26.0);
    rig.advance(1_000);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::SensorRecovered(Channel::Output)),
        1
    );
    assert_eq!(rig.app.status(rig.now).output_temp_c, Some(26.0));
}

#[test]
fn sentinel_never_reaches_status() {
    let mut rig = Rig::started_at(0);
    for ch in Channel::ALL {
        rig.sensors.disconnect(ch);
    }
    rig.advance(5_000);
    let s = rig.app.status(rig.now);
    for t in [s.input_temp_c, s.output_temp_c, s.enclosure_temp_c] {
        assert_ne!(t, Some(DISCONNECTED_C));
    }
}

#[test]
fn sensor_absent_from_boot_is_reported_once() {
    let mut app = AppService::new(SystemConfig::default(), ADDRESSES);
    let mut sensors = MockSensors::new(20.0, 25.0, 35.0);
    sensors.disconnect(Channel::Enclosure);
    let mut pump = MockPump::default();
    let mut sink = RecordingSink::default();

    app.start(0, &mut sink);
    app.tick(0, &mut sensors, &mut pump, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorAbsent(_))), 0);

    for k in 1..=3_600 {
        app.tick(k * 1_000, &mut sensors, &mut pump, &mut sink);
    }

    assert_eq!(app.status(3_600_000).enclosure_temp_c, None);
    assert_eq!(
        sink.count(|e| *e == AppEvent::SensorAbsent(Channel::Enclosure)),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SensorDisconnected(_))),
        0,
        "never-seen probe is absent, not lost"
    );

    sensors.set(Channel::Enclosure, 34.0);
    app.tick(3_601_000, &mut sensors, &mut pump, &mut sink);
    assert_eq!(
        sink.count(|e| *e == AppEvent::SensorRecovered(Channel::Enclosure)),
        1
    );
}

// ── Telemetry & status ───────────────────────────────────────

#[test]
fn telemetry_every_interval() {
    let mut rig = Rig::started_at(0);
    rig.advance(180_000);
    let telemetry: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 3);
    assert_eq!(telemetry[2].state, StateId::Active);
    assert_eq!(telemetry[2].uptime_ms, 180_000);
}

#[test]
fn status_json_is_well_formed() {
    let mut rig = Rig::active();
    rig.advance(3_000);
    let json = rig.app.status(rig.now).to_json().unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["state"], "Active");
    assert_eq!(v["pump_on"], true);
    assert_eq!(v["target_temp_c"], 30.0);
    assert_eq!(v["firmware_version"], env!("CARGO_PKG_VERSION"));
    assert!(v["maintenance_remaining_ms"].is_null());
}

// ── Clock wrap ───────────────────────────────────────────────

#[test]
fn control_survives_millisecond_counter_wrap() {
    let start = u32::MAX - 60_000;
    let mut rig = Rig::started_at(start);
    rig.advance(120_000);
    assert!(rig.now < start, "clock wrapped");
    assert_eq!(rig.state(), StateId::Active);
    assert_eq!(rig.app.status(rig.now).uptime_ms, 120_000);

    rig.sensors.set(Channel::Output, 20.0);
    rig.advance(33_000);
    assert_eq!(rig.state(), StateId::Hibernating);
}

#[test]
fn custom_config_timings_are_honoured() {
    let config = SystemConfig {
        stability_delay_ms: 10_000,
        control_interval_ms: 1_000,
        ..SystemConfig::default()
    };
    let mut rig = Rig::with_config(config, 0);
    rig.advance(9_000);
    assert_eq!(rig.state(), StateId::Stabilizing);
    rig.step();
    assert_eq!(rig.state(), StateId::Active);
}
