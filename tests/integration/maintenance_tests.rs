//! Maintenance mode: commands, pump lockout, and expiry reporting.

use crate::mock_hw::Rig;

use poolheat::app::commands::AppCommand;
use poolheat::app::events::AppEvent;
use poolheat::config::SystemConfig;
use poolheat::fsm::StateId;
use poolheat::sensors::temperature::Channel;

fn enter(rig: &mut Rig) {
    rig.app
        .handle_command(AppCommand::EnterMaintenance, rig.now, &mut rig.pump, &mut rig.sink);
}

fn exit(rig: &mut Rig) {
    rig.app
        .handle_command(AppCommand::ExitMaintenance, rig.now, &mut rig.pump, &mut rig.sink);
}

#[test]
fn enter_from_any_state_stops_pump() {
    // Stabilizing
    let mut rig = Rig::started_at(0);
    enter(&mut rig);
    assert_eq!(rig.state(), StateId::Maintenance);
    assert!(!rig.pump.is_on());

    // Active
    let mut rig = Rig::active();
    enter(&mut rig);
    assert_eq!(rig.state(), StateId::Maintenance);
    assert!(!rig.pump.is_on());

    // Hibernating
    let mut rig = Rig::active();
    rig.sensors.set(Channel::Input, 35.0);
    rig.advance(3_000);
    assert_eq!(rig.state(), StateId::Hibernating);
    enter(&mut rig);
    assert_eq!(rig.state(), StateId::Maintenance);
    assert!(!rig.pump.is_on());
}

#[test]
fn enter_twice_is_a_single_transition() {
    let mut rig = Rig::active();
    enter(&mut rig);
    let n = rig.sink.transitions().len();
    enter(&mut rig);
    assert_eq!(rig.sink.transitions().len(), n);
}

#[test]
fn automatic_control_suspended() {
    let mut rig = Rig::active();
    enter(&mut rig);
    let from = rig.pump.calls.len();
    // Conditions that would otherwise drive transitions.
    rig.sensors.set(Channel::Input, 35.0);
    rig.advance(5 * 60_000);
    assert_eq!(rig.state(), StateId::Maintenance);
    assert!(rig.pump.calls[from..].iter().all(|on| !on), "pump never re-enabled");
}

#[test]
fn expiry_reported_once_without_leaving() {
    let mut rig = Rig::active();
    enter(&mut rig);
    let entered = rig.now;
    let period = SystemConfig::default().maintenance_period_ms;

    rig.advance(period - 3_000);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::MaintenanceExpired), 0);
    let remaining = rig.app.status(rig.now).maintenance_remaining_ms;
    assert_eq!(remaining, Some(3_000));

    rig.advance(2 * period);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::MaintenanceExpired), 1);
    assert_eq!(rig.state(), StateId::Maintenance);
    assert!(!rig.pump.is_on());
    assert_eq!(rig.app.status(rig.now).maintenance_remaining_ms, Some(0));
    assert!(rig.now.wrapping_sub(entered) > period);
}

#[test]
fn exit_restarts_from_initializing() {
    let mut rig = Rig::active();
    enter(&mut rig);
    rig.advance(10_000);
    exit(&mut rig);

    assert_eq!(rig.state(), StateId::Initializing);
    assert!(rig.pump.is_on());
    assert_eq!(rig.app.status(rig.now).maintenance_remaining_ms, None);

    rig.advance(3_000);
    assert_eq!(rig.state(), StateId::Stabilizing);
    rig.advance(SystemConfig::default().stability_delay_ms);
    assert_eq!(rig.state(), StateId::Active);
}

#[test]
fn exit_ignored_outside_maintenance() {
    let mut rig = Rig::active();
    let calls = rig.pump.calls.len();
    exit(&mut rig);
    assert_eq!(rig.state(), StateId::Active);
    assert_eq!(rig.pump.calls.len(), calls);
}

#[test]
fn second_visit_reports_expiry_again() {
    let mut rig = Rig::active();
    let period = SystemConfig::default().maintenance_period_ms;

    enter(&mut rig);
    rig.advance(period + 3_000);
    exit(&mut rig);
    rig.advance(3_000);
    enter(&mut rig);
    rig.advance(period + 3_000);

    assert_eq!(rig.sink.count(|e| *e == AppEvent::MaintenanceExpired), 2);
}
