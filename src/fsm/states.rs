//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  INITIALIZING ──[immediate]──▶ STABILIZING ──[stability delay]──▶ ACTIVE
//!                                    ▲                               │
//!                                    │            [pool at target] or│
//!                     [hibernation period]   [low power for delay]   │
//!                                    │                               ▼
//!                                    └─────────────────────── HIBERNATING
//!
//!  Any state ──[EnterMaintenance]──▶ MAINTENANCE ──[ExitMaintenance]──▶ INITIALIZING
//! ```

use super::context::{FsmContext, PoolTemp};
use super::{StateDescriptor, StateId};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Initializing
        StateDescriptor {
            id: StateId::Initializing,
            name: StateId::Initializing.name(),
            on_enter: Some(initializing_enter),
            on_exit: None,
            on_update: initializing_update,
        },
        // Index 1: Stabilizing
        StateDescriptor {
            id: StateId::Stabilizing,
            name: StateId::Stabilizing.name(),
            on_enter: Some(stabilizing_enter),
            on_exit: None,
            on_update: stabilizing_update,
        },
        // Index 2: Active
        StateDescriptor {
            id: StateId::Active,
            name: StateId::Active.name(),
            on_enter: Some(active_enter),
            on_exit: None,
            on_update: active_update,
        },
        // Index 3: Hibernating
        StateDescriptor {
            id: StateId::Hibernating,
            name: StateId::Hibernating.name(),
            on_enter: Some(hibernating_enter),
            on_exit: None,
            on_update: hibernating_update,
        },
        // Index 4: Maintenance
        StateDescriptor {
            id: StateId::Maintenance,
            name: StateId::Maintenance.name(),
            on_enter: Some(maintenance_enter),
            on_exit: Some(maintenance_exit),
            on_update: maintenance_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  INITIALIZING: cold start, arm every timer
// ═══════════════════════════════════════════════════════════════════════════

fn initializing_enter(ctx: &mut FsmContext) {
    // Circulate so the probes see real loop water.
    ctx.commands.pump_on = true;

    let now = ctx.now_ms;
    ctx.timers.stability_start_ms = now;
    ctx.timers.hibernation_entry_ms = now;
    ctx.timers.low_energy_since_ms = None;
    info!("INITIALIZING: pump on, timers armed at {} ms", now);
}

fn initializing_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::Stabilizing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  STABILIZING: pump running, readings not yet trusted
// ═══════════════════════════════════════════════════════════════════════════

fn stabilizing_enter(ctx: &mut FsmContext) {
    ctx.commands.pump_on = true;
    ctx.timers.stability_start_ms = ctx.now_ms;
    info!(
        "STABILIZING: waiting {} s for loop temperatures to settle",
        ctx.config.stability_delay_ms / 1000
    );
}

fn stabilizing_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.ms_since(ctx.timers.stability_start_ms) >= ctx.config.stability_delay_ms {
        info!("STABILIZING: sensors stabilized");
        return Some(StateId::Active);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE: heating the pool
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    ctx.commands.pump_on = true;
    ctx.timers.low_energy_since_ms = None;
    info!("ACTIVE: circulating, target {:.1} C", ctx.config.target_temp_c);
}

fn active_update(ctx: &mut FsmContext) -> Option<StateId> {
    let now = ctx.now_ms;

    // The loop is drawing from the pool, so the inlet is the pool temperature.
    if let Some(input) = ctx.sensors.input_c {
        ctx.last_pool_temp = Some(PoolTemp {
            celsius: input,
            recorded_ms: now,
        });

        if input > ctx.config.target_temp_c {
            info!(
                "ACTIVE: input {:.2} C > target {:.1} C, hibernating",
                input, ctx.config.target_temp_c
            );
            return Some(StateId::Hibernating);
        }
    }

    // Low power must persist for the whole trigger delay; one productive
    // evaluation restarts the wait.
    if ctx.sensors.power_w < ctx.config.energy_threshold_w {
        let since = *ctx.timers.low_energy_since_ms.get_or_insert(now);
        if ctx.ms_since(since) >= ctx.config.hibernation_trigger_delay_ms {
            info!(
                "ACTIVE: capture {:.0} W < {:.0} W for {} s, hibernating",
                ctx.sensors.power_w,
                ctx.config.energy_threshold_w,
                ctx.ms_since(since) / 1000
            );
            return Some(StateId::Hibernating);
        }
    } else {
        ctx.timers.low_energy_since_ms = None;
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  HIBERNATING: pump resting
// ═══════════════════════════════════════════════════════════════════════════

fn hibernating_enter(ctx: &mut FsmContext) {
    ctx.commands.pump_on = false;
    ctx.timers.hibernation_entry_ms = ctx.now_ms;
    ctx.timers.low_energy_since_ms = None;
    info!(
        "HIBERNATING: pump off for {} min",
        ctx.config.hibernation_period_ms / 60_000
    );
}

fn hibernating_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.ms_since(ctx.timers.hibernation_entry_ms) >= ctx.config.hibernation_period_ms {
        info!("HIBERNATING: period over, cycling the loop");
        return Some(StateId::Stabilizing);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAINTENANCE: pump forced off, automatic control suspended
// ═══════════════════════════════════════════════════════════════════════════

fn maintenance_enter(ctx: &mut FsmContext) {
    ctx.commands = super::context::ActuatorCommands::all_off();
    ctx.timers.last_maintenance_toggle_ms = Some(ctx.now_ms);
    ctx.timers.maintenance_expired = false;
    warn!("MAINTENANCE: pump disabled, automatic control suspended");
}

fn maintenance_exit(ctx: &mut FsmContext) {
    ctx.timers.last_maintenance_toggle_ms = Some(ctx.now_ms);
    ctx.timers.maintenance_expired = false;
    info!("MAINTENANCE: released, restarting controller");
}

fn maintenance_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.timers.maintenance_expired {
        if let Some(entered) = ctx.timers.last_maintenance_toggle_ms {
            if ctx.ms_since(entered) >= ctx.config.maintenance_period_ms {
                ctx.timers.maintenance_expired = true;
                warn!("MAINTENANCE: period elapsed, still waiting for release");
            }
        }
    }
    // Only an external command leaves this state.
    None
}
