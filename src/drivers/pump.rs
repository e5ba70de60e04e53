//! Circulation pump relay driver.
//!
//! A single digital output switches the pump relay: HIGH energises it.
//! The driver is a dumb actuator; the state machine decides when it runs.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use log::debug;

use crate::drivers::hw_init;
use crate::pins;

pub struct PumpRelay {
    on: bool,
}

impl Default for PumpRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl PumpRelay {
    /// Relay starts released (pump off).
    pub fn new() -> Self {
        Self { on: false }
    }

    /// Idempotent: repeating the current state only rewrites the pin.
    pub fn set(&mut self, on: bool) {
        if on != self.on {
            debug!("pump relay {}", if on { "ON" } else { "OFF" });
        }
        hw_init::gpio_write(pins::PUMP_CONTROL_GPIO, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
