//! Solar pool-heater pump controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! hardware adapters for the binary.  All ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod sensors;
pub mod timing;

// Peripheral-facing code; host builds use the cfg-gated simulation paths.
pub mod adapters;
pub mod drivers;
