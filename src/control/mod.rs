//! Control-law helpers shared by the state machine.

pub mod energy;
