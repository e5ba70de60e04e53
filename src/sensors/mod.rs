//! Sensor subsystem: flow pulse counting/rate estimation and the
//! three-channel temperature sampler.
//!
//! Both read hardware only through [`SensorPort`](crate::app::ports::SensorPort)
//! (or, for the pulse counter, an ISR), so they run unchanged on the host.

pub mod flow;
pub mod temperature;
