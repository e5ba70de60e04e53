//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                   |
//! |------------|--------------|-------------------------------|
//! | `hardware` | SensorPort   | DS18B20 bus, flow ISR counter |
//! |            | ActuatorPort | Pump relay GPIO               |
//! | `log_sink` | EventSink    | Serial log output             |
//! | `time`     | ClockPort    | ESP32 system timer            |

pub mod hardware;
pub mod log_sink;
pub mod time;
