//! GPIO / peripheral pin assignments for the pool-heater controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers or sensor ROM codes.

// ---------------------------------------------------------------------------
// Pump relay
// ---------------------------------------------------------------------------

/// Digital output: HIGH = pump relay energised.
pub const PUMP_CONTROL_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Hall-effect flow sensor, pulse output, interrupt-driven (rising edge).
/// GPIO 35 is input-only with no internal pull-up; the board has an
/// external 10 kΩ pull-up.
pub const FLOW_SENSOR_GPIO: i32 = 35;

/// DS18B20 one-wire bus (open drain, external 4.7 kΩ pull-up).
pub const ONE_WIRE_BUS_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// DS18B20 ROM codes
// ---------------------------------------------------------------------------

/// Probe on the cold side of the collector (water coming from the pool).
pub const INPUT_TEMP_ROM: [u8; 8] = [0x28, 0x37, 0xB0, 0x57, 0x04, 0xE1, 0x3C, 0x55];
/// Probe on the hot side of the collector (water returning to the pool).
pub const OUTPUT_TEMP_ROM: [u8; 8] = [0x28, 0x43, 0xE7, 0x57, 0x04, 0xE1, 0x3C, 0xD5];
/// Probe inside the controller enclosure.
pub const ENCLOSURE_TEMP_ROM: [u8; 8] = [0x28, 0xAF, 0x1A, 0x57, 0x04, 0xE1, 0x3C, 0xCB];
