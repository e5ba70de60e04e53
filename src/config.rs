//! System configuration parameters
//!
//! All tunable parameters for the pool-heater pump controller.  The
//! configuration is loaded once at boot (baked-in JSON or defaults) and is
//! never mutated while the control loop runs.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Temperature ---
    /// Pool temperature (Celsius) above which heating stops
    pub target_temp_c: f32,
    /// Minimum time between temperature sensor polls (milliseconds)
    pub temp_poll_interval_ms: u32,

    // --- Flow ---
    /// Nominal flow-pulse sampling window (milliseconds)
    pub flow_window_ms: u32,
    /// Sensor pulses per second for a flow of 1 L/min
    pub flow_calibration_factor: f32,

    // --- Energy ---
    /// Specific heat of the loop fluid in joules per litre per kelvin
    pub specific_heat_j_per_l_k: f32,
    /// Captured power (watts) below which the loop is considered unproductive
    pub energy_threshold_w: f32,

    // --- Pump control ---
    /// Minimum time between state machine evaluations (milliseconds)
    pub control_interval_ms: u32,
    /// How long the pump runs before readings are trusted (milliseconds)
    pub stability_delay_ms: u32,
    /// How long power must stay low before hibernating (milliseconds)
    pub hibernation_trigger_delay_ms: u32,
    /// Pump-off rest period before re-cycling the loop (milliseconds)
    pub hibernation_period_ms: u32,
    /// How long maintenance mode is expected to last (milliseconds)
    pub maintenance_period_ms: u32,

    // --- Reporting ---
    /// Telemetry event interval (milliseconds)
    pub telemetry_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Temperature
            target_temp_c: 30.0,
            temp_poll_interval_ms: 1_000,

            // Flow
            flow_window_ms: 1_000,
            flow_calibration_factor: 7.319,

            // Energy
            specific_heat_j_per_l_k: 4_180.0,
            energy_threshold_w: 500.0,

            // Pump control
            control_interval_ms: 3_000,
            stability_delay_ms: 120 * 1_000,          // 2 min
            hibernation_trigger_delay_ms: 30 * 1_000, // 30 s
            hibernation_period_ms: 30 * 60 * 1_000,   // 30 min
            maintenance_period_ms: 60 * 60 * 1_000,   // 1 h

            // Reporting
            telemetry_interval_ms: 60 * 1_000,
        }
    }
}

/// Why a configuration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for [`SystemConfig`].
    Malformed,
    /// A field failed range validation.  Carries the field name.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config document"),
            Self::ValidationFailed(field) => write!(f, "validation failed: {}", field),
        }
    }
}

impl SystemConfig {
    /// Parse a JSON document and validate it.  Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if !self.target_temp_c.is_finite() {
            return Err(ConfigError::ValidationFailed("target_temp_c"));
        }
        if !positive(self.flow_calibration_factor) {
            return Err(ConfigError::ValidationFailed("flow_calibration_factor"));
        }
        if !positive(self.specific_heat_j_per_l_k) {
            return Err(ConfigError::ValidationFailed("specific_heat_j_per_l_k"));
        }
        if !self.energy_threshold_w.is_finite() || self.energy_threshold_w < 0.0 {
            return Err(ConfigError::ValidationFailed("energy_threshold_w"));
        }

        let intervals = [
            ("temp_poll_interval_ms", self.temp_poll_interval_ms),
            ("flow_window_ms", self.flow_window_ms),
            ("control_interval_ms", self.control_interval_ms),
            ("telemetry_interval_ms", self.telemetry_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ValidationFailed(name));
            }
        }

        // Durations longer than half the clock period cannot be measured
        // reliably with a wrapping u32 millisecond counter.
        let durations = [
            ("stability_delay_ms", self.stability_delay_ms),
            ("hibernation_trigger_delay_ms", self.hibernation_trigger_delay_ms),
            ("hibernation_period_ms", self.hibernation_period_ms),
            ("maintenance_period_ms", self.maintenance_period_ms),
        ];
        for (name, value) in durations {
            if value > u32::MAX / 2 {
                return Err(ConfigError::ValidationFailed(name));
            }
        }

        Ok(())
    }
}
