//! Thermal power captured by the collector loop.
//!
//! Water leaving the collector is hotter than water entering it; the flow
//! rate times the temperature rise times the fluid's specific heat is the
//! power being delivered to the pool.  Stateless: recomputed every control
//! tick from the current readings.

/// Instantaneous captured power in watts.
///
/// `flow_l_per_min / 60` is litres per second, times J/(L·K), times the
/// outlet-minus-inlet rise in kelvin.  Negative when the collector is
/// cooling the water.
pub fn power_watts(
    flow_l_per_min: f32,
    input_c: f32,
    output_c: f32,
    specific_heat_j_per_l_k: f32,
) -> f32 {
    (flow_l_per_min / 60.0) * specific_heat_j_per_l_k * (output_c - input_c)
}

/// [`power_watts`] over optional readings: no estimate (0 W) until both
/// probes have produced a good value.
pub fn estimate(
    flow_l_per_min: f32,
    input_c: Option<f32>,
    output_c: Option<f32>,
    specific_heat_j_per_l_k: f32,
) -> f32 {
    match (input_c, output_c) {
        (Some(input), Some(output)) => {
            power_watts(flow_l_per_min, input, output, specific_heat_j_per_l_k)
        }
        _ => 0.0,
    }
}
