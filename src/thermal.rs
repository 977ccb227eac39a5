//! Johnson–Nyquist thermal noise of resistors.

use crate::constants::{BOLTZMANN, CELSIUS_TO_KELVIN};
use crate::error::{NoiseError, Result};

/// Thermal voltage noise density (V/√Hz) of a resistor at `temperature_c`.
///
/// `v = sqrt(4·k·T·R)`. A zero resistance is an ideal short and yields 0.
pub fn resistor_noise(resistance_ohms: f64, temperature_c: f64) -> Result<f64> {
    if !resistance_ohms.is_finite() || resistance_ohms < 0.0 {
        return Err(NoiseError::InvalidCircuitParameter(format!(
            "resistance must be finite and >= 0 Ohm, got {resistance_ohms}"
        )));
    }
    let kelvin = temperature_c + CELSIUS_TO_KELVIN;
    if !kelvin.is_finite() || kelvin < 0.0 {
        return Err(NoiseError::InvalidCircuitParameter(format!(
            "temperature must be finite and above absolute zero, got {temperature_c} C"
        )));
    }

    Ok((4.0 * BOLTZMANN * kelvin * resistance_ohms).sqrt())
}

/// Thermal noise across a range of source resistances, as `(ohms, V/√Hz)` pairs.
pub fn johnson_noise_sweep(resistances: &[f64], temperature_c: f64) -> Result<Vec<(f64, f64)>> {
    resistances
        .iter()
        .map(|&r| resistor_noise(r, temperature_c).map(|v| (r, v)))
        .collect()
}
