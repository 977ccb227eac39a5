//! Intrinsic op-amp noise model
//!
//! Extrapolates voltage and current noise density across frequency from two
//! datasheet anchors. The flicker (1/f) part and the white floor are treated
//! as independent sources and combined root-sum-square.
//!
//! The 1/f term diverges at 0 Hz, so every evaluation requires `f > 0` and
//! fails with [`NoiseError::InvalidFrequency`](crate::NoiseError) otherwise.

use serde::{Deserialize, Serialize};

use crate::constants::SWEEP_FREQUENCIES_HZ;
use crate::error::{check_frequency, NoiseError, Result};
use crate::params::OpAmpNoiseSpec;

/// Voltage noise density (V/√Hz) at `at_freq_hz`:
/// `sqrt(vnoise_high² + vnoise_low² / f)`.
pub fn opamp_vnoise_at_freq(
    vnoise_low_hz: f64,
    vnoise_high_hz: f64,
    at_freq_hz: f64,
) -> Result<f64> {
    check_frequency("voltage noise evaluation", at_freq_hz)?;
    Ok((vnoise_high_hz.powi(2) + vnoise_low_hz.powi(2) / at_freq_hz).sqrt())
}

/// Current noise density (A/√Hz) at `at_freq_hz`.
///
/// With `inoise_corner_hz == 0` the shape mirrors the voltage model,
/// `sqrt(inoise_low² + inoise_high² / f)`. Otherwise the input current rises
/// linearly with the queried frequency above the corner,
/// `sqrt(inoise_low² + inoise_high² · (f / corner)²)`.
pub fn opamp_inoise_at_freq(
    inoise_low_hz: f64,
    inoise_high_hz: f64,
    at_freq_hz: f64,
    inoise_corner_hz: f64,
) -> Result<f64> {
    check_frequency("current noise evaluation", at_freq_hz)?;
    if !inoise_corner_hz.is_finite() || inoise_corner_hz < 0.0 {
        return Err(NoiseError::InvalidOpAmpSpec(format!(
            "inoise_corner_hz must be finite and >= 0, got {inoise_corner_hz}"
        )));
    }

    let density_sq = if inoise_corner_hz == 0.0 {
        inoise_low_hz.powi(2) + inoise_high_hz.powi(2) / at_freq_hz
    } else {
        inoise_low_hz.powi(2) + inoise_high_hz.powi(2) * (at_freq_hz / inoise_corner_hz).powi(2)
    };
    Ok(density_sq.sqrt())
}

impl OpAmpNoiseSpec {
    pub fn vnoise_at(&self, freq_hz: f64) -> Result<f64> {
        opamp_vnoise_at_freq(self.vnoise_low_hz, self.vnoise_high_hz, freq_hz)
    }

    pub fn inoise_at(&self, freq_hz: f64) -> Result<f64> {
        opamp_inoise_at_freq(
            self.inoise_low_hz,
            self.inoise_high_hz,
            freq_hz,
            self.inoise_corner_hz,
        )
    }
}

/// Voltage and current noise sampled over [`SWEEP_FREQUENCIES_HZ`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpAmpSpectrum {
    pub frequencies_hz: Vec<f64>,
    pub vnoise: Vec<f64>,
    pub inoise: Vec<f64>,
}

/// Full-spectrum sweep of a part's intrinsic noise, for plotting.
///
/// The grid is fixed at 1 Hz to 1 MHz regardless of the part's
/// gain-bandwidth.
pub fn opamp_noise(spec: &OpAmpNoiseSpec) -> Result<OpAmpSpectrum> {
    spec.validate()?;

    let frequencies_hz = SWEEP_FREQUENCIES_HZ.to_vec();
    let vnoise = frequencies_hz
        .iter()
        .map(|&f| spec.vnoise_at(f))
        .collect::<Result<Vec<_>>>()?;
    let inoise = frequencies_hz
        .iter()
        .map(|&f| spec.inoise_at(f))
        .collect::<Result<Vec<_>>>()?;

    Ok(OpAmpSpectrum {
        frequencies_hz,
        vnoise,
        inoise,
    })
}

/// Source resistance (Ohm) at which the part's voltage and current noise
/// contribute equally, `e_n / i_n`.
pub fn optimum_source_resistance(vnoise: f64, inoise: f64) -> Result<f64> {
    if !vnoise.is_finite() || vnoise < 0.0 {
        return Err(NoiseError::InvalidOpAmpSpec(format!(
            "voltage noise must be finite and >= 0, got {vnoise}"
        )));
    }
    if !inoise.is_finite() || inoise <= 0.0 {
        return Err(NoiseError::InvalidOpAmpSpec(format!(
            "current noise must be finite and > 0, got {inoise}"
        )));
    }
    Ok(vnoise / inoise)
}
