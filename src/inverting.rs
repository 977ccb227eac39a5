//! Inverting gain stage noise analysis
//!
//! Combines the op-amp's intrinsic noise with the thermal noise of the four
//! resistors around an inverting stage. Contributions are independent, so
//! their variances add: every total here is `gain · sqrt(Σ cᵢ²)`.

use serde::{Deserialize, Serialize};

use crate::constants::NOISE_BANDWIDTH_FACTOR;
use crate::error::{NoiseError, Result};
use crate::params::{CircuitParams, OpAmpNoiseSpec};
use crate::thermal::resistor_noise;

/// Root-sum-square of independent noise magnitudes.
pub fn rss(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// The six input-side contributors to RTI density (V/√Hz each).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RtiContributions {
    /// Op-amp current noise across `(r_source + r_in) ∥ r_feedback`
    pub inverting_input_current: f64,
    /// Op-amp voltage noise, in series with the input
    pub opamp_voltage: f64,
    pub r_noninverting: f64,
    /// Feedback resistor noise divided by the gain
    pub r_feedback: f64,
    pub r_in: f64,
    pub r_source: f64,
}

impl RtiContributions {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.inverting_input_current,
            self.opamp_voltage,
            self.r_noninverting,
            self.r_feedback,
            self.r_in,
            self.r_source,
        ]
    }

    pub fn rss(&self) -> f64 {
        rss(&self.as_array())
    }
}

/// Breaks the RTI density of `circuit` into its six contributors.
///
/// Op-amp noise is sampled at `circuit.reference_freq_hz`.
pub fn rti_contributions(
    circuit: &CircuitParams,
    spec: &OpAmpNoiseSpec,
) -> Result<RtiContributions> {
    circuit.validate()?;
    spec.validate()?;

    let gain = circuit.gain();
    let t = circuit.temperature_c;
    let amp_vnoise = spec.vnoise_at(circuit.reference_freq_hz)?;
    let amp_inoise = spec.inoise_at(circuit.reference_freq_hz)?;

    Ok(RtiContributions {
        inverting_input_current: amp_inoise * circuit.inverting_node_impedance(),
        opamp_voltage: amp_vnoise,
        r_noninverting: resistor_noise(circuit.r_noninverting, t)?,
        r_feedback: resistor_noise(circuit.r_feedback, t)? / gain,
        r_in: resistor_noise(circuit.r_in, t)?,
        r_source: resistor_noise(circuit.r_source, t)?,
    })
}

/// Referred-to-input noise density (V/√Hz) of an inverting stage.
pub fn inverting_rti_noise(circuit: &CircuitParams, spec: &OpAmpNoiseSpec) -> Result<f64> {
    let contributions = rti_contributions(circuit, spec)?;
    Ok(circuit.gain() * contributions.rss())
}

/// Integrated noise over the band of interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratedNoise {
    /// `1.57 · GBW / gain`, the stage's equivalent noise bandwidth (Hz)
    pub max_noise_bandwidth_hz: f64,
    /// Width of the band actually integrated over (Hz)
    pub effective_bandwidth_hz: f64,
    /// True when the amplifier, not `high_freq_hz`, set the upper edge
    pub amplifier_limited: bool,
    pub integrated_noise_vrms: f64,
}

/// Per-source terms of the integrated total (Vrms, before the gain factor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratedContributions {
    pub r_source: f64,
    pub r_in: f64,
    pub r_feedback: f64,
    pub r_noninverting: f64,
    /// Op-amp voltage noise at the reference frequency, not integrated
    pub opamp_voltage: f64,
    /// Op-amp current noise across `r_in ∥ r_feedback`
    pub inverting_input_current: f64,
}

impl IntegratedContributions {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.r_source,
            self.r_in,
            self.r_feedback,
            self.r_noninverting,
            self.opamp_voltage,
            self.inverting_input_current,
        ]
    }

    pub fn rss(&self) -> f64 {
        rss(&self.as_array())
    }
}

pub fn max_noise_bandwidth_hz(circuit: &CircuitParams, spec: &OpAmpNoiseSpec) -> f64 {
    NOISE_BANDWIDTH_FACTOR * spec.gain_bandwidth_hz / circuit.gain()
}

/// Chooses the integration band: up to the amplifier's noise bandwidth when
/// that falls inside the band of interest, otherwise the full band.
///
/// Returns `(max_noise_bandwidth_hz, effective_bandwidth_hz, amplifier_limited)`.
pub fn effective_noise_bandwidth(
    circuit: &CircuitParams,
    spec: &OpAmpNoiseSpec,
) -> Result<(f64, f64, bool)> {
    let max_bw = max_noise_bandwidth_hz(circuit, spec);
    let amplifier_limited = max_bw < circuit.high_freq_hz;
    let upper_hz = if amplifier_limited {
        max_bw
    } else {
        circuit.high_freq_hz
    };

    let delta = upper_hz - circuit.low_freq_hz;
    if delta <= 0.0 {
        return Err(NoiseError::InvalidBandwidth {
            low_hz: circuit.low_freq_hz,
            upper_hz,
        });
    }

    if amplifier_limited {
        log::debug!(
            "noise bandwidth {max_bw:.1} Hz is below high_freq_hz {} Hz; band clipped",
            circuit.high_freq_hz
        );
    }

    Ok((max_bw, delta, amplifier_limited))
}

fn integrate(
    circuit: &CircuitParams,
    spec: &OpAmpNoiseSpec,
) -> Result<(IntegratedContributions, IntegratedNoise)> {
    circuit.validate()?;
    spec.validate()?;

    let gain = circuit.gain();
    let t = circuit.temperature_c;
    let (max_bw, delta, amplifier_limited) = effective_noise_bandwidth(circuit, spec)?;
    let sqrt_bw = delta.sqrt();

    let amp_vnoise = spec.vnoise_at(circuit.reference_freq_hz)?;
    let amp_inoise = spec.inoise_at(circuit.reference_freq_hz)?;
    let r_in_parallel_feedback =
        circuit.r_in * circuit.r_feedback / (circuit.r_in + circuit.r_feedback);

    let contributions = IntegratedContributions {
        r_source: resistor_noise(circuit.r_source, t)? * sqrt_bw,
        r_in: resistor_noise(circuit.r_in, t)? * sqrt_bw,
        r_feedback: resistor_noise(circuit.r_feedback, t)? / gain * sqrt_bw,
        r_noninverting: resistor_noise(circuit.r_noninverting, t)? * sqrt_bw,
        opamp_voltage: amp_vnoise,
        inverting_input_current: amp_inoise * r_in_parallel_feedback,
    };

    let noise = IntegratedNoise {
        max_noise_bandwidth_hz: max_bw,
        effective_bandwidth_hz: delta,
        amplifier_limited,
        integrated_noise_vrms: gain * contributions.rss(),
    };

    Ok((contributions, noise))
}

/// Integrated RMS noise (Vrms) of an inverting stage over its band of interest.
///
/// Resistor noise is flat, so each resistor's density is scaled by `sqrt(Δf)`.
/// The op-amp terms are single-point samples at the reference frequency; the
/// 1/f shape is not integrated (see [`crate::rms::opamp_vnoise_rms`] for that).
pub fn inverting_integrated_noise(
    circuit: &CircuitParams,
    spec: &OpAmpNoiseSpec,
) -> Result<IntegratedNoise> {
    integrate(circuit, spec).map(|(_, noise)| noise)
}

/// Everything the inverting analysis reports for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertingNoiseReport {
    pub circuit: CircuitParams,
    pub opamp: OpAmpNoiseSpec,
    pub gain: f64,
    pub rti_noise_density: f64,
    pub rti_contributions: RtiContributions,
    pub integrated: IntegratedNoise,
    pub integrated_contributions: IntegratedContributions,
}

pub fn analyze_inverting(
    circuit: &CircuitParams,
    spec: &OpAmpNoiseSpec,
) -> Result<InvertingNoiseReport> {
    let rti_contributions = rti_contributions(circuit, spec)?;
    let (integrated_contributions, integrated) = integrate(circuit, spec)?;
    let gain = circuit.gain();

    Ok(InvertingNoiseReport {
        circuit: *circuit,
        opamp: *spec,
        gain,
        rti_noise_density: gain * rti_contributions.rss(),
        rti_contributions,
        integrated,
        integrated_contributions,
    })
}
