//! Labelled (frequency, density) sequences for plotting sinks.

use serde::{Deserialize, Serialize};

use crate::constants::SWEEP_FREQUENCIES_HZ;
use crate::error::{NoiseError, Result};
use crate::inverting::inverting_rti_noise;
use crate::opamp::opamp_noise;
use crate::params::{CircuitParams, OpAmpNoiseSpec};

/// A frequency-ordered noise spectrum.
///
/// Fields are private so the ordering and length invariants established by
/// [`NoiseSeries::new`] hold for the lifetime of the value. Deserialization
/// goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNoiseSeries")]
pub struct NoiseSeries {
    label: String,
    unit: String,
    frequencies_hz: Vec<f64>,
    densities: Vec<f64>,
}

#[derive(Deserialize)]
struct RawNoiseSeries {
    label: String,
    unit: String,
    frequencies_hz: Vec<f64>,
    densities: Vec<f64>,
}

impl TryFrom<RawNoiseSeries> for NoiseSeries {
    type Error = NoiseError;

    fn try_from(raw: RawNoiseSeries) -> Result<Self> {
        NoiseSeries::new(raw.label, raw.unit, raw.frequencies_hz, raw.densities)
    }
}

impl NoiseSeries {
    pub fn new(
        label: impl Into<String>,
        unit: impl Into<String>,
        frequencies_hz: Vec<f64>,
        densities: Vec<f64>,
    ) -> Result<Self> {
        if frequencies_hz.len() != densities.len() {
            return Err(NoiseError::LengthMismatch {
                context: "noise series densities",
                expected: frequencies_hz.len(),
                got: densities.len(),
            });
        }
        if let Some(&bad) = frequencies_hz.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
            return Err(NoiseError::InvalidFrequency {
                context: "noise series",
                freq_hz: bad,
            });
        }
        if let Some(pair) = frequencies_hz.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(NoiseError::InvalidFrequency {
                context: "noise series must be strictly increasing",
                freq_hz: pair[1],
            });
        }

        Ok(Self {
            label: label.into(),
            unit: unit.into(),
            frequencies_hz,
            densities,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Density unit, e.g. `V/√Hz`.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn frequencies_hz(&self) -> &[f64] {
        &self.frequencies_hz
    }

    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    pub fn len(&self) -> usize {
        self.frequencies_hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies_hz.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies_hz
            .iter()
            .copied()
            .zip(self.densities.iter().copied())
    }
}

/// Consumer of noise spectra, e.g. a plot or a CSV writer.
pub trait NoiseSink {
    type Error;

    fn render(&mut self, series: &[NoiseSeries]) -> std::result::Result<(), Self::Error>;
}

/// Intrinsic voltage and current noise of a part, as `(voltage, current)`.
pub fn opamp_series(spec: &OpAmpNoiseSpec) -> Result<(NoiseSeries, NoiseSeries)> {
    let spectrum = opamp_noise(spec)?;
    let voltage = NoiseSeries::new(
        "voltage noise",
        "V/√Hz",
        spectrum.frequencies_hz.clone(),
        spectrum.vnoise,
    )?;
    let current = NoiseSeries::new(
        "current noise",
        "A/√Hz",
        spectrum.frequencies_hz,
        spectrum.inoise,
    )?;
    Ok((voltage, current))
}

/// RTI density of an inverting stage with the op-amp sampled at each grid
/// frequency in turn.
pub fn inverting_rti_series(
    circuit: &CircuitParams,
    spec: &OpAmpNoiseSpec,
) -> Result<NoiseSeries> {
    let frequencies_hz = SWEEP_FREQUENCIES_HZ.to_vec();
    let densities = frequencies_hz
        .iter()
        .map(|&f| {
            let at_f = circuit.with_reference_freq_hz(f)?;
            inverting_rti_noise(&at_f, spec)
        })
        .collect::<Result<Vec<_>>>()?;

    NoiseSeries::new("RTI noise", "V/√Hz", frequencies_hz, densities)
}
