//! Parameter sets for the noise calculations
//!
//! [`OpAmpNoiseSpec`] carries the datasheet noise constants of one part and
//! [`CircuitParams`] the component values of an inverting gain stage. Both
//! deserialize with the documented defaults filled in and are validated
//! before any computation uses them.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GAIN_BANDWIDTH_HZ, DEFAULT_INOISE_CORNER_HZ, DEFAULT_REFERENCE_FREQ_HZ,
    DEFAULT_TEMPERATURE_C,
};
use crate::error::{NoiseError, Result};

fn default_inoise_corner_hz() -> f64 {
    DEFAULT_INOISE_CORNER_HZ
}

fn default_gain_bandwidth_hz() -> f64 {
    DEFAULT_GAIN_BANDWIDTH_HZ
}

fn default_temperature_c() -> f64 {
    DEFAULT_TEMPERATURE_C
}

fn default_reference_freq_hz() -> f64 {
    DEFAULT_REFERENCE_FREQ_HZ
}

/// Datasheet noise behaviour of one op-amp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpAmpNoiseSpec {
    /// Voltage noise density anchored at the low frequency (V/√Hz)
    pub vnoise_low_hz: f64,
    /// Voltage noise floor at high frequency (V/√Hz)
    pub vnoise_high_hz: f64,
    /// Current noise density at the low anchor (A/√Hz)
    pub inoise_low_hz: f64,
    /// Current noise density at the high anchor (A/√Hz)
    pub inoise_high_hz: f64,
    /// Frequency where current noise starts rising; 0 means it never does
    #[serde(default = "default_inoise_corner_hz")]
    pub inoise_corner_hz: f64,
    /// Unity-gain bandwidth (Hz)
    #[serde(default = "default_gain_bandwidth_hz")]
    pub gain_bandwidth_hz: f64,
}

impl OpAmpNoiseSpec {
    /// Build a validated spec from the six datasheet values
    pub fn new(
        vnoise_low_hz: f64,
        vnoise_high_hz: f64,
        inoise_low_hz: f64,
        inoise_high_hz: f64,
        inoise_corner_hz: f64,
        gain_bandwidth_hz: f64,
    ) -> Result<Self> {
        let spec = Self {
            vnoise_low_hz,
            vnoise_high_hz,
            inoise_low_hz,
            inoise_high_hz,
            inoise_corner_hz,
            gain_bandwidth_hz,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        let densities = [
            ("vnoise_low_hz", self.vnoise_low_hz),
            ("vnoise_high_hz", self.vnoise_high_hz),
            ("inoise_low_hz", self.inoise_low_hz),
            ("inoise_high_hz", self.inoise_high_hz),
            ("inoise_corner_hz", self.inoise_corner_hz),
        ];
        for (name, value) in densities {
            if !value.is_finite() || value < 0.0 {
                return Err(NoiseError::InvalidOpAmpSpec(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }

        if !self.gain_bandwidth_hz.is_finite() || self.gain_bandwidth_hz <= 0.0 {
            return Err(NoiseError::InvalidOpAmpSpec(format!(
                "gain_bandwidth_hz must be finite and > 0, got {}",
                self.gain_bandwidth_hz
            )));
        }

        Ok(())
    }

    /// Whether current noise rises with frequency above a corner (JFET/CMOS inputs)
    pub fn has_inoise_upturn(&self) -> bool {
        self.inoise_corner_hz != 0.0
    }
}

/// Component values and analysis band of an inverting gain stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircuitParams {
    /// Source resistance (Ohm)
    pub r_source: f64,
    /// Input resistor R1 (Ohm)
    pub r_in: f64,
    /// Feedback resistor R2 (Ohm)
    pub r_feedback: f64,
    /// Non-inverting input to ground, R3 (Ohm)
    pub r_noninverting: f64,
    #[serde(default = "default_temperature_c")]
    pub temperature_c: f64,
    /// Frequency at which op-amp noise is sampled (Hz)
    #[serde(default = "default_reference_freq_hz")]
    pub reference_freq_hz: f64,
    /// Lower edge of the band of interest (Hz)
    pub low_freq_hz: f64,
    /// Upper edge of the band of interest (Hz)
    pub high_freq_hz: f64,
}

impl CircuitParams {
    /// Build a validated stage at 20 °C sampled at 1 kHz
    pub fn new(
        r_source: f64,
        r_in: f64,
        r_feedback: f64,
        r_noninverting: f64,
        low_freq_hz: f64,
        high_freq_hz: f64,
    ) -> Result<Self> {
        let params = Self {
            r_source,
            r_in,
            r_feedback,
            r_noninverting,
            temperature_c: DEFAULT_TEMPERATURE_C,
            reference_freq_hz: DEFAULT_REFERENCE_FREQ_HZ,
            low_freq_hz,
            high_freq_hz,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_temperature_c(mut self, temperature_c: f64) -> Result<Self> {
        self.temperature_c = temperature_c;
        self.validate()?;
        Ok(self)
    }

    pub fn with_reference_freq_hz(mut self, reference_freq_hz: f64) -> Result<Self> {
        self.reference_freq_hz = reference_freq_hz;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let resistors = [
            ("r_source", self.r_source),
            ("r_feedback", self.r_feedback),
            ("r_noninverting", self.r_noninverting),
        ];
        for (name, value) in resistors {
            if !value.is_finite() || value < 0.0 {
                return Err(NoiseError::InvalidCircuitParameter(format!(
                    "{name} must be finite and >= 0 Ohm, got {value}"
                )));
            }
        }

        if !self.r_in.is_finite() || self.r_in <= 0.0 {
            return Err(NoiseError::InvalidCircuitParameter(format!(
                "r_in must be finite and > 0 Ohm, got {}",
                self.r_in
            )));
        }

        if self.r_feedback <= 0.0 {
            return Err(NoiseError::InvalidCircuitParameter(
                "gain r_feedback / r_in must be > 0".to_string(),
            ));
        }

        if !self.gain().is_finite() {
            return Err(NoiseError::InvalidCircuitParameter(format!(
                "gain r_feedback / r_in must be finite, got {} / {}",
                self.r_feedback, self.r_in
            )));
        }

        if !self.temperature_c.is_finite() || self.temperature_c < -273.0 {
            return Err(NoiseError::InvalidCircuitParameter(format!(
                "temperature_c must be finite and above absolute zero, got {}",
                self.temperature_c
            )));
        }

        if !self.reference_freq_hz.is_finite() || self.reference_freq_hz <= 0.0 {
            return Err(NoiseError::InvalidFrequency {
                context: "reference_freq_hz",
                freq_hz: self.reference_freq_hz,
            });
        }

        if !self.low_freq_hz.is_finite() || !self.high_freq_hz.is_finite() {
            return Err(NoiseError::InvalidCircuitParameter(
                "low_freq_hz and high_freq_hz must be finite".to_string(),
            ));
        }

        if self.low_freq_hz < 0.0 {
            return Err(NoiseError::InvalidCircuitParameter(format!(
                "low_freq_hz must be >= 0, got {}",
                self.low_freq_hz
            )));
        }

        if self.low_freq_hz >= self.high_freq_hz {
            return Err(NoiseError::InvalidCircuitParameter(format!(
                "low_freq_hz ({}) must be below high_freq_hz ({})",
                self.low_freq_hz, self.high_freq_hz
            )));
        }

        Ok(())
    }

    /// Closed-loop signal gain magnitude, `r_feedback / r_in`
    pub fn gain(&self) -> f64 {
        self.r_feedback / self.r_in
    }

    /// `r_feedback ∥ (r_source + r_in)`, the impedance seen by the inverting input
    pub fn inverting_node_impedance(&self) -> f64 {
        let series = self.r_source + self.r_in;
        series * self.r_feedback / (series + self.r_feedback)
    }
}
