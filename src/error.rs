use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoiseError {
    #[error("invalid circuit parameter: {0}")]
    InvalidCircuitParameter(String),
    #[error("invalid op-amp noise spec: {0}")]
    InvalidOpAmpSpec(String),
    #[error("{context}: frequency must be finite and > 0 Hz, got {freq_hz}")]
    InvalidFrequency { context: &'static str, freq_hz: f64 },
    #[error("invalid noise bandwidth: upper limit {upper_hz} Hz is not above {low_hz} Hz")]
    InvalidBandwidth { low_hz: f64, upper_hz: f64 },
    #[error("op-amp part not found: {0}")]
    LookupMiss(String),
    #[error("malformed numeric input for {field}: {value:?}")]
    MalformedInput { field: String, value: String },
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, NoiseError>;

/// Rejects zero, negative and non-finite evaluation frequencies.
pub(crate) fn check_frequency(context: &'static str, freq_hz: f64) -> Result<()> {
    if freq_hz.is_finite() && freq_hz > 0.0 {
        Ok(())
    } else {
        Err(NoiseError::InvalidFrequency { context, freq_hz })
    }
}
