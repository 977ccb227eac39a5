//! opnoise - op-amp noise estimation
//!
//! Predicts the noise of amplifier stages built around an op-amp from two
//! datasheet anchor points per noise source plus resistor thermal noise:
//! spectral density at a frequency, referred-to-input density of an
//! inverting stage, and integrated RMS noise over a band of interest.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod intake;
pub mod inverting;
pub mod opamp;
pub mod params;
pub mod rms;
pub mod series;
pub mod thermal;

// Re-export main types
pub use catalog::{CatalogEntry, OpAmpCatalog};
pub use error::{NoiseError, Result};
pub use inverting::{
    analyze_inverting, inverting_integrated_noise, inverting_rti_noise, rss, IntegratedNoise,
    InvertingNoiseReport, RtiContributions,
};
pub use opamp::{opamp_inoise_at_freq, opamp_noise, opamp_vnoise_at_freq, OpAmpSpectrum};
pub use params::{CircuitParams, OpAmpNoiseSpec};
pub use series::{NoiseSeries, NoiseSink};
pub use thermal::resistor_noise;
