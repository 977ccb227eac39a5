//! Physical constants and fixed grids shared by the noise models.

/// Boltzmann's constant (J/K), exact SI value.
pub const BOLTZMANN: f64 = 1.380649e-23;

/// Offset added to a Celsius temperature to obtain kelvin.
///
/// The thermal-noise model uses the integer offset, so 20 °C maps to 293 K.
pub const CELSIUS_TO_KELVIN: f64 = 273.0;

/// Converts a single-pole -3 dB bandwidth into an equivalent noise bandwidth.
pub const NOISE_BANDWIDTH_FACTOR: f64 = 1.57;

/// Ratio of peak-to-peak to RMS noise (covers ~99.9% of a Gaussian record).
pub const PEAK_TO_PEAK_FACTOR: f64 = 6.6;

pub const DEFAULT_TEMPERATURE_C: f64 = 20.0;
pub const DEFAULT_REFERENCE_FREQ_HZ: f64 = 1000.0;
pub const DEFAULT_INOISE_CORNER_HZ: f64 = 0.0;
pub const DEFAULT_GAIN_BANDWIDTH_HZ: f64 = 1.0e6;

/// Decade / half-decade grid from 1 Hz to 1 MHz used for log-log spectra.
pub const SWEEP_FREQUENCIES_HZ: [f64; 19] = [
    1.0, 2.0, 5.0, 10.0, 22.0, 46.0, 100.0, 215.0, 463.0, 1000.0, 2150.0, 4630.0, 10000.0,
    21500.0, 46300.0, 100000.0, 215000.0, 463000.0, 1000000.0,
];
