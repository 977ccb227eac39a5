//! Band-limited RMS noise from spectral density shapes.
//!
//! These integrate the 1/f region properly instead of sampling the density
//! at one frequency, and sit next to the inverting-stage approximation
//! rather than replacing it.

use serde::{Deserialize, Serialize};

use crate::constants::PEAK_TO_PEAK_FACTOR;
use crate::error::{check_frequency, NoiseError, Result};
use crate::params::OpAmpNoiseSpec;

/// Piecewise density: `e_n · sqrt(f_c / f)` below the 1/f corner, `e_n` above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlickerWhiteNoise {
    /// White-noise floor (V/√Hz)
    pub white_density: f64,
    /// 1/f corner frequency (Hz)
    pub corner_hz: f64,
}

impl FlickerWhiteNoise {
    pub fn new(white_density: f64, corner_hz: f64) -> Result<Self> {
        if !white_density.is_finite() || white_density < 0.0 {
            return Err(NoiseError::InvalidOpAmpSpec(format!(
                "white noise density must be finite and >= 0, got {white_density}"
            )));
        }
        check_frequency("1/f corner", corner_hz)?;
        Ok(Self {
            white_density,
            corner_hz,
        })
    }

    pub fn density_at(&self, freq_hz: f64) -> Result<f64> {
        check_frequency("flicker/white density", freq_hz)?;
        if freq_hz < self.corner_hz {
            Ok(self.white_density * (self.corner_hz / freq_hz).sqrt())
        } else {
            Ok(self.white_density)
        }
    }

    /// RMS noise (Vrms) between `f_low` and `f_high`.
    ///
    /// For a band straddling the corner this is
    /// `e_n · sqrt(f_c · ln(f_c / f_low) + (f_high − f_c))`.
    pub fn rms_over_band(&self, f_low: f64, f_high: f64) -> Result<f64> {
        check_band(f_low, f_high)?;
        let en_sq = self.white_density.powi(2);

        let flicker = if f_low < self.corner_hz {
            let top = f_high.min(self.corner_hz);
            en_sq * self.corner_hz * (top / f_low).ln()
        } else {
            0.0
        };
        let white = if f_high > self.corner_hz {
            en_sq * (f_high - f_low.max(self.corner_hz))
        } else {
            0.0
        };

        Ok((flicker + white).sqrt())
    }
}

/// Peak-to-peak estimate from an RMS value.
pub fn peak_to_peak(rms: f64) -> f64 {
    PEAK_TO_PEAK_FACTOR * rms
}

/// RMS voltage noise of the op-amp model integrated from `f_low` to `f_high`:
/// `sqrt(v_high² · (f_high − f_low) + v_low² · ln(f_high / f_low))`.
pub fn opamp_vnoise_rms(spec: &OpAmpNoiseSpec, f_low: f64, f_high: f64) -> Result<f64> {
    spec.validate()?;
    check_band(f_low, f_high)?;
    let white = spec.vnoise_high_hz.powi(2) * (f_high - f_low);
    let flicker = spec.vnoise_low_hz.powi(2) * (f_high / f_low).ln();
    Ok((white + flicker).sqrt())
}

fn check_band(f_low: f64, f_high: f64) -> Result<()> {
    check_frequency("band lower edge", f_low)?;
    check_frequency("band upper edge", f_high)?;
    if f_high <= f_low {
        return Err(NoiseError::InvalidBandwidth {
            low_hz: f_low,
            upper_hz: f_high,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straddling_band_matches_closed_form() {
        let model = FlickerWhiteNoise::new(10e-9, 0.7).unwrap();
        let rms = model.rms_over_band(0.1, 10.0).unwrap();
        let low = 10e-9 * (0.7_f64 * (0.7_f64 / 0.1).ln()).sqrt();
        let high = 10e-9 * (10.0_f64 - 0.7).sqrt();
        let expected = (low * low + high * high).sqrt();
        assert!((rms - expected).abs() / expected < 1e-12);
        assert!((peak_to_peak(rms) - 6.6 * rms).abs() < 1e-24);
    }

    #[test]
    fn band_above_corner_is_pure_white() {
        let model = FlickerWhiteNoise::new(4e-9, 100.0).unwrap();
        let rms = model.rms_over_band(1000.0, 11_000.0).unwrap();
        assert!((rms - 4e-9 * 100.0).abs() < 1e-18);
    }

    #[test]
    fn band_below_corner_is_pure_flicker() {
        let model = FlickerWhiteNoise::new(1e-9, 100.0).unwrap();
        let rms = model.rms_over_band(1.0, 10.0).unwrap();
        let expected = 1e-9 * (100.0 * 10.0_f64.ln()).sqrt();
        assert!((rms - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn density_is_continuous_at_corner() {
        let model = FlickerWhiteNoise::new(5e-9, 10.0).unwrap();
        assert_eq!(model.density_at(10.0).unwrap(), 5e-9);
        assert!((model.density_at(0.1).unwrap() - 5e-8).abs() < 1e-20);
    }

    #[test]
    fn band_rms_requires_positive_ordered_band() {
        let model = FlickerWhiteNoise::new(1e-9, 1.0).unwrap();
        assert!(matches!(
            model.rms_over_band(0.0, 10.0),
            Err(NoiseError::InvalidFrequency { .. })
        ));
        assert!(matches!(
            model.rms_over_band(10.0, 1.0),
            Err(NoiseError::InvalidBandwidth { .. })
        ));
    }

    #[test]
    fn opamp_rms_of_white_only_part_is_density_times_root_bandwidth() {
        let spec = OpAmpNoiseSpec::new(0.0, 3e-9, 0.0, 0.0, 0.0, 1e6).unwrap();
        let rms = opamp_vnoise_rms(&spec, 1.0, 10_001.0).unwrap();
        assert!((rms - 3e-7).abs() < 1e-18);
    }
}
