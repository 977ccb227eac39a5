use approx::assert_relative_eq;
use opnoise::constants::SWEEP_FREQUENCIES_HZ;
use opnoise::inverting::rti_contributions;
use opnoise::{
    opamp_noise, opamp_vnoise_at_freq, resistor_noise, rss, CircuitParams, NoiseError,
    OpAmpCatalog, OpAmpNoiseSpec,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

proptest! {
    #[test]
    fn resistor_noise_is_non_negative(r in 0.0_f64..1e9, t in -200.0_f64..200.0) {
        prop_assert!(resistor_noise(r, t).unwrap() >= 0.0);
    }

    #[test]
    fn resistor_noise_increases_with_resistance(r in 1.0_f64..1e8, t in -200.0_f64..200.0) {
        let lo = resistor_noise(r, t).unwrap();
        let hi = resistor_noise(r * 1.5, t).unwrap();
        prop_assert!(hi > lo);
    }

    #[test]
    fn resistor_noise_increases_with_temperature(r in 1.0_f64..1e8, t in -200.0_f64..200.0) {
        let cold = resistor_noise(r, t).unwrap();
        let warm = resistor_noise(r, t + 10.0).unwrap();
        prop_assert!(warm > cold);
    }

    #[test]
    fn vnoise_never_drops_below_white_floor(
        low in 0.0_f64..1e-6,
        high in 1e-10_f64..1e-7,
        f in 1e-3_f64..1e9,
    ) {
        let v = opamp_vnoise_at_freq(low, high, f).unwrap();
        prop_assert!(v >= high);
    }

    #[test]
    fn vnoise_is_monotonically_non_increasing(
        low in 1e-10_f64..1e-6,
        high in 1e-10_f64..1e-7,
        f in 1e-3_f64..1e8,
    ) {
        let here = opamp_vnoise_at_freq(low, high, f).unwrap();
        let above = opamp_vnoise_at_freq(low, high, f * 2.0).unwrap();
        prop_assert!(above <= here);
    }
}

#[test]
fn zero_resistance_has_no_thermal_noise() {
    for t in [-40.0, 0.0, 20.0, 125.0] {
        assert_eq!(resistor_noise(0.0, t).unwrap(), 0.0);
    }
}

#[test]
fn vnoise_converges_to_white_floor() {
    let mut previous = f64::INFINITY;
    for exponent in 0..12 {
        let f = 10.0_f64.powi(exponent);
        let v = opamp_vnoise_at_freq(6.5e-9, 3.0e-9, f).unwrap();
        assert!(v <= previous);
        previous = v;
    }
    assert_relative_eq!(previous, 3.0e-9, max_relative = 1e-6);
}

#[test]
fn rss_is_independent_of_contribution_order() {
    let circuit = CircuitParams::new(50.0, 1000.0, 100_000.0, 990.0, 1.0, 10_000.0).unwrap();
    let spec = OpAmpNoiseSpec::new(6.5e-9, 3.5e-9, 400e-15, 6.3e-12, 0.0, 10e6).unwrap();
    let terms = rti_contributions(&circuit, &spec).unwrap().as_array();
    let reference = rss(&terms);

    let mut rng = StdRng::seed_from_u64(0x0b5e_55ed);
    for _ in 0..64 {
        let mut shuffled = terms;
        shuffled.shuffle(&mut rng);
        assert_relative_eq!(rss(&shuffled), reference, max_relative = 1e-14);
    }
}

#[test]
fn sweep_round_trips_through_single_point_model() {
    let catalog = OpAmpCatalog::builtin().unwrap();
    for entry in catalog.entries() {
        let spectrum = opamp_noise(&entry.spec).unwrap();
        assert_eq!(spectrum.frequencies_hz, SWEEP_FREQUENCIES_HZ.to_vec());
        for (idx, &f) in spectrum.frequencies_hz.iter().enumerate() {
            assert_eq!(spectrum.vnoise[idx], entry.spec.vnoise_at(f).unwrap());
            assert_eq!(spectrum.inoise[idx], entry.spec.inoise_at(f).unwrap());
        }
    }
}

#[test]
fn unknown_part_is_a_lookup_miss() {
    let catalog = OpAmpCatalog::builtin().unwrap();
    assert!(matches!(
        catalog.lookup("NOT-A-PART"),
        Err(NoiseError::LookupMiss(name)) if name == "NOT-A-PART"
    ));
}
