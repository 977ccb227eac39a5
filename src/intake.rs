//! Numeric intake for values supplied as text (catalog cells, CLI flags).
//!
//! Accepts plain floats (`1000`, `3.01e-9`) and engineering suffixes
//! (`10k`, `3.01n`, `1meg`). Suffixes are case-insensitive, so `MEG`
//! means mega and `m`/`M` means milli.

use crate::error::{NoiseError, Result};

const SUFFIXES: [(&str, f64); 10] = [
    ("meg", 1e6),
    ("t", 1e12),
    ("g", 1e9),
    ("k", 1e3),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
];

/// Parses `text` as a finite number, naming `field` in the error on failure.
pub fn parse_value(field: &str, text: &str) -> Result<f64> {
    let malformed = || NoiseError::MalformedInput {
        field: field.to_string(),
        value: text.to_string(),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(malformed());
    }

    let lower = trimmed.to_lowercase();
    let value = match lower.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            let (number, multiplier) = SUFFIXES
                .iter()
                .find_map(|&(suffix, mult)| lower.strip_suffix(suffix).map(|n| (n, mult)))
                .ok_or_else(malformed)?;
            number.trim().parse::<f64>().map_err(|_| malformed())? * multiplier
        }
    };

    if !value.is_finite() {
        return Err(malformed());
    }
    Ok(value)
}

/// Renders a value with an SI prefix, e.g. `3.0100n`.
///
/// Mega is written `MEG` so the output reads back through [`parse_value`].
pub fn format_si(value: f64) -> String {
    const PREFIXES: [(f64, &str); 9] = [
        (1e12, "T"),
        (1e9, "G"),
        (1e6, "MEG"),
        (1e3, "k"),
        (1.0, ""),
        (1e-3, "m"),
        (1e-6, "u"),
        (1e-9, "n"),
        (1e-12, "p"),
    ];

    let magnitude = value.abs();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return format!("{value:.4}");
    }

    for (scale, prefix) in PREFIXES {
        if magnitude >= scale {
            return format!("{:.4}{prefix}", value / scale);
        }
    }
    format!("{:.4}f", value / 1e-15)
}

#[cfg(test)]
mod tests {
    use super::{format_si, parse_value};
    use crate::error::NoiseError;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= b.abs() * 1e-12
    }

    #[test]
    fn parses_plain_numbers() {
        assert_eq!(parse_value("r_in", "1000").unwrap(), 1000.0);
        assert_eq!(parse_value("r_in", " 2.5 ").unwrap(), 2.5);
        assert!(close(parse_value("vnoise", "3.01e-9").unwrap(), 3.01e-9));
    }

    #[test]
    fn parses_engineering_suffixes() {
        assert!(close(parse_value("r", "10k").unwrap(), 10e3));
        assert!(close(parse_value("r", "4.7K").unwrap(), 4.7e3));
        assert!(close(parse_value("gbw", "8MEG").unwrap(), 8e6));
        assert!(close(parse_value("gbw", "8meg").unwrap(), 8e6));
        assert!(close(parse_value("i", "400f").unwrap(), 400e-15));
        assert!(close(parse_value("v", "3.01n").unwrap(), 3.01e-9));
        assert!(close(parse_value("v", "10m").unwrap(), 10e-3));
        assert!(close(parse_value("v", "1u").unwrap(), 1e-6));
    }

    #[test]
    fn rejects_non_numeric_text() {
        for text in ["", "abc", "ten", "1.2.3k", "nan", "inf", "k"] {
            match parse_value("temperature_c", text) {
                Err(NoiseError::MalformedInput { field, value }) => {
                    assert_eq!(field, "temperature_c");
                    assert_eq!(value, text);
                }
                other => panic!("expected MalformedInput for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn formats_with_prefix() {
        assert_eq!(format_si(1000.0), "1.0000k");
        assert_eq!(format_si(3.01e-9), "3.0100n");
        assert_eq!(format_si(125_600.0), "125.6000k");
        assert_eq!(format_si(0.0), "0.0000");
        assert_eq!(format_si(10e6), "10.0000MEG");
    }

    #[test]
    fn formatted_values_read_back() {
        let values = [
            2.5e12, 8e9, 10e6, 1.57e6, 125_600.0, 47.0, 0.0, 3.3e-3, 1e-6, 3.01e-9, 4.7e-12,
            400e-15, -2.2e3, -6.8e-9,
        ];
        for value in values {
            let printed = format_si(value);
            let reparsed = parse_value("value", &printed).unwrap();
            assert!(
                (reparsed - value).abs() <= value.abs() * 1e-4,
                "{value} printed as {printed} read back as {reparsed}"
            );
        }
    }
}
