use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use opnoise::{CircuitParams, OpAmpCatalog, OpAmpNoiseSpec};

/// Where the op-amp constants come from: a catalog part or the six values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpAmpSource {
    Part {
        part: String,
        #[serde(default)]
        catalog: Option<PathBuf>,
    },
    Manual(OpAmpNoiseSpec),
}

impl OpAmpSource {
    pub fn resolve(&self) -> Result<OpAmpNoiseSpec> {
        match self {
            OpAmpSource::Part { part, catalog } => {
                let catalog = load_catalog(catalog.as_deref())?;
                let spec = catalog
                    .lookup(part)
                    .with_context(|| format!("cannot resolve op-amp part '{part}'"))?;
                Ok(*spec)
            }
            OpAmpSource::Manual(spec) => {
                spec.validate()?;
                Ok(*spec)
            }
        }
    }

    pub fn part_name(&self) -> Option<&str> {
        match self {
            OpAmpSource::Part { part, .. } => Some(part),
            OpAmpSource::Manual(_) => None,
        }
    }
}

/// An inverting-stage analysis described in TOML.
///
/// ```toml
/// [circuit]
/// r_source = 0.0
/// r_in = 1000.0
/// r_feedback = 100000.0
/// r_noninverting = 0.0
/// low_freq_hz = 1.0
/// high_freq_hz = 10000.0
///
/// [opamp]
/// part = "OP27"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub circuit: Option<CircuitParams>,
    pub opamp: Option<OpAmpSource>,
}

impl AnalysisConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let cfg = Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))?;
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: AnalysisConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(circuit) = &self.circuit {
            circuit.validate()?;
        }
        if let Some(OpAmpSource::Manual(spec)) = &self.opamp {
            spec.validate()?;
        }
        if let Some(OpAmpSource::Part { part, .. }) = &self.opamp {
            if part.trim().is_empty() {
                bail!("opamp.part must not be empty");
            }
        }
        Ok(())
    }
}

pub fn load_catalog(path: Option<&Path>) -> Result<OpAmpCatalog> {
    match path {
        Some(path) => OpAmpCatalog::from_path(path)
            .with_context(|| format!("failed to load op-amp catalog: {}", path.display())),
        None => Ok(OpAmpCatalog::builtin()?),
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisConfig, OpAmpSource};

    const CIRCUIT: &str = r#"
[circuit]
r_source = 0.0
r_in = 1000.0
r_feedback = 100000.0
r_noninverting = 0.0
low_freq_hz = 1.0
high_freq_hz = 10000.0
"#;

    #[test]
    fn part_source_resolves_through_builtin_catalog() {
        let raw = format!("{CIRCUIT}\n[opamp]\npart = \"NE5534\"\n");
        let cfg = AnalysisConfig::from_toml_str(&raw).unwrap();
        let source = cfg.opamp.unwrap();
        assert_eq!(source.part_name(), Some("NE5534"));
        let spec = source.resolve().unwrap();
        assert!((spec.vnoise_low_hz - 6.5e-9).abs() < 1e-20);
        assert_eq!(cfg.circuit.unwrap().temperature_c, 20.0);
    }

    #[test]
    fn manual_source_uses_spec_defaults() {
        let raw = format!(
            "{CIRCUIT}\n[opamp]\nvnoise_low_hz = 3.01e-9\nvnoise_high_hz = 3.01e-9\n\
             inoise_low_hz = 4.47e-13\ninoise_high_hz = 4.47e-13\ngain_bandwidth_hz = 8e6\n"
        );
        let cfg = AnalysisConfig::from_toml_str(&raw).unwrap();
        match cfg.opamp.unwrap() {
            OpAmpSource::Manual(spec) => {
                assert_eq!(spec.inoise_corner_hz, 0.0);
                assert_eq!(spec.gain_bandwidth_hz, 8e6);
            }
            other => panic!("expected manual spec, got {other:?}"),
        }
    }

    #[test]
    fn unknown_part_is_reported() {
        let raw = format!("{CIRCUIT}\n[opamp]\npart = \"ne5534\"\n");
        let cfg = AnalysisConfig::from_toml_str(&raw).unwrap();
        let err = cfg.opamp.unwrap().resolve().unwrap_err();
        assert!(format!("{err:#}").contains("op-amp part not found: ne5534"));
    }

    #[test]
    fn bundled_configs_load() {
        let manual =
            AnalysisConfig::from_toml_str(include_str!("../configs/inverting.toml")).unwrap();
        assert!(matches!(manual.opamp, Some(OpAmpSource::Manual(_))));
        let part =
            AnalysisConfig::from_toml_str(include_str!("../configs/inverting_part.toml")).unwrap();
        assert!(part.opamp.unwrap().resolve().is_ok());
    }

    #[test]
    fn invalid_circuit_is_rejected_at_load() {
        let raw = CIRCUIT.replace("r_in = 1000.0", "r_in = 0.0");
        assert!(AnalysisConfig::from_toml_str(&raw).is_err());
    }
}
