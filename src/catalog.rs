//! Read-only table of named op-amps and their datasheet noise constants.
//!
//! The table has the columns `Device, VnoiseLow, VnoiseHigh, InoiseLow,
//! InoiseHigh, InoiseSpecFreq, UGBW`, one row per part. Numeric cells accept
//! engineering suffixes (`3.0n`, `8MEG`).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{NoiseError, Result};
use crate::intake::parse_value;
use crate::params::OpAmpNoiseSpec;

const BUILTIN_CSV: &str = include_str!("../data/opamps.csv");

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Device")]
    device: String,
    #[serde(rename = "VnoiseLow")]
    vnoise_low: String,
    #[serde(rename = "VnoiseHigh")]
    vnoise_high: String,
    #[serde(rename = "InoiseLow")]
    inoise_low: String,
    #[serde(rename = "InoiseHigh")]
    inoise_high: String,
    #[serde(rename = "InoiseSpecFreq")]
    inoise_spec_freq: String,
    #[serde(rename = "UGBW")]
    ugbw: String,
}

impl CatalogRow {
    fn into_entry(self) -> Result<CatalogEntry> {
        let field = |column: &str| format!("{}.{column}", self.device);
        let spec = OpAmpNoiseSpec::new(
            parse_value(&field("VnoiseLow"), &self.vnoise_low)?,
            parse_value(&field("VnoiseHigh"), &self.vnoise_high)?,
            parse_value(&field("InoiseLow"), &self.inoise_low)?,
            parse_value(&field("InoiseHigh"), &self.inoise_high)?,
            parse_value(&field("InoiseSpecFreq"), &self.inoise_spec_freq)?,
            parse_value(&field("UGBW"), &self.ugbw)?,
        )
        .map_err(|err| match err {
            NoiseError::InvalidOpAmpSpec(msg) => {
                NoiseError::InvalidOpAmpSpec(format!("{}: {msg}", self.device))
            }
            other => other,
        })?;

        Ok(CatalogEntry {
            device: self.device,
            spec,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub device: String,
    pub spec: OpAmpNoiseSpec,
}

#[derive(Debug, Clone, Default)]
pub struct OpAmpCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl OpAmpCatalog {
    /// The part table shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_reader(BUILTIN_CSV.as_bytes())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let catalog = Self::from_reader(file)?;
        log::debug!(
            "loaded {} op-amp parts from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut catalog = Self::default();
        for row in csv_reader.deserialize::<CatalogRow>() {
            let entry = row?.into_entry()?;
            if catalog.index.contains_key(&entry.device) {
                return Err(NoiseError::InvalidOpAmpSpec(format!(
                    "duplicate device in catalog: {}",
                    entry.device
                )));
            }
            catalog
                .index
                .insert(entry.device.clone(), catalog.entries.len());
            catalog.entries.push(entry);
        }

        Ok(catalog)
    }

    /// Exact, case-sensitive lookup by part name.
    pub fn lookup(&self, device: &str) -> Result<&OpAmpNoiseSpec> {
        self.index
            .get(device)
            .map(|&idx| &self.entries[idx].spec)
            .ok_or_else(|| NoiseError::LookupMiss(device.to_string()))
    }

    /// Part names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.device.as_str())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
