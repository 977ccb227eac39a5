use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use plotters::prelude::*;
use serde::Serialize;

use opnoise::{InvertingNoiseReport, NoiseSeries, NoiseSink};

pub const OUTPUT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize)]
pub struct InvertingSummary {
    pub schema_version: String,
    pub part: Option<String>,
    pub report: InvertingNoiseReport,
    /// Op-amp voltage noise integrated over the band, when the band starts above 0 Hz
    pub opamp_vnoise_band_rms: Option<f64>,
}

pub fn create_timestamped_output_dir(output_root: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_root).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_root.display()
        )
    })?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = output_root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        if counter > 999 {
            bail!(
                "failed to allocate unique run directory under {}",
                output_root.display()
            );
        }
        output_dir = output_root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn fmt_f64(value: f64) -> String {
    format!("{value:.6e}")
}

/// Writes series in long form: `label, unit, frequency_hz, density`.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NoiseSink for CsvSink {
    type Error = anyhow::Error;

    fn render(&mut self, series: &[NoiseSeries]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("failed to open CSV path {}", self.path.display()))?;
        writer.write_record(["label", "unit", "frequency_hz", "density"])?;

        for s in series {
            for (f, density) in s.points() {
                writer.write_record([
                    s.label().to_string(),
                    s.unit().to_string(),
                    fmt_f64(f),
                    fmt_f64(density),
                ])?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

/// Log-log PNG with one stacked panel per series.
pub struct LogLogPlot {
    path: PathBuf,
    title: String,
}

impl LogLogPlot {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }
}

fn positive_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

impl NoiseSink for LogLogPlot {
    type Error = anyhow::Error;

    fn render(&mut self, series: &[NoiseSeries]) -> Result<()> {
        if series.is_empty() {
            bail!("nothing to plot for {}", self.path.display());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let height = 420 * series.len() as u32;
        let root = BitMapBackend::new(&self.path, (1280, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((series.len(), 1));

        for (panel, s) in panels.iter().zip(series) {
            let (f_lo, f_hi) = positive_bounds(s.frequencies_hz().iter().copied())
                .with_context(|| format!("series '{}' has no frequencies", s.label()))?;
            let (d_lo, d_hi) = positive_bounds(s.densities().iter().copied())
                .with_context(|| format!("series '{}' has no positive densities", s.label()))?;

            let mut chart = ChartBuilder::on(panel)
                .caption(
                    format!("{}: {}", self.title, s.label()),
                    ("sans-serif", 28).into_font(),
                )
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(90)
                .build_cartesian_2d(
                    (f_lo..f_hi.max(f_lo * 10.0)).log_scale(),
                    ((d_lo * 0.8)..(d_hi * 1.25)).log_scale(),
                )?;

            chart
                .configure_mesh()
                .x_desc("Frequency [Hz]")
                .y_desc(format!("Noise [{}]", s.unit()))
                .draw()?;

            chart
                .draw_series(LineSeries::new(
                    s.points().filter(|(_, d)| *d > 0.0),
                    &BLUE,
                ))?
                .label(s.label())
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], BLUE.stroke_width(3)));

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

pub fn write_summary(path: &Path, summary: &InvertingSummary) -> Result<()> {
    let payload = serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
    fs::write(path, payload)
        .with_context(|| format!("failed to write summary: {}", path.display()))?;
    Ok(())
}
