//! opnoise command-line interface.
//!
//! ```sh
//! opnoise opamp --part NE5534
//! opnoise inverting --config configs/inverting.toml
//! opnoise inverting --part OP27 --r-in 1k --r-feedback 100k --low-freq 1 --high-freq 10k
//! opnoise band-rms --white 10n --corner 0.7 --low 0.1 --high 10
//! opnoise source-match --part OP27
//! opnoise parts
//! ```

mod config;
mod output;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use opnoise::constants::{
    DEFAULT_GAIN_BANDWIDTH_HZ, DEFAULT_INOISE_CORNER_HZ, DEFAULT_REFERENCE_FREQ_HZ,
    DEFAULT_TEMPERATURE_C,
};
use opnoise::intake::{format_si, parse_value};
use opnoise::opamp::optimum_source_resistance;
use opnoise::rms::{opamp_vnoise_rms, peak_to_peak, FlickerWhiteNoise};
use opnoise::series::{inverting_rti_series, opamp_series};
use opnoise::thermal::johnson_noise_sweep;
use opnoise::{
    analyze_inverting, opamp_noise, CircuitParams, NoiseError, NoiseSink, OpAmpNoiseSpec,
};

use crate::config::{load_catalog, AnalysisConfig, OpAmpSource};
use crate::output::{
    create_timestamped_output_dir, write_summary, CsvSink, InvertingSummary, LogLogPlot,
    OUTPUT_SCHEMA_VERSION,
};

fn parse_si(text: &str) -> std::result::Result<f64, NoiseError> {
    parse_value("value", text)
}

#[derive(Debug, Parser)]
#[command(name = "opnoise")]
#[command(author, version, about = "Noise budgets for op-amp stages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Intrinsic voltage and current noise spectrum of one op-amp.
    Opamp {
        #[command(flatten)]
        opamp: OpAmpArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// RTI and integrated noise of an inverting gain stage.
    Inverting {
        /// TOML file with [circuit] and [opamp] tables; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        circuit: CircuitArgs,
        #[command(flatten)]
        opamp: OpAmpArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// RMS and peak-to-peak noise of a 1/f + white spectrum over a band.
    BandRms {
        /// White-noise floor [V/√Hz]
        #[arg(long, value_parser = parse_si)]
        white: f64,
        /// 1/f corner frequency [Hz]
        #[arg(long, value_parser = parse_si)]
        corner: f64,
        #[arg(long, value_parser = parse_si)]
        low: f64,
        #[arg(long, value_parser = parse_si)]
        high: f64,
    },
    /// Source resistance at which an op-amp's voltage and current noise balance.
    SourceMatch {
        #[command(flatten)]
        opamp: OpAmpArgs,
        /// Frequency at which the densities are sampled [Hz]
        #[arg(long, value_parser = parse_si, default_value_t = DEFAULT_REFERENCE_FREQ_HZ)]
        freq: f64,
        #[arg(long, value_parser = parse_si, default_value_t = DEFAULT_TEMPERATURE_C)]
        temp: f64,
    },
    /// List the parts in the op-amp catalog.
    Parts {
        /// CSV catalog to read instead of the bundled one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct OpAmpArgs {
    /// Part name from the catalog (exact, case-sensitive)
    #[arg(long)]
    part: Option<String>,
    /// CSV catalog to resolve --part against
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Voltage noise at the low anchor [V/√Hz]
    #[arg(long, value_parser = parse_si)]
    vnoise_low: Option<f64>,
    /// Voltage noise floor [V/√Hz]
    #[arg(long, value_parser = parse_si)]
    vnoise_high: Option<f64>,
    /// Current noise at the low anchor [A/√Hz]
    #[arg(long, value_parser = parse_si)]
    inoise_low: Option<f64>,
    /// Current noise at the high anchor [A/√Hz]
    #[arg(long, value_parser = parse_si)]
    inoise_high: Option<f64>,
    /// Current-noise corner [Hz], 0 for none
    #[arg(long, value_parser = parse_si)]
    inoise_corner: Option<f64>,
    /// Unity-gain bandwidth [Hz]
    #[arg(long, value_parser = parse_si)]
    gbw: Option<f64>,
}

impl OpAmpArgs {
    fn manual_values(&self) -> [Option<f64>; 4] {
        [
            self.vnoise_low,
            self.vnoise_high,
            self.inoise_low,
            self.inoise_high,
        ]
    }

    /// `None` when neither a part nor any manual density was given.
    fn source(&self) -> Result<Option<OpAmpSource>> {
        let manual = self.manual_values();
        let any_manual = manual.iter().any(Option::is_some);

        if let Some(part) = &self.part {
            if any_manual {
                bail!("--part cannot be combined with manual --vnoise-*/--inoise-* values");
            }
            return Ok(Some(OpAmpSource::Part {
                part: part.clone(),
                catalog: self.catalog.clone(),
            }));
        }
        if !any_manual {
            return Ok(None);
        }

        match manual {
            [Some(vnoise_low), Some(vnoise_high), Some(inoise_low), Some(inoise_high)] => {
                let spec = OpAmpNoiseSpec::new(
                    vnoise_low,
                    vnoise_high,
                    inoise_low,
                    inoise_high,
                    self.inoise_corner.unwrap_or(DEFAULT_INOISE_CORNER_HZ),
                    self.gbw.unwrap_or(DEFAULT_GAIN_BANDWIDTH_HZ),
                )?;
                Ok(Some(OpAmpSource::Manual(spec)))
            }
            _ => bail!(
                "manual op-amp entry needs --vnoise-low, --vnoise-high, --inoise-low and \
                 --inoise-high"
            ),
        }
    }

    /// Resolves the op-amp from the flags, falling back to `base` (a config
    /// `[opamp]` table). `--catalog`, `--inoise-corner` and `--gbw` override
    /// whichever source wins.
    fn resolve(&self, base: Option<OpAmpSource>) -> Result<(OpAmpSource, OpAmpNoiseSpec)> {
        let mut source = self
            .source()?
            .or(base)
            .context("no op-amp given: use --part, manual values, or an [opamp] table")?;

        if let Some(path) = &self.catalog {
            match &mut source {
                OpAmpSource::Part { catalog, .. } => *catalog = Some(path.clone()),
                OpAmpSource::Manual(_) => bail!("--catalog needs a part name to look up"),
            }
        }

        let mut spec = source.resolve()?;
        if let Some(corner) = self.inoise_corner {
            spec.inoise_corner_hz = corner;
        }
        if let Some(gbw) = self.gbw {
            spec.gain_bandwidth_hz = gbw;
        }
        spec.validate()?;
        Ok((source, spec))
    }
}

#[derive(Debug, Args)]
struct CircuitArgs {
    #[arg(long, value_parser = parse_si)]
    r_source: Option<f64>,
    /// Input resistor R1 [Ohm]
    #[arg(long, value_parser = parse_si)]
    r_in: Option<f64>,
    /// Feedback resistor R2 [Ohm]
    #[arg(long, value_parser = parse_si)]
    r_feedback: Option<f64>,
    /// Non-inverting input resistor R3 [Ohm]
    #[arg(long, value_parser = parse_si)]
    r_noninverting: Option<f64>,
    /// Resistor temperature [C]
    #[arg(long, value_parser = parse_si)]
    temp: Option<f64>,
    /// Frequency at which op-amp noise is sampled [Hz]
    #[arg(long, value_parser = parse_si)]
    ref_freq: Option<f64>,
    /// Lower edge of the band of interest [Hz]
    #[arg(long, value_parser = parse_si)]
    low_freq: Option<f64>,
    /// Upper edge of the band of interest [Hz]
    #[arg(long, value_parser = parse_si)]
    high_freq: Option<f64>,
}

impl CircuitArgs {
    fn apply(&self, base: Option<CircuitParams>) -> Result<CircuitParams> {
        let mut circuit = match base {
            Some(circuit) => circuit,
            None => CircuitParams {
                r_source: 0.0,
                r_in: self.r_in.context("missing --r-in (or a [circuit] table in --config)")?,
                r_feedback: self
                    .r_feedback
                    .context("missing --r-feedback (or a [circuit] table in --config)")?,
                r_noninverting: 0.0,
                temperature_c: DEFAULT_TEMPERATURE_C,
                reference_freq_hz: DEFAULT_REFERENCE_FREQ_HZ,
                low_freq_hz: self
                    .low_freq
                    .context("missing --low-freq (or a [circuit] table in --config)")?,
                high_freq_hz: self
                    .high_freq
                    .context("missing --high-freq (or a [circuit] table in --config)")?,
            },
        };

        let overrides = [
            (self.r_source, &mut circuit.r_source),
            (self.r_in, &mut circuit.r_in),
            (self.r_feedback, &mut circuit.r_feedback),
            (self.r_noninverting, &mut circuit.r_noninverting),
            (self.temp, &mut circuit.temperature_c),
            (self.ref_freq, &mut circuit.reference_freq_hz),
            (self.low_freq, &mut circuit.low_freq_hz),
            (self.high_freq, &mut circuit.high_freq_hz),
        ];
        for (value, slot) in overrides {
            if let Some(v) = value {
                *slot = v;
            }
        }

        circuit.validate()?;
        Ok(circuit)
    }
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Output root; each run gets a timestamped directory beneath it
    #[arg(long, default_value = "output-opnoise")]
    output: PathBuf,
    /// Print results only, write no files
    #[arg(long, default_value_t = false)]
    no_write: bool,
}

impl OutputArgs {
    fn run_dir(&self) -> Result<Option<PathBuf>> {
        if self.no_write {
            return Ok(None);
        }
        let dir = create_timestamped_output_dir(&self.output)?;
        log::info!("writing run artefacts to {}", dir.display());
        Ok(Some(dir))
    }
}

fn run_opamp(opamp: &OpAmpArgs, output: &OutputArgs) -> Result<()> {
    let (source, spec) = opamp.resolve(None)?;
    let spectrum = opamp_noise(&spec)?;

    println!("{:>12}  {:>14}  {:>14}", "freq [Hz]", "vnoise [V/√Hz]", "inoise [A/√Hz]");
    for ((f, v), i) in spectrum
        .frequencies_hz
        .iter()
        .zip(&spectrum.vnoise)
        .zip(&spectrum.inoise)
    {
        println!("{:>12}  {:>14}  {:>14}", format_si(*f), format_si(*v), format_si(*i));
    }

    if let Some(dir) = output.run_dir()? {
        let (voltage, current) = opamp_series(&spec)?;
        let series = [voltage, current];
        let title = source.part_name().unwrap_or("op-amp").to_string();
        CsvSink::new(dir.join("opamp_spectrum.csv")).render(&series)?;
        LogLogPlot::new(dir.join("opamp_spectrum.png"), title).render(&series)?;
        println!("Run directory: {}", dir.display());
    }
    Ok(())
}

fn run_inverting(
    config: Option<&Path>,
    circuit_args: &CircuitArgs,
    opamp: &OpAmpArgs,
    output: &OutputArgs,
) -> Result<()> {
    let file = config.map(AnalysisConfig::from_toml_file).transpose()?;
    let (base_circuit, base_opamp) = match file {
        Some(cfg) => (cfg.circuit, cfg.opamp),
        None => (None, None),
    };

    let circuit = circuit_args.apply(base_circuit)?;
    let (source, spec) = opamp.resolve(base_opamp)?;

    let report = analyze_inverting(&circuit, &spec)?;
    let band_rms = if circuit.low_freq_hz > 0.0 {
        Some(opamp_vnoise_rms(&spec, circuit.low_freq_hz, circuit.high_freq_hz)?)
    } else {
        None
    };

    println!("Rsource: {} Ohm", format_si(circuit.r_source));
    println!("Rin: {} Ohm", format_si(circuit.r_in));
    println!("Rfeedback: {} Ohm", format_si(circuit.r_feedback));
    println!("Rnoninverting: {} Ohm", format_si(circuit.r_noninverting));
    println!("Amplifier gain: {} V/V", format_si(report.gain));
    println!(
        "Max noise BW: {} Hz{}",
        format_si(report.integrated.max_noise_bandwidth_hz),
        if report.integrated.amplifier_limited {
            " (limits the band of interest)"
        } else {
            ""
        }
    );
    println!(
        "Noise over bandwidth: {} Vrms",
        format_si(report.integrated.integrated_noise_vrms)
    );
    println!("RTI noise: {} V/√Hz", format_si(report.rti_noise_density));

    let c = &report.rti_contributions;
    println!("RTI contributions [V/√Hz]:");
    for (name, value) in [
        ("op-amp current", c.inverting_input_current),
        ("op-amp voltage", c.opamp_voltage),
        ("R noninverting", c.r_noninverting),
        ("R feedback / gain", c.r_feedback),
        ("R in", c.r_in),
        ("R source", c.r_source),
    ] {
        println!("  {name:<18} {}", format_si(value));
    }
    if let Some(rms) = band_rms {
        println!("Op-amp voltage noise over band (integrated model): {} Vrms", format_si(rms));
    }

    if let Some(dir) = output.run_dir()? {
        let rti = inverting_rti_series(&circuit, &spec)?;
        CsvSink::new(dir.join("rti_spectrum.csv")).render(std::slice::from_ref(&rti))?;
        LogLogPlot::new(dir.join("rti_spectrum.png"), "Inverting stage")
            .render(std::slice::from_ref(&rti))?;

        let summary = InvertingSummary {
            schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
            part: source.part_name().map(str::to_string),
            report,
            opamp_vnoise_band_rms: band_rms,
        };
        write_summary(&dir.join("summary.json"), &summary)?;
        println!("Run directory: {}", dir.display());
    }
    Ok(())
}

fn run_band_rms(white: f64, corner: f64, low: f64, high: f64) -> Result<()> {
    let model = FlickerWhiteNoise::new(white, corner)?;
    let rms = model.rms_over_band(low, high)?;
    println!("RMS noise: {} Vrms", format_si(rms));
    println!("Peak-to-peak noise: {} V", format_si(peak_to_peak(rms)));
    Ok(())
}

fn run_source_match(opamp: &OpAmpArgs, freq: f64, temp: f64) -> Result<()> {
    let (_, spec) = opamp.resolve(None)?;
    let en = spec.vnoise_at(freq)?;
    let inoise = spec.inoise_at(freq)?;
    let rs = optimum_source_resistance(en, inoise)?;

    println!(
        "At {} Hz: en = {} V/√Hz, in = {} A/√Hz",
        format_si(freq),
        format_si(en),
        format_si(inoise)
    );
    println!("Optimum source resistance: {} Ohm", format_si(rs));

    let decades: Vec<f64> = (1..=6).map(|exp| 10.0_f64.powi(exp)).collect();
    println!("{:>10}  {:>14}  {:>14}", "Rs [Ohm]", "Johnson [V/√Hz]", "in·Rs [V/√Hz]");
    for (r, johnson) in johnson_noise_sweep(&decades, temp)? {
        println!(
            "{:>10}  {:>14}  {:>14}",
            format_si(r),
            format_si(johnson),
            format_si(inoise * r)
        );
    }
    Ok(())
}

fn run_parts(catalog: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog)?;
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Device", "VnoiseLow", "VnoiseHigh", "InoiseLow", "InoiseHigh", "InoiseFreq", "UGBW"
    );
    for entry in catalog.entries() {
        let s = &entry.spec;
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            entry.device,
            format_si(s.vnoise_low_hz),
            format_si(s.vnoise_high_hz),
            format_si(s.inoise_low_hz),
            format_si(s.inoise_high_hz),
            format_si(s.inoise_corner_hz),
            format_si(s.gain_bandwidth_hz)
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Opamp { opamp, output } => run_opamp(opamp, output),
        Commands::Inverting {
            config,
            circuit,
            opamp,
            output,
        } => run_inverting(config.as_deref(), circuit, opamp, output),
        Commands::BandRms {
            white,
            corner,
            low,
            high,
        } => run_band_rms(*white, *corner, *low, *high),
        Commands::SourceMatch { opamp, freq, temp } => run_source_match(opamp, *freq, *temp),
        Commands::Parts { catalog } => run_parts(catalog.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::{CircuitArgs, Cli, Commands, OpAmpArgs};
    use crate::config::{AnalysisConfig, OpAmpSource};
    use clap::Parser;

    fn inverting_args(extra: &[&str]) -> (CircuitArgs, OpAmpArgs) {
        let argv = ["opnoise", "inverting"].iter().chain(extra).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Inverting { circuit, opamp, .. } => (circuit, opamp),
            other => panic!("expected inverting command, got {other:?}"),
        }
    }

    fn part_config() -> AnalysisConfig {
        AnalysisConfig::from_toml_str(include_str!("../configs/inverting_part.toml")).unwrap()
    }

    #[test]
    fn circuit_flags_alone_fill_defaults() {
        let (circuit, _) = inverting_args(&[
            "--r-in", "1k", "--r-feedback", "100k", "--low-freq", "1", "--high-freq", "10k",
        ]);
        let c = circuit.apply(None).unwrap();
        assert_eq!(c.r_source, 0.0);
        assert_eq!(c.r_in, 1000.0);
        assert_eq!(c.high_freq_hz, 10_000.0);
        assert_eq!(c.temperature_c, 20.0);
        assert_eq!(c.reference_freq_hz, 1000.0);
    }

    #[test]
    fn circuit_flags_override_config_table() {
        let (circuit, _) = inverting_args(&["--r-source", "100", "--temp", "85"]);
        let c = circuit.apply(part_config().circuit).unwrap();
        assert_eq!(c.r_source, 100.0);
        assert_eq!(c.temperature_c, 85.0);
        assert_eq!(c.r_feedback, 10_000.0);
    }

    #[test]
    fn missing_circuit_values_are_reported() {
        let (circuit, _) = inverting_args(&["--r-in", "1k"]);
        let err = circuit.apply(None).unwrap_err();
        assert!(err.to_string().contains("--r-feedback"));
    }

    #[test]
    fn bandwidth_flags_override_config_part() {
        let (_, opamp) = inverting_args(&["--gbw", "100MEG", "--inoise-corner", "2k"]);
        assert!(opamp.source().unwrap().is_none());

        let (source, spec) = opamp.resolve(part_config().opamp).unwrap();
        assert_eq!(source.part_name(), Some("NE5534"));
        assert_eq!(spec.gain_bandwidth_hz, 100e6);
        assert_eq!(spec.inoise_corner_hz, 2e3);
        assert!((spec.vnoise_low_hz - 6.5e-9).abs() < 1e-20);
    }

    #[test]
    fn part_with_manual_densities_is_rejected() {
        let (_, opamp) = inverting_args(&["--part", "OP27", "--vnoise-low", "3n"]);
        let err = opamp.source().unwrap_err();
        assert!(err.to_string().contains("--part cannot be combined"));
    }

    #[test]
    fn partial_manual_entry_is_rejected() {
        let (_, opamp) = inverting_args(&["--vnoise-low", "3n", "--vnoise-high", "3n"]);
        assert!(opamp.source().is_err());
    }

    #[test]
    fn catalog_flag_applies_to_config_part() {
        let dir = std::env::temp_dir().join(format!("opnoise-cli-catalog-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("parts.csv");
        std::fs::write(
            &path,
            "Device,VnoiseLow,VnoiseHigh,InoiseLow,InoiseHigh,InoiseSpecFreq,UGBW\n\
             NE5534,9n,4n,1p,7p,0,20MEG\n",
        )
        .unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let (_, opamp) = inverting_args(&["--catalog", &path_arg]);
        let (source, spec) = opamp.resolve(part_config().opamp).unwrap();
        match source {
            OpAmpSource::Part { catalog, .. } => {
                assert_eq!(catalog.as_deref(), Some(path.as_path()))
            }
            other => panic!("expected catalog part, got {other:?}"),
        }
        assert!((spec.vnoise_low_hz - 9e-9).abs() < 1e-20);
        assert_eq!(spec.gain_bandwidth_hz, 20e6);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn catalog_flag_without_part_is_rejected_for_manual_spec() {
        let manual =
            AnalysisConfig::from_toml_str(include_str!("../configs/inverting.toml")).unwrap();
        let (_, opamp) = inverting_args(&["--catalog", "parts.csv"]);
        assert!(opamp.resolve(manual.opamp).is_err());
    }
}
