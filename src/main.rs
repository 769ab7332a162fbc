use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use qaa_iop::iop::{IopResult, QaaAlgorithm, QaaConfig, Sensor, WaterClarity, qaaf_zeu};
use qaa_iop::{Config, SceneProcessor};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "QAA inherent optical properties from ocean colour reflectance",
    long_about = None
)]
struct Args {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a scene described by a JSON configuration file
    Run {
        /// Path to the JSON configuration
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Process a single reflectance spectrum
    Pixel {
        /// Sensor preset
        #[arg(short, long, default_value = "meris_legacy")]
        sensor: Sensor,

        /// Reflectance is already divided by pi
        #[arg(long)]
        no_divide_by_pi: bool,

        /// Reflectance per band, in sensor band order
        #[arg(required = true, allow_negative_numbers = true)]
        rrs: Vec<f32>,
    },
    /// Euphotic depth from absorption and backscattering at 490 nm
    Zeu {
        #[arg(allow_negative_numbers = true)]
        a490: f64,
        #[arg(allow_negative_numbers = true)]
        bb490: f64,
        /// Solar zenith angle in degrees
        zenith: f64,
        /// Light level: 1, 10 or 50 percent
        #[arg(short, long, default_value = "1")]
        percentile: u32,
    },
}

fn run(path: PathBuf) -> Result<()> {
    let config = Config::from_file(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    let input = config.input_directory().display();
    info!("Processing {} scene from {input}", config.sensor());

    let processor = SceneProcessor::new(config);
    let written = processor.run().context("Scene processing failed")?;
    info!("Done, {} files written", written.len());
    Ok(())
}

fn pixel(sensor: Sensor, no_divide_by_pi: bool, rrs: Vec<f32>) -> Result<()> {
    let sensor_config = sensor.config();
    let expected = sensor_config.input_bands();
    if rrs.len() != expected {
        let got = rrs.len();
        bail!("{sensor} expects {expected} reflectance values, got {got}");
    }

    let config = QaaConfig {
        divide_by_pi: !no_divide_by_pi,
        ..QaaConfig::default()
    };
    let algorithm = QaaAlgorithm::new(sensor_config, config);
    let mut result = IopResult::new();
    if let Err(e) = algorithm.process(&rrs, &mut result) {
        println!("{e}");
    }
    println!("{result}");
    Ok(())
}

fn zeu(a490: f64, bb490: f64, zenith: f64, percentile: u32) -> Result<()> {
    let clarity = WaterClarity::from_percent(percentile);
    if clarity.percent() != percentile {
        log::warn!("Unrecognised percentile {percentile}, using {clarity}");
    }
    let z = qaaf_zeu(a490, bb490, zenith, clarity)?;
    println!("zeu({clarity}) = {z:.4} m");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env).init();

    match args.command {
        Command::Run { config } => run(config),
        Command::Pixel {
            sensor,
            no_divide_by_pi,
            rrs,
        } => pixel(sensor, no_divide_by_pi, rrs),
        Command::Zeu {
            a490,
            bb490,
            zenith,
            percentile,
        } => zeu(a490, bb490, zenith, percentile),
    }
}
