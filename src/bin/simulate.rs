// Runs one walking-human radar simulation and logs a summary.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gait_radar_lib::{
    config::{ScatteringConfig, SimulationConfig},
    gait::Gait,
    helper::wavelength,
    pipeline::simulate,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "simulate", about = "Simulate the radar return of a walking human")]
struct Cli {
    /// JSON configuration file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Body height in meters
    #[arg(long)]
    height: Option<f32>,
    /// Walking speed relative to the hip joint height, in (0, 3]
    #[arg(long)]
    velocity: Option<f32>,
    /// Force a gait class instead of deriving it from the velocity
    #[arg(long, value_parser = parse_gait)]
    gait: Option<Gait>,
    /// Let the body advance instead of walking in place
    #[arg(long)]
    forward_motion: bool,
    /// Pulse repetition frequency in Hz
    #[arg(long)]
    sample_rate: Option<f32>,
    /// Seconds of walking, rounded up to whole gait cycles
    #[arg(long)]
    duration: Option<f32>,
    /// Radar position as x,y,z in meters
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    radar: Option<Vec<f32>>,
    /// Carrier frequency in Hz
    #[arg(long)]
    carrier: Option<f32>,
    /// Range bin width in meters
    #[arg(long)]
    range_resolution: Option<f32>,
    /// Only the feet scatter
    #[arg(long)]
    feet_only: bool,
    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_gait(s: &str) -> std::result::Result<Gait, String> {
    match s {
        "A" | "a" => Ok(Gait::A),
        "B" | "b" => Ok(Gait::B),
        "C" | "c" => Ok(Gait::C),
        _ => Err(format!("unknown gait `{}`, expected A, B or C", s)),
    }
}

fn effective_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(h) = cli.height {
        config.height = h;
    }
    if let Some(rv) = cli.velocity {
        config.relative_velocity = rv;
    }
    if cli.gait.is_some() {
        config.gait = cli.gait;
    }
    if cli.forward_motion {
        config.forward_motion = true;
    }
    if let Some(fs) = cli.sample_rate {
        config.sample_rate = fs;
    }
    if let Some(d) = cli.duration {
        config.duration = d;
    }
    if let Some(r) = &cli.radar {
        match r.as_slice() {
            &[x, y, z] => config.radar_location = [x, y, z],
            _ => bail!("--radar takes three coordinates, got {}", r.len()),
        }
    }
    if let Some(f) = cli.carrier {
        config.wavelength = wavelength(f);
    }
    if let Some(res) = cli.range_resolution {
        config.range_resolution = res;
    }
    if cli.feet_only {
        config.body_parts = ScatteringConfig::feet_only();
    }

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = effective_config(&cli)?;

    if cli.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let start = std::time::Instant::now();
    let out = simulate(&config)?;

    info!(
        cycles = out.timing.total_cycles,
        samples_per_cycle = out.timing.samples_per_cycle,
        cycle_duration = out.timing.cycle_duration,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "simulated walk"
    );
    info!(height = out.lengths.height(), "segment lengths");
    for (segment, length) in out.lengths.iter() {
        info!(segment = segment.name(), length, "segment length");
    }

    let peak = out
        .matrix
        .power_db(f32::NEG_INFINITY)
        .fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
    match out.matrix.occupied_bins() {
        Some((first, last)) => info!(
            range_bins = out.matrix.range_bins(),
            pulses = out.matrix.pulses(),
            first,
            last,
            peak_db = peak,
            "range-time matrix"
        ),
        None => info!(
            range_bins = out.matrix.range_bins(),
            pulses = out.matrix.pulses(),
            "range-time matrix is empty"
        ),
    }

    println!(
        "{} range bins x {} pulses, peak {:.1} dB",
        out.matrix.range_bins(),
        out.matrix.pulses(),
        peak
    );

    Ok(())
}
