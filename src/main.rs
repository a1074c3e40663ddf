// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use raytrace1d::io;
use raytrace1d::{DirectSettings, PartialsComputer};

#[derive(Parser)]
#[command(
    name = "raytrace1d",
    about = "P and S travel times and partial derivatives in a layered 1-D model"
)]
struct Cli {
    /// Control file naming the catalogs and the velocity model
    #[arg(default_value = "rayTrace.inp")]
    input: PathBuf,

    /// Output record file
    #[arg(default_value = "rayTrace.src")]
    output: PathBuf,

    /// Also save station-by-source matrices to this .npz file
    #[arg(long)]
    partials: Option<PathBuf>,

    /// Number of Rayon worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Iteration cap for the direct-ray false-position search
    #[arg(long, default_value = "25")]
    max_iterations: usize,

    /// Horizontal distance tolerance (km) for the direct-ray search
    #[arg(long, default_value = "0.02")]
    tolerance: f64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let control = io::read_control(&cli.input)
        .with_context(|| format!("reading control file {}", cli.input.display()))?;
    let model = control.model().context("building velocity model")?;
    let sources = io::read_events(&control.event_file)
        .with_context(|| format!("reading events from {}", control.event_file.display()))?;
    let stations = io::read_stations(&control.station_file).with_context(|| {
        format!(
            "reading stations from {}",
            control.station_file.display()
        )
    })?;
    if sources.is_empty() {
        bail!("event file {} has no events", control.event_file.display());
    }
    if stations.is_empty() {
        bail!(
            "station file {} has no stations",
            control.station_file.display()
        );
    }

    let settings = DirectSettings::new(cli.max_iterations, cli.tolerance)?;
    let mut computer = PartialsComputer::new(model, control.vpvs)?.with_direct_settings(settings);
    if let Some(threads) = cli.threads {
        computer = computer.with_threads(threads);
    }

    let start = Instant::now();
    let partials = computer.compute(&sources, &stations)?;

    io::write_records(&cli.output, &partials.records)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    if let Some(path) = &cli.partials {
        io::save_partials_npz(path, &partials.table)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    tracing::info!(
        records = partials.records.len(),
        output = %cli.output.display(),
        elapsed_s = start.elapsed().as_secs_f64(),
        "ray tracing complete"
    );
    Ok(())
}
