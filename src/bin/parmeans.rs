//! Command-line front-end: loads a dataset, runs the requested engine for
//! an exact iteration count and prints the evaluator-facing two-line
//! output (elapsed seconds, then the centroid checksum).

use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use parmeans::{io, Error, KMeans, KMeansConfig, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Sequential reference engine
    Serial,
    /// Worker threads over shared memory, gated by two barriers per iteration
    Threads,
    /// Spawned workers owning their partitions, channels only
    Message,
}

/// Parallel Lloyd k-means clustering over integer datasets.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Dataset file: whitespace-separated integers, M x D values row-major
    file: PathBuf,

    /// Number of points (M)
    points: usize,

    /// Dimensions per point (D)
    dims: usize,

    /// Number of clusters (K)
    clusters: usize,

    /// Number of Lloyd iterations (I); always runs exactly this many
    iterations: usize,

    /// Execution engine
    #[arg(long, value_enum, default_value = "threads")]
    mode: Mode,

    /// Worker count (threads or message-passing workers).
    /// In message mode the point count must divide evenly by this.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Seed for the random centroid initialization
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Also print a human-readable centroid report after the two output lines
    #[arg(long)]
    print_centroids: bool,
}

fn validate(opts: &Opts) -> Result<()> {
    if opts.points == 0 {
        return Err(Error::InvalidArguments("M must be positive".into()));
    }
    if opts.dims == 0 {
        return Err(Error::InvalidArguments("D must be positive".into()));
    }
    if opts.clusters == 0 || opts.clusters > opts.points {
        return Err(Error::InvalidArguments(
            "K must satisfy 1 <= K <= M".into(),
        ));
    }
    if opts.workers == 0 {
        return Err(Error::InvalidArguments(
            "worker count must be positive".into(),
        ));
    }
    Ok(())
}

fn run(opts: &Opts) -> Result<()> {
    validate(opts)?;

    let samples = io::read_dataset::<i32>(&opts.file, opts.points, opts.dims)?;
    let kmean = KMeans::new(samples, opts.points, opts.dims);
    let config = KMeansConfig::build()
        .random_generator(StdRng::seed_from_u64(opts.seed))
        .build();
    info!(
        "running {:?} engine: M={} D={} K={} I={} workers={}",
        opts.mode, opts.points, opts.dims, opts.clusters, opts.iterations, opts.workers
    );

    let start = Instant::now();
    let state = match opts.mode {
        Mode::Serial => kmean.lloyd_serial(
            opts.clusters,
            opts.iterations,
            KMeans::init_random_sample,
            &config,
        ),
        Mode::Threads => kmean.lloyd_barrier(
            opts.clusters,
            opts.iterations,
            opts.workers,
            KMeans::init_random_sample,
            &config,
        ),
        Mode::Message => kmean.lloyd_message(
            opts.clusters,
            opts.iterations,
            opts.workers,
            KMeans::init_random_sample,
            &config,
        )?,
    };
    let elapsed = start.elapsed().as_secs_f64();

    println!("{:.6}", elapsed);
    println!("{}", state.checksum());
    if opts.print_centroids {
        print!("{}", io::render_centroids(&state));
    }
    Ok(())
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));
    let opts = Opts::parse();
    if let Err(err) = run(&opts) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
