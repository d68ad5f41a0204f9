//! Grid Voronoi labeling CLI
//!
//! Labels every cell of a square grid with the index of its nearest seed
//! and reports wall-clock timing. Seeds come from a YAML scenario file,
//! explicit `--seed-at` pairs, a seeded random set, or the default
//! four-corner layout.
//!
//! ## YAML scenario file
//!
//! ```yaml
//! size: 4096
//! seeds:
//!   - [0, 0]
//!   - [0, 4095]
//!   - [4095, 4095]
//!   - [4095, 0]
//! mode: parallel
//! ```
//!
//! Run with: `voronoi-grid --scenario corners.yaml -o labels.png`
//!
//! ## Graceful interruption
//!
//! Press Ctrl+C to cancel a long computation; workers stop at the next
//! row boundary and no output is written.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use voronoi_grid_core::{
    check_finite, corner_seeds, random_seeds, ComputeBackend, CpuBackend, LabelGrid, Seed,
    VoronoiError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    Serial,
    Parallel,
}

/// YAML scenario file format
#[derive(Debug, Deserialize)]
struct Scenario {
    size: u32,
    seeds: Vec<[f64; 2]>,
    #[serde(default)]
    mode: Option<Mode>,
}

fn load_scenario(path: &PathBuf) -> anyhow::Result<Scenario> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {:?}", path))?;
    parse_scenario(&contents)
        .with_context(|| format!("failed to parse scenario file: {:?}", path))
}

fn parse_scenario(contents: &str) -> anyhow::Result<Scenario> {
    Ok(serde_yaml::from_str(contents)?)
}

/// Parse a seed coordinate pair like "128,96" or "40.5,12"
fn parse_seed_at(spec: &str) -> anyhow::Result<Seed> {
    let (x, y) = spec
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected x,y in '{}'", spec))?;
    Ok(Seed::new(
        x.trim().parse().with_context(|| format!("invalid x in '{}'", spec))?,
        y.trim().parse().with_context(|| format!("invalid y in '{}'", spec))?,
    ))
}

#[derive(Parser, Debug)]
#[command(name = "voronoi-grid")]
#[command(about = "Label grid cells with their nearest seed", long_about = None)]
struct Args {
    /// Grid side length (grid is size x size)
    #[arg(long, default_value = "4096")]
    size: u32,

    /// Explicit seed coordinate, as x,y (repeatable)
    #[arg(long = "seed-at")]
    seed_at: Vec<String>,

    /// Use this many uniformly random seeds instead of the corner layout
    #[arg(long)]
    random: Option<usize>,

    /// RNG seed for --random (reproducible)
    #[arg(long, default_value = "0")]
    rng_seed: u64,

    /// YAML scenario file (overrides --size and seed options)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Execution mode
    #[arg(short, long, value_enum, default_value = "parallel")]
    mode: Mode,

    /// Worker threads for parallel mode (0 = Rayon default)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Render the label grid to a PNG at this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Time serial vs parallel on identical inputs
    #[arg(long)]
    benchmark: bool,

    /// Timed iterations per mode in benchmark mode
    #[arg(long, default_value = "5")]
    bench_iters: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Set up SIGINT handler
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || {
            interrupted.store(true, std::sync::atomic::Ordering::SeqCst);
        })
        .context("failed to set Ctrl-C handler")?;
    }

    // Resolve grid size, seeds, and mode (scenario file wins where present)
    let scenario = args.scenario.as_ref().map(load_scenario).transpose()?;
    let (size, seeds, mode) = match &scenario {
        Some(s) => {
            let seeds: Vec<Seed> = s.seeds.iter().map(|&[x, y]| Seed::new(x, y)).collect();
            (s.size, seeds, s.mode.unwrap_or(args.mode))
        }
        None => {
            let seeds = if !args.seed_at.is_empty() {
                args.seed_at
                    .iter()
                    .map(|s| parse_seed_at(s))
                    .collect::<anyhow::Result<Vec<_>>>()?
            } else if let Some(count) = args.random {
                random_seeds(count, args.size, args.rng_seed)
            } else {
                corner_seeds(args.size)
            };
            (args.size, seeds, args.mode)
        }
    };

    check_finite(&seeds)?;

    if args.benchmark {
        return run_benchmark(size, &seeds, args.bench_iters, args.threads, interrupted);
    }

    let mut backend = make_backend(mode, args.threads).with_cancel_flag(interrupted);

    println!(
        "Grid: {}x{}, seeds: {}, mode: {:?}",
        size,
        size,
        seeds.len(),
        mode
    );

    let start = Instant::now();
    let grid = match backend.assign(size, &seeds) {
        Ok(grid) => grid,
        Err(VoronoiError::Cancelled) => {
            eprintln!("Interrupted, no output written.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let elapsed = start.elapsed();

    println!("Computed in {:.3}s", elapsed.as_secs_f64());

    if let Some(output) = &args.output {
        let img = grid.to_image(seeds.len());
        img.save(output)
            .with_context(|| format!("failed to save image: {:?}", output))?;
        println!("Output saved to: {:?}", output);
    }

    Ok(())
}

fn make_backend(mode: Mode, threads: usize) -> CpuBackend {
    match mode {
        Mode::Serial => CpuBackend::sequential(),
        Mode::Parallel if threads > 0 => CpuBackend::with_threads(threads),
        Mode::Parallel => CpuBackend::new(),
    }
}

/// Time serial vs parallel on identical inputs and print a summary
fn run_benchmark(
    size: u32,
    seeds: &[Seed],
    iters: usize,
    threads: usize,
    interrupted: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    anyhow::ensure!(iters > 0, "--bench-iters must be at least 1");

    println!("\n=== Grid Voronoi Benchmark ===");
    println!("Grid: {}x{}", size, size);
    println!("Seeds: {}", seeds.len());
    println!("Iterations: {}", iters);
    println!();

    println!("Benchmarking sequential...");
    let mut serial = CpuBackend::sequential().with_cancel_flag(interrupted.clone());
    let (serial_time, serial_grid) = match benchmark_backend(&mut serial, size, seeds, iters) {
        Ok(result) => result,
        Err(e) if is_cancelled(&e) => {
            eprintln!("Interrupted.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    report("Sequential", serial_time, iters);

    println!("Benchmarking parallel (Rayon)...");
    let mut parallel = make_backend(Mode::Parallel, threads).with_cancel_flag(interrupted);
    let (parallel_time, parallel_grid) = match benchmark_backend(&mut parallel, size, seeds, iters)
    {
        Ok(result) => result,
        Err(e) if is_cancelled(&e) => {
            eprintln!("Interrupted.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    report("Parallel", parallel_time, iters);

    println!();
    println!("=== Summary ===");
    let speedup = serial_time.as_secs_f64() / parallel_time.as_secs_f64();
    if speedup > 1.0 {
        println!("Parallel is {:.2}x faster than sequential", speedup);
    } else {
        println!("Sequential is {:.2}x faster than parallel", 1.0 / speedup);
    }
    println!(
        "Modes agree: {}",
        if serial_grid == parallel_grid { "yes" } else { "NO (bug!)" }
    );

    Ok(())
}

/// Run one warmup plus `iters` timed calls, returning the total timed
/// duration and the last grid produced
fn benchmark_backend(
    backend: &mut dyn ComputeBackend,
    size: u32,
    seeds: &[Seed],
    iters: usize,
) -> anyhow::Result<(Duration, LabelGrid)> {
    let mut grid = backend.assign(size, seeds)?;

    let progress = ProgressBar::new(iters as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    for _ in 0..iters {
        grid = backend.assign(size, seeds)?;
        progress.inc(1);
    }
    let elapsed = start.elapsed();
    progress.finish_and_clear();

    Ok((elapsed, grid))
}

fn is_cancelled(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<VoronoiError>(), Some(VoronoiError::Cancelled))
}

fn report(label: &str, total: Duration, iters: usize) {
    println!(
        "  {}: {:?} total, {:.2} ms/run",
        label,
        total,
        total.as_secs_f64() * 1000.0 / iters as f64
    );
}
