use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use corridor_generator::ascii::{self, AsciiMode};
use corridor_generator::export;
use corridor_generator::generator::{generate_path, GenerationFailure, PathLayout};
use corridor_generator::params::PathParams;
use corridor_generator::tiles::TileAtlas;

#[derive(Parser, Debug)]
#[command(name = "corridor_generator")]
#[command(about = "Generate a single-width corridor across a tile grid")]
struct Args {
    /// Grid height in tiles
    #[arg(short = 'r', long)]
    rows: Option<usize>,

    /// Grid width in tiles
    #[arg(short = 'c', long)]
    columns: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Minimum number of cells the walk must place
    #[arg(short = 'm', long)]
    min_length: Option<usize>,

    /// Rows near the top and bottom that vertical moves avoid
    #[arg(short = 'b', long)]
    edge_buffer: Option<usize>,

    /// Seeds to try before giving up (seed, seed + 1, ...)
    #[arg(short = 'a', long, default_value = "100")]
    attempts: usize,

    /// JSON file with generation parameters; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Export the map and report as text
    #[arg(long)]
    ascii: Option<PathBuf>,

    /// Export a PNG preview
    #[arg(long)]
    png: Option<PathBuf>,

    /// Export the layout as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Pixel size of one tile in the PNG preview
    #[arg(long, default_value = "64")]
    tile_size: u32,

    /// Print the raw bitmask view instead of tiles
    #[arg(long)]
    bitmask: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_params(args: &Args) -> Result<PathParams, Box<dyn std::error::Error>> {
    let mut params = match &args.config {
        Some(path) => PathParams::load(path)?,
        None => PathParams::default(),
    };
    if let Some(rows) = args.rows {
        params.rows = rows;
    }
    if let Some(columns) = args.columns {
        params.columns = columns;
    }
    if let Some(min_length) = args.min_length {
        params.min_length = min_length;
    }
    if let Some(edge_buffer) = args.edge_buffer {
        params.edge_buffer = edge_buffer;
    }
    params.validate()?;
    if args.attempts == 0 {
        return Err("--attempts must be at least 1".into());
    }
    if args.tile_size == 0 {
        return Err("--tile-size must be positive".into());
    }
    Ok(params)
}

fn generate(params: &PathParams, base_seed: u64, attempts: usize) -> Result<PathLayout, Vec<(u64, GenerationFailure)>> {
    let mut failures = Vec::new();
    for attempt in 0..attempts as u64 {
        let seed = base_seed.wrapping_add(attempt);
        match generate_path(params, seed) {
            Ok(layout) => return Ok(layout),
            Err(failure) => {
                tracing::info!(seed, %failure, "attempt failed");
                failures.push((seed, failure));
            }
        }
    }
    Err(failures)
}

fn export_outputs(args: &Args, layout: &PathLayout) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &args.ascii {
        ascii::export_ascii(layout, path)?;
        println!("Wrote text report to {}", path.display());
    }
    if let Some(path) = &args.png {
        let atlas = TileAtlas {
            tile_size: args.tile_size,
            ..TileAtlas::default()
        };
        export::export_png(layout, &atlas, path)?;
        println!("Wrote PNG preview to {}", path.display());
    }
    if let Some(path) = &args.json {
        export::export_json(layout, path)?;
        println!("Wrote layout JSON to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let params = match build_params(&args) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating corridor with seed: {}", seed);
    println!(
        "Grid: {} rows x {} columns, min length {}, edge buffer {}",
        params.rows, params.columns, params.min_length, params.edge_buffer
    );

    let layout = match generate(&params, seed, args.attempts) {
        Ok(layout) => layout,
        Err(failures) => {
            eprintln!("No corridor after {} attempts:", failures.len());
            let mut reasons: Vec<(&str, usize)> = Vec::new();
            for (_, failure) in &failures {
                match reasons.iter_mut().find(|(r, _)| *r == failure.reason()) {
                    Some((_, count)) => *count += 1,
                    None => reasons.push((failure.reason(), 1)),
                }
            }
            for (reason, count) in reasons {
                eprintln!("  {:<18} {}", reason, count);
            }
            return ExitCode::FAILURE;
        }
    };

    if layout.seed != seed {
        println!("Succeeded with seed: {} (after {} attempts)", layout.seed, layout.seed.wrapping_sub(seed) + 1);
    }
    println!(
        "Start: {} edge at ({}, {}), {} path cells, trace {}",
        layout.start_edge.name(),
        layout.start.0,
        layout.start.1,
        layout.path_cell_count(),
        layout.trace.len()
    );
    println!();

    let mode = if args.bitmask { AsciiMode::Bitmask } else { AsciiMode::Tiles };
    print!("{}", ascii::render_ascii_map(&layout, mode));
    println!();

    if let Err(e) = export_outputs(&args, &layout) {
        eprintln!("Export failed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
