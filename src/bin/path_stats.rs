//! Sweep a range of seeds and report how often generation succeeds

use std::collections::BTreeMap;
use std::time::Instant;

use clap::Parser;
use rayon::prelude::*;

use corridor_generator::generator::generate_path;
use corridor_generator::params::PathParams;
use corridor_generator::StartEdge;

#[derive(Parser, Debug)]
#[command(name = "path_stats")]
#[command(about = "Measure corridor generation success rate over many seeds")]
struct Args {
    /// First seed of the sweep
    #[arg(long, default_value = "0")]
    from: u64,

    /// Number of seeds to try
    #[arg(short, long, default_value = "1000")]
    count: u64,

    #[arg(short = 'r', long, default_value = "11")]
    rows: usize,

    #[arg(short = 'c', long, default_value = "20")]
    columns: usize,

    #[arg(short = 'm', long, default_value = "25")]
    min_length: usize,

    #[arg(short = 'b', long, default_value = "1")]
    edge_buffer: usize,
}

fn main() {
    let args = Args::parse();
    let params = PathParams::new(args.rows, args.columns, args.min_length, args.edge_buffer);
    if let Err(e) = params.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    println!("=== Corridor Generation Sweep ===");
    println!(
        "Grid: {}x{}, min length {}, edge buffer {}",
        params.rows, params.columns, params.min_length, params.edge_buffer
    );
    println!("Seeds: {}..{}", args.from, args.from + args.count);
    println!();

    let start = Instant::now();
    let results: Vec<_> = (args.from..args.from + args.count)
        .into_par_iter()
        .map(|seed| generate_path(&params, seed).map(|layout| (layout.start_edge, layout.trace.len(), layout.route().len())))
        .collect();
    let elapsed = start.elapsed();

    let mut failures: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_edge: BTreeMap<&str, usize> = BTreeMap::new();
    let mut trace_total = 0usize;
    let mut route_total = 0usize;
    let mut successes = 0usize;

    for result in &results {
        match result {
            Ok((edge, trace, route)) => {
                successes += 1;
                trace_total += trace;
                route_total += route;
                *by_edge.entry(edge.name()).or_insert(0) += 1;
            }
            Err(failure) => *failures.entry(failure.reason()).or_insert(0) += 1,
        }
    }

    let total = results.len().max(1);
    println!("Elapsed: {:?} ({:?} per attempt)", elapsed, elapsed / total as u32);
    println!("Success: {} / {} ({:.1}%)", successes, results.len(), 100.0 * successes as f64 / total as f64);
    if successes > 0 {
        println!("Mean trace length: {:.1}", trace_total as f64 / successes as f64);
        println!("Mean route length: {:.1}", route_total as f64 / successes as f64);
    }
    println!();

    println!("Successes by start edge:");
    for edge in StartEdge::ALL {
        println!("  {:<8} {}", edge.name(), by_edge.get(edge.name()).copied().unwrap_or(0));
    }
    println!();

    println!("Failures:");
    for (reason, count) in &failures {
        println!("  {:<18} {:>6} ({:.1}%)", reason, count, 100.0 * *count as f64 / total as f64);
    }
}
