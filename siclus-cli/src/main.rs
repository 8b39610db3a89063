//! siclus-cli: Command-line interface for siclus.
//!
//! Clusters the cells of JSON event files into measurements.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand, ValueEnum};

use siclus_algorithms::{Clusterization, ClusterizationSummary, SparseCcl};
use siclus_core::{
    ClusterizationConfig, Connectivity, DiameterStrategy, ExecutionModel, NeighborScan,
};
use siclus_io::{read_event, MeasurementWriter};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    SiclusIo(#[from] siclus_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] siclus_core::Error),
}

/// Diameter strategy selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Diameter along the first axis
    Channel0,
    /// Diameter along the second axis
    Channel1,
    /// Larger of the two axis diameters
    Maximum,
    /// Euclidean norm of the two axis diameters
    Diagonal,
}

impl From<Strategy> for DiameterStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Channel0 => DiameterStrategy::Channel0,
            Strategy::Channel1 => DiameterStrategy::Channel1,
            Strategy::Maximum => DiameterStrategy::Maximum,
            Strategy::Diagonal => DiameterStrategy::Diagonal,
        }
    }
}

/// Execution model selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Execution {
    /// Single-threaded labeling and aggregation
    Sequential,
    /// Fixed-size partitions processed in parallel
    Partitioned,
}

impl From<Execution> for ExecutionModel {
    fn from(execution: Execution) -> Self {
        match execution {
            Execution::Sequential => ExecutionModel::Sequential,
            Execution::Partitioned => ExecutionModel::Partitioned,
        }
    }
}

/// Adjacency selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Adjacency {
    /// Edge and corner neighbours
    Eight,
    /// Edge neighbours only
    Four,
}

impl From<Adjacency> for Connectivity {
    fn from(adjacency: Adjacency) -> Self {
        match adjacency {
            Adjacency::Eight => Connectivity::Eight,
            Adjacency::Four => Connectivity::Four,
        }
    }
}

/// Silicon detector cell clusterization.
#[derive(Parser)]
#[command(name = "siclus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster event files into measurements
    Process {
        /// Input event file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.csv, otherwise binary)
        #[arg(short, long)]
        output: PathBuf,

        /// Diameter strategy
        #[arg(short, long, value_enum, default_value = "maximum")]
        strategy: Strategy,

        /// Execution model
        #[arg(short, long, value_enum, default_value = "sequential")]
        execution: Execution,

        /// Cells per partition (partitioned model)
        #[arg(long, default_value = "1024")]
        partition_size: usize,

        /// Cell adjacency
        #[arg(long, value_enum, default_value = "eight")]
        connectivity: Adjacency,

        /// Compare every earlier cell of a module instead of stopping at the channel1 gap
        #[arg(long)]
        exhaustive: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about an event file
    Info {
        /// Input event file
        input: PathBuf,
    },

    /// Benchmark both execution models
    Benchmark {
        /// Input event file
        input: PathBuf,

        /// Number of iterations
        #[arg(short, long, default_value = "3")]
        iterations: usize,

        /// Cells per partition (partitioned model)
        #[arg(long, default_value = "1024")]
        partition_size: usize,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = matches!(cli.command, Commands::Process { verbose: true, .. });
    init_logging(verbose);

    match cli.command {
        Commands::Process {
            input,
            output,
            strategy,
            execution,
            partition_size,
            connectivity,
            exhaustive,
            verbose: _,
        } => {
            let config = ClusterizationConfig::new()
                .with_diameter_strategy(strategy.into())
                .with_execution(execution.into())
                .with_connectivity(connectivity.into())
                .with_neighbor_scan(if exhaustive {
                    NeighborScan::Exhaustive
                } else {
                    NeighborScan::Bounded
                });
            let config = ClusterizationConfig {
                partition_size,
                ..config
            };
            let pipeline = Clusterization::new(config)?;
            log::debug!("configuration: {:?}", pipeline.config());

            let start = Instant::now();
            let mut totals = ClusterizationSummary::default();

            let mut writer = MeasurementWriter::create(&output)?;
            let csv = output
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            log::debug!(
                "writing {} output to {}",
                if csv { "CSV" } else { "binary" },
                output.display()
            );

            for (n, path) in input.iter().enumerate() {
                log::debug!("reading {}", path.display());
                let event = read_event(path)?;
                let (measurements, summary) =
                    pipeline.run_with_summary(&event.cells, &event.designs, &event.conditions)?;

                if csv {
                    writer.write_csv(&measurements, n == 0)?;
                } else {
                    writer.write_binary(&measurements)?;
                }

                log::info!(
                    "{}: {} cells, {} clusters, {} measurements",
                    path.display(),
                    summary.cells,
                    summary.clusters,
                    summary.measurements
                );
                totals.cells += summary.cells;
                totals.clusters += summary.clusters;
                totals.degenerate_clusters += summary.degenerate_clusters;
                totals.measurements += summary.measurements;
            }
            writer.flush()?;

            let elapsed = start.elapsed();
            println!(
                "Processed {} files in {:.2}s",
                input.len(),
                elapsed.as_secs_f64()
            );
            println!("Total cells: {}", totals.cells);
            println!(
                "Total clusters: {} ({} below threshold)",
                totals.clusters, totals.degenerate_clusters
            );
            println!("Total measurements: {}", totals.measurements);
        }

        Commands::Info { input } => {
            let event = read_event(&input)?;
            let cells = &event.cells;

            println!("File: {}", input.display());
            println!("Designs: {}", event.designs.len());
            println!("Modules: {}", event.conditions.len());
            println!("Cells: {}", cells.len());

            if !cells.is_empty() {
                let (min_act, max_act) = cells
                    .activation
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &a| {
                        (lo.min(a), hi.max(a))
                    });
                println!("Activation range: {} - {}", min_act, max_act);

                let mut modules = cells.module_index.clone();
                modules.dedup();
                println!("Modules hit: {}", modules.len());

                let labels = SparseCcl::default().label(cells);
                println!("Clusters: {}", labels.num_clusters());
                println!(
                    "Mean cluster size: {:.2}",
                    cells.len() as f64 / labels.num_clusters() as f64
                );
            }
        }

        Commands::Benchmark {
            input,
            iterations,
            partition_size,
        } => {
            let event = read_event(&input)?;
            let iterations = iterations.max(1);

            println!(
                "Benchmarking with {} cells, {} iterations",
                event.cells.len(),
                iterations
            );

            let models = [
                (
                    ClusterizationConfig::default(),
                    "Sequential".to_string(),
                ),
                (
                    ClusterizationConfig::default().partitioned(partition_size),
                    format!("Partitioned ({})", partition_size),
                ),
            ];

            println!(
                "{:<20} | {:<15} | {:<15} | {:<15} | {:<12}",
                "Model", "Mean Time (ms)", "Min Time (ms)", "Max Time (ms)", "Measurements"
            );
            println!("{:-<88}", "");

            for (config, name) in models {
                let pipeline = Clusterization::new(config)?;
                let mut times = Vec::with_capacity(iterations);

                // Warmup
                let mut count =
                    pipeline.run(&event.cells, &event.designs, &event.conditions)?.len();

                for _ in 0..iterations {
                    let start = Instant::now();
                    count = pipeline
                        .run(&event.cells, &event.designs, &event.conditions)?
                        .len();
                    times.push(start.elapsed().as_secs_f64() * 1000.0);
                }

                let min_time = times.iter().fold(f64::INFINITY, |a, &b| a.min(b));
                let max_time = times.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
                let mean_time = times.iter().sum::<f64>() / times.len() as f64;

                println!(
                    "{:<20} | {:<15.2} | {:<15.2} | {:<15.2} | {:<12}",
                    name, mean_time, min_time, max_time, count
                );
            }
        }
    }

    Ok(())
}
