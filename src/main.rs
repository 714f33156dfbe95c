//! evograph - CLI entry point
//!
//! Evolves weight-agnostic computational graphs against a sample set.

use clap::{Parser, Subcommand, ValueEnum};
use evograph::mnist::read_mnist;
use evograph::sample::{max_index, xor_samples, Sample};
use evograph::{Config, Trainer};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "evograph")]
#[command(version)]
#[command(about = "Evolving computational-graph engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Dataset {
    /// The canonical 4-sample XOR set
    Xor,
    /// IDX-format images and labels (MNIST layout)
    Mnist,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population against a dataset
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Training dataset
        #[arg(short, long, value_enum, default_value_t = Dataset::Xor)]
        dataset: Dataset,

        /// Directory holding the IDX files (mnist dataset only)
        #[arg(long, default_value = "mnist")]
        data_dir: PathBuf,

        /// IDX file prefix, e.g. "train" or "t10k"
        #[arg(long, default_value = "train")]
        prefix: String,

        /// Random seed for reproducible mutation sequences
        #[arg(long)]
        seed: Option<u64>,

        /// Write the best network as a Graphviz dot file
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            dataset,
            data_dir,
            prefix,
            seed,
            dot,
        } => run(config, dataset, data_dir, prefix, seed, dot),
        Commands::Init { output } => init(output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    config_path: PathBuf,
    dataset: Dataset,
    data_dir: PathBuf,
    prefix: String,
    seed: Option<u64>,
    dot: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let mut config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    if let Some(s) = seed {
        println!("Using seed: {}", s);
        config.runtime.seed = Some(s);
    }

    let samples: Vec<Sample> = match dataset {
        Dataset::Xor => xor_samples(),
        Dataset::Mnist => read_mnist(&data_dir, &prefix)?,
    };
    // A structurally valid IDX pair may still hold zero records.
    if samples.is_empty() {
        return Err("dataset contains no samples".into());
    }

    // The dataset dictates the network shape.
    config.network.num_inputs = samples[0].inputs.len();
    config.network.num_outputs = samples[0].targets.len();

    println!("Starting evolution");
    println!("  Samples: {}", samples.len());
    println!(
        "  Network shape: {} -> {}",
        config.network.num_inputs, config.network.num_outputs
    );
    println!("  Population: {}", config.population.size);
    println!("  Epochs: {}", config.evolution.epochs);
    println!();

    let start = Instant::now();

    let mut trainer = Trainer::new(config)?;
    let population = trainer.initial_population();
    let result = trainer.train(population, &samples)?;

    let elapsed = start.elapsed();
    let best = &result[0];

    println!();
    println!("=== Evolution Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Seed: {}", trainer.seed());
    println!("Survivors: {}", result.len());
    println!("Best error: {:.6}", best.total_error);
    println!(
        "Best structure: {} nodes, {} edges",
        best.node_count(),
        best.edge_count()
    );

    match dataset {
        Dataset::Xor => {
            // Show the best network's answers next to the targets.
            let mut net = best.clone();
            for sample in &samples {
                net.feed(&sample.inputs)?;
                println!(
                    "  in: {:?} out: {:?} target: {:?}",
                    sample.inputs,
                    net.output(),
                    sample.targets
                );
            }
        }
        Dataset::Mnist => {
            let mut net = best.clone();
            let mut errors = 0;
            for sample in &samples {
                net.feed(&sample.inputs)?;
                if max_index(&net.output()) != max_index(&sample.targets) {
                    errors += 1;
                }
            }
            println!(
                "  label errors: {}/{} ({:.2}% error)",
                errors,
                samples.len(),
                100.0 * errors as f64 / samples.len() as f64
            );
        }
    }

    if let Some(path) = dot {
        let label = format!(
            "error {:.4} / {} edges",
            best.total_error,
            best.edge_count()
        );
        std::fs::write(&path, best.topology().to_dot(Some(&label)))?;
        println!("Wrote dot graph to {:?}", path);
    }

    Ok(())
}

fn init(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Wrote default config to {:?}", output);
    Ok(())
}
