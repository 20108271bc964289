//! ferrite-ocr command-line front end.
//!
//!   ferrite-ocr parity
//!   ferrite-ocr train --training-set letters.json --output net.json
//!   ferrite-ocr classify --model net.json --grid drawing.txt
//!   ferrite-ocr inspect --model net.json

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ferrite_ocr::ocr::{self, Grid, TrainingSet, GRID_SIZE};
use ferrite_ocr::{train_loop, BackPropagator, EpochStats, Network, NetworkSpec, TrainConfig};

#[derive(Parser)]
#[command(name = "ferrite-ocr")]
#[command(about = "Train and run a single-hidden-layer letter recogniser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a 3-2-1 network on the three-input parity table and print its outputs
    Parity {
        #[arg(short, long, default_value = "50000")]
        epochs: usize,

        #[arg(short, long, default_value = "0.8")]
        learning_rate: f64,

        /// Seed for the initial weights
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Train a letter network from a training-set JSON file
    Train {
        #[arg(short, long)]
        training_set: PathBuf,

        /// Where to write the trained network
        #[arg(short, long)]
        output: PathBuf,

        /// Optional network spec JSON; defaults to the 8x8 letter shape
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Continue training an existing network instead of starting fresh
        #[arg(long)]
        resume: Option<PathBuf>,

        #[arg(short, long)]
        epochs: Option<usize>,

        #[arg(short, long)]
        learning_rate: Option<f64>,

        #[arg(long)]
        hidden: Option<usize>,

        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Read the letter drawn in a grid text file or an image
    Classify {
        #[arg(short, long)]
        model: PathBuf,

        /// `#`/`.` text grid, or any PNG/JPEG/BMP/GIF image
        #[arg(short, long)]
        grid: PathBuf,

        /// Grayscale level below which an image pixel counts as ink
        #[arg(long, default_value = "0.5")]
        threshold: f64,
    },

    /// Print the shape of a saved network
    Inspect {
        #[arg(short, long)]
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Parity { epochs, learning_rate, seed } => run_parity(epochs, learning_rate, seed),
        Commands::Train { training_set, output, spec, resume, epochs, learning_rate, hidden, seed } => {
            let mut spec = match spec {
                Some(path) => NetworkSpec::load_json(&path)
                    .with_context(|| format!("reading spec {}", path.display()))?,
                None => NetworkSpec::default(),
            };
            if let Some(epochs) = epochs {
                spec.epochs = epochs;
            }
            if let Some(learning_rate) = learning_rate {
                spec.learning_rate = learning_rate;
            }
            if let Some(hidden) = hidden {
                spec.hidden_count = hidden;
            }
            run_train(&training_set, &output, &spec, resume.as_deref(), seed)
        }
        Commands::Classify { model, grid, threshold } => run_classify(&model, &grid, threshold),
        Commands::Inspect { model } => {
            let network = Network::load_json(&model)
                .with_context(|| format!("loading network {}", model.display()))?;
            println!("inputs:     {}", network.input_count());
            println!("hidden:     {}", network.hidden_count());
            println!("outputs:    {}", network.output_count());
            println!("activation: {:?}", network.activation());
            Ok(())
        }
    }
}

fn build_network(spec: &NetworkSpec, seed: Option<u64>) -> Network {
    match seed {
        Some(seed) => Network::from_spec_with_rng(spec, &mut StdRng::seed_from_u64(seed)),
        None => Network::from_spec(spec),
    }
}

fn run_parity(epochs: usize, learning_rate: f64, seed: Option<u64>) -> Result<()> {
    let table: Vec<Vec<f64>> = (0..8u32)
        .map(|bits| (0..3).rev().map(|i| ((bits >> i) & 1) as f64).collect())
        .collect();

    let mut network = build_network(&NetworkSpec::new(3, 1, 2).with_learning_rate(learning_rate), seed);
    let mut trainer = BackPropagator::new(&mut network, learning_rate);
    for input in &table {
        let all_equal = input.iter().all(|&v| v == input[0]);
        trainer.add_input_output(input.clone(), vec![if all_equal { 0.0 } else { 1.0 }])?;
    }

    let outcome = train_loop(&mut trainer, &TrainConfig::new(epochs))?;
    info!(epochs_run = outcome.epochs_run, "parity training done");

    for input in &table {
        let output = network.fire(input)?;
        println!("Input: {:?}\tOutput: {:.6}", input, output[0]);
    }
    Ok(())
}

fn run_train(
    training_set: &Path,
    output: &Path,
    spec: &NetworkSpec,
    resume: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let set = TrainingSet::open(training_set)
        .with_context(|| format!("reading training set {}", training_set.display()))?;
    if set.is_empty() {
        bail!("training set {} has no samples", training_set.display());
    }

    let mut network = match resume {
        Some(path) => Network::load_json(path)
            .with_context(|| format!("loading network {}", path.display()))?,
        None => build_network(spec, seed),
    };

    let (tx, rx) = mpsc::channel::<EpochStats>();
    let reporter = std::thread::spawn(move || {
        let mut last_reported = None;
        for stats in rx {
            if last_reported != Some(stats.progress_percent) && stats.progress_percent % 10 == 0 {
                info!(
                    epoch = stats.epoch,
                    total = stats.total_epochs,
                    average_error = stats.average_error,
                    "{}%", stats.progress_percent
                );
                last_reported = Some(stats.progress_percent);
            }
        }
    });

    {
        let mut trainer = BackPropagator::new(&mut network, spec.learning_rate);
        set.populate(&mut trainer)?;
        let config = TrainConfig::new(spec.epochs).with_progress(tx);
        train_loop(&mut trainer, &config)?;
    }
    reporter.join().map_err(|_| anyhow!("progress reporter panicked"))?;

    network.save_json(output)
        .with_context(|| format!("writing network {}", output.display()))?;
    info!(path = %output.display(), "network saved");
    Ok(())
}

fn run_classify(model: &Path, grid_path: &Path, threshold: f64) -> Result<()> {
    let mut network = Network::load_json(model)
        .with_context(|| format!("loading network {}", model.display()))?;

    let is_text = grid_path.extension().map_or(false, |ext| ext == "txt");
    let grid = if is_text {
        let text = std::fs::read_to_string(grid_path)
            .with_context(|| format!("reading grid {}", grid_path.display()))?;
        Grid::from_text(&text)?
    } else {
        let bytes = std::fs::read(grid_path)
            .with_context(|| format!("reading image {}", grid_path.display()))?;
        let side = (network.input_count() as f64).sqrt() as usize;
        Grid::from_image_bytes(&bytes, if side > 0 { side } else { GRID_SIZE }, threshold)?
    };

    match ocr::classify(&mut network, &grid)? {
        Some(letter) => println!("Result: {letter}"),
        None => println!("Result: (no confident match)"),
    }
    Ok(())
}
