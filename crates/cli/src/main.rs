mod args;
mod commands;
pub mod defaults;
mod printing;
mod utils;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use args::{InitArgs, StreamArgs};
use commands::{fit, info, init, stream};

/// Zeichen: feature tokenization from the command line
///
/// Builds codecs for numbers, categories and timestamps, fits them on data and
/// converts JSON-lines files between raw values and token ids.
#[derive(Parser, Debug)]
#[command(name = "zeichen")]
#[command(author, version, about = "Turns feature values into token ids and back", long_about = None)]
struct Cli {
    /// Number of threads to use for batch encoding and decoding
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    ///
    /// RUST_LOG takes precedence when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new codec model.
    ///
    /// Writes the configuration as a model file. Range and vocabulary
    /// models still need `fit` unless categories are given up front.
    Init(Box<InitArgs>),

    /// Fit a model on sample values.
    ///
    /// Reads one JSON value per line (numbers for range models, strings for
    /// vocabulary and calendar models; `null` marks a missing value).
    Fit {
        /// Model file
        #[arg(short, long, default_value = defaults::MODEL_PATH)]
        model: PathBuf,

        /// Sample values (JSON lines)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to save the fitted model (default: overwrite --model)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode values into tokens.
    ///
    /// One JSON value per line in, one JSON token form per line out.
    Encode(StreamArgs),

    /// Decode tokens back into values.
    Decode(StreamArgs),

    /// Info: Show the configuration and token layout of a model.
    Info {
        /// Model file
        #[arg(short, long, default_value = defaults::MODEL_PATH)]
        model: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init(args) => {
            init::init_model(&args)?;
        }
        Commands::Fit {
            model,
            input,
            output,
        } => {
            fit::fit_model(&model, &input, output.as_ref())?;
        }
        Commands::Encode(args) => {
            stream::run(&args, stream::Direction::Encode)?;
        }
        Commands::Decode(args) => {
            stream::run(&args, stream::Direction::Decode)?;
        }
        Commands::Info { model } => {
            info::show_info(&model)?;
        }
    }

    Ok(())
}
