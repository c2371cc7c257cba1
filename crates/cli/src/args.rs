use clap::Args;
use std::path::PathBuf;
use zeichenformer_codec::CodecKind;

use crate::defaults;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Codec kind (range, vocabulary, calendar)
    ///
    /// The aliases numerical, category and timestamp are accepted too.
    #[arg(short, long)]
    pub kind: CodecKind,

    /// Output model path
    #[arg(short, long, default_value = defaults::MODEL_PATH)]
    pub output: PathBuf,

    /// First token id of this codec in a shared token space
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Bisection depth (range only)
    ///
    /// Defaults to 8.
    #[arg(short = 'b', long)]
    pub num_bits: Option<usize>,

    /// Smallest representable year (calendar only)
    ///
    /// Defaults to 2000.
    #[arg(long)]
    pub min_year: Option<u16>,

    /// Largest representable year (calendar only)
    ///
    /// Defaults to 2100.
    #[arg(long)]
    pub max_year: Option<u16>,

    /// Precomputed categories, comma separated (vocabulary only)
    ///
    /// The model is fitted right away; duplicates are dropped.
    #[arg(short, long, value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// Overwrite an existing model file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Model file
    #[arg(short, long, default_value = defaults::MODEL_PATH)]
    pub model: PathBuf,

    /// Input file (JSON lines; stdin if not specified)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file (JSON lines; stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}
