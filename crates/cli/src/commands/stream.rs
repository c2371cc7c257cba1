//! `encode` and `decode`: JSON lines in, JSON lines out.
//!
//! Output goes to stdout unless `--output` is given, so status messages are
//! written to stderr. The whole input is converted before anything is
//! written: a bad line aborts the run without leaving a partial output file.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::Write;
use tracing::info;
use zeichenformer_codec::AnyCodec;

use crate::args::StreamArgs;
use crate::defaults::CHUNK_SIZE;
use crate::utils::{load_model, open_output, JsonLines};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Self::Encode => "Encoding",
            Self::Decode => "Decoding",
        }
    }
}

pub fn run(args: &StreamArgs, direction: Direction) -> Result<()> {
    let model = load_model(&args.model)?;
    if !model.is_fitted() {
        eprintln!(
            "⚠️  Warning: {} model is not fitted, output will be sentinels only.",
            model.kind()
        );
    }

    let input = JsonLines::read(args.input.as_ref())?;
    info!(
        lines = input.len(),
        kind = %model.kind(),
        direction = ?direction,
        "Read input"
    );

    let pb = if args.progress {
        let pb = ProgressBar::new(input.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb.set_message(direction.verb());
        Some(pb)
    } else {
        None
    };

    let result = convert(&model, &input, direction, pb.as_ref());
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let outputs = result?;

    let mut writer = open_output(args.output.as_ref())?;
    for value in &outputs {
        serde_json::to_writer(&mut writer, value)?;
        writer.write_all(b"\n").context("Failed to write output")?;
    }
    writer.flush().context("Failed to write output")?;

    if let Some(path) = &args.output {
        eprintln!(
            "✓ {} {} lines to: {}",
            match direction {
                Direction::Encode => "Encoded",
                Direction::Decode => "Decoded",
            },
            input.len(),
            path.display()
        );
    }

    Ok(())
}

/// Converts the input chunk by chunk, in input order.
fn convert(
    model: &AnyCodec,
    input: &JsonLines,
    direction: Direction,
    pb: Option<&ProgressBar>,
) -> Result<Vec<Value>> {
    let mut outputs = Vec::with_capacity(input.len());
    for (chunk_index, chunk) in input.values.chunks(CHUNK_SIZE).enumerate() {
        let start = chunk_index * CHUNK_SIZE;
        let converted = match direction {
            Direction::Encode => model.encode_values(chunk),
            Direction::Decode => model.decode_values(chunk),
        }
        .map_err(|e| input.locate(start, e))?;
        outputs.extend(converted);

        if let Some(pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }
    Ok(outputs)
}
