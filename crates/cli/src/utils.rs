use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use zeichenformer_codec::{AnyCodec, CodecError};

pub fn load_model(path: &Path) -> Result<AnyCodec> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open model {}", path.display()))?;
    let model = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to read model {}", path.display()))?;
    Ok(model)
}

pub fn save_model(model: &AnyCodec, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(model)?;
    std::fs::write(path, content + "\n")
        .with_context(|| format!("Failed to write model {}", path.display()))?;
    Ok(())
}

/// JSON values read from a JSON-lines source, with their 1-based line numbers.
///
/// Blank lines are skipped.
pub struct JsonLines {
    pub values: Vec<Value>,
    pub line_numbers: Vec<usize>,
}

impl JsonLines {
    pub fn read(input: Option<&PathBuf>) -> Result<Self> {
        let reader: Box<dyn BufRead> = match input {
            Some(path) => Box::new(BufReader::new(
                File::open(path)
                    .with_context(|| format!("Failed to open input {}", path.display()))?,
            )),
            None => Box::new(BufReader::new(io::stdin().lock())),
        };

        let mut values = Vec::new();
        let mut line_numbers = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.context("Failed to read input")?;
            if line.trim().is_empty() {
                continue;
            }
            let value = serde_json::from_str(&line)
                .with_context(|| format!("Line {}: not valid JSON", i + 1))?;
            values.push(value);
            line_numbers.push(i + 1);
        }
        Ok(Self {
            values,
            line_numbers,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Rewrites an element error from a codec batch call so it names the
    /// input line; `start` is the index of the batch's first value.
    pub fn locate(&self, start: usize, err: CodecError) -> anyhow::Error {
        match err {
            CodecError::Element { index, source } => {
                let line = self.line_numbers.get(start + index).copied().unwrap_or(0);
                anyhow::anyhow!("Line {line}: {source}")
            }
            other => other.into(),
        }
    }
}

pub fn open_output(output: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    Ok(writer)
}
