//! Shared default values for the command-line tool.

pub const MODEL_PATH: &str = "model.json";

/// Lines handed to the codec per batch; also the progress bar step.
pub const CHUNK_SIZE: usize = 65_536;
