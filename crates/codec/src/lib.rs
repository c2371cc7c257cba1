//! Feature tokenization library.
//!
//! Turns tabular feature values (real numbers, categorical strings and
//! timestamps) into small sets of integer tokens for an embedding lookup,
//! and maps tokens back to approximate values.

mod codecs;
mod config;
mod dynamic;
mod error;
mod offset;
mod tokens;
mod traits;

pub use codecs::{
    CalendarBounds, CalendarCodec, Field, FieldLayout, FittedRange, LevelSet, RangeCodec,
    Vocabulary, VocabularyCodec, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR, DEFAULT_NUM_BITS,
    MAX_NUM_BITS, MISSING_TOKEN, NUM_FIELDS, UNKNOWN_TOKEN,
};
pub use config::CodecConfig;
pub use dynamic::AnyCodec;
pub use error::CodecError as Error;
pub use error::CodecError;
pub use offset::{Offset, TokenSpace, MAX_OFFSET};
pub use tokens::{Token, TokenShift, INVALID, MISSING, UNKNOWN};
pub use traits::{Codec, Fit};

use serde::{Deserialize, Serialize};

/// The available codec families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// Real numbers, bisection levels.
    Range,
    /// Categorical strings, one token each.
    Vocabulary,
    /// `YYYY-MM-DDTHH:MM:SS` timestamps, one token per field.
    Calendar,
}

impl CodecKind {
    pub const ALL: [CodecKind; 3] = [Self::Range, Self::Vocabulary, Self::Calendar];
}

impl std::fmt::Display for CodecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Range => write!(f, "range"),
            Self::Vocabulary => write!(f, "vocabulary"),
            Self::Calendar => write!(f, "calendar"),
        }
    }
}

impl std::str::FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "range" | "numerical" => Ok(Self::Range),
            "vocabulary" | "category" => Ok(Self::Vocabulary),
            "calendar" | "timestamp" => Ok(Self::Calendar),
            _ => Err(format!(
                "Unknown codec kind: {s}. Available: range, vocabulary, calendar"
            )),
        }
    }
}
