//! Construction-time configuration for codecs.
//!
//! A configuration can be read from JSON, e.g.
//! `{"kind": "calendar", "min_year": 2020, "max_year": 2030, "offset": 17}`;
//! omitted options take their defaults.

use serde::{Deserialize, Serialize};

use crate::codecs::{
    CalendarCodec, RangeCodec, VocabularyCodec, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR,
    DEFAULT_NUM_BITS,
};
use crate::dynamic::AnyCodec;
use crate::error::CodecError;
use crate::offset::Offset;
use crate::tokens::Token;
use crate::CodecKind;

/// Options recognised when constructing a codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CodecConfig {
    Range {
        /// Bisection depth
        #[serde(default = "default_num_bits")]
        num_bits: usize,
        #[serde(default)]
        offset: Token,
    },
    Vocabulary {
        #[serde(default)]
        offset: Token,
        /// Precomputed vocabulary; the codec starts fitted when present
        #[serde(default)]
        categories: Option<Vec<String>>,
    },
    Calendar {
        #[serde(default = "default_min_year")]
        min_year: u16,
        #[serde(default = "default_max_year")]
        max_year: u16,
        #[serde(default)]
        offset: Token,
    },
}

fn default_num_bits() -> usize {
    DEFAULT_NUM_BITS
}

fn default_min_year() -> u16 {
    DEFAULT_MIN_YEAR
}

fn default_max_year() -> u16 {
    DEFAULT_MAX_YEAR
}

impl CodecConfig {
    /// Default options for `kind`.
    pub fn defaults(kind: CodecKind) -> Self {
        match kind {
            CodecKind::Range => Self::Range {
                num_bits: DEFAULT_NUM_BITS,
                offset: 0,
            },
            CodecKind::Vocabulary => Self::Vocabulary {
                offset: 0,
                categories: None,
            },
            CodecKind::Calendar => Self::Calendar {
                min_year: DEFAULT_MIN_YEAR,
                max_year: DEFAULT_MAX_YEAR,
                offset: 0,
            },
        }
    }

    pub fn kind(&self) -> CodecKind {
        match self {
            Self::Range { .. } => CodecKind::Range,
            Self::Vocabulary { .. } => CodecKind::Vocabulary,
            Self::Calendar { .. } => CodecKind::Calendar,
        }
    }

    /// Validates the options and constructs the codec.
    pub fn build(&self) -> Result<AnyCodec, CodecError> {
        let codec = match self {
            Self::Range { num_bits, offset } => {
                AnyCodec::Range(Offset::new(RangeCodec::new(*num_bits)?, *offset)?)
            }
            Self::Vocabulary { offset, categories } => {
                let codec = match categories {
                    Some(categories) => VocabularyCodec::with_categories(categories),
                    None => VocabularyCodec::new(),
                };
                AnyCodec::Vocabulary(Offset::new(codec, *offset)?)
            }
            Self::Calendar {
                min_year,
                max_year,
                offset,
            } => AnyCodec::Calendar(Offset::new(
                CalendarCodec::new(*min_year, *max_year)?,
                *offset,
            )?),
        };
        Ok(codec)
    }
}
