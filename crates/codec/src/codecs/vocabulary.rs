//! Category strings as dense ids into a sorted vocabulary.
//!
//! Token layout:
//! - `0`: missing value (empty string)
//! - `1`: category not seen during fitting
//! - `2..2 + n`: the `n` fitted categories in byte-wise order

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CodecError;
use crate::tokens::{Token, INVALID, MISSING, UNKNOWN};
use crate::traits::{Codec, Fit};

pub const MISSING_TOKEN: Token = 0;
pub const UNKNOWN_TOKEN: Token = 1;
const FIRST_CATEGORY: Token = 2;

/// Sorted, duplicate-free set of non-empty category strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    categories: Vec<String>,
}

impl Vocabulary {
    /// Builds a vocabulary from raw values: empty strings are dropped,
    /// duplicates removed and the rest sorted byte-wise.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories: Vec<String> = values
            .into_iter()
            .filter(|v| !v.as_ref().is_empty())
            .map(|v| v.as_ref().to_owned())
            .collect();
        categories.sort_unstable();
        categories.dedup();
        Self { categories }
    }

    /// Position of `value` in the vocabulary.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.categories.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.categories
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = CodecError;

    fn try_from(categories: Vec<String>) -> Result<Self, Self::Error> {
        if categories.iter().any(String::is_empty) {
            return Err(CodecError::Config(
                "vocabulary must not contain the empty string".into(),
            ));
        }
        if let Some(pair) = categories.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CodecError::Config(format!(
                "vocabulary is not strictly increasing at {:?} >= {:?}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { categories })
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.categories
    }
}

/// Codec for categorical string features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyCodec {
    vocabulary: Option<Vocabulary>,
}

impl VocabularyCodec {
    /// Creates an unfitted codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fitted codec from a precomputed category list, bypassing `fit`.
    ///
    /// The codec counts as fitted even if no non-empty category remains, so
    /// every non-empty value encodes to the unknown token.
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            vocabulary: Some(Vocabulary::from_values(categories)),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    /// Number of fitted categories, excluding sentinels.
    pub fn num_categories(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, Vocabulary::len)
    }

    /// Decodes a token without allocating.
    pub fn decode_str(&self, token: Token) -> &str {
        let Some(vocabulary) = &self.vocabulary else {
            return INVALID;
        };
        match token {
            MISSING_TOKEN => MISSING,
            UNKNOWN_TOKEN => UNKNOWN,
            t => vocabulary.get(t - FIRST_CATEGORY).unwrap_or(INVALID),
        }
    }
}

impl Codec for VocabularyCodec {
    type Value = str;
    type Tokens = Token;
    type Decoded = String;

    fn encode(&self, value: &str) -> Token {
        if value.is_empty() {
            return MISSING_TOKEN;
        }
        match &self.vocabulary {
            None => MISSING_TOKEN,
            Some(vocabulary) => vocabulary
                .position(value)
                .map_or(UNKNOWN_TOKEN, |i| i + FIRST_CATEGORY),
        }
    }

    fn decode(&self, token: &Token) -> String {
        self.decode_str(*token).to_owned()
    }

    fn invalid(&self) -> String {
        INVALID.to_owned()
    }

    fn num_bits(&self) -> usize {
        self.num_categories() + FIRST_CATEGORY
    }

    /// Missing, unknown and a real category are mutually exclusive.
    fn max_active_features(&self) -> usize {
        3
    }
}

impl Fit for VocabularyCodec {
    type Sample = str;

    fn fit<S>(&mut self, samples: &[S])
    where
        S: Borrow<str>,
    {
        if samples.is_empty() {
            warn!("No samples, vocabulary codec left unfitted");
            self.vocabulary = None;
            return;
        }
        let vocabulary = Vocabulary::from_values(samples.iter().map(<S as Borrow<str>>::borrow));
        if vocabulary.is_empty() {
            warn!(
                samples = samples.len(),
                "Only missing values, every category will encode as unknown"
            );
        } else {
            debug!(
                samples = samples.len(),
                categories = vocabulary.len(),
                "Fitted vocabulary codec"
            );
        }
        self.vocabulary = Some(vocabulary);
    }
}
