//! Constant id offsets, so several codecs can share one embedding table.

use std::borrow::Borrow;
use std::ops::Range;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CodecError;
use crate::tokens::{Token, TokenShift};
use crate::traits::{Codec, Fit};

/// Largest accepted offset.
///
/// Every codec's own token space is far smaller than `usize::MAX / 2`, so
/// shifting by at most this much never overflows.
pub const MAX_OFFSET: Token = Token::MAX / 2;

fn check_offset(offset: Token) -> Result<Token, CodecError> {
    if offset > MAX_OFFSET {
        return Err(CodecError::Config(format!(
            "offset {offset} exceeds the maximum of {MAX_OFFSET}"
        )));
    }
    Ok(offset)
}

fn deserialize_offset<'de, D>(deserializer: D) -> Result<Token, D::Error>
where
    D: Deserializer<'de>,
{
    let offset = Token::deserialize(deserializer)?;
    check_offset(offset).map_err(serde::de::Error::custom)
}

/// A codec whose tokens are shifted by a constant.
///
/// Encoding adds `offset` to every emitted token; decoding subtracts it before
/// handing the tokens to the wrapped codec. Tokens below the offset belong to
/// some other codec and decode to the wrapped codec's invalid placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offset<C> {
    #[serde(deserialize_with = "deserialize_offset")]
    offset: Token,
    #[serde(flatten)]
    codec: C,
}

impl<C> Offset<C> {
    /// Wraps `codec` so its tokens start at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Config`] if `offset` is above [`MAX_OFFSET`].
    pub fn new(codec: C, offset: Token) -> Result<Self, CodecError> {
        Ok(Self {
            offset: check_offset(offset)?,
            codec,
        })
    }

    pub fn offset(&self) -> Token {
        self.offset
    }

    pub fn inner(&self) -> &C {
        &self.codec
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.codec
    }

    pub fn into_inner(self) -> C {
        self.codec
    }
}

impl<C: Codec> Offset<C> {
    /// Ids this codec occupies in the shared token space.
    pub fn token_range(&self) -> Range<Token> {
        self.offset..self.offset + self.codec.num_bits()
    }
}

impl<C: Codec> Codec for Offset<C> {
    type Value = C::Value;
    type Tokens = C::Tokens;
    type Decoded = C::Decoded;

    fn encode(&self, value: &C::Value) -> C::Tokens {
        let tokens = self.codec.encode(value);
        if self.offset == 0 {
            return tokens;
        }
        tokens.shift_up(self.offset)
    }

    fn decode(&self, tokens: &C::Tokens) -> C::Decoded {
        if self.offset == 0 {
            return self.codec.decode(tokens);
        }
        match tokens.shift_down(self.offset) {
            Some(local) => self.codec.decode(&local),
            None => self.codec.invalid(),
        }
    }

    fn invalid(&self) -> C::Decoded {
        self.codec.invalid()
    }

    fn num_bits(&self) -> usize {
        self.codec.num_bits()
    }

    fn max_active_features(&self) -> usize {
        self.codec.max_active_features()
    }
}

impl<C: Fit> Fit for Offset<C> {
    type Sample = C::Sample;

    fn fit<S>(&mut self, samples: &[S])
    where
        S: Borrow<C::Sample>,
    {
        self.codec.fit(samples);
    }
}

/// Lays codecs out back-to-back in one flat token space.
///
/// Place codecs after fitting them: a vocabulary's size is only known once
/// it has seen its data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenSpace {
    next: Token,
}

impl TokenSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A space whose first codec starts at `offset` (e.g. after reserved ids).
    pub fn starting_at(offset: Token) -> Self {
        Self { next: offset }
    }

    /// Wraps `codec` with the next free offset and reserves its ids.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Config`] once the space has grown past
    /// [`MAX_OFFSET`].
    pub fn place<C: Codec>(&mut self, codec: C) -> Result<Offset<C>, CodecError> {
        let placed = Offset::new(codec, self.next)?;
        self.next += placed.num_bits();
        Ok(placed)
    }

    /// Embedding table rows needed for everything placed so far.
    pub fn size(&self) -> usize {
        self.next
    }
}
