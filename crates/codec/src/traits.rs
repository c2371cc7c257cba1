use std::borrow::Borrow;

use rayon::prelude::*;

use crate::tokens::TokenShift;

/// Core trait for feature codecs.
///
/// Every codec maps a raw feature value to tokens and back:
/// 1.  `encode`: Take a value and turn it into token ids.
/// 2.  `decode`: Take token ids and turn them back into a value (or a placeholder).
///
/// Neither direction fails: values a codec cannot represent become sentinel
/// tokens, and tokens it cannot map back become [`Codec::invalid`].
pub trait Codec: Sync {
    /// Raw feature value accepted by `encode`.
    type Value: ?Sized + Sync;
    /// Encoded form of a single value.
    type Tokens: TokenShift + Send + Sync;
    /// Decoded form of a single value.
    type Decoded: Send;

    fn encode(&self, value: &Self::Value) -> Self::Tokens;
    fn decode(&self, tokens: &Self::Tokens) -> Self::Decoded;

    /// Placeholder returned for tokens that do not belong to this codec.
    fn invalid(&self) -> Self::Decoded;

    /// Number of distinct token ids this codec can emit.
    fn num_bits(&self) -> usize;

    /// Upper bound on the number of tokens active for one encoded value.
    fn max_active_features(&self) -> usize;

    /// Encode many values on the rayon pool. Output order matches input order.
    fn encode_batch<V>(&self, values: &[V]) -> Vec<Self::Tokens>
    where
        V: Borrow<Self::Value> + Sync,
    {
        values
            .par_iter()
            .map(|v| self.encode(<V as Borrow<Self::Value>>::borrow(v)))
            .collect()
    }

    /// Decode many token groups on the rayon pool. Output order matches input order.
    fn decode_batch(&self, tokens: &[Self::Tokens]) -> Vec<Self::Decoded> {
        tokens.par_iter().map(|t| self.decode(t)).collect()
    }
}

/// Codecs whose token space is learned from sample data.
///
/// A call to `fit` replaces any previously fitted state as a whole.
pub trait Fit {
    type Sample: ?Sized;

    fn fit<S>(&mut self, samples: &[S])
    where
        S: Borrow<Self::Sample>;
}
