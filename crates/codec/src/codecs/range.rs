//! Numeric values as sparse sets of bisection levels.
//!
//! The fitted interval `[min, max]` is halved `num_bits` times. Level `k` is
//! active when the value fell into the upper half at the `k`-th halving, so a
//! value is encoded as the (ordered) set of its active levels and decoded as
//! the midpoint of the cell those choices lead to.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CodecError;
use crate::tokens::{Token, TokenShift};
use crate::traits::{Codec, Fit};

/// Bisection depth used when none is configured.
pub const DEFAULT_NUM_BITS: usize = 8;

/// Deepest accepted bisection. An f64 interval stops splitting long before
/// this (at most ~2100 halvings from the widest finite range down to
/// subnormal spacing).
pub const MAX_NUM_BITS: usize = 2048;

/// Bounds learned by [`RangeCodec::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedRange {
    min: f64,
    max: f64,
}

impl FittedRange {
    /// Bounds over the finite samples, or `None` if there are none.
    fn from_samples(samples: impl IntoIterator<Item = f64>) -> Option<Self> {
        samples
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Self { min: v, max: v }),
                Some(r) => Some(Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

/// Output of the range codec.
///
/// `levels` holds the active bisection levels in increasing order. An empty
/// set is a legitimate encoding (the lowest cell of the range), so values the
/// codec could not place carry `in_range == false` as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSet {
    levels: Vec<Token>,
    in_range: bool,
}

impl LevelSet {
    /// The empty set emitted for NaN, out-of-range values and unfitted codecs.
    pub fn out_of_range() -> Self {
        Self {
            levels: Vec::new(),
            in_range: false,
        }
    }

    /// Wraps levels received from outside the codec (e.g. a model's output).
    pub fn from_levels(levels: Vec<Token>) -> Self {
        Self {
            levels,
            in_range: true,
        }
    }

    pub fn levels(&self) -> &[Token] {
        &self.levels
    }

    pub fn into_levels(self) -> Vec<Token> {
        self.levels
    }

    pub fn is_in_range(&self) -> bool {
        self.in_range
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl TokenShift for LevelSet {
    fn shift_up(&self, offset: Token) -> Self {
        Self {
            levels: self.levels.shift_up(offset),
            in_range: self.in_range,
        }
    }

    fn shift_down(&self, offset: Token) -> Option<Self> {
        Some(Self {
            levels: self.levels.shift_down(offset)?,
            in_range: self.in_range,
        })
    }
}

#[inline]
fn midpoint(lo: f64, hi: f64) -> f64 {
    // halves first so that ranges spanning most of f64 do not overflow
    lo / 2.0 + hi / 2.0
}

/// Codec for real-valued features based on recursive interval bisection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRangeCodec")]
pub struct RangeCodec {
    num_bits: usize,
    fitted: Option<FittedRange>,
}

#[derive(Deserialize)]
struct RawRangeCodec {
    num_bits: usize,
    fitted: Option<FittedRange>,
}

impl TryFrom<RawRangeCodec> for RangeCodec {
    type Error = CodecError;

    fn try_from(raw: RawRangeCodec) -> Result<Self, Self::Error> {
        let mut codec = RangeCodec::new(raw.num_bits)?;
        if let Some(range) = raw.fitted {
            if !(range.min.is_finite() && range.max.is_finite() && range.min <= range.max) {
                return Err(CodecError::Config(format!(
                    "fitted range [{}, {}] is not a finite interval",
                    range.min, range.max
                )));
            }
            codec.fitted = Some(range);
        }
        Ok(codec)
    }
}

impl Default for RangeCodec {
    fn default() -> Self {
        Self {
            num_bits: DEFAULT_NUM_BITS,
            fitted: None,
        }
    }
}

impl RangeCodec {
    /// Creates an unfitted codec with the given bisection depth.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Config`] if `num_bits` is zero or above
    /// [`MAX_NUM_BITS`].
    pub fn new(num_bits: usize) -> Result<Self, CodecError> {
        if num_bits == 0 {
            return Err(CodecError::Config(
                "range codec needs at least one bisection level".into(),
            ));
        }
        if num_bits > MAX_NUM_BITS {
            return Err(CodecError::Config(format!(
                "range codec depth {num_bits} exceeds the maximum of {MAX_NUM_BITS}"
            )));
        }
        Ok(Self {
            num_bits,
            fitted: None,
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Fitted `(min, max)`, if any.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.fitted.map(|r| (r.min, r.max))
    }

    /// Decodes raw levels, treating them as an in-range encoding.
    pub fn decode_levels(&self, levels: &[Token]) -> f64 {
        let Some(range) = self.fitted else {
            return f64::NAN;
        };
        if levels.iter().any(|&l| l >= self.num_bits) {
            return f64::NAN;
        }
        if range.is_degenerate() {
            return range.min;
        }

        let mut active = vec![false; self.num_bits];
        for &level in levels {
            active[level] = true;
        }

        let (mut lo, mut hi) = (range.min, range.max);
        for upper in active {
            let mid = midpoint(lo, hi);
            if upper {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        midpoint(lo, hi)
    }
}

impl Codec for RangeCodec {
    type Value = f64;
    type Tokens = LevelSet;
    type Decoded = f64;

    fn encode(&self, value: &f64) -> LevelSet {
        let value = *value;
        let Some(range) = self.fitted else {
            return LevelSet::out_of_range();
        };
        // NaN fails `contains` as well
        if !range.contains(value) {
            return LevelSet::out_of_range();
        }
        if range.is_degenerate() {
            return LevelSet::from_levels(Vec::new());
        }

        let (mut lo, mut hi) = (range.min, range.max);
        let mut levels = Vec::with_capacity(self.num_bits);
        for level in 0..self.num_bits {
            let mid = midpoint(lo, hi);
            if value >= mid {
                levels.push(level);
                lo = mid;
            } else {
                hi = mid;
            }
        }
        LevelSet::from_levels(levels)
    }

    fn decode(&self, tokens: &LevelSet) -> f64 {
        if !tokens.in_range {
            return f64::NAN;
        }
        self.decode_levels(&tokens.levels)
    }

    fn invalid(&self) -> f64 {
        f64::NAN
    }

    fn num_bits(&self) -> usize {
        self.num_bits
    }

    fn max_active_features(&self) -> usize {
        self.num_bits
    }
}

impl Fit for RangeCodec {
    type Sample = f64;

    fn fit<S>(&mut self, samples: &[S])
    where
        S: Borrow<f64>,
    {
        let fitted =
            FittedRange::from_samples(samples.iter().map(<S as Borrow<f64>>::borrow).copied());
        match fitted {
            Some(range) => debug!(
                samples = samples.len(),
                min = range.min,
                max = range.max,
                num_bits = self.num_bits,
                "Fitted range codec"
            ),
            None => warn!(
                samples = samples.len(),
                "No finite samples, range codec left unfitted"
            ),
        }
        self.fitted = fitted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn fitted(num_bits: usize, samples: &[f64]) -> RangeCodec {
        let mut codec = RangeCodec::new(num_bits).expect("valid depth");
        codec.fit(samples);
        codec
    }

    #[test]
    fn test_zero_bits_rejected() {
        assert!(matches!(RangeCodec::new(0), Err(CodecError::Config(_))));
    }

    #[test]
    fn test_depth_limit() {
        assert!(RangeCodec::new(MAX_NUM_BITS).is_ok());
        assert!(matches!(
            RangeCodec::new(MAX_NUM_BITS + 1),
            Err(CodecError::Config(_))
        ));

        let huge = format!(
            r#"{{"num_bits":{},"fitted":{{"min":0.0,"max":1.0}}}}"#,
            usize::MAX
        );
        assert!(serde_json::from_str::<RangeCodec>(&huge).is_err());

        let deepest = fitted(MAX_NUM_BITS, &[0.0, 1.0]);
        let tokens = deepest.encode(&0.3);
        assert!((deepest.decode(&tokens) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_fit_ignores_nan() {
        let codec = fitted(8, &[f64::NAN, -2.0, 5.0, f64::NAN, 1.0]);
        assert_eq!(codec.bounds(), Some((-2.0, 5.0)));
    }

    #[test]
    fn test_empty_fit_leaves_unfitted() {
        let codec = fitted(8, &[] as &[f64]);
        assert!(!codec.is_fitted());

        let codec = fitted(8, &[f64::NAN, f64::INFINITY]);
        assert!(!codec.is_fitted());
        assert_eq!(codec.encode(&1.0), LevelSet::out_of_range());
        assert!(codec.decode(&LevelSet::from_levels(vec![0])).is_nan());
    }

    #[test]
    fn test_encode_upper_half_levels() {
        let codec = fitted(4, &[0.0, 1.0]);
        // 0.75: upper, upper (tie at 0.75), lower, lower
        assert_eq!(codec.encode(&0.75).levels(), &[0, 1]);
        // tie at the first midpoint resolves upward
        assert_eq!(codec.encode(&0.5).levels(), &[0]);
        // last cell [0, 0.125] splits at 0.0625
        assert_eq!(codec.encode(&0.1).levels(), &[3]);
        assert_eq!(codec.encode(&0.05).levels(), &[] as &[Token]);
    }

    #[test]
    fn test_encode_bounds() {
        let codec = fitted(6, &[-3.0, 9.0]);

        let low = codec.encode(&-3.0);
        assert!(low.is_in_range());
        assert!(low.is_empty());
        assert!((codec.decode(&low) - -3.0).abs() <= 12.0 / 2f64.powi(7));

        let high = codec.encode(&9.0);
        assert_eq!(high.levels(), &[0, 1, 2, 3, 4, 5]);
        assert!((codec.decode(&high) - 9.0).abs() <= 12.0 / 2f64.powi(7));
    }

    #[test]
    fn test_out_of_range_and_nan() {
        let codec = fitted(8, &[0.0, 1.0]);
        for value in [-0.001, 1.001, f64::NAN, f64::INFINITY] {
            let encoded = codec.encode(&value);
            assert!(encoded.is_empty());
            assert!(!encoded.is_in_range());
            assert!(codec.decode(&encoded).is_nan());
        }
    }

    #[test]
    fn test_degenerate_range() {
        let codec = fitted(8, &[3.0, 3.0]);
        let encoded = codec.encode(&3.0);
        assert!(encoded.is_empty());
        assert!(encoded.is_in_range());
        assert_eq!(codec.decode(&encoded), 3.0);
        assert!(!codec.encode(&3.5).is_in_range());
    }

    #[test]
    fn test_decode_rejects_levels_beyond_depth() {
        let codec = fitted(4, &[0.0, 1.0]);
        assert!(codec.decode_levels(&[0, 4]).is_nan());
    }

    #[test]
    fn test_decode_ignores_duplicate_and_unordered_levels() {
        let codec = fitted(4, &[0.0, 1.0]);
        assert_eq!(codec.decode_levels(&[1, 0, 1]), codec.decode_levels(&[0, 1]));
    }

    #[test]
    fn test_round_trip_error_bound() {
        let mut rng = rand::thread_rng();
        let samples: Vec<f64> = (0..1000).map(|_| rng.gen_range(-1.0..1.0)).collect();
        for num_bits in [1, 8, 24] {
            let codec = fitted(num_bits, &samples);
            let (min, max) = codec.bounds().expect("fitted");
            let bound = (max - min) / 2f64.powi(num_bits as i32 + 1);
            for &value in samples.iter().chain([min, max].iter()) {
                let decoded = codec.decode(&codec.encode(&value));
                assert!(
                    (decoded - value).abs() <= bound + 1e-12,
                    "{value} decoded to {decoded} with {num_bits} bits"
                );
            }
        }
    }

    #[test]
    fn test_batch_matches_scalar() {
        let codec = fitted(12, &[-10.0, 10.0]);
        let values = vec![-10.0, -1.0, -0.245, 0.0, 0.173, 10.0, 13.0, f64::NAN];
        let encoded = codec.encode_batch(&values);
        let scalar: Vec<LevelSet> = values.iter().map(|v| codec.encode(v)).collect();
        assert_eq!(encoded, scalar);

        let decoded = codec.decode_batch(&encoded);
        for (batch, single) in decoded.iter().zip(encoded.iter().map(|t| codec.decode(t))) {
            assert!(batch == &single || (batch.is_nan() && single.is_nan()));
        }
    }

    #[test]
    fn test_refit_replaces_state() {
        let mut codec = fitted(8, &[0.0, 1.0]);
        let before = codec.encode(&0.3);

        codec.fit(&[10.0, 20.0]);
        assert!(!codec.encode(&0.3).is_in_range());

        codec.fit(&[0.0, 1.0]);
        assert_eq!(codec.encode(&0.3), before);

        codec.fit(&[] as &[f64]);
        assert!(!codec.is_fitted());
    }

    #[test]
    fn test_deserialize_validates() {
        let bad_depth = r#"{"num_bits":0,"fitted":null}"#;
        assert!(serde_json::from_str::<RangeCodec>(bad_depth).is_err());

        let inverted = r#"{"num_bits":4,"fitted":{"min":2.0,"max":1.0}}"#;
        assert!(serde_json::from_str::<RangeCodec>(inverted).is_err());

        let codec = fitted(4, &[0.0, 1.0]);
        let json = serde_json::to_string(&codec).expect("serializable");
        let restored: RangeCodec = serde_json::from_str(&json).expect("valid model");
        assert_eq!(restored, codec);
    }
}
