//! Codecs driven by JSON values.
//!
//! This is the boundary where values arrive untyped (files, other
//! languages). Out-of-domain values still become sentinels, but a value of
//! the wrong JSON type for the codec is rejected with
//! [`CodecError::TypeMismatch`].
//!
//! JSON shapes:
//! - range: number or null in; array of levels out, or null when the value
//!   could not be placed. Decoding null gives null.
//! - vocabulary: string or null in; integer token out.
//! - calendar: string or null in; array of six integer tokens out.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codecs::{CalendarCodec, LevelSet, RangeCodec, VocabularyCodec};
use crate::error::CodecError;
use crate::offset::Offset;
use crate::tokens::Token;
use crate::traits::{Codec, Fit};
use crate::CodecKind;

/// Any of the three codecs together with its offset.
///
/// This is also the persisted model format, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyCodec {
    Range(Offset<RangeCodec>),
    Vocabulary(Offset<VocabularyCodec>),
    Calendar(Offset<CalendarCodec>),
}

impl From<Offset<RangeCodec>> for AnyCodec {
    fn from(codec: Offset<RangeCodec>) -> Self {
        Self::Range(codec)
    }
}

impl From<Offset<VocabularyCodec>> for AnyCodec {
    fn from(codec: Offset<VocabularyCodec>) -> Self {
        Self::Vocabulary(codec)
    }
}

impl From<Offset<CalendarCodec>> for AnyCodec {
    fn from(codec: Offset<CalendarCodec>) -> Self {
        Self::Calendar(codec)
    }
}

fn as_number(value: &Value) -> Result<f64, CodecError> {
    match value {
        Value::Null => Ok(f64::NAN),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CodecError::type_mismatch("number or null", value)),
        other => Err(CodecError::type_mismatch("number or null", other)),
    }
}

fn as_text(value: &Value) -> Result<&str, CodecError> {
    match value {
        Value::Null => Ok(""),
        Value::String(s) => Ok(s),
        other => Err(CodecError::type_mismatch("string or null", other)),
    }
}

fn as_token(value: &Value) -> Result<Token, CodecError> {
    value
        .as_u64()
        .and_then(|t| Token::try_from(t).ok())
        .ok_or_else(|| CodecError::type_mismatch("non-negative integer token", value))
}

fn as_tokens(value: &Value) -> Result<Vec<Token>, CodecError> {
    match value {
        Value::Array(items) => items.iter().map(as_token).collect(),
        other => Err(CodecError::type_mismatch("array of tokens", other)),
    }
}

fn as_level_set(value: &Value) -> Result<LevelSet, CodecError> {
    match value {
        Value::Null => Ok(LevelSet::out_of_range()),
        other => as_tokens(other).map(LevelSet::from_levels),
    }
}

fn level_set_to_json(levels: LevelSet) -> Value {
    if levels.is_in_range() {
        Value::from(levels.into_levels())
    } else {
        Value::Null
    }
}

fn number_to_json(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Converts every element, reporting the index of the first failure.
fn convert_all<'a, T>(
    values: &'a [Value],
    convert: impl Fn(&'a Value) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            convert(value).map_err(|source| CodecError::Element {
                index,
                source: Box::new(source),
            })
        })
        .collect()
}

impl AnyCodec {
    pub fn kind(&self) -> CodecKind {
        match self {
            Self::Range(_) => CodecKind::Range,
            Self::Vocabulary(_) => CodecKind::Vocabulary,
            Self::Calendar(_) => CodecKind::Calendar,
        }
    }

    /// Whether encode/decode have state to work with. Calendars always do.
    pub fn is_fitted(&self) -> bool {
        match self {
            Self::Range(codec) => codec.inner().is_fitted(),
            Self::Vocabulary(codec) => codec.inner().is_fitted(),
            Self::Calendar(_) => true,
        }
    }

    pub fn offset(&self) -> Token {
        match self {
            Self::Range(codec) => codec.offset(),
            Self::Vocabulary(codec) => codec.offset(),
            Self::Calendar(codec) => codec.offset(),
        }
    }

    pub fn num_bits(&self) -> usize {
        match self {
            Self::Range(codec) => codec.num_bits(),
            Self::Vocabulary(codec) => codec.num_bits(),
            Self::Calendar(codec) => codec.num_bits(),
        }
    }

    pub fn max_active_features(&self) -> usize {
        match self {
            Self::Range(codec) => codec.max_active_features(),
            Self::Vocabulary(codec) => codec.max_active_features(),
            Self::Calendar(codec) => codec.max_active_features(),
        }
    }

    pub fn token_range(&self) -> Range<Token> {
        match self {
            Self::Range(codec) => codec.token_range(),
            Self::Vocabulary(codec) => codec.token_range(),
            Self::Calendar(codec) => codec.token_range(),
        }
    }

    /// Fits the codec on JSON samples. A no-op for calendars beyond type checks.
    pub fn fit_values(&mut self, values: &[Value]) -> Result<(), CodecError> {
        match self {
            Self::Range(codec) => {
                let numbers = convert_all(values, as_number)?;
                codec.fit(&numbers);
            }
            Self::Vocabulary(codec) => {
                let texts = convert_all(values, as_text)?;
                codec.fit(&texts);
            }
            Self::Calendar(_) => {
                convert_all(values, as_text)?;
            }
        }
        Ok(())
    }

    pub fn encode_value(&self, value: &Value) -> Result<Value, CodecError> {
        let encoded = match self {
            Self::Range(codec) => level_set_to_json(codec.encode(&as_number(value)?)),
            Self::Vocabulary(codec) => Value::from(codec.encode(as_text(value)?)),
            Self::Calendar(codec) => Value::from(codec.encode(as_text(value)?)),
        };
        Ok(encoded)
    }

    pub fn decode_value(&self, tokens: &Value) -> Result<Value, CodecError> {
        let decoded = match self {
            Self::Range(codec) => number_to_json(codec.decode(&as_level_set(tokens)?)),
            Self::Vocabulary(codec) => Value::from(codec.decode(&as_token(tokens)?)),
            Self::Calendar(codec) => Value::from(codec.decode(&as_tokens(tokens)?)),
        };
        Ok(decoded)
    }

    /// Batch form of [`AnyCodec::encode_value`]; every element is type-checked
    /// before any is encoded.
    pub fn encode_values(&self, values: &[Value]) -> Result<Vec<Value>, CodecError> {
        let encoded = match self {
            Self::Range(codec) => codec
                .encode_batch(&convert_all(values, as_number)?)
                .into_iter()
                .map(level_set_to_json)
                .collect(),
            Self::Vocabulary(codec) => codec
                .encode_batch(&convert_all(values, as_text)?)
                .into_iter()
                .map(Value::from)
                .collect(),
            Self::Calendar(codec) => codec
                .encode_batch(&convert_all(values, as_text)?)
                .into_iter()
                .map(Value::from)
                .collect(),
        };
        Ok(encoded)
    }

    /// Batch form of [`AnyCodec::decode_value`].
    pub fn decode_values(&self, tokens: &[Value]) -> Result<Vec<Value>, CodecError> {
        let decoded = match self {
            Self::Range(codec) => codec
                .decode_batch(&convert_all(tokens, as_level_set)?)
                .into_iter()
                .map(number_to_json)
                .collect(),
            Self::Vocabulary(codec) => codec
                .decode_batch(&convert_all(tokens, as_token)?)
                .into_iter()
                .map(Value::from)
                .collect(),
            Self::Calendar(codec) => codec
                .decode_batch(&convert_all(tokens, as_tokens)?)
                .into_iter()
                .map(Value::from)
                .collect(),
        };
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::tokens::{INVALID, MISSING};
    use serde_json::json;

    fn build(config: serde_json::Value) -> AnyCodec {
        serde_json::from_value::<CodecConfig>(config)
            .expect("valid config")
            .build()
            .expect("valid codec")
    }

    #[test]
    fn test_range_json_shapes() {
        let mut codec = build(json!({"kind": "range", "num_bits": 4, "offset": 10}));
        codec
            .fit_values(&[json!(0.0), json!(1), Value::Null])
            .expect("numbers");

        assert_eq!(codec.encode_value(&json!(0.75)).expect("number"), json!([10, 11]));
        assert_eq!(codec.encode_value(&json!(0.0)).expect("number"), json!([]));
        assert_eq!(codec.encode_value(&json!(7)).expect("number"), Value::Null);
        assert_eq!(codec.encode_value(&Value::Null).expect("null"), Value::Null);

        assert_eq!(codec.decode_value(&Value::Null).expect("null"), Value::Null);
        let low = codec.decode_value(&json!([])).expect("levels");
        assert_eq!(low, json!(0.03125));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let mut range = build(json!({"kind": "range"}));
        assert!(matches!(
            range.fit_values(&[json!(1.0), json!("two")]),
            Err(CodecError::Element { index: 1, .. })
        ));
        assert!(matches!(
            range.encode_value(&json!("1.5")),
            Err(CodecError::TypeMismatch { .. })
        ));

        let vocab = build(json!({"kind": "vocabulary", "categories": ["a"]}));
        assert!(vocab.encode_value(&json!(3)).is_err());
        assert!(vocab.decode_value(&json!(-1)).is_err());
        assert!(vocab.decode_value(&json!("2")).is_err());

        let calendar = build(json!({"kind": "calendar"}));
        assert!(calendar.encode_value(&json!(20230515)).is_err());
        assert!(calendar.decode_value(&json!(5)).is_err());
    }

    #[test]
    fn test_vocabulary_null_is_missing() {
        let mut codec = build(json!({"kind": "vocabulary"}));
        codec
            .fit_values(&[json!("red"), Value::Null, json!("blue")])
            .expect("strings");
        assert_eq!(codec.num_bits(), 4);
        assert_eq!(codec.encode_value(&Value::Null).expect("null"), json!(0));
        assert_eq!(codec.decode_value(&json!(0)).expect("token"), json!(MISSING));
        assert_eq!(codec.encode_value(&json!("red")).expect("string"), json!(3));
    }

    #[test]
    fn test_calendar_wrong_arity_is_placeholder() {
        let codec = build(json!({"kind": "calendar", "min_year": 2020, "max_year": 2030}));
        let decoded = codec.decode_value(&json!([5, 18, 41])).expect("tokens");
        assert_eq!(decoded, json!(INVALID));
    }

    #[test]
    fn test_batch_matches_scalar() {
        let mut codec = build(json!({"kind": "range", "num_bits": 10}));
        let values = vec![json!(-1.0), json!(0.5), json!(2.0), Value::Null, json!(1.0)];
        codec.fit_values(&values).expect("numbers");

        let batch = codec.encode_values(&values).expect("numbers");
        let scalar: Vec<Value> = values
            .iter()
            .map(|v| codec.encode_value(v).expect("number"))
            .collect();
        assert_eq!(batch, scalar);

        let decoded = codec.decode_values(&batch).expect("tokens");
        let scalar: Vec<Value> = batch
            .iter()
            .map(|t| codec.decode_value(t).expect("tokens"))
            .collect();
        assert_eq!(decoded, scalar);
    }

    #[test]
    fn test_model_round_trip() {
        let mut codec = build(json!({"kind": "vocabulary", "offset": 2}));
        codec.fit_values(&[json!("x"), json!("y")]).expect("strings");

        let model = serde_json::to_value(&codec).expect("serializable");
        assert_eq!(
            model,
            json!({"kind": "vocabulary", "offset": 2, "vocabulary": ["x", "y"]})
        );
        let restored: AnyCodec = serde_json::from_value(model).expect("valid model");
        assert_eq!(restored, codec);

        let calendar = build(json!({"kind": "calendar", "offset": 1}));
        let model = serde_json::to_string(&calendar).expect("serializable");
        let restored: AnyCodec = serde_json::from_str(&model).expect("valid model");
        assert_eq!(restored.token_range(), 1..297);
    }
}
