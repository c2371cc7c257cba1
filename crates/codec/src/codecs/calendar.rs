//! Timestamps as six per-field tokens.
//!
//! A timestamp `YYYY-MM-DDTHH:MM:SS` is split into year, month, day, hour,
//! minute and second. Each field owns a fixed-capacity sub-range of one flat
//! token space; the sub-ranges are laid out in field order, so every base
//! after the year depends on the configured year span.
//!
//! | field  | leading sentinels             | values         | trailing sentinel |
//! |--------|-------------------------------|----------------|-------------------|
//! | year   | below minimum, above maximum  | min..=max year | malformed input   |
//! | month  |                               | 1..=12         | invalid           |
//! | day    |                               | 1..=31         | invalid           |
//! | hour   |                               | 0..=23         | invalid           |
//! | minute |                               | 0..=59         | invalid           |
//! | second |                               | 0..=59         | invalid           |

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::tokens::{Token, INVALID};
use crate::traits::Codec;

pub const DEFAULT_MIN_YEAR: u16 = 2000;
pub const DEFAULT_MAX_YEAR: u16 = 2100;
const MAX_REPRESENTABLE_YEAR: u16 = 9999;

/// Number of tokens per encoded timestamp.
pub const NUM_FIELDS: usize = 6;

/// Byte offsets of the digit groups in `YYYY-MM-DDTHH:MM:SS`.
const GROUPS: [(usize, usize); NUM_FIELDS] =
    [(0, 4), (5, 7), (8, 10), (11, 13), (14, 16), (17, 19)];
const SEPARATORS: [(usize, u8); 5] = [(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':')];
const TIMESTAMP_LEN: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Field {
    pub const ALL: [Field; NUM_FIELDS] = [
        Field::Year,
        Field::Month,
        Field::Day,
        Field::Hour,
        Field::Minute,
        Field::Second,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year => write!(f, "year"),
            Self::Month => write!(f, "month"),
            Self::Day => write!(f, "day"),
            Self::Hour => write!(f, "hour"),
            Self::Minute => write!(f, "minute"),
            Self::Second => write!(f, "second"),
        }
    }
}

/// Inclusive year bounds of a calendar codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarBounds {
    pub min_year: u16,
    pub max_year: u16,
}

impl Default for CalendarBounds {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
            max_year: DEFAULT_MAX_YEAR,
        }
    }
}

impl CalendarBounds {
    fn validate(&self) -> Result<(), CodecError> {
        if self.min_year > self.max_year {
            return Err(CodecError::Config(format!(
                "min_year {} is greater than max_year {}",
                self.min_year, self.max_year
            )));
        }
        if self.max_year > MAX_REPRESENTABLE_YEAR {
            return Err(CodecError::Config(format!(
                "max_year {} does not fit in four digits",
                self.max_year
            )));
        }
        Ok(())
    }

    fn span(&self) -> u16 {
        self.max_year - self.min_year + 1
    }
}

/// Position of one field's sub-range in the codec's token space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldLayout {
    field: Field,
    base: Token,
    /// Sentinels placed below the valid zone (only the year has any).
    leading: usize,
    /// Smallest valid value.
    low: u16,
    /// Number of valid values.
    count: u16,
}

impl FieldLayout {
    fn new(field: Field, base: Token, bounds: CalendarBounds) -> Self {
        let (leading, low, count) = match field {
            Field::Year => (2, bounds.min_year, bounds.span()),
            Field::Month => (0, 1, 12),
            Field::Day => (0, 1, 31),
            Field::Hour => (0, 0, 24),
            Field::Minute | Field::Second => (0, 0, 60),
        };
        Self {
            field,
            base,
            leading,
            low,
            count,
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn base(&self) -> Token {
        self.base
    }

    /// Valid values plus sentinel slots.
    pub fn capacity(&self) -> usize {
        self.leading + usize::from(self.count) + 1
    }

    /// Tokens that decode to a value.
    pub fn valid_tokens(&self) -> Range<Token> {
        let start = self.base + self.leading;
        start..start + usize::from(self.count)
    }

    /// Top slot: the field's invalid sentinel (malformed input, for the year).
    pub fn invalid_token(&self) -> Token {
        self.base + self.capacity() - 1
    }

    fn encode(&self, value: u16) -> Token {
        if value < self.low {
            return match self.field {
                Field::Year => self.base,
                _ => self.invalid_token(),
            };
        }
        let index = usize::from(value - self.low);
        if index >= usize::from(self.count) {
            return match self.field {
                Field::Year => self.base + 1,
                _ => self.invalid_token(),
            };
        }
        self.valid_tokens().start + index
    }

    fn decode(&self, token: Token) -> Option<u16> {
        let valid = self.valid_tokens();
        valid
            .contains(&token)
            .then(|| self.low + (token - valid.start) as u16)
    }
}

/// Fields of a structurally valid timestamp, in layout order.
fn parse(timestamp: &str) -> Option<[u16; NUM_FIELDS]> {
    let bytes = timestamp.as_bytes();
    if bytes.len() != TIMESTAMP_LEN {
        return None;
    }
    if SEPARATORS.iter().any(|&(i, sep)| bytes[i] != sep) {
        return None;
    }

    let mut fields = [0u16; NUM_FIELDS];
    for (slot, (start, end)) in fields.iter_mut().zip(GROUPS) {
        *slot = bytes[start..end].iter().try_fold(0u16, |acc, &b| {
            b.is_ascii_digit().then(|| acc * 10 + u16::from(b - b'0'))
        })?;
    }
    Some(fields)
}

/// Codec for ISO-8601 timestamps. Needs no fitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CalendarBounds", into = "CalendarBounds")]
pub struct CalendarCodec {
    bounds: CalendarBounds,
    layout: [FieldLayout; NUM_FIELDS],
}

impl TryFrom<CalendarBounds> for CalendarCodec {
    type Error = CodecError;

    fn try_from(bounds: CalendarBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.min_year, bounds.max_year)
    }
}

impl From<CalendarCodec> for CalendarBounds {
    fn from(codec: CalendarCodec) -> Self {
        codec.bounds
    }
}

impl Default for CalendarCodec {
    fn default() -> Self {
        Self::with_bounds(CalendarBounds::default())
    }
}

impl CalendarCodec {
    /// Creates a codec accepting years in `min_year..=max_year`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Config`] if the bounds are inverted or
    /// `max_year` needs more than four digits.
    pub fn new(min_year: u16, max_year: u16) -> Result<Self, CodecError> {
        let bounds = CalendarBounds { min_year, max_year };
        bounds.validate()?;
        Ok(Self::with_bounds(bounds))
    }

    fn with_bounds(bounds: CalendarBounds) -> Self {
        let mut base = 0;
        let layout = Field::ALL.map(|field| {
            let field_layout = FieldLayout::new(field, base, bounds);
            base += field_layout.capacity();
            field_layout
        });
        Self { bounds, layout }
    }

    pub fn bounds(&self) -> CalendarBounds {
        self.bounds
    }

    /// Per-field sub-ranges, in token order.
    pub fn field_layout(&self) -> &[FieldLayout; NUM_FIELDS] {
        &self.layout
    }
}

impl Codec for CalendarCodec {
    type Value = str;
    type Tokens = Vec<Token>;
    type Decoded = String;

    fn encode(&self, timestamp: &str) -> Vec<Token> {
        match parse(timestamp) {
            Some(values) => self
                .layout
                .iter()
                .zip(values)
                .map(|(field, value)| field.encode(value))
                .collect(),
            None => self.layout.iter().map(FieldLayout::invalid_token).collect(),
        }
    }

    fn decode(&self, tokens: &Vec<Token>) -> String {
        if tokens.len() != NUM_FIELDS {
            return self.invalid();
        }
        let mut values = [0u16; NUM_FIELDS];
        for ((slot, field), &token) in values.iter_mut().zip(&self.layout).zip(tokens) {
            match field.decode(token) {
                Some(value) => *slot = value,
                None => return self.invalid(),
            }
        }
        let [year, month, day, hour, minute, second] = values;
        format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}")
    }

    fn invalid(&self) -> String {
        INVALID.to_owned()
    }

    fn num_bits(&self) -> usize {
        let last = &self.layout[NUM_FIELDS - 1];
        last.base + last.capacity()
    }

    fn max_active_features(&self) -> usize {
        NUM_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> CalendarCodec {
        CalendarCodec::new(2020, 2030).expect("valid bounds")
    }

    #[test]
    fn test_layout_depends_on_year_span() {
        let codec = codec();
        let bases: Vec<Token> = codec.field_layout().iter().map(|f| f.base()).collect();
        assert_eq!(bases, vec![0, 14, 27, 59, 84, 145]);
        assert_eq!(codec.num_bits(), 11 + 195);

        let wide = CalendarCodec::default();
        assert_eq!(wide.field_layout()[1].base(), 104);
        assert_eq!(wide.num_bits(), 101 + 195);
    }

    #[test]
    fn test_valid_round_trip() {
        let codec = codec();
        let tokens = codec.encode("2023-05-15T14:37:29");
        assert_eq!(tokens, vec![5, 18, 41, 73, 121, 174]);
        assert_eq!(codec.decode(&tokens), "2023-05-15T14:37:29");
    }

    #[test]
    fn test_field_extremes_round_trip() {
        let codec = codec();
        for ts in ["2020-01-01T00:00:00", "2030-12-31T23:59:59", "2024-02-30T12:00:00"] {
            assert_eq!(codec.decode(&codec.encode(ts)), ts);
        }
    }

    #[test]
    fn test_invalid_minute() {
        let codec = codec();
        let tokens = codec.encode("2023-05-15T14:61:29");
        assert_eq!(tokens[4], codec.field_layout()[4].invalid_token());
        assert_eq!(tokens[5], 174);
        assert_eq!(codec.decode(&tokens), INVALID);
    }

    #[test]
    fn test_year_out_of_range() {
        let codec = codec();
        let below = codec.encode("1989-12-15T00:00:00");
        assert_eq!(below[0], 0);
        assert_eq!(codec.decode(&below), INVALID);

        let above = codec.encode("2031-01-01T00:00:00");
        assert_eq!(above[0], 1);
        assert_eq!(codec.decode(&above), INVALID);
    }

    #[test]
    fn test_per_field_validation() {
        let codec = codec();
        let cases = [
            ("2023-00-15T14:37:29", 1),
            ("2023-13-15T14:37:29", 1),
            ("2023-05-00T14:37:29", 2),
            ("2023-05-32T14:37:29", 2),
            ("2023-05-15T24:37:29", 3),
            ("2023-05-15T14:37:60", 5),
        ];
        for (ts, bad) in cases {
            let tokens = codec.encode(ts);
            for (i, field) in codec.field_layout().iter().enumerate() {
                let is_sentinel = tokens[i] == field.invalid_token();
                assert_eq!(is_sentinel, i == bad, "{ts}: field {}", field.field());
            }
            assert_eq!(codec.decode(&tokens), INVALID);
        }
    }

    #[test]
    fn test_malformed_marks_every_field() {
        let codec = codec();
        let sentinels: Vec<Token> = codec
            .field_layout()
            .iter()
            .map(FieldLayout::invalid_token)
            .collect();
        assert_eq!(sentinels, vec![13, 26, 58, 83, 144, 205]);

        for ts in [
            "2023-05-15",
            "",
            "2023-05-15 14:37:29",
            "2023-05-15T14:37:29Z",
            "2023-05-15T14:37:29.5",
            "2023-5-15T14:37:290",
            "2023-05-1xT14:37:29",
            "+023-05-15T14:37:29",
            "2023/05/15T14:37:29",
        ] {
            assert_eq!(codec.encode(ts), sentinels, "{ts:?}");
            assert_eq!(codec.decode(&codec.encode(ts)), INVALID);
        }
    }

    #[test]
    fn test_decode_rejects_bad_token_vectors() {
        let codec = codec();
        let good = codec.encode("2023-05-15T14:37:29");

        assert_eq!(codec.decode(&good[..5].to_vec()), INVALID);
        let mut long = good.clone();
        long.push(0);
        assert_eq!(codec.decode(&long), INVALID);

        // a day token in the month slot
        let mut swapped = good.clone();
        swapped.swap(1, 2);
        assert_eq!(codec.decode(&swapped), INVALID);

        let mut beyond = good;
        beyond[5] = codec.num_bits();
        assert_eq!(codec.decode(&beyond), INVALID);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(matches!(
            CalendarCodec::new(2030, 2020),
            Err(CodecError::Config(_))
        ));
        assert!(CalendarCodec::new(2000, 10_000).is_err());
        assert!(CalendarCodec::new(0, 9999).is_ok());

        let single = CalendarCodec::new(2024, 2024).expect("single year");
        let ts = "2024-06-01T08:09:10";
        assert_eq!(single.decode(&single.encode(ts)), ts);
    }

    #[test]
    fn test_batch_matches_scalar() {
        let codec = codec();
        let input = ["2023-05-15T14:37:29", "2023-05-15T14:37:30", "nope"];
        let tokens = codec.encode_batch(&input);
        let scalar: Vec<Vec<Token>> = input.iter().map(|ts| codec.encode(ts)).collect();
        assert_eq!(tokens, scalar);
        assert_eq!(
            codec.decode_batch(&tokens),
            vec!["2023-05-15T14:37:29", "2023-05-15T14:37:30", INVALID]
        );
    }

    #[test]
    fn test_serde_keeps_bounds_only() {
        let codec = codec();
        let json = serde_json::to_string(&codec).expect("serializable");
        assert_eq!(json, r#"{"min_year":2020,"max_year":2030}"#);
        let restored: CalendarCodec = serde_json::from_str(&json).expect("valid model");
        assert_eq!(restored, codec);
        let inverted = r#"{"min_year":5,"max_year":1}"#;
        assert!(serde_json::from_str::<CalendarCodec>(inverted).is_err());
    }
}
