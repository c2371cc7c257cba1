mod calendar;
mod range;
mod vocabulary;

pub use calendar::{
    CalendarBounds, CalendarCodec, Field, FieldLayout, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR,
    NUM_FIELDS,
};
pub use range::{FittedRange, LevelSet, RangeCodec, DEFAULT_NUM_BITS, MAX_NUM_BITS};
pub use vocabulary::{Vocabulary, VocabularyCodec, MISSING_TOKEN, UNKNOWN_TOKEN};
