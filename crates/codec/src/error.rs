use thiserror::Error;

/// Error type for codec operations.
///
/// Out-of-domain inputs (NaN, unseen categories, malformed timestamps) are
/// never errors; they encode to sentinel tokens. Only construction problems,
/// type-contract violations and model (de)serialization surface here.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid codec configuration: {0}")]
    Config(String),
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("Element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<CodecError>,
    },
    #[error("Model serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    pub(crate) fn type_mismatch(expected: &'static str, found: &serde_json::Value) -> Self {
        let found = match found {
            serde_json::Value::Null => "null".to_string(),
            serde_json::Value::Bool(b) => format!("boolean {b}"),
            serde_json::Value::Number(n) => format!("number {n}"),
            serde_json::Value::String(s) => format!("string {s:?}"),
            serde_json::Value::Array(a) => format!("array of length {}", a.len()),
            serde_json::Value::Object(_) => "object".to_string(),
        };
        Self::TypeMismatch { expected, found }
    }
}
