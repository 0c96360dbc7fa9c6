/// Error type produced by an [`ObjectFormat`] implementation.
pub type ObjectFormatError = Box<dyn std::error::Error + Send + Sync>;

/// Pluggable text format for opaque object payloads.
///
/// Supplied at construction, never a global — the codec only ever calls
/// these two functions. An implementation owns whatever token-preservation
/// rules its text format needs.
pub trait ObjectFormat {
    fn stringify(&self, value: &serde_json::Value) -> Result<String, ObjectFormatError>;
    fn parse(&self, text: &str) -> Result<serde_json::Value, ObjectFormatError>;
}

/// Default strategy: plain JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl ObjectFormat for JsonFormat {
    fn stringify(&self, value: &serde_json::Value) -> Result<String, ObjectFormatError> {
        serde_json::to_string(value).map_err(Into::into)
    }

    fn parse(&self, text: &str) -> Result<serde_json::Value, ObjectFormatError> {
        serde_json::from_str(text).map_err(Into::into)
    }
}
