//! Structured error types for report generation.
//!
//! Usage mistakes inside the layout engine (a short table row, an unbalanced
//! style restore) are logged and ignored. Everything here is an error a
//! caller has to decide about: missing data, unreadable fonts, I/O.

use thiserror::Error;

/// The unified error type returned by the public folio API.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Config or data fixture JSON failed to parse.
    #[error("Failed to parse {what}: {source}{}", hint_suffix(.hint))]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// A font could not be loaded or embedded.
    #[error("Font error: {0}")]
    Font(String),
    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),
    /// Markdown source could not be turned into a node tree.
    #[error("Markdown error: {0}")]
    Markdown(String),
    /// Image bytes were missing or could not be decoded.
    #[error("Image error: {0}")]
    Image(String),
    /// A record the report needs is missing or malformed.
    #[error("Data error: {0}")]
    Data(String),
    /// Content could not be fetched from the content store.
    #[error("Content not found: {0}")]
    Content(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FolioError>;

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl FolioError {
    /// Wrap a serde_json error with a hint for the kind of failure.
    pub fn parse(what: &'static str, e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input, is the file truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::Parse { what, source: e, hint }
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        FolioError::parse("JSON", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_hint() {
        let e = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}").unwrap_err();
        let err = FolioError::parse("config", e);
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse config"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn invalid_month_message() {
        assert_eq!(FolioError::InvalidMonth(13).to_string(), "Invalid month: 13");
    }
}
