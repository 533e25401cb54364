//! Purpose: Provide the JSON decode entrypoint for caller-supplied documents.
//! Exports: `from_str`, `ParseFailureCategory`, `categorize_error`, `hint_for_error`.
//! Role: Parser boundary that maps serde_json failures onto `ErrorKind::Usage`.
//! Invariants: Error hints name a stable category and the caller's context label.
//! Invariants: Hints never echo the rejected payload.

use serde::de::DeserializeOwned;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Data,
    Io,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Data => "data",
            ParseFailureCategory::Io => "io",
        }
    }
}

pub fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    match err.classify() {
        serde_json::error::Category::Syntax => ParseFailureCategory::Syntax,
        serde_json::error::Category::Eof => ParseFailureCategory::Eof,
        serde_json::error::Category::Data => ParseFailureCategory::Data,
        serde_json::error::Category::Io => ParseFailureCategory::Io,
    }
}

pub fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    format!(
        "parse category: {}; line {}, column {}; context: {context}",
        categorize_error(err).label(),
        err.line(),
        err.column(),
    )
}

/// Decodes `input`, labelling failures with `context` (for example `"coerce --json"`).
pub fn from_str<T: DeserializeOwned>(input: &str, context: &str) -> Result<T, Error> {
    serde_json::from_str(input).map_err(|err| {
        let hint = hint_for_error(&err, context);
        Error::new(ErrorKind::Usage)
            .with_message("invalid JSON input")
            .with_hint(hint)
            .with_source(err)
    })
}
