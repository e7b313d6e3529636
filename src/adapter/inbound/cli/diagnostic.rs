//! Miette-based diagnostics for configuration errors.
//!
//! Turns a failed config load into a report that quotes the TOML source
//! and points at the offending key.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError, Error};

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(bankpeer::config))]
pub struct ConfigDiagnostic {
    pub message: String,

    #[source_code]
    pub src: String,

    #[label("here")]
    pub span: SourceSpan,

    #[help]
    pub help: Option<String>,
}

impl ConfigDiagnostic {
    #[must_use]
    pub fn new(message: impl Into<String>, src: impl Into<String>, offset: usize, len: usize) -> Self {
        Self {
            message: message.into(),
            src: src.into(),
            span: (offset, len).into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Build a diagnostic for `error` raised while loading `src`.
    ///
    /// Returns `None` when the error cannot be located in the source.
    #[must_use]
    pub fn from_error(error: &Error, src: &str) -> Option<Self> {
        match error {
            Error::Config(ConfigError::Parse(e)) => {
                let span = e.span()?;
                Some(
                    Self::new(e.message(), src, span.start, span.end.saturating_sub(span.start))
                        .with_help("see config.toml.example for the expected layout"),
                )
            }
            Error::Config(ConfigError::InvalidValue { field, reason }) => {
                let offset = locate_key(src, field)?;
                Some(Self::new(
                    format!("invalid value for {field}: {reason}"),
                    src,
                    offset,
                    field.len(),
                ))
            }
            _ => None,
        }
    }
}

/// Byte offset of the first line that assigns `key`.
fn locate_key(src: &str, key: &str) -> Option<usize> {
    let mut offset = 0;
    for line in src.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::Config;

    #[test]
    fn locates_assignment_lines() {
        let src = "database = \"x\"\n[analysis]\n  peer_count = 0\n";
        assert_eq!(locate_key(src, "peer_count"), Some(src.find("peer_count").unwrap()));
        assert_eq!(locate_key(src, "workers"), None);
    }

    #[test]
    fn invalid_value_points_at_key() {
        let src = "[analysis]\npeer_count = 0\n";
        let err = Config::parse_toml_with_env(src, |_| None).unwrap_err();
        let diagnostic = ConfigDiagnostic::from_error(&err, src).unwrap();
        assert_eq!(diagnostic.span.offset(), 11);
        assert!(diagnostic.message.contains("peer_count"));
    }

    #[test]
    fn parse_error_carries_span() {
        let src = "[analysis]\npeer_count = \"ten\"\n";
        let err = Config::parse_toml_with_env(src, |_| None).unwrap_err();
        assert!(ConfigDiagnostic::from_error(&err, src).is_some());
    }
}
