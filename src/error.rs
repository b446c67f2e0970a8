//! Crate-level error types.

use std::fmt;

/// Errors produced by the panoview crate.
///
/// Only configuration can fail. Per-frame composition never returns an
/// error; it holds the previous pose instead.
#[derive(Debug)]
pub enum PanoError {
    /// A configuration value was out of its valid domain (non-positive field
    /// of view, a rotation range with `min > max`, a non-finite angle).
    InvalidParameter(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl PanoError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

impl fmt::Display for PanoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => {
                write!(f, "invalid parameter: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for PanoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PanoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
