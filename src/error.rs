//! Crate-level error type
//!
//! [`Error`] separates the two ways reading a translation unit can fail:
//! the file could not be read, or its contents could not be parsed. The
//! CLI maps each variant to its own exit code.

use crate::parser::ParseError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be read (missing file, permissions, invalid UTF-8)
    #[error("Cannot open: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input was read but is not valid in the supported grammar
    #[error("Cannot parse: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl Error {
    /// Location of the syntax error, if this is one
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse { source, .. } => Some(source),
            Error::Io { .. } => None,
        }
    }
}
