//! Tagged errors the library can fail with.
//!
//! Mirrors the tagged-enum-of-errors approach `jack-compiler` uses
//! (`JackError`/`*ErrorKind`), so callers can match on the failure kind:
//! argument errors, bad filenames, unknown opcodes, unparseable arguments,
//! I/O failures.
use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    /// Wrong CLI argument count, or a path that is neither a `.vm` file nor
    /// a directory.
    #[error("{0}")]
    ArgumentError(String),

    /// `.vm` extension missing, or base name doesn't start with an
    /// uppercase letter.
    #[error("{path}: {reason}")]
    FilenameError { path: PathBuf, reason: String },

    /// The classifier couldn't recognize the opcode.
    #[error("{unit}:{line}: unknown vm command `{text}`")]
    UnknownCommand {
        unit: String,
        line: usize,
        text: String,
    },

    /// An argument that should parse as an integer, or a segment/label
    /// name, didn't.
    #[error("{unit}:{line}: malformed argument in `{text}`: {source}")]
    MalformedArgument {
        unit: String,
        line: usize,
        text: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl TranslateError {
    pub fn malformed(unit: &str, line: usize, text: &str, source: anyhow::Error) -> Self {
        TranslateError::MalformedArgument {
            unit: unit.to_string(),
            line,
            text: text.to_string(),
            source,
        }
    }
}
