// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for topology loading, catalog loading and fact persistence.
//!
//! Only hard failures live here. Mapping gaps found while compiling are
//! recorded in [`crate::diagnostics::Diagnostics`] and never surface as `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mulval-facts operations.
pub type Result<T> = std::result::Result<T, FactsError>;

#[derive(Error, Debug)]
pub enum FactsError {
    /// Reading or writing a file failed.
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON or YAML document could not be decoded.
    #[error("failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// File extension is not one we know how to decode.
    #[error("unsupported file format for '{path}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    /// A catalog entry is internally inconsistent.
    #[error("invalid catalog entry for '{playbook}': {reason}")]
    InvalidCatalog { playbook: String, reason: String },

    /// The topology breaks one of its structural invariants.
    #[error("invalid topology: {}", .0.join("; "))]
    InvalidTopology(Vec<String>),

    /// A preset cannot be built with the requested number of hosts.
    #[error("preset '{preset}' cannot have {hosts} hosts: {reason}")]
    InvalidPresetSize {
        preset: String,
        hosts: usize,
        reason: String,
    },
}

impl FactsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FactsError::Io {
            path: path.into(),
            source,
        }
    }
}
