// SPDX-License-Identifier: PMPL-1.0-or-later

//! Persisting fact documents
//!
//! The file handle is owned by `write_document` alone and is closed on every
//! return path. Missing directories are not created here: a bad output
//! location is an error for the caller to see.

use crate::compiler::Compilation;
use crate::error::{FactsError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name MulVAL's `graph_gen.sh` expects by convention.
pub const DEFAULT_FILE_NAME: &str = "input.P";

pub fn write_document(path: &Path, text: &str) -> Result<()> {
    let file = File::create(path).map_err(|err| FactsError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .map_err(|err| FactsError::io(path, err))?;
    writer.flush().map_err(|err| FactsError::io(path, err))?;
    info!(path = %path.display(), bytes = text.len(), "fact document written");
    Ok(())
}

pub fn persist_compilation(compilation: &Compilation, path: &Path) -> Result<()> {
    write_document(path, &compilation.render())
}

/// Resolve where a document goes from an optional directory and file name.
pub fn output_path(directory: Option<&Path>, file_name: Option<&str>) -> PathBuf {
    let name = file_name.unwrap_or(DEFAULT_FILE_NAME);
    match directory {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
