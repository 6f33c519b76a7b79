// SPDX-License-Identifier: PMPL-1.0-or-later

//! Exporter configuration file
//!
//! All fields are optional; command-line flags take precedence.

use crate::catalog::VulnCatalog;
use crate::error::Result;
use crate::format;
use crate::storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Extra catalog entries layered over the builtin table.
    pub catalog: Option<PathBuf>,
    /// Use only the file catalog, ignoring builtin entries.
    pub replace_builtin_catalog: bool,
    pub output_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    /// Compile even when the topology fails structural validation.
    pub lenient: bool,
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = format::load_file(path)?;
        debug!(path = %path.display(), "loaded export config");
        Ok(config)
    }

    /// Catalog to compile with. Relative catalog paths are taken as given.
    pub fn resolve_catalog(&self) -> Result<VulnCatalog> {
        match &self.catalog {
            None => Ok(VulnCatalog::builtin()),
            Some(path) => {
                let extra = VulnCatalog::from_file(path)?;
                if self.replace_builtin_catalog {
                    Ok(extra)
                } else {
                    Ok(VulnCatalog::builtin().merge(extra))
                }
            }
        }
    }

    /// Output location, when the config names one.
    pub fn output_path(&self) -> Option<PathBuf> {
        if self.output_dir.is_none() && self.file_name.is_none() {
            return None;
        }
        Some(storage::output_path(
            self.output_dir.as_deref(),
            self.file_name.as_deref(),
        ))
    }
}
