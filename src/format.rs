// SPDX-License-Identifier: PMPL-1.0-or-later

//! JSON / YAML encoding shared by topology, catalog and config files

use crate::error::{FactsError, Result};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(DataFormat::Json),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            _ => None,
        }
    }

    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
            .ok_or_else(|| FactsError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }

    pub fn decode<T: DeserializeOwned>(&self, path: &Path, text: &str) -> Result<T> {
        let decoded = match self {
            DataFormat::Json => serde_json::from_str(text).map_err(|err| err.to_string()),
            DataFormat::Yaml => serde_yaml::from_str(text).map_err(|err| err.to_string()),
        };
        decoded.map_err(|message| FactsError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn serialize<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        match self {
            DataFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            DataFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

/// Read and decode a JSON or YAML file, choosing the decoder by extension.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DataFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|err| FactsError::io(path, err))?;
    format.decode(path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DataFormat::from_path(Path::new("net.json")).unwrap(),
            DataFormat::Json
        );
        assert_eq!(
            DataFormat::from_path(Path::new("net.YML")).unwrap(),
            DataFormat::Yaml
        );
        assert!(matches!(
            DataFormat::from_path(Path::new("net.toml")),
            Err(FactsError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_decode_error_names_the_file() {
        let path = PathBuf::from("broken.json");
        let err = DataFormat::Json
            .decode::<serde_json::Value>(&path, "{ not json")
            .unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
