// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sweep: batch compilation of a directory of topologies
//!
//! Finds every `.json` / `.yaml` / `.yml` file directly under a directory,
//! compiles each one and writes `<stem>.P` into the output directory. A file
//! that fails to load is recorded and the sweep carries on.

use crate::catalog::VulnCatalog;
use crate::compiler::{self, CompileStats};
use crate::format::DataFormat;
use crate::storage;
use crate::types::Topology;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for a sweep run
pub struct SweepConfig {
    /// Directory holding topology files
    pub directory: PathBuf,
    /// Where `.P` files go; defaults to `directory`
    pub out_dir: Option<PathBuf>,
    /// Compile topologies that fail structural validation
    pub lenient: bool,
}

/// Result for a single topology file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyResult {
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub fact_count: usize,
    pub warning_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub stats: Option<CompileStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub created_at: String,
    pub directory: PathBuf,
    pub topologies_found: usize,
    pub compiled: usize,
    pub failed: usize,
    pub total_warnings: usize,
    pub results: Vec<TopologyResult>,
}

/// Topology files directly under `directory`, sorted by path.
fn discover_topologies(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        anyhow::bail!("Not a directory: {}", directory.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| DataFormat::from_path(path).is_ok())
        .collect();

    files.sort();
    Ok(files)
}

fn compile_one(
    path: &Path,
    out_dir: &Path,
    catalog: &VulnCatalog,
    lenient: bool,
) -> Result<TopologyResult> {
    let topology = Topology::from_file(path)?;
    if !lenient {
        topology.ensure_valid()?;
    }

    let compilation = compiler::compile(&topology, catalog);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "topology".to_string());
    let output = out_dir.join(format!("{}.P", stem));
    storage::persist_compilation(&compilation, &output)?;

    let stats = compilation.stats();
    Ok(TopologyResult {
        source: path.to_path_buf(),
        output: Some(output),
        fact_count: stats.facts.values().sum(),
        warning_count: stats.warnings.len(),
        error: None,
        stats: Some(stats),
    })
}

/// Run sweep across all topology files in a directory
pub fn run(config: &SweepConfig, catalog: &VulnCatalog) -> Result<SweepReport> {
    let files = discover_topologies(&config.directory)?;
    let out_dir = config
        .out_dir
        .clone()
        .unwrap_or_else(|| config.directory.clone());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let mut results = Vec::new();
    for path in &files {
        match compile_one(path, &out_dir, catalog, config.lenient) {
            Ok(result) => results.push(result),
            Err(e) => results.push(TopologyResult {
                source: path.clone(),
                output: None,
                fact_count: 0,
                warning_count: 0,
                error: Some(format!("{:#}", e)),
                stats: None,
            }),
        }
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let total_warnings = results.iter().map(|r| r.warning_count).sum();

    Ok(SweepReport {
        created_at: chrono::Utc::now().to_rfc3339(),
        directory: config.directory.clone(),
        topologies_found: files.len(),
        compiled: files.len() - failed,
        failed,
        total_warnings,
        results,
    })
}

/// Print a summary table to the terminal
pub fn print_summary(report: &SweepReport) {
    println!("\n=== SWEEP SUMMARY ===");
    println!(
        "Directory: {}  |  Topologies: {}  |  Compiled: {}  |  Failed: {}",
        report.directory.display(),
        report.topologies_found,
        report.compiled,
        report.failed
    );
    println!("Total warnings: {}", report.total_warnings);
    println!();

    if report.results.is_empty() {
        println!("  No topology files found.");
        return;
    }

    println!("  {:<40} {:>8} {:>8}", "Topology", "Facts", "Warnings");
    println!("  {}", "-".repeat(58));
    for result in &report.results {
        let name = result
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if let Some(err) = &result.error {
            println!("  {:<40} ERROR: {}", name, err);
        } else {
            println!(
                "  {:<40} {:>8} {:>8}",
                name, result.fact_count, result.warning_count
            );
        }
    }
    println!();
}

/// Write sweep report as JSON
pub fn write_report(report: &SweepReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
