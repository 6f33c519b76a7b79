// SPDX-License-Identifier: PMPL-1.0-or-later

//! mulval-facts: compile lab network topologies into MulVAL attack-graph input
//!
//! Reads a topology description (JSON or YAML), emits the Prolog fact base
//! MulVAL's `graph_gen.sh` consumes, and reports anything it could not map.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use mulval_facts::catalog::{Exposure, VulnCatalog};
use mulval_facts::config::ExportConfig;
use mulval_facts::format::DataFormat;
use mulval_facts::presets::Preset;
use mulval_facts::sweep::{self, SweepConfig};
use mulval_facts::types::Topology;
use mulval_facts::{compile, storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mulval-facts")]
#[command(version)]
#[command(about = "Compile lab network topologies into MulVAL attack-graph facts")]
#[command(long_about = None)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a topology into a MulVAL input.P fact file
    Compile {
        /// Topology description (.json, .yaml, .yml)
        #[arg(value_name = "TOPOLOGY")]
        topology: PathBuf,

        /// Output file (stdout when omitted and the config names none)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extra catalog entries layered over the builtin table
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Exporter configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Compile even if the topology fails structural validation
        #[arg(long)]
        lenient: bool,

        /// Print compile statistics in this format
        #[arg(long, value_enum)]
        stats: Option<DataFormat>,
    },

    /// Check a topology for duplicate names and ids
    Validate {
        #[arg(value_name = "TOPOLOGY")]
        topology: PathBuf,
    },

    /// List the effective vulnerability catalog
    Catalog {
        /// Extra catalog entries layered over the builtin table
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Dump entries in this format instead of a table
        #[arg(long, value_enum)]
        format: Option<DataFormat>,
    },

    /// Emit one of the hand-authored benchmark topologies
    Preset {
        #[arg(value_enum)]
        kind: Preset,

        /// Number of hosts (defaults to the deployed size; dumbbell needs an
        /// even count, enterprise a multiple of 4, ics exactly 47)
        #[arg(long)]
        hosts: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: DataFormat,
    },

    /// Compile every topology file in a directory
    Sweep {
        #[arg(value_name = "DIR")]
        directory: PathBuf,

        /// Directory for generated .P files (defaults to DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        lenient: bool,

        /// Write the sweep summary as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_catalog(extra: Option<&Path>) -> Result<VulnCatalog> {
    match extra {
        Some(path) => {
            let overlay = VulnCatalog::from_file(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            Ok(VulnCatalog::builtin().merge(overlay))
        }
        None => Ok(VulnCatalog::builtin()),
    }
}

fn load_topology(path: &Path) -> Result<Topology> {
    Topology::from_file(path).with_context(|| format!("loading topology {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile {
            topology,
            output,
            catalog,
            config,
            lenient,
            stats,
        } => {
            let config = match &config {
                Some(path) => ExportConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ExportConfig::default(),
            };
            let model = load_topology(&topology)?;
            if !(lenient || config.lenient) {
                model.ensure_valid()?;
            }
            let catalog = match catalog {
                Some(path) => load_catalog(Some(path.as_path()))?,
                None => config.resolve_catalog()?,
            };

            let compilation = compile(&model, &catalog);

            match output.or_else(|| config.output_path()) {
                Some(path) => {
                    storage::persist_compilation(&compilation, &path)?;
                    eprintln!("MulVAL facts written to: {}", path.display());
                }
                None => print!("{}", compilation.render()),
            }

            compilation.diagnostics.print();

            if let Some(format) = stats {
                eprintln!("{}", format.serialize(&compilation.stats())?);
            }
        }

        Commands::Validate { topology } => {
            let model = load_topology(&topology)?;
            let issues = model.validate();
            if issues.is_empty() {
                println!(
                    "{} {} ({} hosts, {} goals)",
                    "OK".green(),
                    topology.display(),
                    model.hosts().count(),
                    model.goals.len()
                );
            } else {
                for issue in &issues {
                    println!("  [{}] {}", "ERR".red(), issue);
                }
                anyhow::bail!(
                    "{} structural issue(s) in {}",
                    issues.len(),
                    topology.display()
                );
            }
        }

        Commands::Catalog { catalog, format } => {
            let catalog = load_catalog(catalog.as_deref())?;
            match format {
                Some(format) => println!("{}", format.serialize(&catalog.to_specs())?),
                None => print_catalog(&catalog),
            }
        }

        Commands::Preset {
            kind,
            hosts,
            output,
            format,
        } => {
            let model = kind.build(hosts.unwrap_or_else(|| kind.default_hosts()))?;
            let text = format.serialize(&model)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Preset topology written to: {}", path.display());
                }
                None => println!("{}", text),
            }
        }

        Commands::Sweep {
            directory,
            out_dir,
            catalog,
            lenient,
            report,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let config = SweepConfig {
                directory,
                out_dir,
                lenient,
            };
            let summary = sweep::run(&config, &catalog)?;
            sweep::print_summary(&summary);
            if let Some(path) = report {
                sweep::write_report(&summary, &path)?;
                println!("Sweep report saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_catalog(catalog: &VulnCatalog) {
    println!("{}", "VULNERABILITY CATALOG".bold().yellow());
    println!(
        "  {:<18} {:<8} {:<8} {:<10} {}",
        "Vuln id", "Program", "Range", "Service", "Playbook"
    );
    println!("  {}", "-".repeat(78));
    for (playbook, descriptor) in catalog.iter() {
        let service = match &descriptor.exposure {
            Exposure::Remote(service) => format!("{}/{}", service.protocol, service.port),
            Exposure::Local => "-".to_string(),
        };
        println!(
            "  {:<18} {:<8} {:<8} {:<10} {}",
            descriptor.vuln_id,
            descriptor.program,
            format!("{:?}", descriptor.range()).to_lowercase(),
            service,
            playbook
        );
    }
    println!("\n  {} entries", catalog.len());
}
