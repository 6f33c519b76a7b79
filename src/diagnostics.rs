// SPDX-License-Identifier: PMPL-1.0-or-later

//! Non-fatal compile diagnostics
//!
//! Every place where the compiler drops an item or falls back to a default
//! is recorded here so that silent data loss stays visible. Nothing in this
//! module can fail a compile.

use colored::*;
use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Goal target id matched no host; the goal was skipped.
    UnknownGoalHost { host_id: String },
    /// Playbook has no catalog entry; only that vulnerability was skipped.
    UnmappedVulnerability { playbook_path: String, host: String },
    /// Connection endpoint names no subnet; it contributed no reachability.
    UnknownSubnet {
        subnet: String,
        from_subnet: String,
        to_subnet: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownGoalHost { host_id } => {
                write!(f, "goal references unknown host id: {}", host_id)
            }
            Warning::UnmappedVulnerability {
                playbook_path,
                host,
            } => write!(
                f,
                "no MulVAL mapping for playbook: {} (on host {}), skipping",
                playbook_path, host
            ),
            Warning::UnknownSubnet {
                subnet,
                from_subnet,
                to_subnet,
            } => write!(
                f,
                "connection {} -> {} references unknown subnet: {}",
                from_subnet, to_subnet, subnet
            ),
        }
    }
}

/// Defaults applied where the topology left something unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FallbackCounts {
    /// Goals without a target user, aimed at the superuser instead.
    pub goal_superuser: usize,
    /// Remote services without `to_user`, assumed to run as the superuser.
    pub service_superuser: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
    fallbacks: FallbackCounts,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn goal_fell_back_to_superuser(&mut self) {
        self.fallbacks.goal_superuser += 1;
    }

    pub fn service_fell_back_to_superuser(&mut self) {
        self.fallbacks.service_superuser += 1;
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn fallbacks(&self) -> FallbackCounts {
        self.fallbacks
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Print the operator summary to stderr.
    pub fn print(&self) {
        if !self.is_clean() {
            eprintln!("{}", "=== MulVAL Export Warnings ===".bold().yellow());
            for warning in &self.warnings {
                eprintln!("  [{}] {}", "WARN".yellow(), warning);
            }
            eprintln!("  Total: {} warning(s)", self.warnings.len());
        }

        let fallbacks = self.fallbacks;
        if fallbacks.goal_superuser > 0 {
            eprintln!(
                "  [{}] {} goal(s) defaulted to the superuser principal",
                "NOTE".cyan(),
                fallbacks.goal_superuser
            );
        }
        if fallbacks.service_superuser > 0 {
            eprintln!(
                "  [{}] {} service(s) assumed to run as the superuser",
                "NOTE".cyan(),
                fallbacks.service_superuser
            );
        }
    }
}
