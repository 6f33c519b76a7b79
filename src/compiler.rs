// SPDX-License-Identifier: PMPL-1.0-or-later

//! Topology → MulVAL fact base compiler
//!
//! `compile` is a pure function of its inputs: no I/O, no shared state, and
//! the same topology always renders to the same bytes. Persisting the
//! result lives in [`crate::storage`].

use crate::catalog::VulnCatalog;
use crate::diagnostics::{Diagnostics, FallbackCounts, Warning};
use crate::emit;
use crate::facts::{FactDocument, Section};
use crate::reachability;
use crate::types::Topology;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const SECTION_ATTACKER: &str = "Attacker location";
pub const SECTION_GOALS: &str = "Attack goals";
pub const SECTION_ACCOUNTS: &str = "User accounts";
pub const SECTION_REACHABILITY: &str = "Network reachability";
pub const SECTION_VULNERABILITIES: &str = "Vulnerabilities and services";
pub const SECTION_PROPERTIES: &str = "Vulnerability properties (deduplicated)";

/// Output of one compile: the document plus everything that was dropped.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub document: FactDocument,
    pub diagnostics: Diagnostics,
    host_count: usize,
}

/// Summary of a compile, for `--stats` and sweep reports.
#[derive(Debug, Clone, Serialize)]
pub struct CompileStats {
    pub generated_at: String,
    pub hosts: usize,
    pub facts: BTreeMap<String, usize>,
    pub warnings: Vec<Warning>,
    pub fallbacks: FallbackCounts,
    /// blake3 of the rendered document
    pub digest: String,
}

impl Compilation {
    pub fn render(&self) -> String {
        self.document.render()
    }

    pub fn stats(&self) -> CompileStats {
        CompileStats {
            generated_at: chrono::Utc::now().to_rfc3339(),
            hosts: self.host_count,
            facts: self.document.counts(),
            warnings: self.diagnostics.warnings().to_vec(),
            fallbacks: self.diagnostics.fallbacks(),
            digest: blake3::hash(self.render().as_bytes()).to_hex().to_string(),
        }
    }
}

/// Project `topology` into MulVAL's input vocabulary.
pub fn compile(topology: &Topology, catalog: &VulnCatalog) -> Compilation {
    let mut diagnostics = Diagnostics::new();
    let mut document = FactDocument::new();

    let mut attacker = Section::new(SECTION_ATTACKER);
    attacker.push_fact(emit::attacker_location());
    document.push(attacker);

    let mut goals = Section::new(SECTION_GOALS);
    goals.extend_facts(emit::goal_facts(topology, &mut diagnostics));
    document.push(goals);

    let mut accounts = Section::new(SECTION_ACCOUNTS);
    accounts.extend_facts(emit::account_facts(topology));
    document.push(accounts);

    let mut network = Section::new(SECTION_REACHABILITY);
    network.extend_facts(reachability::reachability_facts(topology, &mut diagnostics));
    document.push(network);

    let vulnerabilities = emit::vulnerability_facts(topology, catalog, &mut diagnostics);
    let mut services = Section::new(SECTION_VULNERABILITIES);
    for group in &vulnerabilities.host_groups {
        services.push_comment(&group.host_name);
        services.extend_facts(group.facts.iter().cloned());
    }
    document.push(services);

    let mut properties = Section::new(SECTION_PROPERTIES);
    properties.extend_facts(vulnerabilities.property_facts());
    document.push(properties);

    let host_count = topology.hosts().count();
    debug!(
        hosts = host_count,
        facts = document.facts().count(),
        warnings = diagnostics.warnings().len(),
        "topology compiled"
    );

    Compilation {
        document,
        diagnostics,
        host_count,
    }
}
