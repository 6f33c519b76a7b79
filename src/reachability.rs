// SPDX-License-Identifier: PMPL-1.0-or-later

//! Network reachability (`hacl/4`) generation
//!
//! Edges are emitted in four passes: self edges, intra-subnet mesh, declared
//! subnet connections, then internet ingress into external subnets. Only
//! direct edges are produced; MulVAL derives anything transitive itself.
//! An edge appears once even when several passes imply it.

use crate::diagnostics::{Diagnostics, Warning};
use crate::facts::{Fact, Term};
use crate::types::{Host, SubnetConnection, Topology};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Pseudo-host standing for the public network.
pub const INTERNET: &str = "internet";

pub fn hacl(from: &str, to: &str) -> Fact {
    Fact::new(
        "hacl",
        vec![
            Term::atom(from),
            Term::atom(to),
            Term::Wildcard,
            Term::Wildcard,
        ],
    )
}

/// Collects edges, dropping repeats while keeping first-seen order.
struct EdgeSet<'a> {
    seen: HashSet<(&'a str, &'a str)>,
    facts: Vec<Fact>,
}

impl<'a> EdgeSet<'a> {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            facts: Vec::new(),
        }
    }

    fn add(&mut self, from: &'a str, to: &'a str) {
        if self.seen.insert((from, to)) {
            self.facts.push(hacl(from, to));
        }
    }

    fn add_cross(&mut self, from: &'a [Host], to: &'a [Host]) {
        for a in from {
            for b in to {
                self.add(&a.name, &b.name);
            }
        }
    }
}

/// Derive every reachability fact for `topology`.
pub fn reachability_facts(topology: &Topology, diagnostics: &mut Diagnostics) -> Vec<Fact> {
    let subnet_hosts: HashMap<&str, &[Host]> = topology
        .subnets()
        .map(|subnet| (subnet.name.as_str(), subnet.hosts.as_slice()))
        .collect();

    let mut edges = EdgeSet::new();

    for host in topology.hosts() {
        edges.add(&host.name, &host.name);
    }

    for subnet in topology.subnets() {
        for (i, a) in subnet.hosts.iter().enumerate() {
            for (j, b) in subnet.hosts.iter().enumerate() {
                if i != j {
                    edges.add(&a.name, &b.name);
                }
            }
        }
    }

    for conn in &topology.subnet_connections {
        let from_hosts = resolve(&subnet_hosts, conn, &conn.from_subnet, diagnostics);
        let to_hosts = resolve(&subnet_hosts, conn, &conn.to_subnet, diagnostics);

        edges.add_cross(from_hosts, to_hosts);
        if conn.bidirectional {
            edges.add_cross(to_hosts, from_hosts);
        }
    }

    for subnet in topology.subnets().filter(|s| s.external) {
        for host in &subnet.hosts {
            edges.add(INTERNET, &host.name);
        }
    }

    debug!(edges = edges.facts.len(), "reachability generated");
    edges.facts
}

/// Unknown subnets resolve to no hosts, and the miss is reported.
fn resolve<'a>(
    subnet_hosts: &HashMap<&str, &'a [Host]>,
    conn: &SubnetConnection,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> &'a [Host] {
    match subnet_hosts.get(name) {
        Some(&hosts) => hosts,
        None => {
            diagnostics.warn(Warning::UnknownSubnet {
                subnet: name.to_string(),
                from_subnet: conn.from_subnet.clone(),
                to_subnet: conn.to_subnet.clone(),
            });
            &[]
        }
    }
}
