// SPDX-License-Identifier: PMPL-1.0-or-later

//! Entity fact emitters: attacker, goals, accounts, vulnerabilities

use crate::catalog::{ExploitRange, VulnCatalog};
use crate::diagnostics::{Diagnostics, Warning};
use crate::facts::{prolog_atom, Fact, Term};
use crate::namespace::{namespace_principal, SUPERUSER};
use crate::reachability::INTERNET;
use crate::types::Topology;
use std::collections::HashSet;

/// The only modelled campaign starts outside the environment.
pub fn attacker_location() -> Fact {
    Fact::new("attackerLocated", vec![Term::atom(INTERNET)])
}

/// One `attackGoal(execCode(Host, Principal))` per resolvable goal.
pub fn goal_facts(topology: &Topology, diagnostics: &mut Diagnostics) -> Vec<Fact> {
    let mut facts = Vec::new();
    for goal in &topology.goals {
        let Some(host) = topology.host_by_id(&goal.target_host_id) else {
            diagnostics.warn(Warning::UnknownGoalHost {
                host_id: goal.target_host_id.clone(),
            });
            continue;
        };

        let username = match goal.requested_user() {
            Some(user) => user,
            None => {
                diagnostics.goal_fell_back_to_superuser();
                SUPERUSER
            }
        };

        let principal = namespace_principal(username, &host.name);
        facts.push(Fact::new(
            "attackGoal",
            vec![Term::compound(
                "execCode",
                vec![Term::atom(&host.name), Term::Atom(principal)],
            )],
        ));
    }
    facts
}

pub fn account_facts(topology: &Topology) -> Vec<Fact> {
    topology
        .hosts()
        .flat_map(|host| {
            host.users.iter().map(move |user| {
                let permission = if user.is_admin { "root" } else { "user" };
                Fact::new(
                    "hasAccount",
                    vec![
                        Term::Atom(namespace_principal(&user.username, &host.name)),
                        Term::atom(&host.name),
                        Term::atom(permission),
                    ],
                )
            })
        })
        .collect()
}

/// Facts for one host that carries at least one vulnerability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostGroup {
    pub host_name: String,
    pub facts: Vec<Fact>,
}

/// Exploit-class semantics, shared by every host with the flaw.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VulnProperty {
    pub vuln_id: String,
    pub range: ExploitRange,
    pub consequence: String,
}

impl VulnProperty {
    /// Ordering key: the triple as it is written out.
    fn sort_key(&self) -> (String, &'static str, String) {
        (
            prolog_atom(&self.vuln_id),
            self.range.atom(),
            prolog_atom(&self.consequence),
        )
    }

    pub fn to_fact(&self) -> Fact {
        Fact::new(
            "vulProperty",
            vec![
                Term::atom(&self.vuln_id),
                Term::atom(self.range.atom()),
                Term::atom(&self.consequence),
            ],
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct VulnerabilityFacts {
    pub host_groups: Vec<HostGroup>,
    pub properties: HashSet<VulnProperty>,
}

impl VulnerabilityFacts {
    /// Each distinct property once, sorted by its written form.
    pub fn property_facts(&self) -> Vec<Fact> {
        let mut properties: Vec<&VulnProperty> = self.properties.iter().collect();
        properties.sort_by_cached_key(|p| p.sort_key());
        properties.into_iter().map(VulnProperty::to_fact).collect()
    }
}

/// `vulExists/3` and, for remote flaws, `networkServiceInfo/5` per host.
pub fn vulnerability_facts(
    topology: &Topology,
    catalog: &VulnCatalog,
    diagnostics: &mut Diagnostics,
) -> VulnerabilityFacts {
    let mut out = VulnerabilityFacts::default();

    for host in topology.hosts().filter(|h| !h.vulnerabilities.is_empty()) {
        let mut group = HostGroup {
            host_name: host.name.clone(),
            facts: Vec::new(),
        };

        for vuln in &host.vulnerabilities {
            let Some(descriptor) = catalog.get(&vuln.playbook_path) else {
                diagnostics.warn(Warning::UnmappedVulnerability {
                    playbook_path: vuln.playbook_path.clone(),
                    host: host.name.clone(),
                });
                continue;
            };

            group.facts.push(Fact::new(
                "vulExists",
                vec![
                    Term::atom(&host.name),
                    Term::atom(&descriptor.vuln_id),
                    Term::atom(&descriptor.program),
                ],
            ));
            out.properties.insert(VulnProperty {
                vuln_id: descriptor.vuln_id.clone(),
                range: descriptor.range(),
                consequence: descriptor.consequence.clone(),
            });

            if let Some(service) = descriptor.service() {
                let owner = match vuln.service_user() {
                    Some(user) => user,
                    None => {
                        diagnostics.service_fell_back_to_superuser();
                        SUPERUSER
                    }
                };
                group.facts.push(Fact::new(
                    "networkServiceInfo",
                    vec![
                        Term::atom(&host.name),
                        Term::atom(&descriptor.program),
                        Term::atom(&service.protocol),
                        Term::Int(i64::from(service.port)),
                        Term::Atom(namespace_principal(owner, &host.name)),
                    ],
                ));
            }
        }

        out.host_groups.push(group);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::playbooks;
    use crate::types::{Goal, Host, Network, Subnet};

    fn single_subnet(hosts: Vec<Host>) -> Topology {
        Topology {
            networks: vec![Network {
                name: "n".into(),
                subnets: vec![Subnet {
                    name: "s".into(),
                    external: false,
                    hosts,
                }],
            }],
            ..Default::default()
        }
    }

    fn rendered(facts: &[Fact]) -> Vec<String> {
        facts.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_attacker_is_on_the_internet() {
        assert_eq!(attacker_location().to_string(), "attackerLocated(internet).");
    }

    #[test]
    fn test_goal_defaults_to_superuser() {
        let mut topology = single_subnet(vec![Host::new("h1", "db_0")]);
        topology.goals.push(Goal {
            target_host_id: "h1".into(),
            target_user: None,
        });
        let mut diagnostics = Diagnostics::new();
        let facts = goal_facts(&topology, &mut diagnostics);
        assert_eq!(rendered(&facts), vec!["attackGoal(execCode(db_0, root))."]);
        assert_eq!(diagnostics.fallbacks().goal_superuser, 1);
    }

    #[test]
    fn test_unknown_goal_host_is_skipped() {
        let mut topology = single_subnet(vec![Host::new("h1", "db_0")]);
        topology.goals.push(Goal {
            target_host_id: "missing".into(),
            target_user: Some("bob".into()),
        });
        topology.goals.push(Goal {
            target_host_id: "h1".into(),
            target_user: Some("bob".into()),
        });
        let mut diagnostics = Diagnostics::new();
        let facts = goal_facts(&topology, &mut diagnostics);
        assert_eq!(
            rendered(&facts),
            vec!["attackGoal(execCode(db_0, bob_db_0))."]
        );
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_accounts_are_namespaced_with_permission() {
        let topology = single_subnet(vec![Host::new("h1", "web_0")
            .with_user("root", true)
            .with_user("Tomcat", false)]);
        assert_eq!(
            rendered(&account_facts(&topology)),
            vec![
                "hasAccount(root, web_0, root).",
                "hasAccount('Tomcat_web_0', web_0, user).",
            ]
        );
    }

    #[test]
    fn test_unmapped_vulnerability_skips_only_itself() {
        let topology = single_subnet(vec![Host::new("h1", "box")
            .with_vulnerability("unknown.yml", None)
            .with_vulnerability(playbooks::SUDO_BARON, None)]);
        let mut diagnostics = Diagnostics::new();
        let out = vulnerability_facts(&topology, &VulnCatalog::builtin(), &mut diagnostics);
        assert_eq!(out.host_groups.len(), 1);
        assert_eq!(
            rendered(&out.host_groups[0].facts),
            vec!["vulExists(box, 'CVE-2021-3156', sudo)."]
        );
        assert_eq!(diagnostics.warnings().len(), 1);
        assert_eq!(diagnostics.fallbacks().service_superuser, 0);
    }

    #[test]
    fn test_remote_service_owner_is_namespaced() {
        let topology = single_subnet(vec![
            Host::new("h1", "nc_0").with_vulnerability(playbooks::NETCAT_SHELL, Some("alice"))
        ]);
        let out = vulnerability_facts(&topology, &VulnCatalog::builtin(), &mut Diagnostics::new());
        assert_eq!(
            rendered(&out.host_groups[0].facts),
            vec![
                "vulExists(nc_0, netcatBackdoor, netcat).",
                "networkServiceInfo(nc_0, netcat, tcp, 4444, alice_nc_0).",
            ]
        );
    }

    #[test]
    fn test_properties_are_deduplicated_and_sorted() {
        let topology = single_subnet(vec![
            Host::new("h1", "a")
                .with_vulnerability(playbooks::WRITEABLE_PASSWD, None)
                .with_vulnerability(playbooks::APACHE_STRUTS, None),
            Host::new("h2", "b").with_vulnerability(playbooks::APACHE_STRUTS, None),
        ]);
        let out = vulnerability_facts(&topology, &VulnCatalog::builtin(), &mut Diagnostics::new());
        assert_eq!(
            rendered(&out.property_facts()),
            vec![
                "vulProperty('CVE-2017-5638', remoteExploit, privEscalation).",
                "vulProperty(writeablePasswd, localExploit, privEscalation).",
            ]
        );
    }
}
