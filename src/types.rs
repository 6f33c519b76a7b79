// SPDX-License-Identifier: PMPL-1.0-or-later

//! Topology model consumed by the fact compiler
//!
//! Both hand-authored topologies (see [`crate::presets`]) and generated JSON
//! descriptions are normalised into these types before compilation. The
//! compiler only ever reads them.

use crate::error::{FactsError, Result};
use crate::format;
use crate::namespace::{namespace_principal, SUPERUSER};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A fully resolved environment description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub subnet_connections: Vec<SubnetConnection>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Host the attacker operates from. It sits outside every subnet, so it
    /// only takes part in goal resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker_host: Option<Host>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub name: String,
    /// Attacker-reachable from the public network.
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub hosts: Vec<Host>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Provisioning recipe that planted the flaw; the catalog key.
    pub playbook_path: String,
    /// Account the exploited service runs as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetConnection {
    pub from_subnet: String,
    pub to_subnet: String,
    #[serde(default)]
    pub bidirectional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub target_host_id: String,
    #[serde(
        default,
        alias = "host_user",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_user: Option<String>,
}

impl Host {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ip_address: None,
            users: Vec::new(),
            vulnerabilities: Vec::new(),
        }
    }

    pub fn with_user(mut self, username: impl Into<String>, is_admin: bool) -> Self {
        self.users.push(User {
            username: username.into(),
            is_admin,
        });
        self
    }

    pub fn with_vulnerability(
        mut self,
        playbook_path: impl Into<String>,
        to_user: Option<&str>,
    ) -> Self {
        self.vulnerabilities.push(Vulnerability {
            playbook_path: playbook_path.into(),
            to_user: to_user.map(str::to_string),
        });
        self
    }
}

impl Vulnerability {
    /// Declared service owner; blank values count as absent.
    pub fn service_user(&self) -> Option<&str> {
        non_blank(self.to_user.as_deref())
    }
}

impl Goal {
    /// Requested principal; blank values count as absent.
    pub fn requested_user(&self) -> Option<&str> {
        non_blank(self.target_user.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Topology {
    /// Load a topology from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        format::load_file(path)
    }

    /// All subnets in traversal order (network order, then subnet order).
    pub fn subnets(&self) -> impl Iterator<Item = &Subnet> {
        self.networks.iter().flat_map(|network| network.subnets.iter())
    }

    /// All subnet hosts in traversal order. The attacker host is not included.
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.subnets().flat_map(|subnet| subnet.hosts.iter())
    }

    pub fn host_by_id(&self, id: &str) -> Option<&Host> {
        self.hosts()
            .find(|host| host.id == id)
            .or_else(|| self.attacker_host.as_ref().filter(|host| host.id == id))
    }

    /// Report structural problems that would make emitted atoms ambiguous.
    ///
    /// Dangling references (goals to unknown hosts, connections to unknown
    /// subnets) are not listed here; compilation reports those as warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let mut subnet_names = HashSet::new();
        for subnet in self.subnets() {
            if !subnet_names.insert(subnet.name.as_str()) {
                issues.push(format!("duplicate subnet name '{}'", subnet.name));
            }
        }

        let mut host_ids = HashSet::new();
        let mut host_names = HashSet::new();
        for host in self.hosts().chain(self.attacker_host.iter()) {
            if !host_ids.insert(host.id.as_str()) {
                issues.push(format!("duplicate host id '{}'", host.id));
            }
            if !host_names.insert(host.name.as_str()) {
                issues.push(format!("duplicate host name '{}'", host.name));
            }
            if host.name.is_empty() {
                issues.push(format!("host '{}' has an empty name", host.id));
            }
        }

        issues.extend(self.principal_collisions());
        issues
    }

    /// Distinct (username, host) pairs that namespace to the same principal,
    /// such as `a_b` on `c` and `a` on `b_c`.
    fn principal_collisions(&self) -> Vec<String> {
        let mut owners: HashMap<String, (&str, &str)> = HashMap::new();
        let mut issues = Vec::new();
        let mut reported = HashSet::new();

        let goal_users = self.goals.iter().filter_map(|goal| {
            let host = self.host_by_id(&goal.target_host_id)?;
            Some((goal.requested_user()?, host.name.as_str()))
        });
        let pairs = self
            .hosts()
            .chain(self.attacker_host.iter())
            .flat_map(|host| {
                let accounts = host.users.iter().map(|u| u.username.as_str());
                let services = host
                    .vulnerabilities
                    .iter()
                    .filter_map(Vulnerability::service_user);
                accounts
                    .chain(services)
                    .map(move |user| (user, host.name.as_str()))
            })
            .chain(goal_users);

        for (user, host) in pairs.filter(|&(user, _)| user != SUPERUSER) {
            let principal = namespace_principal(user, host);
            match owners.get(&principal) {
                Some(&(first_user, first_host)) => {
                    let same_owner = first_user == user && first_host == host;
                    if !same_owner && reported.insert(principal.clone()) {
                        issues.push(format!(
                            "principal '{}' is shared by user '{}' on '{}' and user '{}' on '{}'",
                            principal, first_user, first_host, user, host
                        ));
                    }
                }
                None => {
                    owners.insert(principal, (user, host));
                }
            }
        }

        issues
    }

    pub fn ensure_valid(&self) -> Result<()> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(FactsError::InvalidTopology(issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_subnets() -> Topology {
        Topology {
            networks: vec![Network {
                name: "corp".into(),
                subnets: vec![
                    Subnet {
                        name: "dmz".into(),
                        external: true,
                        hosts: vec![Host::new("h1", "web_0")],
                    },
                    Subnet {
                        name: "lan".into(),
                        external: false,
                        hosts: vec![Host::new("h2", "db_0"), Host::new("h3", "db_1")],
                    },
                ],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_hosts_follow_traversal_order() {
        let topology = two_subnets();
        let names: Vec<&str> = topology.hosts().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["web_0", "db_0", "db_1"]);
    }

    #[test]
    fn test_host_lookup_includes_attacker() {
        let mut topology = two_subnets();
        assert!(topology.host_by_id("attacker").is_none());
        topology.attacker_host = Some(Host::new("attacker", "kali"));
        assert_eq!(topology.host_by_id("attacker").unwrap().name, "kali");
        assert_eq!(topology.host_by_id("h2").unwrap().name, "db_0");
        assert_eq!(topology.hosts().count(), 3);
    }

    #[test]
    fn test_generated_json_shape() {
        let json = r#"{
            "networks": [{"name": "n", "subnets": [{"name": "s", "hosts": [
                {"id": "u-1", "name": "host_0", "ip_address": "10.0.0.5",
                 "users": [{"username": "alice"}],
                 "vulnerabilities": [{"playbook_path": "x.yml", "to_user": null}]}
            ]}]}],
            "subnet_connections": [],
            "goals": [{"type": "data_exfil", "target_host_id": "u-1", "host_user": "alice"}]
        }"#;
        let topology: Topology = serde_json::from_str(json).unwrap();
        let host = topology.host_by_id("u-1").unwrap();
        assert!(!host.users[0].is_admin);
        assert!(!topology.subnets().next().unwrap().external);
        assert_eq!(topology.goals[0].requested_user(), Some("alice"));
        assert_eq!(host.vulnerabilities[0].service_user(), None);
    }

    #[test]
    fn test_blank_users_count_as_absent() {
        let goal = Goal {
            target_host_id: "h".into(),
            target_user: Some("  ".into()),
        };
        assert_eq!(goal.requested_user(), None);
    }

    #[test]
    fn test_validate_reports_principal_collision() {
        let mut topology = two_subnets();
        let lan = &mut topology.networks[0].subnets[1].hosts;
        lan[0] = Host::new("h2", "c").with_user("a_b", false);
        lan[1] = Host::new("h3", "b_c").with_user("a", false);
        let issues = topology.validate();
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert!(issues[0].contains("'a_b_c'"), "{}", issues[0]);
    }

    #[test]
    fn test_same_principal_from_same_owner_is_fine() {
        let mut topology = two_subnets();
        topology.networks[0].subnets[0].hosts[0] = Host::new("h1", "web_0")
            .with_user("alice", false)
            .with_user("root", true)
            .with_vulnerability("x.yml", Some("alice"));
        topology.networks[0].subnets[1].hosts[0] =
            Host::new("h2", "db_0").with_user("root", true);
        topology.goals.push(Goal {
            target_host_id: "h1".into(),
            target_user: Some("alice".into()),
        });
        assert!(topology.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_duplicates() {
        let mut topology = two_subnets();
        assert!(topology.validate().is_empty());
        topology.networks[0].subnets[1]
            .hosts
            .push(Host::new("h1", "web_0"));
        topology.networks[0].subnets.push(Subnet {
            name: "dmz".into(),
            external: false,
            hosts: vec![],
        });
        let issues = topology.validate();
        assert_eq!(issues.len(), 3, "{issues:?}");
        assert!(matches!(
            topology.ensure_valid(),
            Err(FactsError::InvalidTopology(_))
        ));
    }
}
