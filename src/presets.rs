// SPDX-License-Identifier: PMPL-1.0-or-later

//! Hand-authored benchmark topologies
//!
//! These mirror the environments the provisioning layer deploys, expressed
//! directly in the topology model so they can be compiled without a live
//! deployment.

use crate::catalog::playbooks;
use crate::error::{FactsError, Result};
use crate::types::{Goal, Host, Network, Subnet, SubnetConnection, Topology};
use clap::ValueEnum;

/// Host count of the ICS environment; it is not scalable.
pub const ICS_HOSTS: usize = 47;

const ICS_EMPLOYEES_PER_SUBNET: usize = 10;
const ICS_SENSORS: usize = 20;
const ICS_CONTROL_HOSTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// One flat subnet split into webservers, netcat shells and ssh hosts
    Star,
    /// Webserver subnet with a one-way link into a database subnet
    Dumbbell,
    /// Flat subnet where each host holds keys to the next
    Chain,
    /// Four branch subnets behind an external webserver branch
    Enterprise,
    /// Two employee subnets in front of an operational-technology subnet
    Ics,
}

impl Preset {
    pub fn default_hosts(self) -> usize {
        match self {
            Preset::Star | Preset::Chain => 25,
            Preset::Dumbbell => 30,
            Preset::Enterprise => 20,
            Preset::Ics => ICS_HOSTS,
        }
    }

    /// Reject host counts the preset cannot lay out exactly.
    pub fn check_hosts(self, hosts: usize) -> Result<()> {
        let reason = match self {
            _ if hosts == 0 => Some("at least one host is required".to_string()),
            Preset::Dumbbell if hosts % 2 != 0 => {
                Some("hosts come in webserver/database pairs".to_string())
            }
            Preset::Enterprise if hosts % 4 != 0 => {
                Some("hosts are split evenly over four branches".to_string())
            }
            Preset::Ics if hosts != ICS_HOSTS => {
                Some(format!("the layout is fixed at {} hosts", ICS_HOSTS))
            }
            _ => None,
        };
        match reason {
            Some(reason) => Err(FactsError::InvalidPresetSize {
                preset: format!("{:?}", self).to_lowercase(),
                hosts,
                reason,
            }),
            None => Ok(()),
        }
    }

    pub fn build(self, hosts: usize) -> Result<Topology> {
        self.check_hosts(hosts)?;
        Ok(match self {
            Preset::Star => star(hosts),
            Preset::Dumbbell => dumbbell(hosts),
            Preset::Chain => chain(hosts),
            Preset::Enterprise => enterprise(hosts),
            Preset::Ics => ics(),
        })
    }
}

fn host(network: &str, name: &str) -> Host {
    Host::new(format!("{}.{}", network, name), name)
}

/// Provisioned login for a host: its name with underscores removed.
fn login_for(name: &str) -> String {
    name.replace('_', "")
}

fn attacker(network: &str) -> Host {
    host(network, "attacker_0").with_user("root", true)
}

/// Data-exfiltration goal on every host, as its first user.
fn goals_for<'a>(hosts: impl IntoIterator<Item = &'a Host>) -> Vec<Goal> {
    hosts
        .into_iter()
        .map(|h| Goal {
            target_host_id: h.id.clone(),
            target_user: h.users.first().map(|u| u.username.clone()),
        })
        .collect()
}

fn flat(network: &str, subnet: &str, hosts: Vec<Host>) -> Topology {
    let goals = goals_for(&hosts);
    Topology {
        networks: vec![Network {
            name: network.to_string(),
            subnets: vec![Subnet {
                name: subnet.to_string(),
                external: true,
                hosts,
            }],
        }],
        subnet_connections: Vec::new(),
        goals,
        attacker_host: Some(attacker(network)),
    }
}

pub fn star(count: usize) -> Topology {
    let web_end = count / 3;
    let nc_end = 2 * count / 3;

    let hosts = (0..count)
        .map(|i| {
            let name = format!("host_{}", i);
            let base = host("ring_network", &name);
            if i < web_end {
                base.with_user("tomcat", false)
                    .with_vulnerability(playbooks::APACHE_STRUTS, None)
            } else {
                let login = login_for(&name);
                let playbook = if i < nc_end {
                    playbooks::NETCAT_SHELL
                } else {
                    playbooks::SSH_KEYS
                };
                base.with_user(&login, false)
                    .with_vulnerability(playbook, Some(&login))
            }
        })
        .collect();

    flat("ring_network", "ring_network", hosts)
}

pub fn chain(count: usize) -> Topology {
    let hosts = (0..count)
        .map(|i| {
            let name = format!("host_{}", i);
            let login = login_for(&name);
            host("ring_network", &name)
                .with_user(&login, false)
                .with_vulnerability(playbooks::SSH_KEYS, Some(&login))
        })
        .collect();

    flat("ring_network", "ring_network", hosts)
}

/// `count` hosts split into webserver / database pairs. An odd host is
/// dropped; [`Preset::build`] rejects odd counts.
pub fn dumbbell(count: usize) -> Topology {
    let pairs = count / 2;
    let network = "equifax_network";

    let webservers: Vec<Host> = (0..pairs)
        .map(|i| {
            host(network, &format!("webserver_{}", i))
                .with_user("tomcat", false)
                .with_vulnerability(playbooks::APACHE_STRUTS, None)
        })
        .collect();
    let databases: Vec<Host> = (0..pairs)
        .map(|i| {
            let name = format!("database_{}", i);
            let login = login_for(&name);
            host(network, &name)
                .with_user(&login, false)
                .with_vulnerability(playbooks::SSH_KEYS, Some(&login))
        })
        .collect();

    let goals = goals_for(&databases);
    Topology {
        networks: vec![Network {
            name: network.to_string(),
            subnets: vec![
                Subnet {
                    name: "webserver_network".into(),
                    external: true,
                    hosts: webservers,
                },
                Subnet {
                    name: "critical_company_network".into(),
                    external: false,
                    hosts: databases,
                },
            ],
        }],
        subnet_connections: vec![SubnetConnection {
            from_subnet: "webserver_network".into(),
            to_subnet: "critical_company_network".into(),
            bidirectional: false,
        }],
        goals,
        attacker_host: Some(attacker(network)),
    }
}

fn connection(from: &str, to: &str, bidirectional: bool) -> SubnetConnection {
    SubnetConnection {
        from_subnet: from.to_string(),
        to_subnet: to.to_string(),
        bidirectional,
    }
}

/// Hosts named `{prefix}_{i}`, each logging in as its name without underscores.
fn logins(network: &str, prefix: &str, range: std::ops::Range<usize>) -> Vec<Host> {
    range
        .map(|i| {
            let name = format!("{}_{}", prefix, i);
            let login = login_for(&name);
            host(network, &name).with_user(login, false)
        })
        .collect()
}

/// Four branches of `count / 4` hosts. Branch one serves Struts to the
/// internet and holds ssh keys into the database branches three and four;
/// branch two is the employee branch that talks to both database branches.
pub fn enterprise(count: usize) -> Topology {
    let per_branch = count / 4;
    let network = "equifax_network";

    let webservers: Vec<Host> = (0..per_branch)
        .map(|i| {
            host(network, &format!("webserver_{}", i))
                .with_user("tomcat", false)
                .with_vulnerability(playbooks::APACHE_STRUTS, None)
        })
        .collect();
    let employees = logins(network, "employee", 0..per_branch);
    let databases = |offset: usize| -> Vec<Host> {
        logins(network, "database", offset..offset + per_branch)
            .into_iter()
            .map(|h| {
                let login = h.users[0].username.clone();
                h.with_vulnerability(playbooks::SSH_KEYS, Some(&login))
            })
            .collect()
    };
    let branch_three = databases(0);
    let branch_four = databases(per_branch);

    let goals = goals_for(branch_three.iter().chain(&branch_four));
    let subnet = |name: &str, external: bool, hosts: Vec<Host>| Subnet {
        name: name.to_string(),
        external,
        hosts,
    };

    Topology {
        networks: vec![Network {
            name: network.to_string(),
            subnets: vec![
                subnet("branch_one", true, webservers),
                subnet("branch_two", false, employees),
                subnet("branch_three", false, branch_three),
                subnet("branch_four", false, branch_four),
            ],
        }],
        subnet_connections: vec![
            connection("branch_one", "branch_two", false),
            connection("branch_one", "branch_three", false),
            connection("branch_one", "branch_four", false),
            connection("branch_two", "branch_three", true),
            connection("branch_two", "branch_four", true),
        ],
        goals,
        attacker_host: Some(attacker(network)),
    }
}

/// Fixed ICS-inspired layout of [`ICS_HOSTS`] hosts.
///
/// Each employee subnet has one management host running a netcat shell.
/// Sensors and control hosts in the OT subnet are reachable with planted
/// ssh keys, and the control hosts are the goals.
pub fn ics() -> Topology {
    let network = "ics_inspired";

    let employee_subnet = |prefix: &str, manage: usize| -> Vec<Host> {
        let mut hosts = logins(network, prefix, 0..ICS_EMPLOYEES_PER_SUBNET);
        let name = format!("manage_{}", manage);
        let login = login_for(&name);
        hosts.push(
            host(network, &name)
                .with_user(&login, false)
                .with_vulnerability(playbooks::NETCAT_SHELL, Some(&login)),
        );
        hosts
    };
    let keyed = |prefix: &str, count: usize| -> Vec<Host> {
        logins(network, prefix, 0..count)
            .into_iter()
            .map(|h| {
                let login = h.users[0].username.clone();
                h.with_vulnerability(playbooks::SSH_KEYS, Some(&login))
            })
            .collect()
    };

    let sensors = keyed("sensor", ICS_SENSORS);
    let control_hosts = keyed("control_host", ICS_CONTROL_HOSTS);
    let goals = goals_for(&control_hosts);
    let mut ot_hosts = sensors;
    ot_hosts.extend(control_hosts);

    Topology {
        networks: vec![Network {
            name: network.to_string(),
            subnets: vec![
                Subnet {
                    name: "employee_one_network".into(),
                    external: true,
                    hosts: employee_subnet("employee_A", 0),
                },
                Subnet {
                    name: "employee_two_network".into(),
                    external: true,
                    hosts: employee_subnet("employee_B", 1),
                },
                Subnet {
                    name: "OT_network".into(),
                    external: false,
                    hosts: ot_hosts,
                },
            ],
        }],
        subnet_connections: vec![
            connection("employee_one_network", "employee_two_network", true),
            connection("employee_one_network", "OT_network", false),
            connection("employee_two_network", "OT_network", false),
        ],
        goals,
        attacker_host: Some(attacker(network)),
    }
}
