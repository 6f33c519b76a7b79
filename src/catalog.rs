// SPDX-License-Identifier: PMPL-1.0-or-later

//! Vulnerability catalog
//!
//! Maps provisioning playbook paths to the MulVAL description of the flaw
//! they plant. The catalog is an immutable value handed to the compiler; a
//! missing entry only makes the fact base less complete.

use crate::error::{FactsError, Result};
use crate::format;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Playbook paths of the builtin entries.
pub mod playbooks {
    pub const APACHE_STRUTS: &str = "vulnerabilities/apacheStruts/setupStruts.yml";
    pub const NETCAT_SHELL: &str = "vulnerabilities/NetcatShell.yml";
    pub const SSH_KEYS: &str = "deployment_instance/setup_server_ssh_keys/setup_ssh_keys.yml";
    pub const SUDO_BARON: &str = "vulnerabilities/privledge_escalation/sudobaron/sudobaron.yml";
    pub const WRITEABLE_PASSWD: &str =
        "vulnerabilities/privledge_escalation/writeablePasswd/writeablePasswd.yml";
}

const PRIV_ESCALATION: &str = "privEscalation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExploitRange {
    Remote,
    Local,
}

impl ExploitRange {
    /// Atom used in `vulProperty/3`.
    pub fn atom(self) -> &'static str {
        match self {
            ExploitRange::Remote => "remoteExploit",
            ExploitRange::Local => "localExploit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkService {
    pub protocol: String,
    pub port: u16,
}

/// How the flaw is reached. Only remote flaws carry a listening service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exposure {
    Remote(NetworkService),
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploitDescriptor {
    pub vuln_id: String,
    pub program: String,
    pub consequence: String,
    pub exposure: Exposure,
}

impl ExploitDescriptor {
    pub fn remote(vuln_id: &str, program: &str, protocol: &str, port: u16) -> Self {
        Self {
            vuln_id: vuln_id.to_string(),
            program: program.to_string(),
            consequence: PRIV_ESCALATION.to_string(),
            exposure: Exposure::Remote(NetworkService {
                protocol: protocol.to_string(),
                port,
            }),
        }
    }

    pub fn local(vuln_id: &str, program: &str) -> Self {
        Self {
            vuln_id: vuln_id.to_string(),
            program: program.to_string(),
            consequence: PRIV_ESCALATION.to_string(),
            exposure: Exposure::Local,
        }
    }

    pub fn range(&self) -> ExploitRange {
        match self.exposure {
            Exposure::Remote(_) => ExploitRange::Remote,
            Exposure::Local => ExploitRange::Local,
        }
    }

    pub fn service(&self) -> Option<&NetworkService> {
        match &self.exposure {
            Exposure::Remote(service) => Some(service),
            Exposure::Local => None,
        }
    }
}

/// Flat on-disk form of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntrySpec {
    pub playbook_path: String,
    pub vuln_id: String,
    pub program: String,
    pub range: ExploitRange,
    #[serde(default = "default_consequence")]
    pub consequence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

fn default_consequence() -> String {
    PRIV_ESCALATION.to_string()
}

impl CatalogEntrySpec {
    pub fn to_descriptor(&self) -> Result<ExploitDescriptor> {
        let invalid = |reason: &str| FactsError::InvalidCatalog {
            playbook: self.playbook_path.clone(),
            reason: reason.to_string(),
        };

        if self.vuln_id.trim().is_empty() || self.program.trim().is_empty() {
            return Err(invalid("vuln_id and program must not be empty"));
        }

        let exposure = match (self.range, &self.protocol, self.port) {
            (ExploitRange::Remote, Some(protocol), Some(port)) => {
                Exposure::Remote(NetworkService {
                    protocol: protocol.clone(),
                    port,
                })
            }
            (ExploitRange::Remote, _, _) => {
                return Err(invalid("remote entries need both protocol and port"))
            }
            (ExploitRange::Local, None, None) => Exposure::Local,
            (ExploitRange::Local, _, _) => {
                return Err(invalid("local entries must not declare protocol or port"))
            }
        };

        Ok(ExploitDescriptor {
            vuln_id: self.vuln_id.clone(),
            program: self.program.clone(),
            consequence: self.consequence.clone(),
            exposure,
        })
    }

    fn from_descriptor(playbook_path: &str, descriptor: &ExploitDescriptor) -> Self {
        let service = descriptor.service();
        Self {
            playbook_path: playbook_path.to_string(),
            vuln_id: descriptor.vuln_id.clone(),
            program: descriptor.program.clone(),
            range: descriptor.range(),
            consequence: descriptor.consequence.clone(),
            protocol: service.map(|s| s.protocol.clone()),
            port: service.map(|s| s.port),
        }
    }
}

/// Ordered, read-only playbook → descriptor table
#[derive(Debug, Clone, Default)]
pub struct VulnCatalog {
    entries: Vec<(String, ExploitDescriptor)>,
    index: HashMap<String, usize>,
}

impl VulnCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for every vulnerability the provisioning playbooks can plant.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        // Lateral movement
        catalog.insert(
            playbooks::APACHE_STRUTS,
            ExploitDescriptor::remote("CVE-2017-5638", "httpd", "tcp", 8080),
        );
        catalog.insert(
            playbooks::NETCAT_SHELL,
            ExploitDescriptor::remote("netcatBackdoor", "netcat", "tcp", 4444),
        );
        catalog.insert(
            playbooks::SSH_KEYS,
            ExploitDescriptor::remote("sshKeyMisconfig", "sshd", "tcp", 22),
        );
        // Privilege escalation
        catalog.insert(
            playbooks::SUDO_BARON,
            ExploitDescriptor::local("CVE-2021-3156", "sudo"),
        );
        catalog.insert(
            playbooks::WRITEABLE_PASSWD,
            ExploitDescriptor::local("writeablePasswd", "kernel"),
        );
        catalog
    }

    /// Load a JSON or YAML list of [`CatalogEntrySpec`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let specs: Vec<CatalogEntrySpec> = format::load_file(path)?;
        Self::from_specs(&specs)
    }

    pub fn from_specs(specs: &[CatalogEntrySpec]) -> Result<Self> {
        let mut catalog = Self::new();
        for spec in specs {
            catalog.insert(&spec.playbook_path, spec.to_descriptor()?);
        }
        Ok(catalog)
    }

    /// Add or replace an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, playbook_path: &str, descriptor: ExploitDescriptor) {
        let existing = self.index.get(playbook_path).copied();
        match existing {
            Some(pos) => self.entries[pos].1 = descriptor,
            None => {
                self.index
                    .insert(playbook_path.to_string(), self.entries.len());
                self.entries.push((playbook_path.to_string(), descriptor));
            }
        }
    }

    /// Overlay `other` on top of this catalog.
    pub fn merge(mut self, other: VulnCatalog) -> Self {
        for (playbook_path, descriptor) in other.entries {
            self.insert(&playbook_path, descriptor);
        }
        self
    }

    pub fn get(&self, playbook_path: &str) -> Option<&ExploitDescriptor> {
        self.index.get(playbook_path).map(|&pos| &self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExploitDescriptor)> {
        self.entries.iter().map(|(path, d)| (path.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_specs(&self) -> Vec<CatalogEntrySpec> {
        self.iter()
            .map(|(path, d)| CatalogEntrySpec::from_descriptor(path, d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_struts_entry() {
        let catalog = VulnCatalog::builtin();
        assert_eq!(catalog.len(), 5);
        let struts = catalog.get(playbooks::APACHE_STRUTS).unwrap();
        assert_eq!(struts.vuln_id, "CVE-2017-5638");
        assert_eq!(struts.range(), ExploitRange::Remote);
        assert_eq!(
            struts.service(),
            Some(&NetworkService {
                protocol: "tcp".into(),
                port: 8080
            })
        );
    }

    #[test]
    fn test_local_entries_have_no_service() {
        let catalog = VulnCatalog::builtin();
        let sudo = catalog.get(playbooks::SUDO_BARON).unwrap();
        assert_eq!(sudo.range(), ExploitRange::Local);
        assert!(sudo.service().is_none());
        assert_eq!(sudo.range().atom(), "localExploit");
    }

    #[test]
    fn test_unknown_playbook_is_a_miss() {
        assert!(VulnCatalog::builtin().get("nope.yml").is_none());
    }

    #[test]
    fn test_remote_spec_without_port_is_rejected() {
        let spec = CatalogEntrySpec {
            playbook_path: "x.yml".into(),
            vuln_id: "x".into(),
            program: "p".into(),
            range: ExploitRange::Remote,
            consequence: default_consequence(),
            protocol: Some("tcp".into()),
            port: None,
        };
        assert!(matches!(
            spec.to_descriptor(),
            Err(FactsError::InvalidCatalog { .. })
        ));
    }

    #[test]
    fn test_merge_replaces_in_place_and_appends() {
        let mut overlay = VulnCatalog::new();
        overlay.insert(
            playbooks::NETCAT_SHELL,
            ExploitDescriptor::remote("netcatBackdoor", "ncat", "tcp", 5555),
        );
        overlay.insert("extra.yml", ExploitDescriptor::local("dirtyPipe", "kernel"));

        let merged = VulnCatalog::builtin().merge(overlay);
        let paths: Vec<&str> = merged.iter().map(|(p, _)| p).collect();
        assert_eq!(paths[1], playbooks::NETCAT_SHELL);
        assert_eq!(paths.last(), Some(&"extra.yml"));
        assert_eq!(merged.get(playbooks::NETCAT_SHELL).unwrap().program, "ncat");
    }

    #[test]
    fn test_specs_survive_yaml() {
        let yaml = serde_yaml::to_string(&VulnCatalog::builtin().to_specs()).unwrap();
        let specs: Vec<CatalogEntrySpec> = serde_yaml::from_str(&yaml).unwrap();
        let reloaded = VulnCatalog::from_specs(&specs).unwrap();
        assert_eq!(
            reloaded.get(playbooks::SSH_KEYS),
            VulnCatalog::builtin().get(playbooks::SSH_KEYS)
        );
    }
}
