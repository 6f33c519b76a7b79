// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tests for the sweep subcommand (batch topology compilation)

use mulval_facts::presets;
use mulval_facts::sweep::{self, SweepConfig};
use mulval_facts::VulnCatalog;
use std::fs;
use tempfile::TempDir;

fn write_preset(dir: &std::path::Path, name: &str, hosts: usize) {
    let json = serde_json::to_string_pretty(&presets::dumbbell(hosts)).unwrap();
    fs::write(dir.join(name), json).unwrap();
}

#[test]
fn test_sweep_empty_directory() {
    let dir = TempDir::new().unwrap();
    let config = SweepConfig {
        directory: dir.path().to_path_buf(),
        out_dir: None,
        lenient: false,
    };

    let report = sweep::run(&config, &VulnCatalog::builtin()).expect("sweep should succeed");
    assert_eq!(report.topologies_found, 0);
    assert!(report.results.is_empty());
}

#[test]
fn test_sweep_ignores_other_files() {
    let dir = TempDir::new().unwrap();
    write_preset(dir.path(), "lab.json", 4);
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    fs::create_dir_all(dir.path().join("nested")).unwrap();
    write_preset(&dir.path().join("nested"), "deep.json", 4);

    let config = SweepConfig {
        directory: dir.path().to_path_buf(),
        out_dir: None,
        lenient: false,
    };
    let report = sweep::run(&config, &VulnCatalog::builtin()).unwrap();
    assert_eq!(report.topologies_found, 1);
    assert!(dir.path().join("lab.P").is_file());
}

#[test]
fn test_sweep_continues_past_bad_files() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("facts");
    write_preset(dir.path(), "a.json", 4);
    fs::write(dir.path().join("b.yaml"), "networks: [unclosed").unwrap();
    write_preset(dir.path(), "c.json", 6);

    let config = SweepConfig {
        directory: dir.path().to_path_buf(),
        out_dir: Some(out.clone()),
        lenient: false,
    };
    let report = sweep::run(&config, &VulnCatalog::builtin()).unwrap();

    assert_eq!(report.topologies_found, 3);
    assert_eq!(report.compiled, 2);
    assert_eq!(report.failed, 1);
    assert!(report.results[1].error.is_some());
    assert!(out.join("a.P").is_file());
    assert!(out.join("c.P").is_file());

    let facts = fs::read_to_string(out.join("c.P")).unwrap();
    assert!(facts.contains("hacl(webserver_2, database_2, _, _)."));
    assert!(report.results[2].fact_count > report.results[0].fact_count);
}

#[test]
fn test_sweep_rejects_invalid_topology_unless_lenient() {
    let dir = TempDir::new().unwrap();
    let mut topology = presets::chain(3);
    let duplicate = topology.networks[0].subnets[0].hosts[0].clone();
    topology.networks[0].subnets[0].hosts.push(duplicate);
    fs::write(
        dir.path().join("dup.yaml"),
        serde_yaml::to_string(&topology).unwrap(),
    )
    .unwrap();

    let strict = SweepConfig {
        directory: dir.path().to_path_buf(),
        out_dir: None,
        lenient: false,
    };
    let report = sweep::run(&strict, &VulnCatalog::builtin()).unwrap();
    assert_eq!(report.failed, 1);
    assert!(report.results[0]
        .error
        .as_deref()
        .unwrap()
        .contains("duplicate host id"));

    let lenient = SweepConfig {
        lenient: true,
        ..strict
    };
    let report = sweep::run(&lenient, &VulnCatalog::builtin()).unwrap();
    assert_eq!(report.compiled, 1);
}

#[test]
fn test_sweep_report_written_as_json() {
    let dir = TempDir::new().unwrap();
    write_preset(dir.path(), "lab.json", 2);
    let config = SweepConfig {
        directory: dir.path().to_path_buf(),
        out_dir: None,
        lenient: false,
    };
    let report = sweep::run(&config, &VulnCatalog::builtin()).unwrap();
    let path = dir.path().join("reports/sweep.json");
    sweep::write_report(&report, &path).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed["compiled"], 1);
}
