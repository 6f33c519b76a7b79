// SPDX-License-Identifier: PMPL-1.0-or-later

//! mulval-facts: topology to attack-graph fact compiler.
//!
//! Takes the finished description of a deployed, deliberately vulnerable
//! lab network and projects it into the Prolog fact vocabulary read by the
//! MulVAL attack-graph generator (`input.P`).
//!
//! PIPELINE:
//! 1. **Model**: [`types::Topology`], loaded from JSON/YAML or built by
//!    [`presets`].
//! 2. **Compile**: [`compiler::compile`] walks the model once and emits
//!    attacker, goal, account, reachability, vulnerability and property
//!    facts, collecting [`diagnostics`] for anything it had to drop.
//! 3. **Persist**: [`storage`] writes the rendered document.

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod facts;
pub mod format;
pub mod namespace;
pub mod presets;
pub mod reachability;
pub mod storage;
pub mod sweep;
pub mod types;

pub use catalog::VulnCatalog;
pub use compiler::{compile, Compilation};
pub use error::{FactsError, Result};
pub use types::Topology;
