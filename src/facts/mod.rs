// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prolog fact vocabulary for MulVAL input files
//!
//! Provides:
//! - **Terms and facts** rendered in the syntax the MulVAL (XSB) parser reads
//! - **Atom sanitising** so arbitrary names stay single tokens
//! - **Fact documents** made of titled sections and host-group comments

pub mod atom;
pub mod document;
pub mod term;

pub use atom::prolog_atom;
pub use document::{Entry, FactDocument, Section};
pub use term::{Fact, Term};
