// SPDX-License-Identifier: PMPL-1.0-or-later

//! Atom sanitiser
//!
//! A name is left bare when it is already a plain Prolog atom: a lowercase
//! ASCII letter followed by ASCII letters, digits or underscores. Anything
//! else is wrapped in single quotes, with backslashes and quotes escaped so
//! the result is always exactly one token.

/// Render `name` as a single, syntactically valid Prolog atom.
pub fn prolog_atom(name: &str) -> String {
    if is_plain_atom(name) {
        return name.to_string();
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('\'');
    for c in name.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// True when `name` can be written without quotes.
pub fn is_plain_atom(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
