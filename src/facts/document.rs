// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sectioned fact documents (the contents of MulVAL's `input.P`)

use super::term::Fact;
use std::collections::BTreeMap;

/// One line of a section body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Fact(Fact),
    /// `/* ... */` line, e.g. the host name heading a vulnerability group
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn push_fact(&mut self, fact: Fact) {
        self.entries.push(Entry::Fact(fact));
    }

    pub fn push_comment(&mut self, text: &str) {
        self.entries.push(Entry::Comment(text.to_string()));
    }

    pub fn extend_facts(&mut self, facts: impl IntoIterator<Item = Fact>) {
        self.entries.extend(facts.into_iter().map(Entry::Fact));
    }

    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Fact(fact) => Some(fact),
            Entry::Comment(_) => None,
        })
    }
}

/// Ordered list of sections; rendering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactDocument {
    pub sections: Vec<Section>,
}

impl FactDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.sections.iter().flat_map(|s| s.facts())
    }

    /// Facts per predicate signature (`hacl/4` and so on).
    pub fn counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for fact in self.facts() {
            *counts.entry(fact.signature()).or_insert(0) += 1;
        }
        counts
    }

    /// Each section is a title comment, its entries, then a blank line.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for section in &self.sections {
            lines.push(comment(&section.title));
            for entry in &section.entries {
                lines.push(match entry {
                    Entry::Fact(fact) => fact.to_string(),
                    Entry::Comment(text) => comment(text),
                });
            }
            lines.push(String::new());
        }
        lines.join("\n")
    }
}

/// Comments cannot nest, so a stray terminator in a name is broken up.
fn comment(text: &str) -> String {
    format!("/* {} */", text.replace("*/", "* /"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Term;

    #[test]
    fn test_render_sections_with_blank_separators() {
        let mut doc = FactDocument::new();
        let mut first = Section::new("Attacker location");
        first.push_fact(Fact::new("attackerLocated", vec![Term::atom("internet")]));
        doc.push(first);
        let mut second = Section::new("Hosts");
        second.push_comment("web_0");
        doc.push(second);

        assert_eq!(
            doc.render(),
            "/* Attacker location */\nattackerLocated(internet).\n\n/* Hosts */\n/* web_0 */\n"
        );
    }

    #[test]
    fn test_comment_terminator_is_neutralised() {
        assert_eq!(comment("evil*/host"), "/* evil* /host */");
    }

    #[test]
    fn test_counts_by_signature() {
        let mut doc = FactDocument::new();
        let mut section = Section::new("s");
        section.push_comment("ignored");
        section.extend_facts(vec![
            Fact::new("hacl", vec![Term::atom("a"), Term::atom("a"), Term::Wildcard, Term::Wildcard]),
            Fact::new("hacl", vec![Term::atom("b"), Term::atom("b"), Term::Wildcard, Term::Wildcard]),
        ]);
        doc.push(section);
        assert_eq!(doc.counts().get("hacl/4"), Some(&2));
        assert_eq!(doc.facts().count(), 2);
    }
}
