//! The output of one compile: sections, symbols and references.

use std::fmt::Write;

use serde::Serialize;

use crate::reference::{ComplexReference, SimpleReference};
use crate::section::{Section, SectionId};
use crate::symbol::Symbol;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Intermediate {
    sections: Vec<Section>,
    symbols: Vec<Symbol>,
    simple_references: Vec<SimpleReference>,
    complex_references: Vec<ComplexReference>,
}

impl Intermediate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_section(&mut self, section: Section) -> SectionId {
        let id = SectionId(self.sections.len() as u32);
        self.sections.push(section);
        id
    }

    /// Append a symbol.
    ///
    /// # Panics
    /// Panics if the symbol's section was not added first.
    pub fn push_symbol(&mut self, symbol: Symbol) {
        assert!(
            symbol.section.index() < self.sections.len(),
            "symbol `{}` emitted before its section",
            symbol.id
        );
        self.symbols.push(symbol);
    }

    pub fn push_simple_reference(&mut self, reference: SimpleReference) {
        self.simple_references.push(reference);
    }

    pub fn push_complex_reference(&mut self, reference: ComplexReference) {
        self.complex_references.push(reference);
    }

    /// Append everything from `other`, remapping its section ids.
    pub fn append(&mut self, other: Intermediate) {
        let offset = self.sections.len() as u32;
        self.sections.extend(other.sections);
        self.symbols
            .extend(other.symbols.into_iter().map(|mut symbol| {
                symbol.section = SectionId(symbol.section.0 + offset);
                symbol
            }));
        self.simple_references.extend(other.simple_references);
        self.complex_references.extend(other.complex_references);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.index()]
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn simple_references(&self) -> &[SimpleReference] {
        &self.simple_references
    }

    pub fn complex_references(&self) -> &[ComplexReference] {
        &self.complex_references
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
            && self.symbols.is_empty()
            && self.simple_references.is_empty()
            && self.complex_references.is_empty()
    }

    /// Find the first symbol with the given id.
    pub fn symbol(&self, id: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable listing used by snapshot tests.
    ///
    /// Symbols are grouped under their section; references follow.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (index, section) in self.sections.iter().enumerate() {
            match &section.id {
                Some(id) => writeln!(out, "section {} {}", section.kind, id),
                None => writeln!(out, "section {}", section.kind),
            }
            .expect("String write never fails");

            for symbol in self.symbols.iter().filter(|s| s.section.index() == index) {
                write!(out, "  {} {}", symbol.kind(), symbol.id).expect("String write never fails");
                for (name, value) in symbol.data.fields() {
                    write!(out, " {name}={value}").expect("String write never fails");
                }
                out.push('\n');
            }
        }
        for reference in &self.simple_references {
            writeln!(out, "ref {}:{}", reference.kind, reference.id)
                .expect("String write never fails");
        }
        for reference in &self.complex_references {
            writeln!(out, "group {reference}").expect("String write never fails");
        }
        out
    }
}
