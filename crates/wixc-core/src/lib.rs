#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Intermediate representation produced by the wixc front end.
//!
//! The front end turns a document into an [`Intermediate`]: sections, typed
//! symbols, simple references (promises checked by the linker) and complex
//! references (ordered group membership resolved topologically later).

pub mod identifier;
pub mod intermediate;
pub mod reference;
pub mod section;
pub mod symbol;

#[cfg(test)]
mod intermediate_tests;

pub use identifier::{Access, Identifier};
pub use intermediate::Intermediate;
pub use reference::{
    ComplexReference, ComplexReferenceChild, ComplexReferenceParent, SimpleReference,
};
pub use section::{Section, SectionId, SectionKind};
pub use symbol::{PackageKind, Symbol, SymbolData, SymbolKind, VariableType};
