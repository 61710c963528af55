//! References handed to the linker.

use std::fmt;

use serde::Serialize;

use crate::symbol::SymbolKind;

/// A promise that a symbol of `kind` named `id` exists somewhere.
///
/// Existence is checked by the linker, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SimpleReference {
    pub kind: SymbolKind,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComplexReferenceParent {
    /// Payloads that are only copied during layout.
    Layout,
    Container,
    PackageGroup,
    PayloadGroup,
    Package,
}

/// Kind of a grouped item.
///
/// Rollback boundaries share the package namespace, so they are registered
/// as `Package` children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComplexReferenceChild {
    Package,
    PackageGroup,
    Payload,
    PayloadGroup,
}

impl fmt::Display for ComplexReferenceParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for ComplexReferenceChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One item of an ordered group, optionally placed after a sibling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComplexReference {
    pub parent_kind: ComplexReferenceParent,
    pub parent_id: String,
    pub child_kind: ComplexReferenceChild,
    pub child_id: String,
    pub previous: Option<(ComplexReferenceChild, String)>,
}

impl fmt::Display for ComplexReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.parent_kind, self.parent_id, self.child_kind, self.child_id
        )?;
        if let Some((kind, id)) = &self.previous {
            write!(f, " after {kind}:{id}")?;
        }
        Ok(())
    }
}
