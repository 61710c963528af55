//! Compilation units.

use std::fmt;

use serde::Serialize;

/// Kind of the element that opened a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    Package,
    Module,
    Bundle,
    Patch,
    Fragment,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionKind::Package => "Package",
            SectionKind::Module => "Module",
            SectionKind::Bundle => "Bundle",
            SectionKind::Patch => "Patch",
            SectionKind::Fragment => "Fragment",
        };
        f.write_str(name)
    }
}

/// Index of a section inside an [`Intermediate`](crate::Intermediate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SectionId(pub(crate) u32);

impl SectionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A compilation unit. Owns the symbols emitted while it is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Authored or synthesized name; fragments may be anonymous.
    pub id: Option<String>,
    pub kind: SectionKind,
    /// Distinguishes sections produced by different compile runs.
    pub compilation_id: u32,
}

impl Section {
    pub fn new(id: Option<String>, kind: SectionKind, compilation_id: u32) -> Self {
        Self {
            id,
            kind,
            compilation_id,
        }
    }
}
