//! State of the compilation unit currently being compiled.

use wixc_core::{SectionId, SectionKind};

/// Active section and the mode flags derived from it.
///
/// A fresh context starts every compile. Entering a section replaces the
/// whole value; [`Session::in_section`](super::Session::in_section) puts the
/// previous one back when the section's element returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationContext {
    section: Option<(SectionId, SectionKind)>,
    name: Option<String>,
    language: Option<String>,
}

impl CompilationContext {
    pub(crate) fn entering(
        section: SectionId,
        kind: SectionKind,
        name: Option<String>,
        language: Option<String>,
    ) -> Self {
        Self {
            section: Some((section, kind)),
            name,
            language,
        }
    }

    pub fn active_section(&self) -> Option<SectionId> {
        self.section.map(|(id, _)| id)
    }

    pub fn active_section_kind(&self) -> Option<SectionKind> {
        self.section.map(|(_, kind)| kind)
    }

    /// Name of the package or module being compiled.
    pub fn active_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn active_language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn compiling_module(&self) -> bool {
        self.active_section_kind() == Some(SectionKind::Module)
    }

    pub fn compiling_package(&self) -> bool {
        self.active_section_kind() == Some(SectionKind::Package)
    }

    pub fn compiling_bundle(&self) -> bool {
        self.active_section_kind() == Some(SectionKind::Bundle)
    }

    /// Whether an installer database (package or module) is being compiled.
    pub fn compiling_database(&self) -> bool {
        self.compiling_module() || self.compiling_package()
    }
}
