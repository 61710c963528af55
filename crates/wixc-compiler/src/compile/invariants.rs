//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use wixc_core::SectionId;
use wixc_core::symbol::RegistryRoot;

use super::ordering::OrderingCursor;
use super::{CompilationContext, PackageScope, Parent, Scope};

impl CompilationContext {
    #[inline]
    pub(crate) fn ensure_section(&self) -> SectionId {
        self.active_section().unwrap_or_else(|| {
            panic!("symbol emitted outside a section (every unit handler opens one)")
        })
    }
}

impl Scope {
    #[inline]
    pub(crate) fn ensure_cursor(&mut self) -> &mut OrderingCursor {
        self.cursor.as_mut().unwrap_or_else(|| {
            panic!("grouped child dispatched without an ordering cursor")
        })
    }

    #[inline]
    pub(crate) fn ensure_package(&mut self) -> &mut PackageScope {
        match &mut self.parent {
            Parent::Package(package) => package,
            other => panic!("package child dispatched under {other:?}"),
        }
    }

    /// Component and inherited root/key of a registry element's parent.
    #[inline]
    pub(crate) fn ensure_registry_parent(&self) -> (String, Option<RegistryRoot>, Option<String>) {
        match &self.parent {
            Parent::Component { id } => (id.clone(), None, None),
            Parent::RegistryKey {
                component,
                root,
                key,
            } => (component.clone(), *root, key.clone()),
            other => panic!("registry element dispatched under {other:?}"),
        }
    }
}
