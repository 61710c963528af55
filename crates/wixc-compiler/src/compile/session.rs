//! State of one compile and the operations every handler shares.

use std::sync::Arc;

use wixc_core::{
    ComplexReference, ComplexReferenceChild, Identifier, SectionKind, SimpleReference, Symbol,
    SymbolData, SymbolKind,
};

use super::context::CompilationContext;
use super::dispatch::{Dispatch, Scope};
use super::emitter::Emitter;
use super::extension::{ContextMap, ExtensionContext, ExtensionSet, context_map};
use super::ordering::OrderingCursor;
use super::{CompileOutput, CompilerConfig};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::document::{Attribute, Element};
use crate::{Error, Result};

/// Everything one compile owns. Never shared between compiles.
pub(crate) struct Session {
    extensions: Arc<ExtensionSet>,
    pub(crate) config: CompilerConfig,
    pub(crate) context: CompilationContext,
    pub(crate) diagnostics: Diagnostics,
    emitter: Emitter,
    depth: u32,
}

impl Session {
    pub(crate) fn new(
        extensions: Arc<ExtensionSet>,
        config: CompilerConfig,
        compilation_id: u32,
    ) -> Self {
        Self {
            extensions,
            config,
            context: CompilationContext::default(),
            diagnostics: Diagnostics::new(),
            emitter: Emitter::new(compilation_id),
            depth: 0,
        }
    }

    pub(crate) fn finish(self) -> CompileOutput {
        let failed = self.diagnostics.has_errors();
        CompileOutput {
            intermediate: self.emitter.finish(failed),
            diagnostics: self.diagnostics,
        }
    }

    pub(crate) fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Run `f` with a new section active, then restore the previous context.
    pub(crate) fn in_section<R>(
        &mut self,
        kind: SectionKind,
        id: Option<String>,
        name: Option<String>,
        language: Option<String>,
        f: impl FnOnce(&mut Session) -> Result<R>,
    ) -> Result<R> {
        let section = self.emitter.add_section(id.clone(), kind);
        let entered = CompilationContext::entering(section, kind, name, language);
        let saved = std::mem::replace(&mut self.context, entered);
        tracing::debug!(%kind, id = id.as_deref().unwrap_or(""), "enter section");

        let result = f(self);

        self.context = saved;
        tracing::debug!(%kind, "leave section");
        result
    }

    // ========================================================================
    // Emission, gated on "no error so far"
    // ========================================================================

    pub(crate) fn emit(&mut self, id: Identifier, data: SymbolData) {
        if self.has_errors() {
            self.emitter.suppress(&id);
            return;
        }
        debug_assert!(!id.is_invalid(), "invalid identifier without an error");
        let section = self.context.ensure_section();
        self.emitter.symbol(Symbol { id, section, data });
    }

    pub(crate) fn create_simple_reference(&mut self, kind: SymbolKind, id: &str) {
        if self.has_errors() {
            return;
        }
        self.emitter.simple_reference(SimpleReference {
            kind,
            id: id.to_owned(),
        });
    }

    pub(crate) fn register_complex_reference(&mut self, reference: ComplexReference) {
        if self.has_errors() {
            self.emitter.suppress(&reference);
            return;
        }
        self.emitter.complex_reference(reference);
    }

    /// Register the next child of a group, optionally placed after `after`.
    pub(crate) fn register_child(
        &mut self,
        cursor: &mut OrderingCursor,
        child_kind: ComplexReferenceChild,
        child_id: &str,
        after: Option<(ComplexReferenceChild, String)>,
    ) {
        let reference = cursor.next(child_kind, child_id, after);
        self.register_complex_reference(reference);
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    pub(crate) fn dispatch_children(
        &mut self,
        element: Element<'_>,
        table: &Dispatch,
        scope: &mut Scope,
    ) -> Result<()> {
        self.dispatch_children_with(element, table, scope, |_, _| true)
    }

    /// Dispatch children through `table`; `admit` may veto (and report) a
    /// core child before lookup.
    pub(crate) fn dispatch_children_with(
        &mut self,
        element: Element<'_>,
        table: &Dispatch,
        scope: &mut Scope,
        mut admit: impl FnMut(&mut Session, Element<'_>) -> bool,
    ) -> Result<()> {
        let mut seen: Vec<&str> = Vec::new();
        for child in element.children() {
            if !child.is_core() {
                self.parse_extension_element(element, child, &scope.context);
                continue;
            }
            if !admit(self, child) {
                continue;
            }

            let name = child.local_name();
            let Some(entry) = table.get(name) else {
                self.unexpected_element(element, child);
                continue;
            };
            if entry.once {
                if seen.contains(&name) {
                    self.too_many_children(element, child);
                    continue;
                }
                seen.push(name);
            }

            tracing::trace!(parent = element.local_name(), child = name, "dispatch");
            self.enter()?;
            let result = (entry.handler)(self, child, scope);
            self.depth -= 1;
            result?;
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.recursion_limit {
            return Err(Error::RecursionLimitExceeded);
        }
        Ok(())
    }

    // ========================================================================
    // Extensions
    // ========================================================================

    /// Close an element without core children: replay its extension
    /// attributes and hand foreign children to extensions.
    pub(crate) fn finish_leaf(
        &mut self,
        element: Element<'_>,
        deferred: &[&Attribute],
        id: &Identifier,
    ) {
        let context = if id.is_invalid() {
            ContextMap::new()
        } else {
            context_map([("Id", id.as_str())])
        };
        self.parse_extension_attributes(element, deferred, &context);
        for child in element.children() {
            if child.is_core() {
                self.unexpected_element(element, child);
            } else {
                self.parse_extension_element(element, child, &context);
            }
        }
    }

    pub(crate) fn parse_extension_element(
        &mut self,
        parent: Element<'_>,
        element: Element<'_>,
        context: &ContextMap,
    ) {
        let extensions = Arc::clone(&self.extensions);
        let handled = match element.namespace().and_then(|ns| extensions.get(ns)) {
            Some(extension) => {
                tracing::trace!(element = %element.name(), "delegating element to extension");
                let mut cx = ExtensionContext::for_element(self, parent, element);
                extension.parse_element(&mut cx, parent, element, context)
            }
            None => false,
        };
        if !handled {
            self.diagnostics
                .report(DiagnosticKind::UnhandledExtensionElement, element.range())
                .message(element.name().to_string())
                .args([parent.local_name().to_owned(), element.name().to_string()])
                .emit();
        }
    }

    /// Replay attributes held back while the element was resolved.
    pub(crate) fn parse_extension_attributes(
        &mut self,
        element: Element<'_>,
        attributes: &[&Attribute],
        context: &ContextMap,
    ) {
        let extensions = Arc::clone(&self.extensions);
        for &attribute in attributes {
            let handled = match attribute.namespace().and_then(|ns| extensions.get(ns)) {
                Some(extension) => {
                    tracing::trace!(
                        attribute = %attribute.name,
                        "delegating attribute to extension"
                    );
                    let mut cx = ExtensionContext::for_attribute(self, element, attribute);
                    extension.parse_attribute(&mut cx, element, attribute, context)
                }
                None => false,
            };
            if !handled {
                self.diagnostics
                    .report(DiagnosticKind::UnhandledExtensionAttribute, attribute.range)
                    .message(attribute.name.to_string())
                    .args([element.local_name().to_owned(), attribute.name.to_string()])
                    .emit();
            }
        }
    }
}
