//! Hook points for elements and attributes in foreign namespaces.

use indexmap::IndexMap;
use rowan::TextRange;
use wixc_core::{
    ComplexReference, ComplexReferenceChild, ComplexReferenceParent, Identifier, SymbolData,
    SymbolKind,
};

use super::attributes::EmptyRule;
use super::context::CompilationContext;
use super::identifiers::generate_identifier;
use super::Session;
use crate::diagnostics::{DiagnosticBuilder, DiagnosticKind};
use crate::document::{Attribute, Element};

/// Resolved values of the enclosing core element, in resolution order.
///
/// Always carries `Id` once the element's identifier is final.
pub type ContextMap = IndexMap<String, String>;

pub(crate) fn context_map<const N: usize>(entries: [(&str, &str); N]) -> ContextMap {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

/// A compiler extension owning one XML namespace.
///
/// Both hooks return whether they handled the node. Declining leaves a
/// warning behind, as does a namespace no extension claims.
pub trait CompilerExtension: Send + Sync {
    fn namespace(&self) -> &str;

    fn parse_attribute(
        &self,
        cx: &mut ExtensionContext<'_>,
        element: Element<'_>,
        attribute: &Attribute,
        context: &ContextMap,
    ) -> bool {
        let _ = (cx, element, attribute, context);
        false
    }

    fn parse_element(
        &self,
        cx: &mut ExtensionContext<'_>,
        parent: Element<'_>,
        element: Element<'_>,
        context: &ContextMap,
    ) -> bool {
        let _ = (cx, parent, element, context);
        false
    }
}

/// Registered extensions, looked up by namespace.
#[derive(Default)]
pub(crate) struct ExtensionSet {
    by_namespace: IndexMap<String, Box<dyn CompilerExtension>>,
}

impl ExtensionSet {
    /// Later registrations for the same namespace replace earlier ones.
    pub(crate) fn insert(&mut self, extension: Box<dyn CompilerExtension>) {
        let namespace = extension.namespace().to_owned();
        if self.by_namespace.insert(namespace.clone(), extension).is_some() {
            tracing::debug!(%namespace, "replacing extension");
        }
    }

    pub(crate) fn get(&self, namespace: &str) -> Option<&dyn CompilerExtension> {
        self.by_namespace.get(namespace).map(|e| e.as_ref())
    }

    pub(crate) fn len(&self) -> usize {
        self.by_namespace.len()
    }
}

/// The compiler services an extension callback may use.
///
/// Emission through this context obeys the same gate as core symbols: once
/// any error is recorded nothing more is emitted.
pub struct ExtensionContext<'s> {
    session: &'s mut Session,
    origin: Origin,
}

/// The foreign node a callback was handed, for reporting misuse against it.
struct Origin {
    kind: DiagnosticKind,
    range: TextRange,
    name: String,
}

impl<'s> ExtensionContext<'s> {
    pub(crate) fn for_element(
        session: &'s mut Session,
        parent: Element<'_>,
        element: Element<'_>,
    ) -> Self {
        let origin = Origin {
            kind: DiagnosticKind::UnexpectedElement,
            range: element.range(),
            name: format!("{}/{}", parent.local_name(), element.name()),
        };
        Self { session, origin }
    }

    pub(crate) fn for_attribute(
        session: &'s mut Session,
        element: Element<'_>,
        attribute: &Attribute,
    ) -> Self {
        let origin = Origin {
            kind: DiagnosticKind::UnexpectedAttribute,
            range: attribute.range,
            name: format!("{}/@{}", element.local_name(), attribute.name),
        };
        Self { session, origin }
    }

    pub fn report(&mut self, kind: DiagnosticKind, range: TextRange) -> DiagnosticBuilder<'_> {
        self.session.diagnostics.report(kind, range)
    }

    pub fn has_errors(&self) -> bool {
        self.session.has_errors()
    }

    /// State of the unit being compiled, including its active section.
    pub fn compilation(&self) -> &CompilationContext {
        &self.session.context
    }

    /// Emit a symbol into the active section.
    ///
    /// Outside any section (on the document element or directly under it)
    /// the node the callback was handed is reported as unexpected instead.
    pub fn emit_symbol(
        &mut self,
        id: Identifier,
        definition: impl Into<String>,
        fields: IndexMap<String, String>,
    ) {
        if self.session.context.active_section().is_none() {
            let Origin { kind, range, name } = &self.origin;
            self.session
                .diagnostics
                .report(*kind, *range)
                .message(name.clone())
                .args([name.clone(), id.to_string()])
                .hint("extension symbols need an enclosing section such as `Fragment`")
                .emit();
            return;
        }
        self.session.emit(
            id,
            SymbolData::Extension {
                definition: definition.into(),
                fields,
            },
        );
    }

    pub fn create_simple_reference(&mut self, kind: SymbolKind, id: &str) {
        self.session.create_simple_reference(kind, id);
    }

    pub fn register_complex_reference(
        &mut self,
        parent_kind: ComplexReferenceParent,
        parent_id: &str,
        child_kind: ComplexReferenceChild,
        child_id: &str,
    ) {
        self.session.register_complex_reference(ComplexReference {
            parent_kind,
            parent_id: parent_id.to_owned(),
            child_kind,
            child_id: child_id.to_owned(),
            previous: None,
        });
    }

    /// Place `child_id` right after `previous_id` inside the parent.
    pub fn register_group_ordering(
        &mut self,
        parent_kind: ComplexReferenceParent,
        parent_id: &str,
        child_kind: ComplexReferenceChild,
        child_id: &str,
        previous_kind: ComplexReferenceChild,
        previous_id: &str,
    ) {
        self.session.register_complex_reference(ComplexReference {
            parent_kind,
            parent_id: parent_id.to_owned(),
            child_kind,
            child_id: child_id.to_owned(),
            previous: Some((previous_kind, previous_id.to_owned())),
        });
    }

    pub fn generate_identifier(&self, prefix: &str, discriminators: &[&str]) -> String {
        generate_identifier(prefix, discriminators)
    }

    // Typed getters, same diagnostics as for core attributes.

    pub fn identifier(&mut self, element: Element<'_>, attr: &Attribute) -> Identifier {
        self.session.identifier_value(element, attr)
    }

    pub fn string(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        rule: EmptyRule,
    ) -> Option<String> {
        self.session.string_value(element, attr, rule)
    }

    pub fn yes_no(&mut self, element: Element<'_>, attr: &Attribute) -> Option<bool> {
        self.session.yes_no(element, attr)
    }

    pub fn integer(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        min: i32,
        max: i32,
    ) -> Option<i32> {
        self.session.integer(element, attr, min, max)
    }

    pub fn version(&mut self, element: Element<'_>, attr: &Attribute) -> Option<String> {
        self.session.version(element, attr)
    }

    pub fn guid(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        generatable: bool,
    ) -> Option<String> {
        self.session.guid(element, attr, generatable)
    }

    pub fn codepage(&mut self, element: Element<'_>, attr: &Attribute) -> Option<i32> {
        self.session.codepage(element, attr)
    }

    pub fn long_filename(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        allow_relative: bool,
    ) -> Option<String> {
        self.session.long_filename(element, attr, allow_relative)
    }

    pub fn short_filename(&mut self, element: Element<'_>, attr: &Attribute) -> Option<String> {
        self.session.short_filename(element, attr)
    }
}
