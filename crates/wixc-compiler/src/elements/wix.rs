//! Document root and fragments.

use std::sync::LazyLock;

use wixc_core::SectionKind;

use super::sequence::SEQUENCE_ELEMENTS;
use crate::Result;
use crate::compile::{ContextMap, Dispatch, Parent, Scope, Session, context_map};
use crate::diagnostics::DiagnosticKind;
use crate::document::Element;

static WIX_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    Dispatch::new()
        .on("Bundle", Session::parse_bundle)
        .on("Package", Session::parse_package)
        .on("Module", Session::parse_module)
        .on("Patch", Session::parse_patch)
        .on("Fragment", Session::parse_fragment)
});

/// Elements that may appear in any fragment.
static FRAGMENT_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    let mut dispatch = Dispatch::new()
        .on("BootstrapperApplication", Session::parse_bootstrapper_application)
        .on("Component", Session::parse_component)
        .on("Container", Session::parse_container)
        .on("CustomAction", Session::parse_custom_action)
        .on("PackageGroup", Session::parse_package_group)
        .on("PayloadGroup", Session::parse_payload_group)
        .on("Property", Session::parse_property)
        .on("Variable", Session::parse_variable);
    for name in SEQUENCE_ELEMENTS {
        dispatch = dispatch.on(name, Session::parse_sequence);
    }
    dispatch
});

impl Session {
    /// Compile the document element.
    pub(crate) fn compile_root(&mut self, root: Element<'_>) -> Result<()> {
        if !root.is_core() || root.local_name() != "Wix" {
            self.diagnostics
                .report(DiagnosticKind::UnexpectedElement, root.range())
                .message(root.name().to_string())
                .args([root.name().to_string()])
                .hint("the document element must be `Wix`")
                .emit();
            return Ok(());
        }

        let mut deferred = Vec::new();
        for attr in root.attributes() {
            if attr.is_core() {
                self.unexpected_attribute(root, attr);
            } else {
                deferred.push(attr);
            }
        }
        self.parse_extension_attributes(root, &deferred, &ContextMap::new());

        let mut scope = Scope::new(Parent::Unit);
        self.dispatch_children(root, &WIX_CHILDREN, &mut scope)
    }

    fn parse_fragment(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut id = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = Some(self.identifier_value(element, attr)),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        let section_id = id.filter(|id| !id.is_invalid()).map(|id| id.id);

        self.in_section(SectionKind::Fragment, section_id.clone(), None, None, |s| {
            let context = match &section_id {
                Some(id) => context_map([("Id", id.as_str())]),
                None => ContextMap::new(),
            };
            s.parse_extension_attributes(element, &deferred, &context);
            let mut scope = Scope::new(Parent::Unit).with_context(context);
            s.dispatch_children(element, &FRAGMENT_CHILDREN, &mut scope)
        })
    }
}
