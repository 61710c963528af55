//! Standalone payloads and payload groups.

use std::sync::LazyLock;

use wixc_core::{
    ComplexReferenceChild, ComplexReferenceParent, Identifier, SymbolData, SymbolKind,
};

use crate::Result;
use crate::compile::{
    Dispatch, OrderingCursor, Parent, PayloadFields, Scope, Session, context_map,
    generate_identifier,
};
use crate::document::Element;

static PAYLOAD_GROUP_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    Dispatch::new()
        .on("Payload", Session::parse_payload)
        .on("PayloadGroupRef", Session::parse_payload_group_ref)
});

impl Session {
    /// A payload registered with whatever group the parent opened.
    pub(super) fn parse_payload(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        let mut fields = PayloadFields::default();
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            if !fields.parse_attribute(self, element, attr, true) {
                self.unexpected_attribute(element, attr);
            }
        }

        let authored = fields.id.take();
        let symbol = fields.resolve(self, element, true);
        let id = authored.unwrap_or_else(|| {
            let id = generate_identifier(
                "pay",
                &[
                    symbol.source_file.as_deref().unwrap_or_default(),
                    symbol.name.as_deref().unwrap_or_default(),
                    symbol.download_url.as_deref().unwrap_or_default(),
                ],
            );
            tracing::trace!(%id, "synthesized payload id");
            Identifier::global(id)
        });

        self.register_child(
            scope.ensure_cursor(),
            ComplexReferenceChild::Payload,
            id.as_str(),
            None,
        );
        self.finish_leaf(element, &deferred, &id);
        self.emit(id, SymbolData::Payload(symbol));
        Ok(())
    }

    pub(super) fn parse_payload_group(
        &mut self,
        element: Element<'_>,
        _: &mut Scope,
    ) -> Result<()> {
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
        let id = id.unwrap_or_else(|| {
            self.missing_attribute(element, "Id");
            Identifier::invalid()
        });

        let context = context_map([("Id", id.as_str())]);
        self.parse_extension_attributes(element, &deferred, &context);

        let mut scope = Scope::new(Parent::Unit)
            .with_cursor(OrderingCursor::ordered(
                ComplexReferenceParent::PayloadGroup,
                id.as_str(),
            ))
            .with_context(context);
        self.dispatch_children(element, &PAYLOAD_GROUP_CHILDREN, &mut scope)?;

        self.emit(id, SymbolData::PayloadGroup);
        Ok(())
    }

    pub(super) fn parse_payload_group_ref(
        &mut self,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        let mut id = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = self.reference_value(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if element.attribute("Id").is_none() {
            self.missing_attribute(element, "Id");
        }

        let id = id.unwrap_or_default();
        self.create_simple_reference(SymbolKind::PayloadGroup, &id);
        self.register_child(
            scope.ensure_cursor(),
            ComplexReferenceChild::PayloadGroup,
            &id,
            None,
        );
        self.finish_leaf(element, &deferred, &Identifier::global(id));
        Ok(())
    }
}
