//! The chain, package groups and containers.

use std::sync::LazyLock;

use wixc_core::symbol::{ChainSymbol, ContainerSymbol, ContainerType, RollbackBoundarySymbol};
use wixc_core::{
    ComplexReferenceChild, ComplexReferenceParent, Identifier, SymbolData, SymbolKind,
};

use crate::Result;
use crate::compile::{
    CHAIN_GROUP, Dispatch, EmptyRule, OrderingCursor, Parent, Scope, Session, context_map,
    generate_identifier, identifier_from_filename,
};
use crate::document::Element;

/// Children of `Chain` and `PackageGroup`: ordered chain items.
static CHAIN_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    Dispatch::new()
        .on("MsiPackage", Session::parse_msi_package)
        .on("MspPackage", Session::parse_msp_package)
        .on("MsuPackage", Session::parse_msu_package)
        .on("ExePackage", Session::parse_exe_package)
        .on("BundlePackage", Session::parse_bundle_package)
        .on("RollbackBoundary", Session::parse_rollback_boundary)
        .on("PackageGroupRef", Session::parse_package_group_ref)
});

static CONTAINER_CHILDREN: LazyLock<Dispatch> =
    LazyLock::new(|| Dispatch::new().on("PackageGroupRef", Session::parse_package_group_ref));

impl Session {
    pub(super) fn parse_chain(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut disable_rollback = None;
        let mut disable_system_restore = None;
        let mut parallel_cache = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "DisableRollback" => disable_rollback = self.yes_no(element, attr),
                "DisableSystemRestore" => disable_system_restore = self.yes_no(element, attr),
                "ParallelCache" => parallel_cache = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }

        let context = context_map([("Id", CHAIN_GROUP)]);
        self.parse_extension_attributes(element, &deferred, &context);

        let mut scope = Scope::new(Parent::Unit)
            .with_cursor(OrderingCursor::ordered(
                ComplexReferenceParent::PackageGroup,
                CHAIN_GROUP,
            ))
            .with_context(context);
        self.dispatch_children(element, &CHAIN_CHILDREN, &mut scope)?;

        self.emit(
            Identifier::global(CHAIN_GROUP),
            SymbolData::Chain(ChainSymbol {
                disable_rollback: disable_rollback.unwrap_or(false),
                disable_system_restore: disable_system_restore.unwrap_or(false),
                parallel_cache: parallel_cache.unwrap_or(false),
            }),
        );
        Ok(())
    }

    pub(super) fn parse_package_group(
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
                ComplexReferenceParent::PackageGroup,
                id.as_str(),
            ))
            .with_context(context);
        self.dispatch_children(element, &CHAIN_CHILDREN, &mut scope)?;

        self.emit(id, SymbolData::PackageGroup);
        Ok(())
    }

    /// Reference to a package group from a chain, group or container.
    pub(super) fn parse_package_group_ref(
        &mut self,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        let in_container = matches!(scope.parent, Parent::Container);
        let mut id = None;
        let mut id_seen = false;
        let mut after = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => {
                    id_seen = true;
                    id = self.reference_value(element, attr);
                }
                "After" if in_container => self.unexpected_attribute(element, attr),
                "After" => after = self.reference_value(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if !id_seen {
            self.missing_attribute(element, "Id");
        }
        let id = id.unwrap_or_default();

        self.create_simple_reference(SymbolKind::PackageGroup, &id);
        let after = after.map(|a| (ComplexReferenceChild::Package, a));
        self.register_child(
            scope.ensure_cursor(),
            ComplexReferenceChild::PackageGroup,
            &id,
            after,
        );

        let id = Identifier::global(id);
        self.finish_leaf(element, &deferred, &id);
        Ok(())
    }

    fn parse_rollback_boundary(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        let mut id = None;
        let mut vital = None;
        let mut transaction = None;
        let mut log_path_variable = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = Some(self.identifier_value(element, attr)),
                "Vital" => vital = self.yes_no(element, attr),
                "Transaction" => transaction = self.yes_no(element, attr),
                "LogPathVariable" => {
                    log_path_variable = self.string_value(element, attr, EmptyRule::CanBeEmpty)
                }
                _ => self.unexpected_attribute(element, attr),
            }
        }

        let cursor = scope.ensure_cursor();
        let id = id.unwrap_or_else(|| {
            let position = element.position().to_string();
            let synthesized = generate_identifier("rba", &[cursor.parent_id(), &position]);
            tracing::trace!(id = %synthesized, "synthesized rollback boundary id");
            Identifier::global(synthesized)
        });

        // Boundaries share the package namespace inside a chain.
        self.register_child(cursor, ComplexReferenceChild::Package, id.as_str(), None);
        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::RollbackBoundary(RollbackBoundarySymbol {
                vital: vital.unwrap_or(true),
                transaction: transaction.unwrap_or(false),
                log_path_variable,
            }),
        );
        Ok(())
    }

    pub(super) fn parse_container(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut id = None;
        let mut name = None;
        let mut container_type = None;
        let mut download_url = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = Some(self.identifier_value(element, attr)),
                "Name" => name = self.long_filename(element, attr, false),
                "Type" => {
                    container_type = self.enum_value(
                        element,
                        attr,
                        &[
                            ("attached", ContainerType::Attached),
                            ("detached", ContainerType::Detached),
                        ],
                    )
                }
                "DownloadUrl" => {
                    download_url =
                        self.string_value(element, attr, EmptyRule::MustHaveNonWhitespaceCharacters)
                }
                _ => self.unexpected_attribute(element, attr),
            }
        }

        let id = match (id, &name) {
            (Some(id), _) => id,
            (None, Some(name)) => Identifier::global(identifier_from_filename(name)),
            (None, None) => {
                if element.attribute("Name").is_none() {
                    self.expected_attributes(element, &["Id", "Name"]);
                }
                Identifier::invalid()
            }
        };
        let container_type = container_type.unwrap_or_default();
        if container_type == ContainerType::Attached && download_url.is_some() {
            self.mutually_exclusive(element, "Type", "DownloadUrl");
        }

        let context = context_map([("Id", id.as_str())]);
        self.parse_extension_attributes(element, &deferred, &context);

        let mut scope = Scope::new(Parent::Container)
            .with_cursor(OrderingCursor::unordered(
                ComplexReferenceParent::Container,
                id.as_str(),
            ))
            .with_context(context);
        self.dispatch_children(element, &CONTAINER_CHILDREN, &mut scope)?;

        self.emit(
            id,
            SymbolData::Container(ContainerSymbol {
                name,
                container_type,
                download_url,
            }),
        );
        Ok(())
    }
}
