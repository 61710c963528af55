//! Bundle and its singleton children.

use std::sync::LazyLock;

use wixc_core::symbol::{
    BootstrapperApplicationSymbol, BundleLogSymbol, BundleSymbol, BundleUpdateSymbol,
    DependencyProviderSymbol, DisableModify, PayloadSymbol, RelatedBundleAction,
    RelatedBundleSymbol,
};
use wixc_core::{
    ComplexReferenceChild, ComplexReferenceParent, Identifier, SectionKind, SymbolData,
};

use crate::Result;
use crate::compile::{
    Dispatch, EmptyRule, LAYOUT_ONLY_PAYLOADS, OrderingCursor, Parent, Scope, Session,
    UX_CONTAINER, context_map, file_name, generate_identifier,
};
use crate::document::{Attribute, Element};

/// Id of the bootstrapper application when none is authored.
const DEFAULT_BOOTSTRAPPER_APPLICATION: &str = "WixBootstrapperApplication";

static BUNDLE_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    Dispatch::new()
        .once("Chain", Session::parse_chain)
        .once("BootstrapperApplication", Session::parse_bootstrapper_application)
        .once("Log", Session::parse_log)
        .once("Update", Session::parse_update)
        .on("RelatedBundle", Session::parse_related_bundle)
        .on("Variable", Session::parse_variable)
        .on("Container", Session::parse_container)
        .on("PackageGroup", Session::parse_package_group)
        .on("PayloadGroup", Session::parse_payload_group)
        .on("PayloadGroupRef", Session::parse_payload_group_ref)
        .on("Payload", Session::parse_payload)
});

static BOOTSTRAPPER_APPLICATION_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    Dispatch::new()
        .on("Payload", Session::parse_payload)
        .on("PayloadGroupRef", Session::parse_payload_group_ref)
});

#[derive(Default)]
struct BundleAttributes {
    id: Option<Identifier>,
    name: Option<String>,
    version: Option<String>,
    manufacturer: Option<String>,
    upgrade_code: Option<String>,
    condition: Option<String>,
    compressed: Option<bool>,
    disable_modify: Option<DisableModify>,
    disable_remove: Option<bool>,
    about_url: Option<String>,
    help_url: Option<String>,
    copyright: Option<String>,
    parent_name: Option<String>,
}

impl Session {
    pub(super) fn parse_bundle(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut a = BundleAttributes::default();
        let strict = EmptyRule::MustHaveNonWhitespaceCharacters;
        let mut version_seen = false;

        // Pass 1: everything that does not need the section.
        for attr in element.attributes().iter().filter(|a| a.is_core()) {
            match attr.local_name() {
                "Id" => a.id = Some(self.identifier_value(element, attr)),
                "Name" => a.name = self.string_value(element, attr, strict),
                "Version" => {
                    version_seen = true;
                    a.version = self.version(element, attr);
                }
                "Manufacturer" => a.manufacturer = self.string_value(element, attr, strict),
                "UpgradeCode" => a.upgrade_code = self.guid(element, attr, false),
                "Condition" => a.condition = self.string_value(element, attr, strict),
                "Compressed" => a.compressed = self.yes_no(element, attr),
                "DisableModify" => {
                    a.disable_modify = self.enum_value(
                        element,
                        attr,
                        &[
                            ("yes", DisableModify::Yes),
                            ("no", DisableModify::No),
                            ("button", DisableModify::Button),
                        ],
                    )
                }
                "DisableRemove" => a.disable_remove = self.yes_no(element, attr),
                "AboutUrl" => a.about_url = self.string_value(element, attr, strict),
                "HelpUrl" => a.help_url = self.string_value(element, attr, strict),
                "Copyright" => a.copyright = self.string_value(element, attr, strict),
                "ParentName" => a.parent_name = self.string_value(element, attr, strict),
                "ProviderKey" => {}
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if !version_seen {
            self.missing_attribute(element, "Version");
        }

        let id = a.id.take().unwrap_or_else(|| {
            Identifier::global(generate_identifier(
                "bnd",
                &[
                    a.name.as_deref().unwrap_or_default(),
                    a.version.as_deref().unwrap_or_default(),
                    a.upgrade_code.as_deref().unwrap_or_default(),
                ],
            ))
        });
        let section_id = (!id.is_invalid()).then(|| id.id.clone());

        self.in_section(SectionKind::Bundle, section_id, a.name.clone(), None, |s| {
            // Pass 2: section-dependent attributes, extension attributes queued.
            let mut deferred = Vec::new();
            for attr in element.attributes() {
                if !attr.is_core() {
                    deferred.push(attr);
                } else if attr.local_name() == "ProviderKey" {
                    s.parse_provider_key(element, attr, &id);
                }
            }

            let context = context_map([("Id", id.as_str())]);
            s.parse_extension_attributes(element, &deferred, &context);

            let mut scope = Scope::new(Parent::Unit)
                .with_cursor(OrderingCursor::ordered(
                    ComplexReferenceParent::Layout,
                    LAYOUT_ONLY_PAYLOADS,
                ))
                .with_context(context);
            s.dispatch_children(element, &BUNDLE_CHILDREN, &mut scope)?;

            s.emit(
                id,
                SymbolData::Bundle(BundleSymbol {
                    name: a.name,
                    version: a.version.unwrap_or_default(),
                    manufacturer: a.manufacturer,
                    upgrade_code: a.upgrade_code,
                    condition: a.condition,
                    compressed: a.compressed,
                    disable_modify: a.disable_modify.unwrap_or_default(),
                    disable_remove: a.disable_remove.unwrap_or(false),
                    about_url: a.about_url,
                    help_url: a.help_url,
                    copyright: a.copyright,
                    parent_name: a.parent_name,
                }),
            );
            Ok(())
        })
    }

    /// `ProviderKey` on a bundle or package: a dependency provider owned by
    /// the active section.
    pub(super) fn parse_provider_key(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        parent: &Identifier,
    ) {
        let Some(key) = self.string_value(element, attr, EmptyRule::MustHaveNonWhitespaceCharacters)
        else {
            return;
        };
        let id = generate_identifier("dep", &[parent.as_str(), &key]);
        self.emit(
            Identifier::global(id),
            SymbolData::DependencyProvider(DependencyProviderSymbol {
                parent: parent.id.clone(),
                key,
            }),
        );
    }

    pub(super) fn parse_bootstrapper_application(
        &mut self,
        element: Element<'_>,
        _: &mut Scope,
    ) -> Result<()> {
        let mut id = None;
        let mut source_file = None;
        let mut name = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = Some(self.identifier_value(element, attr)),
                "SourceFile" => {
                    source_file =
                        self.string_value(element, attr, EmptyRule::MustHaveNonWhitespaceCharacters)
                }
                "Name" => name = self.long_filename(element, attr, true),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        let id = id.unwrap_or_else(|| Identifier::global(DEFAULT_BOOTSTRAPPER_APPLICATION));

        let context = context_map([("Id", id.as_str())]);
        self.parse_extension_attributes(element, &deferred, &context);

        let mut cursor = OrderingCursor::ordered(ComplexReferenceParent::Container, UX_CONTAINER);
        if let Some(source) = &source_file {
            let payload_name = name
                .clone()
                .unwrap_or_else(|| file_name(source).to_owned());
            self.emit(
                id.clone(),
                SymbolData::Payload(PayloadSymbol {
                    name: Some(payload_name),
                    source_file: Some(source.clone()),
                    download_url: None,
                    compressed: Some(true),
                    hash: None,
                    size: None,
                    certificate_public_key: None,
                    certificate_thumbprint: None,
                    description: None,
                    product_name: None,
                    version: None,
                    remote: false,
                }),
            );
            self.register_child(&mut cursor, ComplexReferenceChild::Payload, id.as_str(), None);
        }

        let mut scope = Scope::new(Parent::Unit)
            .with_cursor(cursor)
            .with_context(context);
        self.dispatch_children(element, &BOOTSTRAPPER_APPLICATION_CHILDREN, &mut scope)?;

        self.emit(
            id,
            SymbolData::BootstrapperApplication(BootstrapperApplicationSymbol {
                source_file,
                name,
            }),
        );
        Ok(())
    }

    fn parse_related_bundle(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut code = None;
        let mut code_seen = false;
        let mut action = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Code" => {
                    code_seen = true;
                    code = self.guid(element, attr, false);
                }
                "Action" => {
                    action = self.enum_value(
                        element,
                        attr,
                        &[
                            ("detect", RelatedBundleAction::Detect),
                            ("upgrade", RelatedBundleAction::Upgrade),
                            ("addon", RelatedBundleAction::Addon),
                            ("patch", RelatedBundleAction::Patch),
                        ],
                    )
                }
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if !code_seen {
            self.missing_attribute(element, "Code");
        }

        let code = code.unwrap_or_default();
        let action = action.unwrap_or_default();
        let id = Identifier::global(generate_identifier("rlb", &[&code]));
        self.finish_leaf(element, &deferred, &id);
        self.emit(id, SymbolData::RelatedBundle(RelatedBundleSymbol { code, action }));
        Ok(())
    }

    fn parse_log(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut path_variable = None;
        let mut prefix = None;
        let mut extension = None;
        let mut disabled = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "PathVariable" => {
                    path_variable = self.string_value(element, attr, EmptyRule::CanBeEmpty)
                }
                "Prefix" => prefix = self.long_filename(element, attr, false),
                "Extension" => {
                    extension = self.string_value(
                        element,
                        attr,
                        EmptyRule::MustHaveNonWhitespaceCharacters,
                    )
                }
                "Disable" => disabled = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }

        let path_variable = path_variable
            .unwrap_or_else(|| "WixBundleLog".to_owned())
            .trim()
            .to_owned();
        let prefix = prefix.unwrap_or_else(|| "Setup".to_owned());
        let extension = extension.unwrap_or_else(|| "log".to_owned());
        let id = Identifier::global(generate_identifier(
            "log",
            &[&path_variable, &prefix, &extension],
        ));
        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::BundleLog(BundleLogSymbol {
                path_variable: (!path_variable.is_empty()).then_some(path_variable),
                prefix,
                extension,
                disabled: disabled.unwrap_or(false),
            }),
        );
        Ok(())
    }

    fn parse_update(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut location = None;
        let mut location_seen = false;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Location" => {
                    location_seen = true;
                    location = self.string_value(
                        element,
                        attr,
                        EmptyRule::MustHaveNonWhitespaceCharacters,
                    );
                }
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if !location_seen {
            self.missing_attribute(element, "Location");
        }

        let location = location.unwrap_or_default();
        let id = Identifier::global(generate_identifier("upd", &[&location]));
        self.finish_leaf(element, &deferred, &id);
        self.emit(id, SymbolData::BundleUpdate(BundleUpdateSymbol { location }));
        Ok(())
    }
}
