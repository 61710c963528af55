//! Installer databases: packages, merge modules and patches.

use std::sync::LazyLock;

use wixc_core::symbol::{
    InstallScope, ModuleSignatureSymbol, PackageSummarySymbol, PatchPropertySymbol, PatchSymbol,
    PropertySymbol,
};
use wixc_core::{Identifier, SectionKind, SymbolData};

use super::sequence::SEQUENCE_ELEMENTS;
use crate::Result;
use crate::compile::{
    Dispatch, EmptyRule, Parent, Scope, Session, context_map, generate_identifier,
};
use crate::document::Element;

const DEFAULT_INSTALLER_VERSION: i32 = 500;

/// Children of `Package` and `Module`.
static DATABASE_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    let mut dispatch = Dispatch::new()
        .on("Component", Session::parse_component)
        .on("CustomAction", Session::parse_custom_action)
        .on("Property", Session::parse_property);
    for name in SEQUENCE_ELEMENTS {
        dispatch = dispatch.on(name, Session::parse_sequence);
    }
    dispatch
});

static PATCH_CHILDREN: LazyLock<Dispatch> =
    LazyLock::new(|| Dispatch::new().on("PatchProperty", Session::parse_patch_property));

#[derive(Default)]
struct PackageAttributes {
    name: Option<String>,
    manufacturer: Option<String>,
    version: Option<String>,
    language: Option<i32>,
    codepage: Option<i32>,
    upgrade_code: Option<String>,
    product_code: Option<String>,
    installer_version: Option<i32>,
    scope: Option<InstallScope>,
    compressed: Option<bool>,
}

impl Session {
    pub(super) fn parse_package(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let strict = EmptyRule::MustHaveNonWhitespaceCharacters;
        let mut a = PackageAttributes::default();

        // Pass 1: everything that does not need the section.
        for attr in element.attributes().iter().filter(|a| a.is_core()) {
            match attr.local_name() {
                "Name" => a.name = self.string_value(element, attr, strict),
                "Manufacturer" => a.manufacturer = self.string_value(element, attr, strict),
                "Version" => a.version = self.version(element, attr),
                "Language" => a.language = self.integer(element, attr, 0, i32::from(u16::MAX)),
                "Codepage" => a.codepage = self.codepage(element, attr),
                "UpgradeCode" => a.upgrade_code = self.guid(element, attr, false),
                "ProductCode" => a.product_code = self.guid(element, attr, true),
                "InstallerVersion" => {
                    a.installer_version = self.integer(element, attr, 0, i32::MAX)
                }
                "Scope" => {
                    a.scope = self.enum_value(
                        element,
                        attr,
                        &[
                            ("perMachine", InstallScope::PerMachine),
                            ("perUser", InstallScope::PerUser),
                            ("perUserOrMachine", InstallScope::PerUserOrMachine),
                        ],
                    )
                }
                "Compressed" => a.compressed = self.yes_no(element, attr),
                "ProviderKey" => {}
                _ => self.unexpected_attribute(element, attr),
            }
        }
        for required in ["Name", "Manufacturer", "Version"] {
            if element.attribute(required).is_none() {
                self.missing_attribute(element, required);
            }
        }

        let name = a.name.unwrap_or_default();
        let manufacturer = a.manufacturer.unwrap_or_default();
        let version = a.version.unwrap_or_default();
        let language = a.language.unwrap_or(0);
        let product_code = a.product_code.unwrap_or_else(|| "*".to_owned());
        let id = Identifier::global(generate_identifier(
            "pkg",
            &[&name, &manufacturer, &version, &product_code],
        ));

        self.in_section(
            SectionKind::Package,
            Some(id.id.clone()),
            Some(name.clone()),
            Some(language.to_string()),
            |s| {
                // Pass 2.
                let mut deferred = Vec::new();
                for attr in element.attributes() {
                    if !attr.is_core() {
                        deferred.push(attr);
                    } else if attr.local_name() == "ProviderKey" {
                        s.parse_provider_key(element, attr, &id);
                    }
                }
                let context = context_map([
                    ("Id", id.as_str()),
                    ("ProductCode", product_code.as_str()),
                ]);
                s.parse_extension_attributes(element, &deferred, &context);

                let mut scope = Scope::new(Parent::Unit).with_context(context);
                s.dispatch_children(element, &DATABASE_CHILDREN, &mut scope)?;

                let language_text = language.to_string();
                let mut properties = vec![
                    ("ProductName", name.as_str()),
                    ("Manufacturer", manufacturer.as_str()),
                    ("ProductVersion", version.as_str()),
                    ("ProductLanguage", language_text.as_str()),
                    ("ProductCode", product_code.as_str()),
                ];
                if let Some(upgrade_code) = &a.upgrade_code {
                    properties.push(("UpgradeCode", upgrade_code.as_str()));
                }
                for (property, value) in properties {
                    s.emit(
                        Identifier::global(property),
                        SymbolData::Property(PropertySymbol {
                            value: Some(value.to_owned()),
                            secure: false,
                            hidden: false,
                            admin: false,
                        }),
                    );
                }

                s.emit(
                    id,
                    SymbolData::PackageSummary(PackageSummarySymbol {
                        name,
                        manufacturer,
                        version,
                        language,
                        codepage: a.codepage,
                        upgrade_code: a.upgrade_code,
                        product_code,
                        installer_version: a.installer_version.unwrap_or(DEFAULT_INSTALLER_VERSION),
                        scope: a.scope.unwrap_or_default(),
                        compressed: a.compressed.unwrap_or(false),
                    }),
                );
                Ok(())
            },
        )
    }

    pub(super) fn parse_module(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut id = None;
        let mut language = None;
        let mut version = None;
        let mut codepage = None;
        let mut guid = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = Some(self.identifier_value(element, attr)),
                "Language" => language = self.integer(element, attr, 0, i32::from(u16::MAX)),
                "Version" => version = self.version(element, attr),
                "Codepage" => codepage = self.codepage(element, attr),
                "Guid" => guid = self.guid(element, attr, false),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        for required in ["Id", "Version"] {
            if element.attribute(required).is_none() {
                self.missing_attribute(element, required);
            }
        }

        let id = id.unwrap_or_else(Identifier::invalid);
        let language = language.unwrap_or(0);
        let section_id = (!id.is_invalid()).then(|| id.id.clone());
        let name = section_id.clone();

        self.in_section(
            SectionKind::Module,
            section_id,
            name,
            Some(language.to_string()),
            |s| {
                let context = context_map([("Id", id.as_str())]);
                s.parse_extension_attributes(element, &deferred, &context);

                let mut scope = Scope::new(Parent::Unit).with_context(context);
                s.dispatch_children(element, &DATABASE_CHILDREN, &mut scope)?;

                s.emit(
                    id,
                    SymbolData::ModuleSignature(ModuleSignatureSymbol {
                        language,
                        version: version.unwrap_or_default(),
                        codepage,
                        guid,
                    }),
                );
                Ok(())
            },
        )
    }

    pub(super) fn parse_patch(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let strict = EmptyRule::MustHaveNonWhitespaceCharacters;
        let mut code = None;
        let mut classification = None;
        let mut display_name = None;
        let mut description = None;
        let mut manufacturer = None;
        let mut allow_removal = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => code = self.guid(element, attr, true),
                "Classification" => classification = self.string_value(element, attr, strict),
                "DisplayName" => display_name = self.string_value(element, attr, strict),
                "Description" => description = self.string_value(element, attr, strict),
                "Manufacturer" => manufacturer = self.string_value(element, attr, strict),
                "AllowRemoval" => allow_removal = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }

        // A generated patch code is resolved at bind time; name the symbol
        // after what was authored instead.
        let id = match code.as_deref() {
            Some(code) if code != "*" => Identifier::global(code),
            _ => Identifier::global(generate_identifier(
                "pch",
                &[
                    display_name.as_deref().unwrap_or_default(),
                    description.as_deref().unwrap_or_default(),
                    manufacturer.as_deref().unwrap_or_default(),
                ],
            )),
        };

        self.in_section(SectionKind::Patch, Some(id.id.clone()), None, None, |s| {
            let context = context_map([("Id", id.as_str())]);
            s.parse_extension_attributes(element, &deferred, &context);

            let mut scope = Scope::new(Parent::Unit).with_context(context);
            s.dispatch_children(element, &PATCH_CHILDREN, &mut scope)?;

            s.emit(
                id,
                SymbolData::Patch(PatchSymbol {
                    classification: classification.unwrap_or_else(|| "Update".to_owned()),
                    display_name,
                    description,
                    manufacturer,
                    allow_removal: allow_removal.unwrap_or(false),
                }),
            );
            Ok(())
        })
    }

    fn parse_patch_property(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut name = None;
        let mut value = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Name" => {
                    name = self.string_value(
                        element,
                        attr,
                        EmptyRule::MustHaveNonWhitespaceCharacters,
                    )
                }
                "Value" => value = self.string_value(element, attr, EmptyRule::CanBeEmpty),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        for required in ["Name", "Value"] {
            if element.attribute(required).is_none() {
                self.missing_attribute(element, required);
            }
        }

        let name = name.unwrap_or_default();
        let id = Identifier::global(generate_identifier("pp", &[&name]));
        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::PatchProperty(PatchPropertySymbol {
                name,
                value: value.unwrap_or_default(),
            }),
        );
        Ok(())
    }

    pub(super) fn parse_property(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut id = None;
        let mut value = None;
        let mut secure = None;
        let mut hidden = None;
        let mut admin = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = Some(self.identifier_value(element, attr)),
                "Value" => value = self.string_value(element, attr, EmptyRule::CanBeEmpty),
                "Secure" => secure = self.yes_no(element, attr),
                "Hidden" => hidden = self.yes_no(element, attr),
                "Admin" => admin = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        let id = id.unwrap_or_else(|| {
            self.missing_attribute(element, "Id");
            Identifier::invalid()
        });

        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::Property(PropertySymbol {
                value,
                secure: secure.unwrap_or(false),
                hidden: hidden.unwrap_or(false),
                admin: admin.unwrap_or(false),
            }),
        );
        Ok(())
    }
}
