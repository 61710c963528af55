//! Components and the registry entries they own.

use std::sync::LazyLock;

use wixc_core::symbol::{
    Bitness, ComponentSymbol, RegistryRoot, RegistrySymbol, RegistryValueType,
};
use wixc_core::{Identifier, SymbolData, SymbolKind};

use crate::Result;
use crate::compile::{
    Dispatch, EmptyRule, Parent, Scope, Session, context_map, generate_identifier,
};
use crate::document::{Attribute, Element};

/// Directory a database component installs to when none is authored.
const DEFAULT_DIRECTORY: &str = "INSTALLFOLDER";

const ROOTS: [(&str, RegistryRoot); 5] = [
    ("HKLM", RegistryRoot::HKLM),
    ("HKCU", RegistryRoot::HKCU),
    ("HKCR", RegistryRoot::HKCR),
    ("HKMU", RegistryRoot::HKMU),
    ("HKU", RegistryRoot::HKU),
];

static COMPONENT_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    Dispatch::new()
        .on("RegistryKey", Session::parse_registry_key)
        .on("RegistryValue", Session::parse_registry_value)
});

impl Session {
    pub(super) fn parse_component(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut id = None;
        let mut guid = None;
        let mut directory = None;
        let mut bitness = None;
        let mut key_path = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = Some(self.identifier_value(element, attr)),
                "Guid" => {
                    guid = self.guid(element, attr, true);
                    if guid.as_deref() == Some("*") && !self.context.compiling_database() {
                        self.illegal_value_because(
                            element,
                            attr,
                            "a generated guid needs a package or module being compiled",
                        );
                    }
                }
                "Directory" => directory = self.reference_value(element, attr),
                "Bitness" => {
                    bitness = self.enum_value(
                        element,
                        attr,
                        &[
                            ("always32", Bitness::Always32),
                            ("always64", Bitness::Always64),
                            ("default", Bitness::Default),
                        ],
                    )
                }
                "KeyPath" => key_path = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        let id = id.unwrap_or_else(|| {
            self.missing_attribute(element, "Id");
            Identifier::invalid()
        });
        if element.attribute("Directory").is_none() {
            if self.context.compiling_database() {
                directory = Some(DEFAULT_DIRECTORY.to_owned());
            } else {
                self.missing_attribute(element, "Directory");
            }
        }
        if let Some(directory) = &directory {
            self.create_simple_reference(SymbolKind::Directory, directory);
        }

        let context = context_map([("Id", id.as_str())]);
        self.parse_extension_attributes(element, &deferred, &context);

        let mut scope = Scope::new(Parent::Component {
            id: id.id.clone(),
        })
        .with_context(context);
        self.dispatch_children(element, &COMPONENT_CHILDREN, &mut scope)?;

        self.emit(
            id,
            SymbolData::Component(ComponentSymbol {
                guid,
                directory,
                bitness: bitness.unwrap_or_default(),
                key_path: key_path.unwrap_or(false),
            }),
        );
        Ok(())
    }

    fn parse_registry_key(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        let (component, inherited_root, inherited_key) = scope.ensure_registry_parent();
        let mut root = None;
        let mut key = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Root" => root = self.enum_value(element, attr, &ROOTS),
                "Key" => {
                    key = self.string_value(
                        element,
                        attr,
                        EmptyRule::MustHaveNonWhitespaceCharacters,
                    )
                }
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if inherited_root.is_none() && element.attribute("Root").is_none() {
            self.missing_attribute(element, "Root");
        }
        if element.attribute("Key").is_none() {
            self.missing_attribute(element, "Key");
        }

        let root = root.or(inherited_root);
        let key = join_key(inherited_key.as_deref(), key.as_deref());
        let context = context_map([
            ("ComponentId", component.as_str()),
            ("Root", root.map(RegistryRoot::as_str).unwrap_or_default()),
            ("Key", key.as_deref().unwrap_or_default()),
        ]);
        self.parse_extension_attributes(element, &deferred, &context);

        let mut scope = Scope::new(Parent::RegistryKey {
            component,
            root,
            key,
        })
        .with_context(context);
        self.dispatch_children(element, &COMPONENT_CHILDREN, &mut scope)
    }

    fn parse_registry_value(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        let (component, inherited_root, inherited_key) = scope.ensure_registry_parent();
        let mut id = None;
        let mut root = None;
        let mut key = None;
        let mut name = None;
        let mut value = None;
        let mut value_type = None;
        let mut key_path = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => id = Some(self.identifier_value(element, attr)),
                "Root" => root = self.enum_value(element, attr, &ROOTS),
                "Key" => {
                    key = self.string_value(
                        element,
                        attr,
                        EmptyRule::MustHaveNonWhitespaceCharacters,
                    )
                }
                "Name" => name = self.string_value(element, attr, EmptyRule::CanBeEmpty),
                "Value" => value = self.string_value(element, attr, EmptyRule::CanBeEmpty),
                "Type" => {
                    value_type = self.enum_value(
                        element,
                        attr,
                        &[
                            ("string", RegistryValueType::String),
                            ("integer", RegistryValueType::Integer),
                            ("binary", RegistryValueType::Binary),
                            ("expandable", RegistryValueType::Expandable),
                            ("multiString", RegistryValueType::MultiString),
                        ],
                    )
                }
                "KeyPath" => key_path = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if inherited_root.is_none() && element.attribute("Root").is_none() {
            self.missing_attribute(element, "Root");
        }
        if inherited_key.is_none() && element.attribute("Key").is_none() {
            self.missing_attribute(element, "Key");
        }
        let value_type = value_type.unwrap_or_default();
        if value_type == RegistryValueType::Integer {
            if let (Some(number), Some(attr)) = (value.as_deref(), element.attribute("Value")) {
                self.check_registry_integer(element, attr, number);
            }
        }

        let root = root.or(inherited_root).unwrap_or(RegistryRoot::HKLM);
        let key = join_key(inherited_key.as_deref(), key.as_deref()).unwrap_or_default();
        let id = id.unwrap_or_else(|| {
            let lowered = key.to_lowercase();
            Identifier::global(generate_identifier(
                "reg",
                &[
                    &component,
                    root.as_str(),
                    &lowered,
                    name.as_deref().unwrap_or_default(),
                ],
            ))
        });

        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::Registry(RegistrySymbol {
                component,
                root,
                key,
                name,
                value,
                value_type,
                key_path: key_path.unwrap_or(false),
            }),
        );
        Ok(())
    }

    fn check_registry_integer(&mut self, element: Element<'_>, attr: &Attribute, value: &str) {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.parse::<i32>().is_err() {
            self.illegal_value_because(element, attr, "expected a 32-bit integer");
        }
    }
}

fn join_key(parent: Option<&str>, key: Option<&str>) -> Option<String> {
    match (parent, key) {
        (Some(parent), Some(key)) => Some(format!("{parent}\\{key}")),
        (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
        (None, None) => None,
    }
}
