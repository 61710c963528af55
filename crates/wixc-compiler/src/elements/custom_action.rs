//! Custom actions.

use wixc_core::symbol::{
    CustomActionSource, CustomActionSymbol, CustomActionTarget, ExecuteType, ReturnType,
};
use wixc_core::{Identifier, SymbolData, SymbolKind};

use crate::Result;
use crate::compile::{EmptyRule, Scope, Session};
use crate::document::Element;

const SOURCES: [&str; 5] = ["BinaryRef", "FileRef", "Property", "Directory", "Script"];
const TARGETS: [&str; 5] = ["DllEntry", "ExeCommand", "Value", "JScriptCall", "VBScriptCall"];

impl Session {
    pub(super) fn parse_custom_action(
        &mut self,
        element: Element<'_>,
        _: &mut Scope,
    ) -> Result<()> {
        let strict = EmptyRule::MustHaveNonWhitespaceCharacters;
        let mut id = None;
        let mut source: Option<(&str, CustomActionSource, Option<String>)> = None;
        let mut target: Option<(&str, CustomActionTarget, Option<String>)> = None;
        let mut script = None;
        let mut execute = None;
        let mut return_type = None;
        let mut impersonate = None;
        let mut hide_target = None;
        let mut deferred = Vec::new();

        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            let name = attr.local_name();
            if SOURCES.contains(&name) {
                if let Some((first, _, _)) = source {
                    self.mutually_exclusive(element, first, name);
                    continue;
                }
            }
            if TARGETS.contains(&name) {
                if let Some((first, _, _)) = target {
                    self.mutually_exclusive(element, first, name);
                    continue;
                }
            }
            match name {
                "Id" => id = Some(self.identifier_value(element, attr)),
                "BinaryRef" => {
                    let value = self.reference_value(element, attr);
                    source = Some(("BinaryRef", CustomActionSource::Binary, value));
                }
                "FileRef" => {
                    let value = self.reference_value(element, attr);
                    source = Some(("FileRef", CustomActionSource::File, value));
                }
                "Property" => {
                    let value = self.reference_value(element, attr);
                    source = Some(("Property", CustomActionSource::Property, value));
                }
                "Directory" => {
                    let value = self.reference_value(element, attr);
                    source = Some(("Directory", CustomActionSource::Directory, value));
                }
                "Script" => {
                    script = self.enum_value(
                        element,
                        attr,
                        &[
                            ("jscript", CustomActionTarget::JScript),
                            ("vbscript", CustomActionTarget::VBScript),
                        ],
                    );
                    source = Some(("Script", CustomActionSource::InlineScript, None));
                }
                "DllEntry" => {
                    let value = self.string_value(element, attr, strict);
                    target = Some(("DllEntry", CustomActionTarget::Dll, value));
                }
                "ExeCommand" => {
                    let value = self.string_value(element, attr, EmptyRule::CanBeEmpty);
                    target = Some(("ExeCommand", CustomActionTarget::Exe, value));
                }
                "Value" => {
                    let value = self.string_value(element, attr, EmptyRule::CanBeEmpty);
                    target = Some(("Value", CustomActionTarget::Value, value));
                }
                "JScriptCall" => {
                    let value = self.string_value(element, attr, strict);
                    target = Some(("JScriptCall", CustomActionTarget::JScript, value));
                }
                "VBScriptCall" => {
                    let value = self.string_value(element, attr, strict);
                    target = Some(("VBScriptCall", CustomActionTarget::VBScript, value));
                }
                "Execute" => {
                    execute = self.enum_value(
                        element,
                        attr,
                        &[
                            ("immediate", ExecuteType::Immediate),
                            ("deferred", ExecuteType::Deferred),
                            ("rollback", ExecuteType::Rollback),
                            ("commit", ExecuteType::Commit),
                            ("oncePerProcess", ExecuteType::OncePerProcess),
                            ("firstSequence", ExecuteType::FirstSequence),
                            ("secondSequence", ExecuteType::SecondSequence),
                        ],
                    )
                }
                "Return" => {
                    return_type = self.enum_value(
                        element,
                        attr,
                        &[
                            ("check", ReturnType::Check),
                            ("ignore", ReturnType::Ignore),
                            ("asyncWait", ReturnType::AsyncWait),
                            ("asyncNoWait", ReturnType::AsyncNoWait),
                        ],
                    )
                }
                "Impersonate" => impersonate = self.yes_no(element, attr),
                "HideTarget" => hide_target = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        let id = id.unwrap_or_else(|| {
            self.missing_attribute(element, "Id");
            Identifier::invalid()
        });

        let (source_kind, source, target_kind, target) = match (source, target) {
            (None, _) => {
                self.expected_attributes(element, &SOURCES);
                (CustomActionSource::Binary, None, CustomActionTarget::Dll, None)
            }
            (Some((_, CustomActionSource::InlineScript, _)), Some((target_name, kind, value))) => {
                self.mutually_exclusive(element, "Script", target_name);
                (CustomActionSource::InlineScript, None, kind, value)
            }
            (Some((_, CustomActionSource::InlineScript, _)), None) => {
                let body = element.text();
                if let Some(attr) = element.attribute("Script").filter(|_| body.is_empty()) {
                    self.illegal_value_because(element, attr, "an inline script needs a body");
                }
                let kind = script.unwrap_or(CustomActionTarget::JScript);
                (CustomActionSource::InlineScript, None, kind, Some(body.to_owned()))
            }
            (Some((_, kind, value)), None) => {
                self.expected_attributes(element, &TARGETS);
                (kind, value, CustomActionTarget::Dll, None)
            }
            (Some((_, source_kind, source)), Some((_, target_kind, target))) => {
                (source_kind, source, target_kind, target)
            }
        };

        if let Some(source) = &source {
            match source_kind {
                CustomActionSource::Binary => {
                    self.create_simple_reference(SymbolKind::Binary, source)
                }
                CustomActionSource::File => self.create_simple_reference(SymbolKind::File, source),
                CustomActionSource::Directory => {
                    self.create_simple_reference(SymbolKind::Directory, source)
                }
                CustomActionSource::Property | CustomActionSource::InlineScript => {}
            }
        }

        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::CustomAction(CustomActionSymbol {
                source_kind,
                source,
                target_kind,
                target,
                execute: execute.unwrap_or_default(),
                return_type: return_type.unwrap_or_default(),
                impersonate: impersonate.unwrap_or(true),
                hide_target: hide_target.unwrap_or(false),
            }),
        );
        Ok(())
    }
}
