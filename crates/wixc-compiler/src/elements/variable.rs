//! Bundle variables and their value types.

use wixc_core::symbol::VariableSymbol;
use wixc_core::{Identifier, SymbolData, VariableType};

use crate::Result;
use crate::compile::{EmptyRule, Scope, Session, is_legal_identifier, is_version};
use crate::diagnostics::DiagnosticKind;
use crate::document::{Attribute, Element};

/// An explicitly typed variable was declared without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a variable with an explicit type needs a value")]
pub struct MissingValue;

/// Type of a variable from its declared type and value.
///
/// An explicit type always wins. Otherwise `v1`, `V2.3.4` are versions,
/// anything parsing as `i64` is numeric and the rest are strings. A variable
/// declared without a value has an unknown type.
///
/// ```
/// use wixc_compiler::infer_variable_type;
/// use wixc_core::VariableType;
///
/// assert_eq!(infer_variable_type(None, Some("v1.2")), Ok(VariableType::Version));
/// assert_eq!(infer_variable_type(None, Some("-7")), Ok(VariableType::Numeric));
/// assert!(infer_variable_type(Some(VariableType::Numeric), Some("")).is_err());
/// ```
pub fn infer_variable_type(
    explicit: Option<VariableType>,
    value: Option<&str>,
) -> std::result::Result<VariableType, MissingValue> {
    if let Some(explicit) = explicit {
        return match value {
            Some(v) if !v.is_empty() => Ok(explicit),
            _ => Err(MissingValue),
        };
    }
    let Some(value) = value else {
        return Ok(VariableType::Unknown);
    };
    if is_prefixed_version(value) {
        Ok(VariableType::Version)
    } else if value.parse::<i64>().is_ok() {
        Ok(VariableType::Numeric)
    } else {
        Ok(VariableType::String)
    }
}

fn is_prefixed_version(value: &str) -> bool {
    value
        .strip_prefix(['v', 'V'])
        .is_some_and(is_version)
}

impl Session {
    pub(super) fn parse_variable(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let mut name = None;
        let mut value = None;
        let mut explicit = None;
        let mut hidden = None;
        let mut persisted = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Name" => name = self.variable_name(element, attr),
                "Value" => value = self.string_value(element, attr, EmptyRule::CanBeEmpty),
                "Type" => {
                    explicit = self.enum_value(
                        element,
                        attr,
                        &[
                            ("formatted", VariableType::Formatted),
                            ("numeric", VariableType::Numeric),
                            ("string", VariableType::String),
                            ("version", VariableType::Version),
                        ],
                    )
                }
                "Hidden" => hidden = self.yes_no(element, attr),
                "Persisted" => persisted = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if element.attribute("Name").is_none() {
            self.missing_attribute(element, "Name");
        }

        let variable_type = match infer_variable_type(explicit, value.as_deref()) {
            Ok(variable_type) => variable_type,
            Err(MissingValue) => {
                match element.attribute("Value") {
                    Some(attr) => self.illegal_empty(element, attr),
                    None => self.missing_attribute(element, "Value"),
                }
                VariableType::Unknown
            }
        };
        if let (Some(value), Some(attr)) = (value.as_deref(), element.attribute("Value")) {
            match explicit {
                Some(VariableType::Numeric)
                    if !value.is_empty() && value.parse::<i64>().is_err() =>
                {
                    self.illegal_value_because(element, attr, "expected a 64-bit integer")
                }
                Some(VariableType::Version)
                    if !value.is_empty() && !is_version(value) && !is_prefixed_version(value) =>
                {
                    self.illegal_value_because(element, attr, "expected a version like `1.2.3.4`")
                }
                _ => {}
            }
        }

        let id = name.map(Identifier::global).unwrap_or_else(Identifier::invalid);
        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::Variable(VariableSymbol {
                value,
                variable_type,
                hidden: hidden.unwrap_or(false),
                persisted: persisted.unwrap_or(false),
            }),
        );
        Ok(())
    }

    /// Names starting with `Wix` belong to built-in variables.
    fn variable_name(&mut self, element: Element<'_>, attr: &Attribute) -> Option<String> {
        let value = attr.value.trim();
        if value.is_empty() {
            self.illegal_empty(element, attr);
            return None;
        }
        if !is_legal_identifier(value) {
            self.diagnostics
                .report(DiagnosticKind::IllegalIdentifier, attr.range)
                .message(value)
                .args([element.local_name(), attr.local_name(), value])
                .emit();
            return None;
        }
        if value.starts_with("Wix") {
            self.reserved_value(element, attr);
            return None;
        }
        Some(value.to_owned())
    }
}
