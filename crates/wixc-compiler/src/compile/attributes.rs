//! Typed attribute getters.
//!
//! Every getter reports a diagnostic on a bad value and returns `None` (or
//! an invalid placeholder) so the caller keeps checking the rest of the
//! element.

use wixc_core::Identifier;
use wixc_core::symbol::YesNoDefault;

use super::Session;
use super::identifiers::{IdentifierError, is_legal_identifier, parse_identifier};
use crate::diagnostics::DiagnosticKind;
use crate::document::{Attribute, Element};

/// How a free-form string treats empty values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyRule {
    /// Whitespace-only values are rejected too.
    MustHaveNonWhitespaceCharacters,
    CanBeEmpty,
    #[default]
    DisallowEmpty,
}

const LONG_FILENAME_ILLEGAL: &[char] = &['\\', '?', '|', '>', '<', ':', '/', '*', '"'];
const SHORT_FILENAME_EXTRA: &str = "!#$%&'()-@^_`{}~";

/// Code page names accepted in place of numbers.
const WEB_CODEPAGES: &[(&str, i32)] = &[
    ("big5", 950),
    ("gb2312", 936),
    ("iso-8859-1", 28591),
    ("ks_c_5601-1987", 949),
    ("shift_jis", 932),
    ("us-ascii", 20127),
    ("utf-8", 65001),
    ("windows-1250", 1250),
    ("windows-1251", 1251),
    ("windows-1252", 1252),
];

pub fn parse_yes_no(value: &str) -> Option<bool> {
    match value {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

pub fn parse_yes_no_default(value: &str) -> Option<YesNoDefault> {
    match value {
        "yes" => Some(YesNoDefault::Yes),
        "no" => Some(YesNoDefault::No),
        "default" => Some(YesNoDefault::Default),
        _ => None,
    }
}

/// One to four dot-separated unsigned 32-bit components.
pub fn is_version(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    (1..=4).contains(&parts.len())
        && parts.iter().all(|p| {
            !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) && p.parse::<u32>().is_ok()
        })
}

/// Values resolved by the binder, like `!(bind.packageVersion.Foo)`.
fn is_bind_variable(value: &str) -> bool {
    value.starts_with("!(") && value.ends_with(')')
}

/// Upper-case braced form of a GUID in any of the usual notations.
pub fn normalize_guid(value: &str) -> Option<String> {
    let uuid = uuid::Uuid::parse_str(value).ok()?;
    Some(format!("{{{}}}", uuid.hyphenated()).to_ascii_uppercase())
}

pub fn parse_codepage(value: &str) -> Option<i32> {
    if let Ok(number) = value.parse::<i32>() {
        return (0..=65535).contains(&number).then_some(number);
    }
    let lower = value.to_ascii_lowercase();
    WEB_CODEPAGES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|&(_, page)| page)
}

pub fn is_long_filename(value: &str, allow_relative: bool) -> bool {
    if allow_relative {
        let mut segments = value.split(['\\', '/']).peekable();
        segments.peek().is_some() && segments.all(|s| is_long_filename(s, false))
    } else {
        !value.is_empty()
            && value.len() <= 259
            && value != "."
            && value != ".."
            && !value.trim().is_empty()
            && !value
                .chars()
                .any(|c| c.is_control() || LONG_FILENAME_ILLEGAL.contains(&c))
    }
}

/// 8.3 name: up to eight characters, optionally a dot and up to three more.
pub fn is_short_filename(value: &str) -> bool {
    let legal = |s: &str| {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || SHORT_FILENAME_EXTRA.contains(c))
    };
    match value.split_once('.') {
        Some((base, ext)) => {
            (1..=8).contains(&base.len())
                && (1..=3).contains(&ext.len())
                && legal(base)
                && legal(ext)
        }
        None => (1..=8).contains(&value.len()) && legal(value),
    }
}

fn qualified(element: Element<'_>, attr: &Attribute) -> String {
    format!("{}/@{}", element.local_name(), attr.local_name())
}

impl Session {
    // ========================================================================
    // Diagnostic shorthands
    // ========================================================================

    pub(crate) fn missing_attribute(&mut self, element: Element<'_>, name: &str) {
        let el = element.local_name();
        self.diagnostics
            .report(DiagnosticKind::MissingRequiredAttribute, element.range())
            .message(format!("{el}/@{name}"))
            .args([el, name])
            .emit();
    }

    pub(crate) fn unexpected_attribute(&mut self, element: Element<'_>, attr: &Attribute) {
        self.diagnostics
            .report(DiagnosticKind::UnexpectedAttribute, attr.range)
            .message(qualified(element, attr))
            .args([element.local_name(), attr.local_name()])
            .emit();
    }

    pub(crate) fn unexpected_element(&mut self, parent: Element<'_>, child: Element<'_>) {
        self.diagnostics
            .report(DiagnosticKind::UnexpectedElement, child.range())
            .message(format!("{}/{}", parent.local_name(), child.local_name()))
            .args([parent.local_name(), child.local_name()])
            .emit();
    }

    pub(crate) fn too_many_children(&mut self, parent: Element<'_>, child: Element<'_>) {
        let mut builder = self
            .diagnostics
            .report(DiagnosticKind::TooManyChildren, child.range())
            .message(format!("{}/{}", parent.local_name(), child.local_name()))
            .args([parent.local_name(), child.local_name()]);
        if let Some(earlier) = parent.children().find(|c| c.name() == child.name()) {
            builder = builder.related_to("first one here", earlier.range());
        }
        builder.emit();
    }

    /// Two attributes that cannot appear together; points at the second.
    pub(crate) fn mutually_exclusive(&mut self, element: Element<'_>, first: &str, second: &str) {
        let el = element.local_name();
        let range_of = |name: &str| element.attribute(name).map(|a| a.range);
        let mut builder = self
            .diagnostics
            .report(
                DiagnosticKind::MutuallyExclusive,
                range_of(second).unwrap_or_else(|| element.range()),
            )
            .message(format!("`{el}/@{first}` and `{el}/@{second}`"))
            .args([el, first, second]);
        if let Some(range) = range_of(first) {
            builder = builder.related_to(format!("`{first}` is set here"), range);
        }
        builder.emit();
    }

    pub(crate) fn illegal_value(&mut self, element: Element<'_>, attr: &Attribute, legal: &[&str]) {
        let mut args = vec![
            element.local_name().to_owned(),
            attr.local_name().to_owned(),
            attr.value.clone(),
        ];
        args.extend(legal.iter().map(|s| (*s).to_owned()));
        self.diagnostics
            .report(DiagnosticKind::IllegalAttributeValue, attr.range)
            .message(format!(
                "`{}` is `{}`; expected one of: {}",
                qualified(element, attr),
                attr.value,
                legal.join(", ")
            ))
            .args(args)
            .emit();
    }

    /// Bad value outside an enumerated domain.
    pub(crate) fn illegal_value_because(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        reason: &str,
    ) {
        self.diagnostics
            .report(DiagnosticKind::IllegalAttributeValue, attr.range)
            .message(format!(
                "`{}` is `{}`; {reason}",
                qualified(element, attr),
                attr.value
            ))
            .args([element.local_name(), attr.local_name(), attr.value.as_str()])
            .emit();
    }

    pub(crate) fn illegal_empty(&mut self, element: Element<'_>, attr: &Attribute) {
        self.diagnostics
            .report(DiagnosticKind::IllegalEmptyAttributeValue, attr.range)
            .message(qualified(element, attr))
            .args([element.local_name(), attr.local_name()])
            .emit();
    }

    pub(crate) fn reserved_value(&mut self, element: Element<'_>, attr: &Attribute) {
        self.diagnostics
            .report(DiagnosticKind::ReservedValue, attr.range)
            .message(attr.value.trim())
            .args([element.local_name(), attr.local_name(), attr.value.trim()])
            .emit();
    }

    pub(crate) fn expected_attributes(&mut self, element: Element<'_>, names: &[&str]) {
        let el = element.local_name();
        let list = names
            .iter()
            .map(|n| format!("`{n}`"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut args = vec![el];
        args.extend_from_slice(names);
        self.diagnostics
            .report(DiagnosticKind::ExpectedAttributes, element.range())
            .message(format!("`{el}` needs one of {list}"))
            .args(args)
            .emit();
    }

    pub(crate) fn expected_attribute_or_element(
        &mut self,
        element: Element<'_>,
        attribute: &str,
        child: &str,
    ) {
        let el = element.local_name();
        self.diagnostics
            .report(DiagnosticKind::ExpectedAttributeOrElement, element.range())
            .message(format!("`{el}/@{attribute}` or a `{child}` child"))
            .args([el, attribute, child])
            .emit();
    }

    pub(crate) fn element_with_attribute(
        &mut self,
        element: Element<'_>,
        child: Element<'_>,
        attribute: &str,
    ) {
        let el = element.local_name();
        self.diagnostics
            .report(DiagnosticKind::UnexpectedElementWithAttribute, child.range())
            .message(format!(
                "`{}` cannot be combined with `{el}/@{attribute}`",
                child.local_name()
            ))
            .args([el, child.local_name(), attribute])
            .emit();
    }

    pub(crate) fn deprecated_attribute(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        replacement: &str,
    ) {
        if !self.config.deprecation_warnings {
            return;
        }
        let el = element.local_name();
        self.diagnostics
            .report(DiagnosticKind::DeprecatedConstruct, attr.range)
            .message(format!(
                "`{}` is deprecated; use `{el}/@{replacement}`",
                qualified(element, attr)
            ))
            .args([el, attr.local_name(), replacement])
            .emit();
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Authored identifier, with access prefix, grammar and reserved checks.
    pub(crate) fn identifier_value(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
    ) -> Identifier {
        match parse_identifier(&attr.value) {
            Ok(id) => id,
            Err(IdentifierError::Empty) => {
                self.illegal_empty(element, attr);
                Identifier::invalid()
            }
            Err(IdentifierError::Illegal) => {
                self.diagnostics
                    .report(DiagnosticKind::IllegalIdentifier, attr.range)
                    .message(attr.value.trim())
                    .args([element.local_name(), attr.local_name(), attr.value.trim()])
                    .emit();
                Identifier::invalid()
            }
            Err(IdentifierError::Reserved) => {
                self.reserved_value(element, attr);
                Identifier::invalid()
            }
        }
    }

    /// Identifier naming another symbol. No access prefix, no reserved check.
    pub(crate) fn reference_value(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
    ) -> Option<String> {
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
        Some(value.to_owned())
    }

    pub(crate) fn string_value(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        rule: EmptyRule,
    ) -> Option<String> {
        let rejected = match rule {
            EmptyRule::MustHaveNonWhitespaceCharacters => attr.value.trim().is_empty(),
            EmptyRule::DisallowEmpty => attr.value.is_empty(),
            EmptyRule::CanBeEmpty => false,
        };
        if rejected {
            self.illegal_empty(element, attr);
            return None;
        }
        Some(attr.value.clone())
    }

    /// Value of a non-string domain; empty values are reported here.
    fn non_empty<'a>(&mut self, element: Element<'_>, attr: &'a Attribute) -> Option<&'a str> {
        if attr.value.is_empty() {
            self.illegal_empty(element, attr);
            return None;
        }
        Some(&attr.value)
    }

    pub(crate) fn yes_no(&mut self, element: Element<'_>, attr: &Attribute) -> Option<bool> {
        let value = self.non_empty(element, attr)?;
        let parsed = parse_yes_no(value);
        if parsed.is_none() {
            self.illegal_value(element, attr, &["yes", "no"]);
        }
        parsed
    }

    pub(crate) fn yes_no_default(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
    ) -> Option<YesNoDefault> {
        let value = self.non_empty(element, attr)?;
        let parsed = parse_yes_no_default(value);
        if parsed.is_none() {
            self.illegal_value(element, attr, &["yes", "no", "default"]);
        }
        parsed
    }

    pub(crate) fn integer(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        min: i32,
        max: i32,
    ) -> Option<i32> {
        let value = self.long(element, attr, i64::from(min), i64::from(max))?;
        i32::try_from(value).ok()
    }

    pub(crate) fn long(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        min: i64,
        max: i64,
    ) -> Option<i64> {
        let value = self.non_empty(element, attr)?;
        match value.trim().parse::<i64>() {
            Ok(number) if (min..=max).contains(&number) => Some(number),
            Ok(_) => {
                self.illegal_value_because(element, attr, &format!("expected {min}..={max}"));
                None
            }
            Err(_) => {
                self.illegal_value_because(element, attr, "expected an integer");
                None
            }
        }
    }

    pub(crate) fn version(&mut self, element: Element<'_>, attr: &Attribute) -> Option<String> {
        let value = self.non_empty(element, attr)?;
        if is_version(value) || is_bind_variable(value) {
            return Some(value.to_owned());
        }
        self.illegal_value_because(element, attr, "expected a version like `1.2.3.4`");
        None
    }

    /// GUID normalised to upper-case braced form.
    ///
    /// With `generatable`, `*` is accepted and returned as is.
    pub(crate) fn guid(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        generatable: bool,
    ) -> Option<String> {
        let value = self.non_empty(element, attr)?.trim();
        if generatable && value == "*" {
            return Some("*".to_owned());
        }
        let normalized = normalize_guid(value);
        if normalized.is_none() {
            let reason = if generatable {
                "expected a GUID or `*`"
            } else {
                "expected a GUID"
            };
            self.illegal_value_because(element, attr, reason);
        }
        normalized
    }

    pub(crate) fn codepage(&mut self, element: Element<'_>, attr: &Attribute) -> Option<i32> {
        let value = self.non_empty(element, attr)?;
        let parsed = parse_codepage(value.trim());
        if parsed.is_none() {
            self.illegal_value_because(
                element,
                attr,
                "expected a code page number or a web name like `windows-1252`",
            );
        }
        parsed
    }

    pub(crate) fn long_filename(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        allow_relative: bool,
    ) -> Option<String> {
        let value = self.non_empty(element, attr)?;
        if is_long_filename(value, allow_relative) {
            return Some(value.to_owned());
        }
        let reason = if allow_relative {
            "expected a file name or relative path"
        } else {
            "expected a file name"
        };
        self.illegal_value_because(element, attr, reason);
        None
    }

    pub(crate) fn short_filename(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
    ) -> Option<String> {
        let value = self.non_empty(element, attr)?;
        if is_short_filename(value) {
            return Some(value.to_owned());
        }
        self.illegal_value_because(element, attr, "expected an 8.3 file name");
        None
    }

    /// Enumerated value resolved through an explicit case list.
    pub(crate) fn enum_value<T: Copy>(
        &mut self,
        element: Element<'_>,
        attr: &Attribute,
        cases: &[(&str, T)],
    ) -> Option<T> {
        let value = self.non_empty(element, attr)?;
        let found = cases.iter().find(|(name, _)| *name == value).map(|&(_, v)| v);
        if found.is_none() {
            let legal: Vec<&str> = cases.iter().map(|(name, _)| *name).collect();
            self.illegal_value(element, attr, &legal);
        }
        found
    }
}
