//! Payload descriptors and the two forms a package can supply them in.

use wixc_core::symbol::PayloadSymbol;
use wixc_core::{Identifier, PackageKind};

use super::Session;
use super::attributes::EmptyRule;
use super::extension::{ContextMap, context_map};
use super::identifiers::identifier_from_filename;
use crate::document::{Attribute, Element};

/// Attributes that describe where a package's payload comes from.
const INLINE_SOURCE: [&str; 4] = ["Name", "SourceFile", "DownloadUrl", "Compressed"];

/// Attributes only a remote descriptor carries.
const REMOTE_ONLY: [&str; 7] = [
    "Hash",
    "Size",
    "CertificatePublicKey",
    "CertificateThumbprint",
    "Description",
    "ProductName",
    "Version",
];

/// Required by a payload without a local source file.
const REMOTE_REQUIRED: [&str; 4] = ["Name", "DownloadUrl", "Hash", "Size"];

/// Whether the kind's payload may be fetched at install time.
pub(crate) fn allows_remote(kind: PackageKind) -> bool {
    matches!(kind, PackageKind::Exe | PackageKind::Msu | PackageKind::Bundle)
}

/// Last component of a path, either separator.
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// Fields gathered from one syntactic form.
#[derive(Debug, Default)]
pub(crate) struct PayloadFields {
    pub(crate) id: Option<Identifier>,
    name: Option<String>,
    source_file: Option<String>,
    download_url: Option<String>,
    compressed: Option<bool>,
    hash: Option<String>,
    size: Option<i64>,
    certificate_public_key: Option<String>,
    certificate_thumbprint: Option<String>,
    description: Option<String>,
    product_name: Option<String>,
    version: Option<String>,
    /// Authored attribute names, valid or not.
    seen: Vec<&'static str>,
}

impl PayloadFields {
    fn saw(&self, name: &str) -> bool {
        self.seen.contains(&name)
    }

    fn first_seen_of(&self, names: &[&'static str]) -> Option<&'static str> {
        self.seen.iter().copied().find(|n| names.contains(n))
    }

    /// Consume a payload attribute. Returns false when `attr` is not one.
    pub(crate) fn parse_attribute(
        &mut self,
        session: &mut Session,
        element: Element<'_>,
        attr: &Attribute,
        remote_allowed: bool,
    ) -> bool {
        let name = attr.local_name();
        let Some(known) = ["Id"]
            .iter()
            .chain(INLINE_SOURCE.iter())
            .chain(REMOTE_ONLY.iter())
            .copied()
            .find(|n| *n == name)
        else {
            return false;
        };

        if REMOTE_ONLY.contains(&known) && !remote_allowed {
            session.unexpected_attribute(element, attr);
            return true;
        }
        self.seen.push(known);

        let strict = EmptyRule::MustHaveNonWhitespaceCharacters;
        match known {
            "Id" => self.id = Some(session.identifier_value(element, attr)),
            "Name" => self.name = session.long_filename(element, attr, true),
            "SourceFile" => self.source_file = session.string_value(element, attr, strict),
            "DownloadUrl" => self.download_url = session.string_value(element, attr, strict),
            "Compressed" => self.compressed = session.yes_no(element, attr),
            "Hash" => self.hash = session.string_value(element, attr, strict),
            "Size" => self.size = session.long(element, attr, 0, i64::MAX),
            "CertificatePublicKey" => {
                self.certificate_public_key = session.string_value(element, attr, strict)
            }
            "CertificateThumbprint" => {
                self.certificate_thumbprint = session.string_value(element, attr, strict)
            }
            "Description" => self.description = session.string_value(element, attr, strict),
            "ProductName" => self.product_name = session.string_value(element, attr, strict),
            "Version" => self.version = session.version(element, attr),
            _ => unreachable!("payload attribute table and match disagree on `{known}`"),
        }
        true
    }

    /// Decide local or remote and check the companions each needs.
    ///
    /// A payload without `SourceFile` is remote when it carries any
    /// remote-only attribute; otherwise its `Name` doubles as the source.
    pub(crate) fn resolve(
        mut self,
        session: &mut Session,
        element: Element<'_>,
        remote_allowed: bool,
    ) -> PayloadSymbol {
        let remote = if self.saw("SourceFile") {
            if let Some(remote_attr) = self.first_seen_of(&REMOTE_ONLY) {
                session.mutually_exclusive(element, "SourceFile", remote_attr);
            }
            false
        } else if remote_allowed && self.first_seen_of(&REMOTE_ONLY).is_some() {
            for required in REMOTE_REQUIRED {
                if !self.saw(required) {
                    session.missing_attribute(element, required);
                }
            }
            true
        } else if self.saw("Name") {
            self.source_file = self.name.clone();
            false
        } else {
            session.missing_attribute(element, "SourceFile");
            false
        };

        let name = self
            .name
            .or_else(|| self.source_file.as_deref().map(|s| file_name(s).to_owned()));

        PayloadSymbol {
            name,
            source_file: self.source_file,
            download_url: self.download_url,
            compressed: self.compressed,
            hash: self.hash,
            size: self.size,
            certificate_public_key: self.certificate_public_key,
            certificate_thumbprint: self.certificate_thumbprint,
            description: self.description,
            product_name: self.product_name,
            version: self.version,
            remote,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    CollectingCoreAttributes,
    ParsedNestedPayloadElement,
    Finalized,
}

/// Package payload resolved to its final identifiers.
#[derive(Debug)]
pub(crate) struct ResolvedPayload {
    pub(crate) package_id: Identifier,
    pub(crate) payload_id: Identifier,
    pub(crate) symbol: PayloadSymbol,
}

/// The payload of one chain package, from inline attributes or from the
/// nested typed payload element, never both.
#[derive(Debug)]
pub(crate) struct PayloadBuilder {
    kind: PackageKind,
    state: State,
    inline: PayloadFields,
    nested: Option<(Option<Identifier>, PayloadSymbol)>,
}

impl PayloadBuilder {
    pub(crate) fn new(kind: PackageKind) -> Self {
        Self {
            kind,
            state: State::CollectingCoreAttributes,
            inline: PayloadFields::default(),
            nested: None,
        }
    }

    /// Consume an inline source attribute of the package element.
    pub(crate) fn parse_inline_attribute(
        &mut self,
        session: &mut Session,
        package: Element<'_>,
        attr: &Attribute,
    ) -> bool {
        debug_assert_eq!(self.state, State::CollectingCoreAttributes);
        INLINE_SOURCE.contains(&attr.local_name())
            && self.inline.parse_attribute(session, package, attr, false)
    }

    /// Parse the typed payload child. Must run after every inline attribute.
    pub(crate) fn parse_nested(
        &mut self,
        session: &mut Session,
        package: Element<'_>,
        child: Element<'_>,
    ) {
        debug_assert_eq!(self.state, State::CollectingCoreAttributes);
        if let Some(attr) = self.inline.first_seen_of(&INLINE_SOURCE) {
            session.element_with_attribute(package, child, attr);
        }

        let remote_allowed = allows_remote(self.kind);
        let mut fields = PayloadFields::default();
        let mut deferred = Vec::new();
        for attr in child.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            if attr.local_name() == "Compressed"
                || !fields.parse_attribute(session, child, attr, remote_allowed)
            {
                session.unexpected_attribute(child, attr);
            }
        }

        let id = fields.id.take();
        let symbol = fields.resolve(session, child, remote_allowed);

        let context = match &id {
            Some(id) if !id.is_invalid() => context_map([("Id", id.as_str())]),
            _ => ContextMap::new(),
        };
        session.parse_extension_attributes(child, &deferred, &context);
        for grandchild in child.children() {
            if grandchild.is_core() {
                session.unexpected_element(child, grandchild);
            } else {
                session.parse_extension_element(child, grandchild, &context);
            }
        }

        self.nested = Some((id, symbol));
        self.state = State::ParsedNestedPayloadElement;
    }

    /// Compute the package and payload identifiers.
    ///
    /// Package id: authored, else derived from the payload name. Payload id:
    /// the nested element's id, else the package id.
    pub(crate) fn finalize(
        &mut self,
        session: &mut Session,
        package: Element<'_>,
        authored_id: Option<Identifier>,
    ) -> ResolvedPayload {
        debug_assert_ne!(self.state, State::Finalized);
        let (nested_id, symbol) = match self.nested.take() {
            Some((id, symbol)) => (id, symbol),
            None => {
                let inline = std::mem::take(&mut self.inline);
                if !inline.saw("SourceFile") && !inline.saw("Name") {
                    session.expected_attribute_or_element(
                        package,
                        "SourceFile",
                        self.kind.payload_element_name(),
                    );
                }
                (None, inline.resolve_inline())
            }
        };
        self.state = State::Finalized;

        let package_id = match authored_id {
            Some(id) => id,
            None => match symbol.name.as_deref() {
                Some(name) => Identifier::global(identifier_from_filename(name)),
                None => Identifier::invalid(),
            },
        };
        let payload_id = nested_id.unwrap_or_else(|| package_id.clone());
        tracing::trace!(package = %package_id, payload = %payload_id, "payload finalized");

        ResolvedPayload {
            package_id,
            payload_id,
            symbol,
        }
    }
}

impl PayloadFields {
    /// Inline form: always local, `Name` alone doubles as the source.
    fn resolve_inline(mut self) -> PayloadSymbol {
        if self.source_file.is_none() {
            self.source_file = self.name.clone();
        }
        let name = self
            .name
            .or_else(|| self.source_file.as_deref().map(|s| file_name(s).to_owned()));
        PayloadSymbol {
            name,
            source_file: self.source_file,
            download_url: self.download_url,
            compressed: self.compressed,
            hash: None,
            size: None,
            certificate_public_key: None,
            certificate_thumbprint: None,
            description: None,
            product_name: None,
            version: None,
            remote: false,
        }
    }
}
