//! Identifier grammar, deterministic synthesis and reserved values.

use wixc_core::{Access, Identifier};
use xxhash_rust::xxh3::xxh3_128;

/// Package group every chain item belongs to.
pub const CHAIN_GROUP: &str = "WixChain";
/// Rollback boundary inserted in front of the chain when none is authored.
pub const DEFAULT_BOUNDARY: &str = "WixDefaultBoundary";
/// Container carrying the bootstrapper application payloads.
pub const UX_CONTAINER: &str = "WixUXContainer";
/// Container attached to the bundle executable.
pub const ATTACHED_CONTAINER: &str = "WixAttachedContainer";
/// Layout-only payloads of a bundle.
pub const LAYOUT_ONLY_PAYLOADS: &str = "BundleLayoutOnlyPayloads";

/// Sentinels the compiler uses internally; authors may not define them.
pub const RESERVED_IDENTIFIERS: [&str; 5] = [
    CHAIN_GROUP,
    DEFAULT_BOUNDARY,
    UX_CONTAINER,
    ATTACHED_CONTAINER,
    LAYOUT_ONLY_PAYLOADS,
];

pub fn is_reserved(id: &str) -> bool {
    RESERVED_IDENTIFIERS.contains(&id)
}

/// `[A-Za-z_][A-Za-z0-9_.]*`
pub fn is_legal_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierError {
    Empty,
    Illegal,
    Reserved,
}

/// Parse an authored identifier, with an optional access keyword in front
/// (`"private Foo"`).
pub fn parse_identifier(value: &str) -> Result<Identifier, IdentifierError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let (access, id) = match value.split_once(char::is_whitespace) {
        Some((keyword, rest)) => match Access::from_keyword(keyword) {
            Some(access) => (access, rest.trim_start()),
            None => return Err(IdentifierError::Illegal),
        },
        None => (Access::Global, value),
    };

    if !is_legal_identifier(id) {
        return Err(IdentifierError::Illegal);
    }
    if is_reserved(id) {
        return Err(IdentifierError::Reserved);
    }
    Ok(Identifier::new(access, id))
}

/// Identifier derived from a file name: lower-cased, anything outside the
/// grammar replaced by `_`.
pub fn identifier_from_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push('_');
        }
    }
    if !out.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        out.insert(0, '_');
    }
    out
}

/// Short prefix plus the hash of the ordered discriminators.
///
/// Each discriminator is hashed behind its length, so no choice of
/// separator inside a value can merge two different lists.
/// Output is lower-case, so it can never equal one of the mixed-case
/// reserved values.
pub fn generate_identifier(prefix: &str, discriminators: &[&str]) -> String {
    let mut input = Vec::new();
    for discriminator in discriminators {
        input.extend_from_slice(&(discriminator.len() as u64).to_le_bytes());
        input.extend_from_slice(discriminator.as_bytes());
    }
    let hash = xxh3_128(&input);
    let id = format!("{prefix}{hash:032x}");
    debug_assert!(!is_reserved(&id));
    id
}
