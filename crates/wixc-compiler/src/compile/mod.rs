//! The semantic-analysis front end: from a [`Document`](crate::document::Document)
//! to an [`Intermediate`](wixc_core::Intermediate).

mod attributes;
mod compiler;
mod context;
mod dispatch;
mod emitter;
mod extension;
mod identifiers;
mod invariants;
mod ordering;
mod payload;
mod session;

#[cfg(test)]
mod attributes_tests;
#[cfg(test)]
mod extension_tests;

pub use attributes::{
    EmptyRule, is_long_filename, is_short_filename, is_version, normalize_guid, parse_codepage,
    parse_yes_no, parse_yes_no_default,
};
pub use compiler::{CompileOutput, Compiler, CompilerBuilder, CompilerConfig};
pub use context::CompilationContext;
pub use extension::{CompilerExtension, ContextMap, ExtensionContext};
pub use identifiers::{
    ATTACHED_CONTAINER, CHAIN_GROUP, DEFAULT_BOUNDARY, IdentifierError, LAYOUT_ONLY_PAYLOADS,
    RESERVED_IDENTIFIERS, UX_CONTAINER, generate_identifier, identifier_from_filename,
    is_legal_identifier, is_reserved, parse_identifier,
};
pub use ordering::OrderingCursor;

pub(crate) use dispatch::{ArpEntry, Dispatch, PackageScope, Parent, Scope};
pub(crate) use extension::context_map;
pub(crate) use payload::{PayloadBuilder, PayloadFields, file_name};
pub(crate) use session::Session;
