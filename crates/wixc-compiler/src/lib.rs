//! wixc: semantic analysis for the WiX installer-definition language.
//!
//! Walks a parsed document and produces an [`Intermediate`](wixc_core::Intermediate):
//! typed symbols grouped into sections, plus the simple and complex references
//! the linker resolves later. Problems in the document are reported as
//! [`Diagnostics`], never as errors; once any error is recorded the compile
//! stops emitting and its output is empty.
//!
//! # Example
//!
//! ```
//! use wixc_compiler::{Compiler, Document};
//!
//! let source = r#"
//!     <Wix xmlns="http://wixtoolset.org/schemas/v4/wxs">
//!       <Fragment>
//!         <PackageGroup Id="Prereqs">
//!           <ExePackage Id="Vcredist" SourceFile="vc_redist.x64.exe"
//!                       DetectCondition="VcInstalled" UninstallArguments="/uninstall" />
//!         </PackageGroup>
//!       </Fragment>
//!     </Wix>
//! "#;
//!
//! let document = Document::parse(source).expect("well-formed");
//! let output = Compiler::new().compile(&document).expect("within limits");
//! eprintln!("{}", output.diagnostics().printer().source(source).render());
//! assert!(output.is_success());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod compile;
pub mod diagnostics;
pub mod document;
mod elements;

#[cfg(test)]
pub mod test_utils;

pub use compile::{
    CompileOutput, Compiler, CompilerBuilder, CompilerExtension, ContextMap, ExtensionContext,
};
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use document::{Document, WXS_NAMESPACE, parse};
pub use elements::{MissingValue, infer_variable_type};

/// Failures that stop a compile outright.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The input is not XML a document can be built from.
    #[error("malformed XML at byte {offset}: {message}")]
    Xml { offset: u64, message: String },

    /// Elements nested deeper than the configured limit.
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("compile failed with {} errors", .0.count(Severity::Error))]
    CompileFailed(Diagnostics),
}

/// Result type for document and compile operations.
pub type Result<T> = std::result::Result<T, Error>;
