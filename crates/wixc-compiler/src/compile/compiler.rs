//! Compiler configuration and the per-compile entry points.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use wixc_core::Intermediate;

use super::extension::{CompilerExtension, ExtensionSet};
use super::session::Session;
use crate::diagnostics::Diagnostics;
use crate::document::Document;
use crate::{Error, Result};

const DEFAULT_RECURSION_LIMIT: u32 = 256;

#[derive(Debug, Clone, Copy)]
pub struct CompilerConfig {
    pub recursion_limit: u32,
    pub deprecation_warnings: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            deprecation_warnings: true,
        }
    }
}

pub struct CompilerBuilder {
    extensions: ExtensionSet,
    config: CompilerConfig,
}

impl CompilerBuilder {
    pub fn new() -> Self {
        Self {
            extensions: ExtensionSet::default(),
            config: CompilerConfig::default(),
        }
    }

    pub fn with_extension(mut self, extension: impl CompilerExtension + 'static) -> Self {
        self.extensions.insert(Box::new(extension));
        self
    }

    /// Maximum element nesting depth before the compile is aborted.
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.config.recursion_limit = limit;
        self
    }

    pub fn with_deprecation_warnings(mut self, enabled: bool) -> Self {
        self.config.deprecation_warnings = enabled;
        self
    }

    pub fn build(self) -> Compiler {
        tracing::debug!(extensions = self.extensions.len(), "compiler built");
        Compiler {
            extensions: Arc::new(self.extensions),
            config: self.config,
            next_compilation: AtomicU32::new(0),
        }
    }
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Reusable front end. Every compile runs in its own session.
pub struct Compiler {
    extensions: Arc<ExtensionSet>,
    config: CompilerConfig,
    next_compilation: AtomicU32,
}

impl Compiler {
    /// Compiler without extensions and with default settings.
    pub fn new() -> Self {
        CompilerBuilder::new().build()
    }

    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile one document.
    ///
    /// Semantic problems end up in the output's diagnostics; only nesting
    /// beyond the recursion limit is an `Err`.
    pub fn compile(&self, document: &Document) -> Result<CompileOutput> {
        let compilation_id = self.next_compilation.fetch_add(1, Ordering::Relaxed);
        let mut session = Session::new(Arc::clone(&self.extensions), self.config, compilation_id);
        if let Some(root) = document.root() {
            session.compile_root(root)?;
        }
        Ok(session.finish())
    }

    /// Compile independent documents and concatenate their outputs in order.
    ///
    /// An error in any document empties the combined intermediate.
    pub fn compile_all(&self, documents: &[Document]) -> Result<CompileOutput> {
        let mut combined = CompileOutput::default();
        for document in documents {
            let output = self.compile(document)?;
            combined.intermediate.append(output.intermediate);
            combined.diagnostics.extend(output.diagnostics);
        }
        if combined.diagnostics.has_errors() {
            combined.intermediate = Intermediate::new();
        }
        Ok(combined)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a compile: a complete intermediate and no errors, or an empty
/// intermediate and at least one error. Warnings may accompany either.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub(crate) intermediate: Intermediate,
    pub(crate) diagnostics: Diagnostics,
}

impl CompileOutput {
    pub fn intermediate(&self) -> &Intermediate {
        &self.intermediate
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn into_result(self) -> Result<Intermediate> {
        if self.diagnostics.has_errors() {
            return Err(Error::CompileFailed(self.diagnostics));
        }
        Ok(self.intermediate)
    }
}
