//! Append-only sink for sections, symbols and references.

use wixc_core::{
    ComplexReference, Intermediate, Section, SectionId, SectionKind, SimpleReference, Symbol,
};

/// Collects the output of one compile.
///
/// Gating on earlier errors happens in the session; the emitter only counts
/// what was held back so the final trace can say so.
#[derive(Debug)]
pub(crate) struct Emitter {
    intermediate: Intermediate,
    compilation_id: u32,
    suppressed: usize,
}

impl Emitter {
    pub(crate) fn new(compilation_id: u32) -> Self {
        Self {
            intermediate: Intermediate::new(),
            compilation_id,
            suppressed: 0,
        }
    }

    pub(crate) fn add_section(&mut self, id: Option<String>, kind: SectionKind) -> SectionId {
        self.intermediate
            .add_section(Section::new(id, kind, self.compilation_id))
    }

    pub(crate) fn symbol(&mut self, symbol: Symbol) {
        tracing::trace!(kind = %symbol.kind(), id = %symbol.id, "emit");
        self.intermediate.push_symbol(symbol);
    }

    pub(crate) fn simple_reference(&mut self, reference: SimpleReference) {
        self.intermediate.push_simple_reference(reference);
    }

    pub(crate) fn complex_reference(&mut self, reference: ComplexReference) {
        tracing::trace!(%reference, "group");
        self.intermediate.push_complex_reference(reference);
    }

    pub(crate) fn suppress(&mut self, what: &dyn std::fmt::Display) {
        if self.suppressed == 0 {
            tracing::debug!(first = %what, "emission suppressed after an error");
        }
        self.suppressed += 1;
    }

    /// The collected output, or an empty intermediate when the compile failed.
    pub(crate) fn finish(self, failed: bool) -> Intermediate {
        if failed {
            tracing::debug!(
                suppressed = self.suppressed,
                "compile failed; discarding intermediate"
            );
            return Intermediate::new();
        }
        self.intermediate
    }
}
