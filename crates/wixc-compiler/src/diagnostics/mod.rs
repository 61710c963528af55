//! Problems found in a document.
//!
//! Handlers never fail on a bad document; they record a [`DiagnosticMessage`]
//! and carry on with a safe default, so one compile reports as much as it can.

mod message;
mod printer;


use rowan::TextRange;

pub use message::{DiagnosticKind, DiagnosticMessage, RelatedInfo, Severity};
pub use printer::DiagnosticsPrinter;

/// Everything reported during a compile, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

/// Pending diagnostic; nothing is recorded until [`emit`](Self::emit).
#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    sink: &'a mut Vec<DiagnosticMessage>,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a diagnostic of `kind` at `range`, worded with the kind's
    /// fallback message until `.message()` supplies the detail.
    pub fn report(&mut self, kind: DiagnosticKind, range: TextRange) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            sink: &mut self.messages,
            message: DiagnosticMessage::with_default_message(kind, range),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiagnosticMessage> {
        self.messages.iter()
    }

    /// Number of diagnostics of the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.iter().filter(|d| d.severity() == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.iter().any(DiagnosticMessage::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.iter().filter(|d| d.is_error())
    }

    /// Kinds in report order.
    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.iter().map(DiagnosticMessage::kind).collect()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticMessage;
    type IntoIter = std::slice::Iter<'a, DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = self.iter();
        if let Some(first) = lines.next() {
            write!(f, "{first}")?;
        }
        for diag in lines {
            write!(f, "\n{diag}")?;
        }
        Ok(())
    }
}

impl DiagnosticBuilder<'_> {
    /// Detail rendered through the kind's template.
    pub fn message(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    /// Element names, attribute names and values the message was built from.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn related_to(mut self, note: impl Into<String>, range: TextRange) -> Self {
        self.message.related.push(RelatedInfo::new(range, note));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn emit(self) {
        tracing::debug!(kind = ?self.message.kind, "{}", self.message.message);
        self.sink.push(self.message);
    }
}
