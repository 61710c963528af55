//! Rendering diagnostics for people.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

/// Configurable renderer over a [`Diagnostics`] collection.
///
/// With the document text, each diagnostic becomes an annotated snippet
/// pointing at the offending element or attribute. Without it the printer
/// writes one line per diagnostic, prefixed with the path when one is set.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
    warnings: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
            warnings: true,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    /// Include warnings (the default).
    pub fn warnings(mut self, value: bool) -> Self {
        self.warnings = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let selected = self
            .diagnostics
            .iter()
            .filter(|d| self.warnings || !d.is_warning());
        for (i, diag) in selected.enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match self.source {
                Some(source) => write!(w, "{}", renderer.render(&self.report(diag, source)))?,
                None => {
                    if let Some(path) = self.path {
                        write!(w, "{path}: ")?;
                    }
                    write!(w, "{diag}")?;
                }
            }
        }
        Ok(())
    }

    /// Title with the full message, a primary annotation labelled with the
    /// kind, context annotations for related locations, one help group per hint.
    fn report<'a>(&self, diag: &'a DiagnosticMessage, source: &'a str) -> Vec<Group<'a>>
    where
        's: 'a,
    {
        let mut snippet = Snippet::source(source).line_start(1).annotation(
            AnnotationKind::Primary
                .span(span(diag.range, source.len()))
                .label(diag.kind.fallback_message()),
        );
        if let Some(path) = self.path {
            snippet = snippet.path(path);
        }
        for related in &diag.related {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(span(related.range, source.len()))
                    .label(&related.message),
            );
        }

        let title = Level::from(diag.severity())
            .primary_title(&diag.message)
            .element(snippet);
        std::iter::once(title)
            .chain(
                diag.hints
                    .iter()
                    .map(|hint| Group::with_title(Level::HELP.secondary_title(hint))),
            )
            .collect()
    }
}

impl From<Severity> for Level<'static> {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARNING,
        }
    }
}

/// Byte span clamped to the text, at least one byte wide so empty ranges
/// from built documents still point somewhere.
fn span(range: TextRange, len: usize) -> Range<usize> {
    let start = usize::from(range.start()).min(len);
    let end = usize::from(range.end()).clamp(start, len);
    if start == end {
        start..(start + 1).min(len)
    } else {
        start..end
    }
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
