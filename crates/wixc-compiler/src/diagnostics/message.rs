use rowan::TextRange;

/// Every problem the front end can report.
///
/// The first group are errors; the trailing group are warnings that never
/// block emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Attribute shape
    MissingRequiredAttribute,
    IllegalAttributeValue,
    IllegalEmptyAttributeValue,
    IllegalIdentifier,
    ReservedValue,
    MutuallyExclusive,
    ExpectedAttributes,
    UnexpectedAttribute,

    // Element structure
    UnexpectedElement,
    TooManyChildren,
    UnexpectedElementWithAttribute,
    ExpectedAttributeOrElement,

    // Warnings
    UnhandledExtensionElement,
    UnhandledExtensionAttribute,
    DeprecatedConstruct,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnhandledExtensionElement
            | Self::UnhandledExtensionAttribute
            | Self::DeprecatedConstruct => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short description of the kind, also used when no detail is given.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::MissingRequiredAttribute => "missing required attribute",
            Self::IllegalAttributeValue => "illegal attribute value",
            Self::IllegalEmptyAttributeValue => "attribute value cannot be empty",
            Self::IllegalIdentifier => "illegal identifier",
            Self::ReservedValue => "value is reserved",
            Self::MutuallyExclusive => "attributes cannot be used together",
            Self::ExpectedAttributes => "expected at least one of the attributes",
            Self::UnexpectedAttribute => "unexpected attribute",

            Self::UnexpectedElement => "unexpected element",
            Self::TooManyChildren => "element may appear only once",
            Self::UnexpectedElementWithAttribute => "element conflicts with attribute",
            Self::ExpectedAttributeOrElement => "expected an attribute or a child element",

            Self::UnhandledExtensionElement => "no extension handles this element",
            Self::UnhandledExtensionAttribute => "no extension handles this attribute",
            Self::DeprecatedConstruct => "deprecated",
        }
    }

    /// Message with `detail` worked in.
    ///
    /// Kinds about a single name quote it inside a sentence; the rest append
    /// the detail to the fallback text.
    pub fn message(&self, detail: Option<&str>) -> String {
        let Some(detail) = detail else {
            return self.fallback_message().to_owned();
        };
        match self {
            Self::MissingRequiredAttribute => format!("`{detail}` is required"),
            Self::IllegalEmptyAttributeValue => format!("`{detail}` cannot be empty"),
            Self::IllegalIdentifier => format!("`{detail}` is not a legal identifier"),
            Self::ReservedValue => format!("`{detail}` is reserved"),
            Self::UnexpectedAttribute => format!("unexpected attribute `{detail}`"),
            Self::UnexpectedElement => format!("unexpected element `{detail}`"),
            Self::TooManyChildren => format!("`{detail}` may appear only once"),
            Self::UnhandledExtensionElement => format!("no extension handles element `{detail}`"),
            Self::UnhandledExtensionAttribute => {
                format!("no extension handles attribute `{detail}`")
            }
            _ => format!("{}: {detail}", self.fallback_message()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secondary location that explains the primary one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A reported problem: kind, position, rendered text and the raw arguments
/// the text was formatted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) args: Vec<String>,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self {
            kind,
            range,
            message: kind.fallback_message().to_owned(),
            args: Vec::new(),
            related: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Element names, attribute names and values the message mentions.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

/// `start..end` in bytes.
struct Span(TextRange);

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", u32::from(self.0.start()), u32::from(self.0.end()))
    }
}

/// One line: `severity at start..end: message`, then related notes and hints
/// in parentheses.
impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}: {}", self.severity(), Span(self.range), self.message)?;
        for note in &self.related {
            write!(f, " (related: {} at {})", note.message, Span(note.range))?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}
