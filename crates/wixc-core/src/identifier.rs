//! Scoped identifiers.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// Visibility of an identifier to the linker.
///
/// The front end only records the scope; it is enforced when sections are
/// linked together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Access {
    #[default]
    Global,
    /// Visible only inside the section that defines it.
    Section,
    /// Visible only inside the source document.
    Private,
    /// Can be overridden by a non-virtual definition elsewhere.
    Virtual,
    /// Placeholder produced after an error.
    Invalid,
}

impl Access {
    /// Keyword accepted as an access prefix in authored ids (`"private Foo"`).
    pub fn keyword(self) -> &'static str {
        match self {
            Access::Global => "global",
            Access::Section => "section",
            Access::Private => "private",
            Access::Virtual => "virtual",
            Access::Invalid => "invalid",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "global" => Some(Access::Global),
            "section" => Some(Access::Section),
            "private" => Some(Access::Private),
            "virtual" => Some(Access::Virtual),
            _ => None,
        }
    }
}

/// A symbol name plus its access scope.
///
/// Equality and hashing only consider the name: two identifiers that differ
/// only in scope denote the same symbol.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct Identifier {
    pub access: Access,
    pub id: String,
}

impl Identifier {
    pub fn new(access: Access, id: impl Into<String>) -> Self {
        Self {
            access,
            id: id.into(),
        }
    }

    pub fn global(id: impl Into<String>) -> Self {
        Self::new(Access::Global, id)
    }

    /// Placeholder used when the authored value could not be resolved.
    pub fn invalid() -> Self {
        Self::new(Access::Invalid, "")
    }

    pub fn is_invalid(&self) -> bool {
        self.access == Access::Invalid
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.access {
            Access::Global | Access::Invalid => f.write_str(&self.id),
            access => write!(f, "{} {}", access.keyword(), self.id),
        }
    }
}
