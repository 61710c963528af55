//! Per-parent handler tables and the state a parent hands its children.

use indexmap::IndexMap;
use wixc_core::symbol::{RegistryRoot, SequenceTable};
use wixc_core::PackageKind;

use super::extension::ContextMap;
use super::ordering::OrderingCursor;
use super::Session;
use crate::Result;
use crate::document::Element;

/// Handler for one core element.
pub(crate) type Handler = fn(&mut Session, Element<'_>, &mut Scope) -> Result<()>;

#[derive(Clone, Copy)]
pub(crate) struct Entry {
    pub(crate) handler: Handler,
    /// Singleton child; a second occurrence is `TooManyChildren`.
    pub(crate) once: bool,
}

/// Core child elements a parent accepts, keyed by local name.
///
/// Built once per parent kind inside a `LazyLock`.
#[derive(Default)]
pub(crate) struct Dispatch {
    entries: IndexMap<&'static str, Entry>,
}

impl Dispatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, name: &'static str, handler: Handler) -> Self {
        self.entries.insert(
            name,
            Entry {
                handler,
                once: false,
            },
        );
        self
    }

    pub(crate) fn once(mut self, name: &'static str, handler: Handler) -> Self {
        self.entries.insert(
            name,
            Entry {
                handler,
                once: true,
            },
        );
        self
    }

    pub(crate) fn get(&self, name: &str) -> Option<Entry> {
        self.entries.get(name).copied()
    }
}

/// What the enclosing element knows that its children need.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    pub(crate) parent: Parent,
    /// Group the children register under, if the parent is one.
    pub(crate) cursor: Option<OrderingCursor>,
    /// Resolved values of the parent, handed to extensions.
    pub(crate) context: ContextMap,
}

impl Scope {
    pub(crate) fn new(parent: Parent) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    pub(crate) fn with_cursor(mut self, cursor: OrderingCursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub(crate) fn with_context(mut self, context: ContextMap) -> Self {
        self.context = context;
        self
    }
}

#[derive(Debug, Default)]
pub(crate) enum Parent {
    #[default]
    Unit,
    Container,
    Package(PackageScope),
    Component {
        id: String,
    },
    RegistryKey {
        component: String,
        root: Option<RegistryRoot>,
        key: Option<String>,
    },
    Sequence(SequenceTable),
}

/// Chain package whose children are being compiled.
#[derive(Debug)]
pub(crate) struct PackageScope {
    pub(crate) kind: PackageKind,
    pub(crate) id: String,
    /// `ArpEntry` detection collected from the children.
    pub(crate) arp: Option<ArpEntry>,
}

#[derive(Debug, Clone)]
pub(crate) struct ArpEntry {
    pub(crate) id: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) win64: bool,
}
