//! Sibling ordering inside complex-reference parents.

use wixc_core::{ComplexReference, ComplexReferenceChild, ComplexReferenceParent};

/// Tracks the last child registered under one parent.
///
/// Ordered parents (chains, groups, package payloads) link each child to the
/// one before it. An explicit predecessor replaces that link for a single
/// child; the cursor still advances to the child, so later siblings follow it.
#[derive(Debug, Clone)]
pub struct OrderingCursor {
    parent_kind: ComplexReferenceParent,
    parent_id: String,
    ordered: bool,
    last: Option<(ComplexReferenceChild, String)>,
}

impl OrderingCursor {
    pub fn ordered(parent_kind: ComplexReferenceParent, parent_id: impl Into<String>) -> Self {
        Self {
            parent_kind,
            parent_id: parent_id.into(),
            ordered: true,
            last: None,
        }
    }

    /// Membership without sequencing, as in containers.
    pub fn unordered(parent_kind: ComplexReferenceParent, parent_id: impl Into<String>) -> Self {
        Self {
            ordered: false,
            ..Self::ordered(parent_kind, parent_id)
        }
    }

    pub fn parent_kind(&self) -> ComplexReferenceParent {
        self.parent_kind
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Build the reference for the next child in document order.
    pub fn next(
        &mut self,
        child_kind: ComplexReferenceChild,
        child_id: &str,
        after: Option<(ComplexReferenceChild, String)>,
    ) -> ComplexReference {
        let previous = if self.ordered {
            let previous = after.or_else(|| self.last.take());
            self.last = Some((child_kind, child_id.to_owned()));
            previous
        } else {
            None
        };

        ComplexReference {
            parent_kind: self.parent_kind,
            parent_id: self.parent_id.clone(),
            child_kind,
            child_id: child_id.to_owned(),
            previous,
        }
    }
}
