//! Node storage and child references.

use std::ops::Range;

use text_size::TextRange;

use crate::{FieldName, SyntaxKind};

/// Raw node stored in the tree arena.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Node {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<u32>,
    pub(crate) field: Option<FieldName>,
    /// Slice of the shared child array.
    pub(crate) children: Range<u32>,
    /// Token array entries (trivia included) covered by this node.
    pub(crate) tokens: Range<u32>,
    pub(crate) range: TextRange,
}

impl Node {
    #[inline]
    pub(crate) fn children<'a>(&self, all: &'a [Child]) -> &'a [Child] {
        &all[self.children.start as usize..self.children.end as usize]
    }
}

/// Reference from a node to one of its direct children.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Child {
    Node(u32),
    Token(u32),
}
