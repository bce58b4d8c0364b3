use super::node::{Child, Node};
use super::token::Token;

/// Frozen arena behind a [`SyntaxTree`](crate::SyntaxTree).
#[derive(Clone, Eq, PartialEq)]
pub(crate) struct TreeInner {
    pub(crate) text: Box<str>,
    /// Always starts with a fake zero-width token.
    pub(crate) tokens: Box<[Token]>,
    /// The root is always at index 0.
    pub(crate) nodes: Box<[Node]>,
    pub(crate) children: Box<[Child]>,
}

impl TreeInner {
    #[inline]
    pub(crate) fn node(&self, index: u32) -> &Node {
        &self.nodes[index as usize]
    }

    #[inline]
    pub(crate) fn token(&self, index: u32) -> &Token {
        &self.tokens[index as usize]
    }
}
