//! Lossless, immutable syntax tree for nginx configuration files.
//!
//! The tree is built once and then navigated through `Copy` handles that
//! borrow it. Whitespace, newlines and comments are kept as trivia attached to
//! the neighbouring tokens, so the concatenated text of all tokens is exactly
//! the source text.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;
mod builder;
mod dump;
mod field;
mod nodes;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod trivia;

/// Incremental builder for constructing a `SyntaxTree`.
pub use builder::Builder;
/// Field names labelling children.
pub use field::{FieldName, UnknownField};
/// Primary syntax tree API types and adapters.
pub use syntax::{
    Children, ChildrenWithTokens, DescendantTokens, NodeOrToken, Preorder, PreorderWithTokens,
    SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree, TokenAtOffset, TriviaIter,
    WalkEvent, WalkEventWithTokens,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Trivia pieces attached to tokens.
pub use trivia::{TriviaPiece, TriviaPieceKind};
pub use text_size::{TextRange, TextSize};
