//! Token storage and trivia attachment metadata.

use text_size::{TextRange, TextSize};

use crate::{FieldName, SyntaxKind};

/// Raw token stored in the tree arena.
///
/// Trivia pieces are stored as tokens too, directly before (leading) and after
/// (trailing) the token they are attached to. Only the start offset is implied:
/// it is the `end` of the previous entry in the token array.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: SyntaxKind,
    pub(crate) attached_trivia: AttachedTrivia,
    pub(crate) end: TextSize,
    pub(crate) parent: u32,
    pub(crate) field: Option<FieldName>,
}

/// Number of trivia entries surrounding a real token.
///
/// Always zero for trivia entries themselves.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct AttachedTrivia {
    pub(crate) leading: u32,
    pub(crate) trailing: u32,
}

impl AttachedTrivia {
    pub(crate) const NONE: Self = Self { leading: 0, trailing: 0 };

    #[inline]
    pub(crate) fn new(leading: usize, trailing: usize) -> Self {
        Self {
            leading: leading.try_into().expect("too many trivia pieces"),
            trailing: trailing.try_into().expect("too many trivia pieces"),
        }
    }
}

/// Returns the range of the token at `index`; index 0 is the zero-width sentinel.
#[inline]
pub(crate) fn token_range(tokens: &[Token], index: u32) -> TextRange {
    let index = index as usize;
    debug_assert!(index > 0, "the sentinel token has no range");
    TextRange::new(tokens[index - 1].end, tokens[index].end)
}
