/// Every token and node kind that can appear in an nginx syntax tree.
///
/// Token kinds come first, node kinds after `EOF`. The discriminants are dense
/// so that a [`SyntaxSet`](crate::SyntaxSet) can store them as bits.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SyntaxKind {
    L_BRACE,
    R_BRACE,
    SEMICOLON,
    EQ,

    /// Unclassified bare run. Only survives into the tree inside `ERROR`.
    ATOM,
    KEYWORD,
    WORD,
    VARIABLE,
    QUOTED_STRING,
    STRING,
    NUMERIC_LITERAL,
    TIME,
    SIZE,
    BOOLEAN,
    AUTO,
    CPUMASK,
    CONNECTION_METHOD,
    LEVEL,
    DEBUG_POINT,
    ENV_NAME,
    CONDITION,
    LOCATION_MODIFIER,
    LOCATION_ROUTE,
    FILE,
    MASK,
    RANDOM_VALUE,
    RAW_VALUE,

    WHITESPACE,
    NEWLINE,
    COMMENT,

    EOF,

    SOURCE_FILE,
    BLOCK,
    DIRECTIVE,
    ATTRIBUTE,
    IF,
    MAP,
    LOCATION,
    THREAD_POOL_OPTION,
    ERROR,
    TOMBSTONE,
}

impl SyntaxKind {
    /// Returns `true` for whitespace, newlines and comments.
    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE | Self::COMMENT)
    }

    /// Returns `true` for kinds that label leaves of the tree.
    #[inline]
    pub const fn is_token(self) -> bool {
        (self as u8) <= (Self::EOF as u8)
    }

    /// Returns `true` for kinds that label interior nodes.
    #[inline]
    pub const fn is_node(self) -> bool {
        !self.is_token()
    }
}
