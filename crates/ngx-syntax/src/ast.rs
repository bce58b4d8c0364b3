use crate::SyntaxKind::{self, *};
use crate::{FieldName, NodeOrToken, SyntaxNode, SyntaxToken};

/// A typed view over a [`SyntaxNode`] of a particular kind.
pub trait AstNode<'a>: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self>;

    fn syntax(self) -> SyntaxNode<'a>;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name<'a>(SyntaxNode<'a>);

        impl<'a> AstNode<'a> for $name<'a> {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
                Self::can_cast(syntax.kind()).then_some(Self(syntax))
            }

            fn syntax(self) -> SyntaxNode<'a> {
                self.0
            }
        }
    };
}

ast_node!(
    /// The root of every tree.
    SourceFile => SOURCE_FILE
);
ast_node!(
    /// `{ ... }`
    Block => BLOCK
);
ast_node!(
    /// One of the specifically typed core directives, e.g. `worker_processes auto;`.
    Directive => DIRECTIVE
);
ast_node!(
    /// Any other `keyword value... ;` or `keyword value... { ... }` statement.
    Attribute => ATTRIBUTE
);
ast_node!(If => IF);
ast_node!(Map => MAP);
ast_node!(Location => LOCATION);
ast_node!(
    /// `threads=32` or `max_queue=65536` inside `thread_pool`.
    ThreadPoolOption => THREAD_POOL_OPTION
);
ast_node!(Error => ERROR);

fn token_field<'a>(node: SyntaxNode<'a>, field: FieldName) -> Option<SyntaxToken<'a>> {
    node.field(field).and_then(NodeOrToken::into_token)
}

fn token_fields<'a>(
    node: SyntaxNode<'a>,
    field: FieldName,
) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
    node.fields(field).filter_map(NodeOrToken::into_token)
}

fn body<'a>(node: SyntaxNode<'a>) -> Option<Block<'a>> {
    node.field(FieldName::Body).and_then(NodeOrToken::into_node).and_then(Block::cast)
}

fn statements<'a>(node: SyntaxNode<'a>) -> impl Iterator<Item = Statement<'a>> + 'a {
    node.children().filter_map(Statement::cast)
}

/// Any statement that can appear at the top level or inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement<'a> {
    Directive(Directive<'a>),
    Attribute(Attribute<'a>),
    Block(Block<'a>),
    If(If<'a>),
    Map(Map<'a>),
    Location(Location<'a>),
    Error(Error<'a>),
}

impl<'a> AstNode<'a> for Statement<'a> {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, DIRECTIVE | ATTRIBUTE | BLOCK | IF | MAP | LOCATION | ERROR)
    }

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        Some(match syntax.kind() {
            DIRECTIVE => Self::Directive(Directive(syntax)),
            ATTRIBUTE => Self::Attribute(Attribute(syntax)),
            BLOCK => Self::Block(Block(syntax)),
            IF => Self::If(If(syntax)),
            MAP => Self::Map(Map(syntax)),
            LOCATION => Self::Location(Location(syntax)),
            ERROR => Self::Error(Error(syntax)),
            _ => return None,
        })
    }

    fn syntax(self) -> SyntaxNode<'a> {
        match self {
            Self::Directive(it) => it.0,
            Self::Attribute(it) => it.0,
            Self::Block(it) => it.0,
            Self::If(it) => it.0,
            Self::Map(it) => it.0,
            Self::Location(it) => it.0,
            Self::Error(it) => it.0,
        }
    }
}

impl<'a> Statement<'a> {
    /// The leading keyword text, for statements that have one.
    pub fn keyword(self) -> Option<&'a str> {
        token_field(self.syntax(), FieldName::Keyword).map(SyntaxToken::text_trimmed)
    }

    /// The nested block, if the statement has one.
    pub fn block(self) -> Option<Block<'a>> {
        match self {
            Self::Block(block) => Some(block),
            other => body(other.syntax()),
        }
    }
}

impl<'a> SourceFile<'a> {
    pub fn statements(self) -> impl Iterator<Item = Statement<'a>> + 'a {
        statements(self.0)
    }

    /// Every `ERROR` node in the file, in document order.
    pub fn errors(self) -> impl Iterator<Item = Error<'a>> + 'a {
        self.0.descendants().filter_map(Error::cast)
    }
}

impl<'a> Block<'a> {
    pub fn statements(self) -> impl Iterator<Item = Statement<'a>> + 'a {
        statements(self.0)
    }

    pub fn l_brace(self) -> Option<SyntaxToken<'a>> {
        self.punct(L_BRACE)
    }

    /// `None` when the block is unterminated.
    pub fn r_brace(self) -> Option<SyntaxToken<'a>> {
        self.punct(R_BRACE)
    }

    fn punct(self, kind: SyntaxKind) -> Option<SyntaxToken<'a>> {
        self.0
            .children_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|token| token.kind() == kind)
    }
}

impl<'a> Directive<'a> {
    pub fn keyword(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Keyword)
    }

    /// The directive name, e.g. `worker_processes`.
    pub fn name(self) -> Option<&'a str> {
        self.keyword().map(SyntaxToken::text_trimmed)
    }

    pub fn values(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        token_fields(self.0, FieldName::Value)
    }

    /// The first value; most directives take exactly one.
    pub fn value(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Value)
    }

    /// The thread pool name or the `env` variable name.
    pub fn target(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Name)
    }

    /// The status code of `return`.
    pub fn status(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Status)
    }

    /// The severity of `error_log`.
    pub fn level(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Level)
    }

    pub fn thread_pool_options(self) -> impl Iterator<Item = ThreadPoolOption<'a>> + 'a {
        self.0.children().filter_map(ThreadPoolOption::cast)
    }

    pub fn block(self) -> Option<Block<'a>> {
        body(self.0)
    }
}

impl<'a> Attribute<'a> {
    pub fn keyword(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Keyword)
    }

    pub fn values(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        token_fields(self.0, FieldName::Value)
    }

    pub fn block(self) -> Option<Block<'a>> {
        body(self.0)
    }
}

impl<'a> If<'a> {
    /// The parenthesised condition, parentheses included.
    pub fn condition(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Condition)
    }

    pub fn block(self) -> Option<Block<'a>> {
        body(self.0)
    }
}

impl<'a> Map<'a> {
    /// Source and destination variables, in order.
    pub fn variables(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        token_fields(self.0, FieldName::Variable)
    }

    pub fn block(self) -> Option<Block<'a>> {
        body(self.0)
    }
}

impl<'a> Location<'a> {
    pub fn modifier(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Modifier)
    }

    pub fn route(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Route)
    }

    pub fn block(self) -> Option<Block<'a>> {
        body(self.0)
    }
}

impl<'a> ThreadPoolOption<'a> {
    pub fn key(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Key)
    }

    pub fn value(self) -> Option<SyntaxToken<'a>> {
        token_field(self.0, FieldName::Value)
    }
}
