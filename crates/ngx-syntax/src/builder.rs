//! Incremental builder for the immutable syntax tree.

use text_size::{TextRange, TextSize};

use crate::nodes::{AttachedTrivia, Child, Node, Token, TreeInner};
use crate::{FieldName, SyntaxKind, SyntaxTree, TriviaPiece};

struct Opened {
    node: u32,
    children: Vec<Child>,
}

/// Builds a [`SyntaxTree`] from parser events.
///
/// Nodes are opened and closed in document order; tokens are appended to the
/// innermost open node together with their trivia.
pub struct Builder {
    text: Box<str>,
    nodes: Vec<Node>,
    children: Vec<Child>,
    tokens: Vec<Token>,

    children_pool: Vec<Vec<Child>>,
    opened: Vec<Opened>,
    text_len: TextSize,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 64;
const DEFAULT_TREE_SIZE: usize = 1024;
const DEFAULT_CHILDREN_LEN: usize = 8;

impl Builder {
    /// Creates a new builder for `text`.
    ///
    /// The token buffer is seeded with a fake token at index 0 so that every
    /// real token can read its start offset from its predecessor.
    pub fn new(text: &str) -> Self {
        let mut tokens = Vec::with_capacity(DEFAULT_TREE_SIZE);
        tokens.push(Token {
            kind: SyntaxKind::TOMBSTONE,
            attached_trivia: AttachedTrivia::NONE,
            end: TextSize::new(0),
            parent: 0,
            field: None,
        });
        Self {
            text: text.into(),
            nodes: Vec::with_capacity(DEFAULT_TREE_SIZE / 4),
            children: Vec::with_capacity(DEFAULT_TREE_SIZE),
            tokens,
            children_pool: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            text_len: TextSize::new(0),
        }
    }

    fn new_children_vec(&mut self) -> Vec<Child> {
        self.children_pool.pop().unwrap_or_else(|| Vec::with_capacity(DEFAULT_CHILDREN_LEN))
    }

    /// Starts a new node of the given kind, optionally labelled with a field.
    pub fn start_node(&mut self, kind: SyntaxKind, field: Option<FieldName>) {
        debug_assert!(kind.is_node(), "{kind:?} is not a node kind");

        let index: u32 = self.nodes.len().try_into().unwrap();
        let parent = match self.opened.last_mut() {
            Some(parent) => {
                parent.children.push(Child::Node(index));
                Some(parent.node)
            }
            None => {
                assert!(self.nodes.is_empty(), "a tree has exactly one root node");
                None
            }
        };

        let first_token: u32 = self.tokens.len().try_into().unwrap();
        self.nodes.push(Node {
            kind,
            parent,
            field,
            children: 0..0,
            tokens: first_token..first_token,
            range: TextRange::empty(self.text_len),
        });

        let children = self.new_children_vec();
        self.opened.push(Opened { node: index, children });
    }

    /// Finishes the most recently started node.
    pub fn finish_node(&mut self) {
        let Opened { node, mut children } = self.opened.pop().expect("no opened nodes?");

        let start: u32 = self.children.len().try_into().unwrap();
        self.children.append(&mut children);
        let end: u32 = self.children.len().try_into().unwrap();
        self.children_pool.push(children);

        let last_token: u32 = self.tokens.len().try_into().unwrap();
        let node = &mut self.nodes[node as usize];
        node.children = start..end;
        node.tokens.end = last_token;
        node.range = TextRange::new(node.range.start(), self.text_len);
    }

    /// Adds a token with its leading and trailing trivia to the open node.
    pub fn token(
        &mut self,
        leading_trivia: &[TriviaPiece],
        kind: SyntaxKind,
        text_len: TextSize,
        trailing_trivia: &[TriviaPiece],
        field: Option<FieldName>,
    ) {
        debug_assert!(kind.is_token() && !kind.is_trivia(), "{kind:?} is not a token kind");

        let parent = self.opened.last().expect("tokens must be inside a node").node;

        for piece in leading_trivia {
            self.push_trivia(piece, parent);
        }

        let index: u32 = self.tokens.len().try_into().unwrap();
        let end = self.advance(text_len);
        self.tokens.push(Token {
            kind,
            attached_trivia: AttachedTrivia::new(leading_trivia.len(), trailing_trivia.len()),
            end,
            parent,
            field,
        });
        if let Some(opened) = self.opened.last_mut() {
            opened.children.push(Child::Token(index));
        }

        for piece in trailing_trivia {
            self.push_trivia(piece, parent);
        }
    }

    fn push_trivia(&mut self, piece: &TriviaPiece, parent: u32) {
        let end = self.advance(piece.len);
        self.tokens.push(Token {
            kind: piece.kind.syntax_kind(),
            attached_trivia: AttachedTrivia::NONE,
            end,
            parent,
            field: None,
        });
    }

    fn advance(&mut self, len: TextSize) -> TextSize {
        self.text_len += len;
        assert!(
            self.text.is_char_boundary(usize::from(self.text_len)),
            "token ends inside a character at {:?}",
            self.text_len
        );
        self.text_len
    }

    /// Finishes building and returns the immutable [`SyntaxTree`].
    pub fn finish(mut self) -> SyntaxTree {
        assert!(self.opened.is_empty(), "unfinished nodes remain");
        assert!(!self.nodes.is_empty(), "a tree needs a root node");
        assert_eq!(
            usize::from(self.text_len),
            self.text.len(),
            "tokens must cover the whole text"
        );

        let inner = TreeInner {
            text: std::mem::take(&mut self.text),
            tokens: std::mem::take(&mut self.tokens).into_boxed_slice(),
            nodes: std::mem::take(&mut self.nodes).into_boxed_slice(),
            children: std::mem::take(&mut self.children).into_boxed_slice(),
        };
        SyntaxTree { inner }
    }
}
