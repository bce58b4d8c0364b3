//! Public syntax tree API built on immutable, parent-linked nodes.

use std::fmt;
use std::hash::{Hash, Hasher};

use text_size::{TextRange, TextSize};

use crate::nodes::{Child, Node, Token, TreeInner, token_range};
use crate::{FieldName, SyntaxKind};

/// Owned syntax tree for a single source text.
///
/// The tree never changes after it is built; handles into it are `Copy` and
/// borrow the tree.
#[derive(Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub(crate) inner: TreeInner,
}

impl SyntaxTree {
    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: &self.inner, index: 0 }
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &str {
        &self.inner.text
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("text_len", &self.text().len())
            .field("nodes", &self.inner.nodes.len())
            .finish_non_exhaustive()
    }
}

/// Token handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl<'a> SyntaxToken<'a> {
    #[inline]
    fn raw(self) -> &'a Token {
        self.tree.token(self.index)
    }

    /// Returns this token's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.raw().kind
    }

    /// Returns the field this token fills in its parent, if any.
    #[inline]
    pub fn field(self) -> Option<FieldName> {
        self.raw().field
    }

    /// Returns `true` if this token is trivia.
    #[inline]
    pub fn is_trivia(self) -> bool {
        self.kind().is_trivia()
    }

    /// Returns the token text range including attached trivia.
    #[inline]
    pub fn text_range(self) -> TextRange {
        let first_token = self.leading_trivia().next().unwrap_or(self);
        let last_token = self.trailing_trivia().next_back().unwrap_or(self);
        TextRange::new(first_token.trimmed_range().start(), last_token.trimmed_range().end())
    }

    /// Returns the token text range excluding trivia.
    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        token_range(&self.tree.tokens, self.index)
    }

    /// Returns the token text including trivia.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the token text excluding trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    /// Iterates over leading trivia tokens.
    #[inline]
    pub fn leading_trivia(self) -> TriviaIter<'a> {
        let len = self.raw().attached_trivia.leading;
        TriviaIter { tree: self.tree, start: self.index - len, end: self.index }
    }

    /// Iterates over trailing trivia tokens.
    #[inline]
    pub fn trailing_trivia(self) -> TriviaIter<'a> {
        let len = self.raw().attached_trivia.trailing;
        TriviaIter { tree: self.tree, start: self.index + 1, end: self.index + 1 + len }
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> SyntaxNode<'a> {
        SyntaxNode { tree: self.tree, index: self.raw().parent }
    }

    /// Returns an iterator of parent nodes, starting from the immediate parent.
    #[inline]
    pub fn parent_ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        self.parent().ancestors()
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxToken<'_> {}

impl Hash for SyntaxToken<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.index.hash(state);
    }
}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.trimmed_range(), self.text_trimmed())
    }
}

impl fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Iterator over trivia tokens.
#[derive(Clone)]
pub struct TriviaIter<'a> {
    tree: &'a TreeInner,
    start: u32,
    end: u32,
}

impl<'a> Iterator for TriviaIter<'a> {
    type Item = SyntaxToken<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        let token = SyntaxToken { tree: self.tree, index: self.start };
        self.start += 1;
        Some(token)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.end - self.start) as usize;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for TriviaIter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(SyntaxToken { tree: self.tree, index: self.end })
    }
}

impl ExactSizeIterator for TriviaIter<'_> {}

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a TreeInner,
    index: u32,
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    fn raw(self) -> &'a Node {
        self.tree.node(self.index)
    }

    /// Returns this node's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.raw().kind
    }

    /// Returns the field this node fills in its parent, if any.
    #[inline]
    pub fn field_name(self) -> Option<FieldName> {
        self.raw().field
    }

    /// Returns the text range covered by this node, trivia included.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.raw().range
    }

    /// Returns the range with leading/trailing trivia trimmed away.
    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => {
                TextRange::new(first.trimmed_range().start(), last.trimmed_range().end())
            }
            _ => TextRange::empty(self.text_range().start()),
        }
    }

    /// Returns the text slice covered by this node.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the text slice excluding leading/trailing trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    /// Returns the parent node if any.
    #[inline]
    pub fn parent(self) -> Option<Self> {
        Some(Self { tree: self.tree, index: self.raw().parent? })
    }

    /// Returns an iterator of ancestors starting from this node.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        std::iter::successors(Some(self), |it| it.parent())
    }

    /// Iterates children including tokens.
    #[inline]
    pub fn children_with_tokens(self) -> ChildrenWithTokens<'a> {
        ChildrenWithTokens {
            tree: self.tree,
            children: self.raw().children(&self.tree.children).iter(),
        }
    }

    /// Iterates child nodes, skipping tokens.
    #[inline]
    pub fn children(self) -> Children<'a> {
        Children { inner: self.children_with_tokens() }
    }

    /// Returns the first child labelled with `name`.
    #[inline]
    pub fn field(self, name: FieldName) -> Option<SyntaxElement<'a>> {
        self.children_with_tokens().find(|child| child.field_name() == Some(name))
    }

    /// Returns every child labelled with `name`, in source order.
    #[inline]
    pub fn fields(self, name: FieldName) -> impl Iterator<Item = SyntaxElement<'a>> + 'a {
        self.children_with_tokens().filter(move |child| child.field_name() == Some(name))
    }

    /// Iterates the non-trivia tokens inside this node in source order.
    #[inline]
    pub fn descendant_tokens(self) -> DescendantTokens<'a> {
        let range = &self.raw().tokens;
        DescendantTokens { tree: self.tree, next: range.start, end: range.end }
    }

    /// Returns the first non-trivia token inside this node.
    #[inline]
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        self.descendant_tokens().next()
    }

    /// Returns the last non-trivia token inside this node.
    #[inline]
    pub fn last_token(self) -> Option<SyntaxToken<'a>> {
        self.descendant_tokens().next_back()
    }

    /// Returns the token (trivia included) at the given offset, if any.
    pub fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'a>> {
        let range = self.raw().tokens.clone();
        let tokens = &self.tree.tokens[range.start as usize..range.end as usize];
        if !self.text_range().contains_inclusive(offset) {
            return TokenAtOffset::None;
        }

        let index = tokens.partition_point(|token| token.end <= offset);
        let token = |i: usize| SyntaxToken { tree: self.tree, index: range.start + i as u32 };

        // Zero-width tokens at `offset` are skipped by the partition point.
        let right = (index < tokens.len()).then(|| token(index));
        let left = (0..index)
            .rev()
            .map(token)
            .find(|token| !token.trimmed_range().is_empty())
            .filter(|token| token.trimmed_range().end() == offset);

        match (left, right) {
            (Some(left), Some(right)) if right.trimmed_range().start() == offset => {
                TokenAtOffset::Between(left, right)
            }
            (Some(left), _) => TokenAtOffset::Single(left),
            (None, Some(right)) => TokenAtOffset::Single(right),
            (None, None) => TokenAtOffset::None,
        }
    }

    /// Returns the smallest element that fully covers `range`.
    pub fn covering_element(self, range: TextRange) -> SyntaxElement<'a> {
        let Some(token) = self.token_at_offset(range.start()).right_biased() else {
            return NodeOrToken::Node(self);
        };
        if token.trimmed_range().contains_range(range) && !token.is_trivia() {
            return NodeOrToken::Token(token);
        }
        let node = token
            .parent_ancestors()
            .find(|ancestor| ancestor.text_range().contains_range(range))
            .unwrap_or(self);
        NodeOrToken::Node(node)
    }

    /// Returns a preorder iterator over nodes.
    #[inline]
    pub fn preorder(self) -> Preorder<'a> {
        Preorder::new(self)
    }

    /// Returns a preorder iterator over nodes and tokens.
    #[inline]
    pub fn preorder_with_tokens(self) -> PreorderWithTokens<'a> {
        PreorderWithTokens::new(self)
    }

    /// Returns every descendant node (self included) in preorder.
    #[inline]
    pub fn descendants(self) -> impl Iterator<Item = SyntaxNode<'a>> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxNode<'_> {}

impl Hash for SyntaxNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.index.hash(state);
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Node or token element inside the tree.
pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

impl<'a> SyntaxElement<'a> {
    /// Returns the element kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        match self {
            Self::Node(node) => node.kind(),
            Self::Token(token) => token.kind(),
        }
    }

    /// Returns the field this element fills in its parent, if any.
    #[inline]
    pub fn field_name(self) -> Option<FieldName> {
        match self {
            Self::Node(node) => node.field_name(),
            Self::Token(token) => token.field(),
        }
    }

    /// Returns the element range, trivia included.
    #[inline]
    pub fn text_range(self) -> TextRange {
        match self {
            Self::Node(node) => node.text_range(),
            Self::Token(token) => token.text_range(),
        }
    }

    /// Returns the element range without surrounding trivia.
    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        match self {
            Self::Node(node) => node.trimmed_range(),
            Self::Token(token) => token.trimmed_range(),
        }
    }

    /// Returns the element text without surrounding trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        match self {
            Self::Node(node) => node.text_trimmed(),
            Self::Token(token) => token.text_trimmed(),
        }
    }
}

/// Iterator over children including tokens.
#[derive(Clone)]
pub struct ChildrenWithTokens<'a> {
    tree: &'a TreeInner,
    children: std::slice::Iter<'a, Child>,
}

impl<'a> ChildrenWithTokens<'a> {
    #[inline]
    fn element(&self, child: Child) -> SyntaxElement<'a> {
        match child {
            Child::Node(index) => NodeOrToken::Node(SyntaxNode { tree: self.tree, index }),
            Child::Token(index) => NodeOrToken::Token(SyntaxToken { tree: self.tree, index }),
        }
    }
}

impl<'a> Iterator for ChildrenWithTokens<'a> {
    type Item = SyntaxElement<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let child = *self.children.next()?;
        Some(self.element(child))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl DoubleEndedIterator for ChildrenWithTokens<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let child = *self.children.next_back()?;
        Some(self.element(child))
    }
}

impl ExactSizeIterator for ChildrenWithTokens<'_> {}

/// Iterator over child nodes only.
#[derive(Clone)]
pub struct Children<'a> {
    inner: ChildrenWithTokens<'a>,
}

impl<'a> Iterator for Children<'a> {
    type Item = SyntaxNode<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(NodeOrToken::into_node)
    }
}

/// Iterator over the non-trivia tokens of a subtree.
#[derive(Clone)]
pub struct DescendantTokens<'a> {
    tree: &'a TreeInner,
    next: u32,
    end: u32,
}

impl<'a> Iterator for DescendantTokens<'a> {
    type Item = SyntaxToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.end {
            let index = self.next;
            self.next += 1;
            if !self.tree.token(index).kind.is_trivia() {
                return Some(SyntaxToken { tree: self.tree, index });
            }
        }
        None
    }
}

impl DoubleEndedIterator for DescendantTokens<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.next < self.end {
            self.end -= 1;
            if !self.tree.token(self.end).kind.is_trivia() {
                return Some(SyntaxToken { tree: self.tree, index: self.end });
            }
        }
        None
    }
}

/// Preorder traversal over nodes.
#[derive(Clone)]
pub struct Preorder<'a> {
    inner: PreorderWithTokens<'a>,
}

impl<'a> Preorder<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> Self {
        Self { inner: PreorderWithTokens::new(start) }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = WalkEvent<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|item| match item {
            WalkEventWithTokens::EnterNode(it) => Some(WalkEvent::Enter(it)),
            WalkEventWithTokens::LeaveNode(it) => Some(WalkEvent::Leave(it)),
            WalkEventWithTokens::Token(_) => None,
        })
    }
}

/// Preorder walk event for nodes.
#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'a> {
    Enter(SyntaxNode<'a>),
    Leave(SyntaxNode<'a>),
}

/// Preorder traversal over nodes and tokens.
#[derive(Clone)]
pub struct PreorderWithTokens<'a> {
    stack: Vec<(SyntaxNode<'a>, ChildrenWithTokens<'a>)>,
    root: Option<SyntaxNode<'a>>,
}

impl<'a> PreorderWithTokens<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> Self {
        Self { stack: Vec::with_capacity(32), root: Some(start) }
    }
}

impl<'a> Iterator for PreorderWithTokens<'a> {
    type Item = WalkEventWithTokens<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root, root.children_with_tokens()));
            return Some(WalkEventWithTokens::EnterNode(root));
        };
        match active_node.next() {
            Some(NodeOrToken::Node(child)) => {
                self.stack.push((child, child.children_with_tokens()));
                Some(WalkEventWithTokens::EnterNode(child))
            }
            Some(NodeOrToken::Token(child)) => Some(WalkEventWithTokens::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop().expect("should have an exited-from node");
                Some(WalkEventWithTokens::LeaveNode(exited_node))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Copy, Debug)]
pub enum WalkEventWithTokens<'a> {
    EnterNode(SyntaxNode<'a>),
    LeaveNode(SyntaxNode<'a>),
    Token(SyntaxToken<'a>),
}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            Self::Node(_) => None,
            Self::Token(token) => Some(token),
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for NodeOrToken<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => fmt::Display::fmt(node, f),
            Self::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(_, right) => Some(right),
        }
    }
}
