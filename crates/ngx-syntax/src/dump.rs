//! Indented, human-readable rendering of a tree.
//!
//! Nodes print with their full range (attached trivia included), tokens with
//! their trimmed range and text. Comments are shown where they are attached;
//! whitespace and newlines are omitted.

use std::fmt::Write;

use crate::{SyntaxNode, SyntaxToken, SyntaxTree, WalkEventWithTokens};

impl SyntaxTree {
    /// Renders the tree, one element per line.
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;

        for event in self.root().preorder_with_tokens() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    write_node(&mut out, depth, node);
                    depth += 1;
                }
                WalkEventWithTokens::LeaveNode(_) => depth -= 1,
                WalkEventWithTokens::Token(token) => {
                    for trivia in token.leading_trivia() {
                        write_comment(&mut out, depth, trivia);
                    }
                    write_token(&mut out, depth, token);
                    for trivia in token.trailing_trivia() {
                        write_comment(&mut out, depth, trivia);
                    }
                }
            }
        }

        out
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_node(out: &mut String, depth: usize, node: SyntaxNode<'_>) {
    indent(out, depth);
    if let Some(field) = node.field_name() {
        let _ = write!(out, "{field}: ");
    }
    let _ = writeln!(out, "{:?}@{:?}", node.kind(), node.text_range());
}

fn write_token(out: &mut String, depth: usize, token: SyntaxToken<'_>) {
    indent(out, depth);
    if let Some(field) = token.field() {
        let _ = write!(out, "{field}: ");
    }
    let _ = writeln!(out, "{:?}@{:?} {:?}", token.kind(), token.trimmed_range(), token.text_trimmed());
}

fn write_comment(out: &mut String, depth: usize, trivia: SyntaxToken<'_>) {
    if trivia.kind() == crate::SyntaxKind::COMMENT {
        write_token(out, depth, trivia);
    }
}
