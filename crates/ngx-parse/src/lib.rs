//! Error-tolerant parser for nginx configuration files.
//!
//! [`parse`] never fails: malformed input is kept in `ERROR` nodes and
//! reported as [`Diagnostic`]s, and the tree always covers the whole text.

use ngx_errors::Diagnostic;
use ngx_syntax::{SyntaxNode, SyntaxTree};
use text_size::{TextRange, TextSize};

mod grammar;
mod parser;
#[cfg(test)]
mod tests;

/// Blocks nested deeper than this are not descended into.
pub const DEFAULT_MAX_DEPTH: u32 = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// A syntax tree together with the errors found while building it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parse {
    tree: SyntaxTree,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.tree.root()
    }

    pub fn text(&self) -> &str {
        self.tree.text()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn into_parts(self) -> (SyntaxTree, Vec<Diagnostic>) {
        (self.tree, self.diagnostics)
    }
}

/// Longest input a tree can address; offsets are [`TextSize`], a `u32`.
pub const MAX_INPUT_LEN: usize = u32::MAX as usize;

/// Parses `text` with the default options.
///
/// # Panics
///
/// If `text` is longer than [`MAX_INPUT_LEN`] bytes. Every shorter input,
/// valid or not, yields a tree.
pub fn parse(text: &str) -> Parse {
    parse_with(text, &ParseOptions::default())
}

/// Replaces each byte of an invalid UTF-8 sequence.
pub const SUBSTITUTE: char = '\u{1a}';

/// Parses bytes of unknown encoding.
///
/// Every byte of an invalid UTF-8 sequence becomes one [`SUBSTITUTE`], so the
/// tree text has the length of `bytes` and every range is a byte range of the
/// input.
///
/// # Panics
///
/// If `bytes` is longer than [`MAX_INPUT_LEN`].
pub fn parse_bytes(bytes: &[u8]) -> Parse {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        text.extend(chunk.invalid().iter().map(|_| SUBSTITUTE));
    }
    parse(&text)
}

/// Parses `text` with the given options.
///
/// # Panics
///
/// If `text` is longer than [`MAX_INPUT_LEN`] bytes.
pub fn parse_with(text: &str, options: &ParseOptions) -> Parse {
    assert!(text.len() <= MAX_INPUT_LEN, "input of {} bytes exceeds MAX_INPUT_LEN", text.len());
    let mut parser = parser::Parser::new(text, options);
    grammar::statements::source_file(&mut parser);
    let (tree, diagnostics) = parser.finish();
    tracing::debug!(len = text.len(), errors = diagnostics.len(), "parsed");
    Parse { tree, diagnostics }
}

/// Replacement of `range` in the previous text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, replacement: impl Into<String>) -> Self {
        Self { range, replacement: replacement.into() }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edit range {range:?} is outside of the text (length {len:?})")]
    OutOfBounds { range: TextRange, len: TextSize },
    #[error("edit range {range:?} does not fall on character boundaries")]
    NotCharBoundary { range: TextRange },
    #[error("edit ranges {first:?} and {second:?} overlap")]
    Overlapping { first: TextRange, second: TextRange },
}

/// Applies `edits` to `text`. Ranges refer to `text` before any edit.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let len = TextSize::of(text);
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.range.start(), edit.range.end()));

    for edit in &sorted {
        let range = edit.range;
        if range.end() > len {
            return Err(EditError::OutOfBounds { range, len });
        }
        if !text.is_char_boundary(range.start().into()) || !text.is_char_boundary(range.end().into())
        {
            return Err(EditError::NotCharBoundary { range });
        }
    }
    for pair in sorted.windows(2) {
        let (first, second) = (pair[0].range, pair[1].range);
        if first.end() > second.start() {
            return Err(EditError::Overlapping { first, second });
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for edit in sorted {
        out.push_str(&text[last..usize::from(edit.range.start())]);
        out.push_str(&edit.replacement);
        last = edit.range.end().into();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Reparses `previous` after `edits`.
///
/// The result is always identical to a full parse of the edited text; the
/// previous tree is left untouched.
pub fn parse_incremental(previous: &Parse, edits: &[TextEdit]) -> Result<Parse, EditError> {
    let text = apply_edits(previous.text(), edits)?;
    tracing::debug!(edits = edits.len(), len = text.len(), "reparsing after edits");
    Ok(parse(&text))
}
