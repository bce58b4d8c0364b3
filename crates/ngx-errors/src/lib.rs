use std::fmt::{self, Display};

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

/// What went wrong at a position the parser recovered from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Input didn't match any production at the current position.
    UnexpectedToken,
    /// A brace, quote or condition reached end of input before its terminator.
    UnterminatedConstruct,
    /// A bare keyword that fits neither a typed directive nor a generic attribute.
    UnknownDirective,
    /// Blocks nested deeper than the configured limit.
    NestingTooDeep,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnexpectedToken => "unexpected-token",
            Self::UnterminatedConstruct => "unterminated-construct",
            Self::UnknownDirective => "unknown-directive",
            Self::NestingTooDeep => "nesting-too-deep",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[salsa::accumulator]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    kind: ErrorKind,
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>, range: TextRange) -> Self {
        Self { kind, message: message.into(), range }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).id(self.kind.as_str()).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.range, self.message)
    }
}
