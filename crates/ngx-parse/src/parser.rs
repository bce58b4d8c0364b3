use drop_bomb::DropBomb;
use ngx_errors::{Diagnostic, ErrorKind};
use ngx_syntax::{Builder, FieldName, SyntaxKind, SyntaxTree};
use ngx_tokenizer::{LexMode, Token, Tokenizer};
use text_size::{TextRange, TextSize};

use crate::ParseOptions;

pub(crate) struct Parser<'t> {
    text: &'t str,
    tokenizer: Tokenizer<'t>,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
    max_depth: u32,
    depth: u32,
    last_end: TextSize,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str, options: &ParseOptions) -> Self {
        Self {
            text,
            tokenizer: Tokenizer::new(text),
            events: Vec::new(),
            diagnostics: Vec::new(),
            max_depth: options.max_depth,
            depth: 0,
            last_end: TextSize::new(0),
        }
    }

    pub(crate) fn peek_kind(&mut self) -> SyntaxKind {
        self.tokenizer.peek().kind
    }

    pub(crate) fn peek_in(&mut self, mode: LexMode) -> SyntaxKind {
        self.tokenizer.peek_in(mode).kind
    }

    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    /// Text of the next token scanned in `mode`.
    pub(crate) fn text_in(&mut self, mode: LexMode) -> &'t str {
        let text = self.text;
        &text[self.tokenizer.peek_in(mode).kind_range]
    }

    /// Returns the kind of the next token in `mode` if it is an argument on
    /// the current line.
    pub(crate) fn argument(&mut self, mode: LexMode) -> Option<SyntaxKind> {
        let token = self.tokenizer.peek_in(mode);
        let is_argument = matches!(
            token.kind,
            SyntaxKind::ATOM
                | SyntaxKind::QUOTED_STRING
                | SyntaxKind::RAW_VALUE
                | SyntaxKind::CONDITION
                | SyntaxKind::LOCATION_ROUTE
        );
        (is_argument && !token.newline_before).then_some(token.kind)
    }

    pub(crate) fn current_range(&mut self) -> TextRange {
        self.tokenizer.current().kind_range
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    pub(crate) fn line(&self) -> u32 {
        self.tokenizer.line()
    }

    /// Brace depth as seen by the scanner.
    pub(crate) fn scanner_depth(&self) -> u32 {
        self.tokenizer.depth()
    }

    /// Consumes the last peeked token as `kind`.
    pub(crate) fn bump(&mut self, kind: SyntaxKind, field: Option<FieldName>) {
        let token = self.tokenizer.next_token();
        self.push_token(token, kind, field);
    }

    /// Consumes the last peeked token keeping its scanned kind.
    pub(crate) fn bump_any(&mut self) {
        let token = self.tokenizer.next_token();
        let kind = token.kind;
        self.push_token(token, kind, None);
    }

    fn push_token(&mut self, token: Token, kind: SyntaxKind, field: Option<FieldName>) {
        self.last_end = token.kind_range.end();
        let lex_error = token.error.map(|error| (error, token.kind_range));
        self.events.push(Event::Token { token, kind, field });

        if let Some((error, range)) = lex_error {
            self.diagnostics.push(Diagnostic::new(
                ErrorKind::UnterminatedConstruct,
                error.message(),
                range,
            ));
            self.events.push(Event::Start { kind: SyntaxKind::ERROR, field: None });
            self.events.push(Event::Finish);
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump(kind, None);
            true
        } else {
            false
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    /// Reports an error at the last peeked token.
    pub(crate) fn error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let range = self.tokenizer.current().kind_range;
        self.diagnostics.push(Diagnostic::new(kind, message, range));
    }

    pub(crate) fn error_at(&mut self, kind: ErrorKind, message: impl Into<String>, range: TextRange) {
        self.diagnostics.push(Diagnostic::new(kind, message, range));
    }

    /// Whether the last reported error ends where the next token would go.
    pub(crate) fn error_ends_here(&self) -> bool {
        self.diagnostics.last().is_some_and(|d| d.range().end() == self.last_end)
    }

    /// Marks a missing required token with a zero-width `ERROR` node.
    pub(crate) fn missing(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let range = TextRange::empty(self.last_end);
        self.error_at(kind, message, range);
        let m = self.start();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Wraps the next token into an `ERROR` node.
    pub(crate) fn error_and_bump(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let m = self.start();
        self.error(kind, message);
        self.bump_any();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Enters a block; returns `false` if that would exceed the depth limit.
    pub(crate) fn enter_block(&mut self) -> bool {
        if self.depth >= self.max_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn exit_block(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn finish(self) -> (SyntaxTree, Vec<Diagnostic>) {
        let Parser { text, events, diagnostics, .. } = self;
        let mut builder = Builder::new(text);

        for event in events {
            match event {
                Event::Start { kind: SyntaxKind::TOMBSTONE, .. } => {}
                Event::Start { kind, field } => builder.start_node(kind, field),
                Event::Finish => builder.finish_node(),
                Event::Token { token, kind, field } => {
                    builder.token(
                        &token.leading,
                        kind,
                        token.kind_range.len(),
                        &token.trailing,
                        field,
                    );
                }
            }
        }

        (builder.finish(), diagnostics)
    }
}

enum Event {
    Start { kind: SyntaxKind, field: Option<FieldName> },
    Token { token: Token, kind: SyntaxKind, field: Option<FieldName> },
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Self::Start { kind: SyntaxKind::TOMBSTONE, field: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Self {
        Self { position: pos, bomb: DropBomb::new("Marker must be completed") }
    }

    pub(crate) fn complete(self, p: &mut Parser<'_>, kind: SyntaxKind) {
        self.complete_field(p, kind, None);
    }

    pub(crate) fn complete_field(
        mut self,
        p: &mut Parser<'_>,
        kind: SyntaxKind,
        field: Option<FieldName>,
    ) {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, field: field_slot } => {
                *slot = kind;
                *field_slot = field;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
    }
}
