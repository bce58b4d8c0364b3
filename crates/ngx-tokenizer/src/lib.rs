//! Parser-driven scanner for nginx configuration text.
//!
//! The grammar asks for the next token in a [`LexMode`]; the tokenizer caches
//! the token for the last requested mode until it is bumped. Whitespace,
//! newlines and `#` comments become trivia: everything up to the end of the
//! line trails the previous token, the newline and what follows lead the next.

pub mod classify;
mod cursor;

use cursor::Cursor;
pub use ngx_syntax::SyntaxKind;
use ngx_syntax::SyntaxKind::*;
use ngx_syntax::{TriviaPiece, TriviaPieceKind};
use text_size::{TextRange, TextSize};

/// How the next token should be scanned.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LexMode {
    /// Braces, `;`, quoted strings and bare runs.
    #[default]
    Statement,
    /// A parenthesised `if` condition.
    Condition,
    /// A location route, up to the block.
    Route,
    /// An optional location modifier, otherwise a route.
    Modifier,
    /// An opaque value up to `;`.
    Raw,
    /// Like `Statement`, but runs also stop at `=`.
    KeyValue,
}

/// Malformed input the scanner recovered from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LexError {
    UnterminatedQuote,
    UnterminatedCondition,
}

impl LexError {
    pub fn message(self) -> &'static str {
        match self {
            Self::UnterminatedQuote => "unterminated quoted string",
            Self::UnterminatedCondition => "unterminated condition, expected `)`",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub leading: Vec<TriviaPiece>,
    pub kind: SyntaxKind,
    pub kind_range: TextRange,
    pub trailing: Vec<TriviaPiece>,
    /// A newline precedes the token, or it is the first token of the input.
    pub newline_before: bool,
    pub error: Option<LexError>,
}

impl Token {
    fn eof() -> Self {
        Self {
            leading: Vec::new(),
            kind: EOF,
            kind_range: TextRange::empty(TextSize::new(0)),
            trailing: Vec::new(),
            newline_before: true,
            error: None,
        }
    }

    /// End of the token including its trailing trivia.
    pub fn end(&self) -> TextSize {
        self.kind_range.end() + self.trailing.iter().map(|piece| piece.len).sum::<TextSize>()
    }

    /// Start of the token including its leading trivia.
    pub fn start(&self) -> TextSize {
        self.kind_range.start() - self.leading.iter().map(|piece| piece.len).sum::<TextSize>()
    }
}

pub struct Tokenizer<'t> {
    text: &'t str,
    offset: TextSize,
    line: u32,
    depth: u32,
    current: Token,
    current_mode: Option<LexMode>,
}

impl<'t> Tokenizer<'t> {
    /// # Panics
    ///
    /// If `text` does not fit in a [`TextSize`].
    pub fn new(text: &'t str) -> Self {
        assert!(TextSize::try_from(text.len()).is_ok(), "input too large");
        Self {
            text,
            offset: TextSize::new(0),
            line: 1,
            depth: 0,
            current: Token::eof(),
            current_mode: None,
        }
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Peeks at the next token in the default mode.
    pub fn peek(&mut self) -> &Token {
        self.peek_in(LexMode::Statement)
    }

    /// Peeks at the next token scanned in `mode`.
    pub fn peek_in(&mut self, mode: LexMode) -> &Token {
        if self.current_mode != Some(mode) {
            self.current = self.lex(mode);
            self.current_mode = Some(mode);
        }
        &self.current
    }

    /// The token peeked last, in whatever mode it was scanned.
    pub fn current(&mut self) -> &Token {
        if self.current_mode.is_none() {
            self.peek();
        }
        &self.current
    }

    /// Consumes the most recently peeked token.
    pub fn next_token(&mut self) -> Token {
        if self.current_mode.is_none() {
            self.peek();
        }
        self.current_mode = None;
        let token = std::mem::replace(&mut self.current, Token::eof());

        let end = token.end();
        let consumed = &self.text[TextRange::new(self.offset, end)];
        self.line += consumed.bytes().filter(|&b| b == b'\n').count() as u32;
        self.offset = end;

        match token.kind {
            L_BRACE => self.depth += 1,
            R_BRACE => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }

        token
    }

    /// The 1-based line the scanner is on.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Number of currently open braces.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_eof(&self) -> bool {
        usize::from(self.offset) == self.text.len()
    }

    fn lex(&self, mode: LexMode) -> Token {
        let mut cursor = Cursor::new(self.text, self.offset);

        let mut leading = Vec::new();
        trivia(&mut cursor, &mut leading, false);
        let newline_before = self.offset == TextSize::new(0)
            || leading.iter().any(|piece| piece.kind == TriviaPieceKind::Newline);

        let start = cursor.offset();
        let (kind, error) = scan(&mut cursor, mode);
        let kind_range = TextRange::new(start, cursor.offset());
        cursor.reset_pos_within_token();

        let mut trailing = Vec::new();
        trivia(&mut cursor, &mut trailing, true);

        Token { leading, kind, kind_range, trailing, newline_before, error }
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0b' | '\x0c')
}

fn is_delimiter(c: char) -> bool {
    is_space(c) || matches!(c, '\n' | '\r' | ';' | '{' | '}')
}

fn trivia(cursor: &mut Cursor<'_>, pieces: &mut Vec<TriviaPiece>, stop_at_newline: bool) {
    cursor.reset_pos_within_token();
    while !cursor.is_eof() {
        let kind = match cursor.peek() {
            '\n' | '\r' if stop_at_newline => break,
            '\n' => {
                cursor.advance();
                TriviaPieceKind::Newline
            }
            '\r' => {
                cursor.advance();
                if cursor.peek() == '\n' {
                    cursor.advance();
                }
                TriviaPieceKind::Newline
            }
            '#' => {
                cursor.advance_while(|c| c != '\n' && c != '\r');
                TriviaPieceKind::Comment
            }
            c if is_space(c) => {
                cursor.advance_while(is_space);
                TriviaPieceKind::Whitespace
            }
            _ => break,
        };

        pieces.push(TriviaPiece::new(kind, cursor.pos_within_token()));
        cursor.reset_pos_within_token();
    }
}

fn scan(cursor: &mut Cursor<'_>, mode: LexMode) -> (SyntaxKind, Option<LexError>) {
    if cursor.is_eof() {
        return (EOF, None);
    }

    let first = cursor.peek();
    match mode {
        LexMode::Condition if first == '(' => return condition(cursor),
        LexMode::Modifier => {
            if let Some(len) = modifier_len(cursor.rest()) {
                for _ in 0..len {
                    cursor.advance();
                }
                return (LOCATION_MODIFIER, None);
            }
            if !matches!(first, '{' | '}' | ';') {
                return until_block(cursor, LOCATION_ROUTE);
            }
        }
        LexMode::Route if !matches!(first, '{' | '}' | ';') => {
            return until_block(cursor, LOCATION_ROUTE);
        }
        LexMode::Raw if !matches!(first, '{' | '}' | ';') => return until_block(cursor, RAW_VALUE),
        _ => {}
    }

    statement(cursor, mode == LexMode::KeyValue)
}

fn statement(cursor: &mut Cursor<'_>, stop_at_eq: bool) -> (SyntaxKind, Option<LexError>) {
    match cursor.peek() {
        '{' => {
            cursor.advance();
            (L_BRACE, None)
        }
        '}' => {
            cursor.advance();
            (R_BRACE, None)
        }
        ';' => {
            cursor.advance();
            (SEMICOLON, None)
        }
        '=' if stop_at_eq => {
            cursor.advance();
            (EQ, None)
        }
        quote @ ('"' | '\'') => {
            if !quoted(cursor, quote) {
                return (QUOTED_STRING, Some(LexError::UnterminatedQuote));
            }
            if cursor.is_eof() || is_delimiter(cursor.peek()) || (stop_at_eq && cursor.peek() == '=') {
                (QUOTED_STRING, None)
            } else {
                run(cursor, stop_at_eq);
                (ATOM, None)
            }
        }
        _ => {
            run(cursor, stop_at_eq);
            (ATOM, None)
        }
    }
}

/// Consumes a quoted string; returns `false` if input ends before the closing quote.
fn quoted(cursor: &mut Cursor<'_>, quote: char) -> bool {
    cursor.advance();
    while !cursor.is_eof() {
        match cursor.advance() {
            '\\' => {
                cursor.advance();
            }
            c if c == quote => return true,
            _ => {}
        }
    }
    false
}

fn run(cursor: &mut Cursor<'_>, stop_at_eq: bool) {
    while !cursor.is_eof() {
        match cursor.peek() {
            c if is_delimiter(c) => break,
            '=' if stop_at_eq => break,
            '\\' => {
                cursor.advance();
                cursor.advance();
            }
            '$' if cursor.second() == '{' => {
                cursor.advance();
                cursor.advance();
                cursor.advance_while(|c| !is_delimiter(c));
                if cursor.peek() == '}' {
                    cursor.advance();
                }
            }
            _ => {
                cursor.advance();
            }
        }
    }
}

/// Scans `(` up to the first unescaped `)`. Without one, the condition ends
/// before the first `{` or `;` once the line or the input runs out.
fn condition(cursor: &mut Cursor<'_>) -> (SyntaxKind, Option<LexError>) {
    cursor.advance();
    let mut cut = None;
    while !cursor.is_eof() {
        match cursor.peek() {
            ')' => {
                cursor.advance();
                return (CONDITION, None);
            }
            '\n' | '\r' if cut.is_some() => break,
            '{' | ';' if cut.is_none() => {
                cut = Some(usize::from(cursor.offset()));
                cursor.advance();
            }
            '\\' => {
                cursor.advance();
                cursor.advance();
            }
            quote @ ('"' | '\'') => {
                if !quoted(cursor, quote) {
                    break;
                }
            }
            _ => {
                cursor.advance();
            }
        }
    }

    if let Some(cut) = cut {
        cursor.rewind_to(cut);
    }
    trim_end(cursor);
    (CONDITION, Some(LexError::UnterminatedCondition))
}

fn modifier_len(rest: &str) -> Option<usize> {
    ["^~", "~*", "~", "="].into_iter().find(|m| rest.starts_with(m)).map(str::len)
}

/// Scans up to an unescaped `{`, `}`, `;` or a comment, trimming trailing spaces.
fn until_block(cursor: &mut Cursor<'_>, kind: SyntaxKind) -> (SyntaxKind, Option<LexError>) {
    let mut after_space = false;
    let mut error = None;
    while !cursor.is_eof() {
        let c = cursor.peek();
        match c {
            '{' | '}' | ';' => break,
            '#' if after_space => break,
            '\\' => {
                cursor.advance();
                cursor.advance();
            }
            '"' | '\'' => {
                if !quoted(cursor, c) {
                    error = Some(LexError::UnterminatedQuote);
                }
            }
            _ => {
                cursor.advance();
            }
        }
        after_space = is_space(c) || matches!(c, '\n' | '\r');
    }

    trim_end(cursor);
    (kind, error)
}

fn trim_end(cursor: &mut Cursor<'_>) {
    let text = cursor.token_text();
    let trimmed = text.trim_end_matches(|c| is_space(c) || matches!(c, '\n' | '\r'));
    cursor.rewind_to(cursor.token_start() + trimmed.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_text<'a>(token: &Token, text: &'a str) -> &'a str {
        &text[token.kind_range]
    }

    fn tokens(text: &str, mode: LexMode) -> Vec<(SyntaxKind, &str)> {
        let mut tokenizer = Tokenizer::new(text);
        let mut out = Vec::new();
        loop {
            let kind = tokenizer.peek_in(mode).kind;
            let token = tokenizer.next_token();
            out.push((kind, token_text(&token, text)));
            if kind == EOF {
                return out;
            }
        }
    }

    #[test]
    fn statement_tokens() {
        assert_eq!(
            tokens("worker_processes auto;", LexMode::Statement),
            [(ATOM, "worker_processes"), (ATOM, "auto"), (SEMICOLON, ";"), (EOF, "")]
        );
        assert_eq!(
            tokens("events{worker_connections 1024;}", LexMode::Statement),
            [
                (ATOM, "events"),
                (L_BRACE, "{"),
                (ATOM, "worker_connections"),
                (ATOM, "1024"),
                (SEMICOLON, ";"),
                (R_BRACE, "}"),
                (EOF, "")
            ]
        );
    }

    #[test]
    fn quoted_strings() {
        let text = r#"log_format main '$remote_addr "x"' "a\"b";"#;
        assert_eq!(
            tokens(text, LexMode::Statement),
            [
                (ATOM, "log_format"),
                (ATOM, "main"),
                (QUOTED_STRING, r#"'$remote_addr "x"'"#),
                (QUOTED_STRING, r#""a\"b""#),
                (SEMICOLON, ";"),
                (EOF, "")
            ]
        );
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let text = "return 200 'oops;\n}";
        let mut tokenizer = Tokenizer::new(text);
        tokenizer.next_token();
        tokenizer.next_token();
        let token = tokenizer.next_token();
        assert_eq!(token.kind, QUOTED_STRING);
        assert_eq!(token.error, Some(LexError::UnterminatedQuote));
        assert_eq!(token_text(&token, text), "'oops;\n}");
        assert_eq!(tokenizer.next_token().kind, EOF);
    }

    #[test]
    fn escapes_and_braced_variables() {
        assert_eq!(
            tokens(r"a\;b ${host}x \{", LexMode::Statement),
            [(ATOM, r"a\;b"), (ATOM, "${host}x"), (ATOM, r"\{"), (EOF, "")]
        );
    }

    #[test]
    fn trivia_split_at_newline() {
        let text = "a; # note\n  # own line\nb;";
        let mut tokenizer = Tokenizer::new(text);

        let a = tokenizer.next_token();
        assert!(a.newline_before);
        let semi = tokenizer.next_token();
        assert_eq!(semi.kind, SEMICOLON);
        assert_eq!(
            semi.trailing.iter().map(|p| p.kind).collect::<Vec<_>>(),
            [TriviaPieceKind::Whitespace, TriviaPieceKind::Comment]
        );

        let b = tokenizer.next_token();
        assert_eq!(token_text(&b, text), "b");
        assert!(b.newline_before);
        assert_eq!(
            b.leading.iter().map(|p| p.kind).collect::<Vec<_>>(),
            [
                TriviaPieceKind::Newline,
                TriviaPieceKind::Whitespace,
                TriviaPieceKind::Comment,
                TriviaPieceKind::Newline
            ]
        );
        assert_eq!(b.start(), semi.end());
        assert_eq!(tokenizer.line(), 3);
    }

    #[test]
    fn hash_inside_a_run_is_not_a_comment() {
        assert_eq!(tokens("a#b #c", LexMode::Statement), [(ATOM, "a#b"), (EOF, "")]);
    }

    #[test]
    fn crlf_is_one_newline() {
        let mut tokenizer = Tokenizer::new("a\r\nb");
        tokenizer.next_token();
        let b = tokenizer.next_token();
        assert_eq!(b.leading, [TriviaPiece::new(TriviaPieceKind::Newline, 2.into())]);
        assert!(b.newline_before);
    }

    #[test]
    fn condition_capture() {
        let text = r#"($request_method = POST) {"#;
        assert_eq!(tokens(text, LexMode::Condition)[0], (CONDITION, "($request_method = POST)"));

        let text = r#"($uri ~ "\)x)" ) {"#;
        assert_eq!(tokens(text, LexMode::Condition)[0], (CONDITION, r#"($uri ~ "\)x)" )"#));

        let text = r"($a ~ \)) {";
        assert_eq!(tokens(text, LexMode::Condition)[0], (CONDITION, r"($a ~ \))"));
    }

    #[test]
    fn condition_may_contain_braces_and_semicolons() {
        let text = "($uri ~ ^/a{2}) {";
        assert_eq!(tokens(text, LexMode::Condition)[0], (CONDITION, "($uri ~ ^/a{2})"));

        let text = "($args ~ a;b) {";
        assert_eq!(tokens(text, LexMode::Condition)[0], (CONDITION, "($args ~ a;b)"));
    }

    #[test]
    fn unclosed_condition_ends_at_the_line() {
        let text = "($a = b { x;\n  y); }";
        let mut tokenizer = Tokenizer::new(text);
        let token = tokenizer.peek_in(LexMode::Condition).clone();
        assert_eq!(token.error, Some(LexError::UnterminatedCondition));
        assert_eq!(token_text(&token, text), "($a = b");
    }

    #[test]
    fn unterminated_condition_stops_before_block() {
        let text = "($a = b  {";
        let mut tokenizer = Tokenizer::new(text);
        let token = tokenizer.peek_in(LexMode::Condition).clone();
        assert_eq!(token.kind, CONDITION);
        assert_eq!(token.error, Some(LexError::UnterminatedCondition));
        assert_eq!(token_text(&token, text), "($a = b");
        tokenizer.next_token();
        assert_eq!(tokenizer.peek().kind, L_BRACE);
    }

    #[test]
    fn condition_mode_falls_back() {
        assert_eq!(tokens("$a {", LexMode::Condition)[0], (ATOM, "$a"));
    }

    #[test]
    fn modifiers_and_routes() {
        let cases = [
            ("~* \\.php$ {", "~*", "\\.php$"),
            ("= /exact {", "=", "/exact"),
            ("^~ /images/ {", "^~", "/images/"),
            ("~/glued {", "~", "/glued"),
        ];

        for (text, modifier, route) in cases {
            let mut tokenizer = Tokenizer::new(text);
            let token = tokenizer.peek_in(LexMode::Modifier).clone();
            assert_eq!((token.kind, token_text(&token, text)), (LOCATION_MODIFIER, modifier));
            tokenizer.next_token();

            let token = tokenizer.peek_in(LexMode::Route).clone();
            assert_eq!((token.kind, token_text(&token, text)), (LOCATION_ROUTE, route), "Input: '{text}'");
            tokenizer.next_token();
            assert_eq!(tokenizer.peek().kind, L_BRACE);
        }
    }

    #[test]
    fn route_without_modifier() {
        let text = "/static/ files  # trailing\n{";
        let mut tokenizer = Tokenizer::new(text);
        let token = tokenizer.peek_in(LexMode::Modifier).clone();
        assert_eq!(token.kind, LOCATION_ROUTE);
        assert_eq!(token_text(&token, text), "/static/ files");
        assert_eq!(token.trailing.len(), 2);
    }

    #[test]
    fn route_stops_at_statement_ends() {
        assert_eq!(tokens("/a;b", LexMode::Route)[..2], [(LOCATION_ROUTE, "/a"), (SEMICOLON, ";")]);
        assert_eq!(tokens("/a }", LexMode::Route)[..2], [(LOCATION_ROUTE, "/a"), (R_BRACE, "}")]);
        assert_eq!(tokens(r"/a\;b {", LexMode::Route)[0], (LOCATION_ROUTE, r"/a\;b"));
    }

    #[test]
    fn raw_and_key_value() {
        assert_eq!(
            tokens("127.0.0.1 ::1;", LexMode::Raw),
            [(RAW_VALUE, "127.0.0.1 ::1"), (SEMICOLON, ";"), (EOF, "")]
        );
        assert_eq!(
            tokens("TZ=Europe/Kyiv;", LexMode::KeyValue),
            [(ATOM, "TZ"), (EQ, "="), (ATOM, "Europe/Kyiv"), (SEMICOLON, ";"), (EOF, "")]
        );
    }

    #[test]
    fn mode_switch_relexes_the_same_position() {
        let text = "threads=32 ";
        let mut tokenizer = Tokenizer::new(text);
        assert_eq!(token_text(&tokenizer.peek().clone(), text), "threads=32");
        assert_eq!(token_text(&tokenizer.peek_in(LexMode::KeyValue).clone(), text), "threads");
        assert_eq!(tokenizer.next_token().kind, ATOM);
        assert_eq!(tokenizer.peek_in(LexMode::KeyValue).kind, EQ);
    }

    #[test]
    fn depth_tracking() {
        let mut tokenizer = Tokenizer::new("a { b { } } }");
        let mut depths = Vec::new();
        while tokenizer.peek().kind != EOF {
            tokenizer.next_token();
            depths.push(tokenizer.depth());
        }
        assert_eq!(depths, [0, 1, 1, 2, 1, 0, 0]);
    }

    #[test]
    fn covers_the_whole_input() {
        let inputs = ["", "   ", "# only\n", "a 'b", "}}{{;;", "x\u{0}y \u{e9}t\u{e9};", "($x"];
        for text in inputs {
            let mut tokenizer = Tokenizer::new(text);
            let mut end = TextSize::new(0);
            loop {
                let token = tokenizer.next_token();
                assert_eq!(token.start(), end, "Input: '{text}'");
                end = token.end();
                if token.kind == EOF {
                    break;
                }
            }
            assert_eq!(usize::from(end), text.len(), "Input: '{text}'");
            assert!(tokenizer.is_eof());
        }
    }
}
