use ngx_errors::ErrorKind;
use ngx_syntax::SyntaxKind::*;
use ngx_syntax::{FieldName, SyntaxSet};
use ngx_tokenizer::LexMode;
use ngx_tokenizer::classify::classify;

use crate::parser::Parser;

mod directives;
pub(crate) mod statements;

/// Consumes the next argument on the line if it classifies as one of
/// `accepted`; otherwise wraps it in `ERROR`, or marks it missing.
pub(crate) fn typed_value(
    p: &mut Parser<'_>,
    mode: LexMode,
    accepted: SyntaxSet,
    field: FieldName,
    expected: &str,
) -> bool {
    match p.argument(mode) {
        Some(QUOTED_STRING) if accepted.contains(QUOTED_STRING) => {
            p.bump(QUOTED_STRING, Some(field));
            true
        }
        Some(ATOM) => {
            let text = p.text_in(mode);
            match classify(text, accepted) {
                Some(kind) => {
                    p.bump(kind, Some(field));
                    true
                }
                None => {
                    p.error_and_bump(
                        ErrorKind::UnexpectedToken,
                        format!("expected {expected}, found `{text}`"),
                    );
                    false
                }
            }
        }
        Some(_) => {
            p.error_and_bump(ErrorKind::UnexpectedToken, format!("expected {expected}"));
            false
        }
        None => {
            p.missing(ErrorKind::UnexpectedToken, format!("expected {expected}"));
            false
        }
    }
}

/// Consumes a free-form value: a quoted string or any bare run.
pub(crate) fn free_value(p: &mut Parser<'_>) -> bool {
    match p.argument(LexMode::Statement) {
        Some(QUOTED_STRING) => p.bump(QUOTED_STRING, Some(FieldName::Value)),
        Some(_) => p.bump(RANDOM_VALUE, Some(FieldName::Value)),
        None => return false,
    }
    true
}

/// Ends a typed directive: extra arguments on the same line are wrapped in
/// one `ERROR`, then a `;` is required.
pub(crate) fn terminator(p: &mut Parser<'_>) {
    if p.argument(LexMode::Statement).is_some() {
        let m = p.start();
        p.error(ErrorKind::UnexpectedToken, "unexpected argument");
        while p.argument(LexMode::Statement).is_some() {
            p.bump_any();
        }
        m.complete(p, ERROR);
    }

    if !p.eat(SEMICOLON) {
        missing_semicolon(p);
    }
}

/// Reports a missing `;` unless the statement already ended in an error.
pub(crate) fn missing_semicolon(p: &mut Parser<'_>) {
    if p.error_ends_here() {
        return;
    }
    let kind =
        if p.at(EOF) { ErrorKind::UnterminatedConstruct } else { ErrorKind::UnexpectedToken };
    p.missing(kind, "expected `;`");
}

/// A required `{ ... }` body.
pub(crate) fn body(p: &mut Parser<'_>) {
    if p.at(L_BRACE) {
        statements::block(p, Some(FieldName::Body));
        return;
    }

    if !p.error_ends_here() {
        let kind =
            if p.at(EOF) { ErrorKind::UnterminatedConstruct } else { ErrorKind::UnexpectedToken };
        p.missing(kind, "expected `{`");
    }
    p.eat(SEMICOLON);
}

/// Wraps everything up to the next brace or `;` in one `ERROR`.
pub(crate) fn error_until_block(p: &mut Parser<'_>, message: &str) {
    let at_boundary = |p: &mut Parser<'_>| matches!(p.peek_kind(), L_BRACE | R_BRACE | SEMICOLON | EOF);

    if at_boundary(p) {
        p.missing(ErrorKind::UnexpectedToken, message);
        return;
    }

    let m = p.start();
    p.error(ErrorKind::UnexpectedToken, message);
    while !at_boundary(p) {
        p.bump_any();
    }
    m.complete(p, ERROR);
}

/// Skips to the end of the current statement: a `;` (consumed) or a `}`
/// (left for the enclosing block) at the starting depth. Nested blocks are
/// skipped whole.
pub(crate) fn recover(p: &mut Parser<'_>) {
    let base = p.scanner_depth();
    tracing::debug!(line = p.line(), depth = base, "recovering");

    loop {
        match p.peek_kind() {
            EOF => break,
            SEMICOLON if p.scanner_depth() == base => {
                p.bump_any();
                break;
            }
            R_BRACE if p.scanner_depth() == base => break,
            _ => {}
        }

        let closes = p.at(R_BRACE);
        p.bump_any();
        if closes && p.scanner_depth() == base {
            break;
        }
    }
}
