use ngx_errors::ErrorKind;
use ngx_syntax::SyntaxKind::*;
use ngx_syntax::{FieldName, SyntaxSet};
use ngx_tokenizer::LexMode;
use ngx_tokenizer::classify::classify;

use super::{body, directives, error_until_block, missing_semicolon, recover};
use crate::parser::{Marker, Parser};

const KEYWORDS: SyntaxSet = SyntaxSet::new([WORD, STRING]);

const ATTRIBUTE_VALUES: SyntaxSet = SyntaxSet::new([
    STRING,
    AUTO,
    LEVEL,
    BOOLEAN,
    CONNECTION_METHOD,
    SIZE,
    TIME,
    NUMERIC_LITERAL,
    RANDOM_VALUE,
]);

const MAP_VARIABLES: SyntaxSet = SyntaxSet::new([WORD, VARIABLE]);

pub(crate) fn source_file(p: &mut Parser<'_>) {
    let m = p.start();

    while !p.at(EOF) {
        statement(p);
    }

    p.bump(EOF, None);
    m.complete(p, SOURCE_FILE);
}

fn statement(p: &mut Parser<'_>) {
    match p.peek_kind() {
        L_BRACE => block(p, None),
        R_BRACE => p.error_and_bump(ErrorKind::UnexpectedToken, "unexpected `}`"),
        SEMICOLON => p.error_and_bump(ErrorKind::UnexpectedToken, "unexpected `;`"),
        QUOTED_STRING => attribute(p),
        _ => {
            let keyword = p.text_in(LexMode::Statement);
            tracing::trace!(keyword, "statement");

            match keyword {
                "if" => if_statement(p),
                "map" => map(p),
                "location" => location(p),
                _ => match directives::shape(keyword) {
                    Some(shape) => directives::directive(p, shape),
                    None => attribute(p),
                },
            }
        }
    }
}

pub(crate) fn block(p: &mut Parser<'_>, field: Option<FieldName>) {
    let m = p.start();
    let open = p.current_range();

    if !p.enter_block() {
        flat_block(p, m, field);
        return;
    }

    p.bump(L_BRACE, None);
    while !matches!(p.peek_kind(), R_BRACE | EOF) {
        statement(p);
    }
    p.exit_block();

    if !p.eat(R_BRACE) {
        p.error_at(ErrorKind::UnterminatedConstruct, "unclosed block, expected `}`", open);
        let e = p.start();
        e.complete(p, ERROR);
    }

    m.complete_field(p, BLOCK, field);
}

/// Consumes a block nested past the depth limit as one `ERROR` without
/// descending into it.
fn flat_block(p: &mut Parser<'_>, m: Marker, field: Option<FieldName>) {
    tracing::debug!(depth = p.depth(), line = p.line(), "nesting limit reached");
    p.error(ErrorKind::NestingTooDeep, "blocks are nested too deeply");

    let base = p.scanner_depth();
    p.bump_any();
    while !p.at(EOF) {
        let closes = p.at(R_BRACE);
        p.bump_any();
        if closes && p.scanner_depth() == base {
            break;
        }
    }

    m.complete_field(p, ERROR, field);
}

fn attribute(p: &mut Parser<'_>) {
    let m = p.start();

    let keyword = match p.peek_kind() {
        QUOTED_STRING => Some(QUOTED_STRING),
        _ => classify(p.text_in(LexMode::Statement), KEYWORDS),
    };
    let Some(keyword) = keyword else {
        let text = p.text_in(LexMode::Statement);
        p.error(ErrorKind::UnknownDirective, format!("unknown directive `{text}`"));
        recover(p);
        m.complete(p, ERROR);
        return;
    };
    p.bump(keyword, Some(FieldName::Keyword));

    loop {
        match p.peek_kind() {
            SEMICOLON => {
                p.bump(SEMICOLON, None);
                break;
            }
            L_BRACE => {
                block(p, Some(FieldName::Body));
                break;
            }
            R_BRACE | EOF => {
                missing_semicolon(p);
                break;
            }
            QUOTED_STRING => p.bump(QUOTED_STRING, Some(FieldName::Value)),
            _ => {
                let kind = classify(p.text_in(LexMode::Statement), ATTRIBUTE_VALUES)
                    .unwrap_or(RANDOM_VALUE);
                p.bump(kind, Some(FieldName::Value));
            }
        }
    }

    m.complete(p, ATTRIBUTE);
}

fn if_statement(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(KEYWORD, Some(FieldName::Keyword));

    if p.peek_in(LexMode::Condition) == CONDITION {
        p.bump(CONDITION, Some(FieldName::Condition));
    } else {
        error_until_block(p, "expected a parenthesized condition");
    }

    body(p);
    m.complete(p, IF);
}

fn map(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(KEYWORD, Some(FieldName::Keyword));

    let mut seen = false;
    while matches!(p.peek_kind(), ATOM | QUOTED_STRING) {
        seen = true;
        let text = p.text_in(LexMode::Statement);
        let kind = if p.at(ATOM) { classify(text, MAP_VARIABLES) } else { None };
        match kind {
            Some(kind) => p.bump(kind, Some(FieldName::Variable)),
            None => p.error_and_bump(
                ErrorKind::UnexpectedToken,
                format!("expected a variable, found `{text}`"),
            ),
        }
    }
    if !seen {
        p.missing(ErrorKind::UnexpectedToken, "expected a variable");
    }

    body(p);
    m.complete(p, MAP);
}

fn location(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump(KEYWORD, Some(FieldName::Keyword));

    if p.peek_in(LexMode::Modifier) == LOCATION_MODIFIER {
        p.bump(LOCATION_MODIFIER, Some(FieldName::Modifier));
    }

    if p.peek_in(LexMode::Route) == LOCATION_ROUTE {
        p.bump(LOCATION_ROUTE, Some(FieldName::Route));
    } else {
        p.missing(ErrorKind::UnexpectedToken, "expected a location route");
    }

    body(p);
    m.complete(p, LOCATION);
}
