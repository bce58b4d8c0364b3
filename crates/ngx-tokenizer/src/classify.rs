//! Literal classification of bare runs.
//!
//! nginx overloads bare words across many argument types, so a run is typed
//! by the production that consumes it: the grammar passes the set of kinds it
//! accepts and the first kind in [`PRECEDENCE`] that matches the *whole* run
//! wins. `10s` is therefore a `TIME`, never a number followed by a word.

use ngx_syntax::SyntaxKind::{self, *};
use ngx_syntax::SyntaxSet;

/// Classification order, most specific first.
pub const PRECEDENCE: [SyntaxKind; 16] = [
    AUTO,
    BOOLEAN,
    LEVEL,
    CONNECTION_METHOD,
    DEBUG_POINT,
    CPUMASK,
    SIZE,
    TIME,
    NUMERIC_LITERAL,
    ENV_NAME,
    WORD,
    VARIABLE,
    FILE,
    MASK,
    STRING,
    RANDOM_VALUE,
];

/// How an ambiguity between two token classes is settled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// Both may be accepted at one position; the earlier kind wins.
    Precedence,
    /// The consuming production decides which kinds it accepts; when both are
    /// accepted, the earlier kind is tried first and the later one only
    /// matches input the earlier rejects.
    Positional,
}

/// A pair of token classes that can match the same run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Conflict {
    pub preferred: SyntaxKind,
    pub fallback: SyntaxKind,
    pub resolution: Resolution,
    pub note: &'static str,
}

/// Known ambiguities and their resolution. [`PRECEDENCE`] honours every entry.
pub const CONFLICTS: [Conflict; 4] = [
    Conflict {
        preferred: FILE,
        fallback: MASK,
        resolution: Resolution::Positional,
        note: "a mask needs a `*`; only `include` accepts both",
    },
    Conflict {
        preferred: STRING,
        fallback: RANDOM_VALUE,
        resolution: Resolution::Precedence,
        note: "random values only catch runs no stricter kind accepts",
    },
    Conflict {
        preferred: SIZE,
        fallback: TIME,
        resolution: Resolution::Precedence,
        note: "`10m` is a size in untyped attributes",
    },
    Conflict {
        preferred: WORD,
        fallback: VARIABLE,
        resolution: Resolution::Precedence,
        note: "a plain name in a map header is a word",
    },
];

/// Returns the first kind in `accepted`, by precedence, that matches all of `text`.
pub fn classify(text: &str, accepted: SyntaxSet) -> Option<SyntaxKind> {
    PRECEDENCE.into_iter().filter(|&kind| accepted.contains(kind)).find(|&kind| matches(kind, text))
}

/// Returns `true` if `text` as a whole is a lexeme of `kind`.
pub fn matches(kind: SyntaxKind, text: &str) -> bool {
    match kind {
        AUTO => text == "auto",
        BOOLEAN => matches!(text, "on" | "off"),
        LEVEL => matches!(
            text,
            "debug" | "info" | "notice" | "warn" | "error" | "crit" | "alert" | "emerg"
        ),
        CONNECTION_METHOD => {
            matches!(text, "select" | "poll" | "kqueue" | "epoll" | "/dev/poll" | "eventport")
        }
        DEBUG_POINT => matches!(text, "abort" | "stop"),
        CPUMASK => !text.is_empty() && text.bytes().all(|b| b == b'0' || b == b'1'),
        SIZE => with_unit(text, &["k", "K", "m", "M", "g", "G"]),
        TIME => with_unit(text, &["ms", "s", "m", "h", "d", "w", "M", "y"]),
        NUMERIC_LITERAL => is_numeric(text),
        ENV_NAME => {
            let mut bytes = text.bytes();
            matches!(bytes.next(), Some(b'A'..=b'Z' | b'_'))
                && bytes.all(|b| matches!(b, b'A'..=b'Z' | b'0'..=b'9' | b'_'))
        }
        WORD => {
            let mut bytes = text.bytes();
            matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic())
                && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        }
        VARIABLE => {
            let mut bytes = text.bytes();
            matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic() || b == b'$')
                && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        }
        FILE => !text.is_empty() && text.bytes().all(is_path_byte),
        MASK => text.contains('*') && text.bytes().all(|b| b == b'*' || is_path_byte(b)),
        STRING => !text.is_empty() && !text.contains(['"', '\'']),
        RANDOM_VALUE => !text.is_empty(),
        _ => false,
    }
}

fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'/' | b'.' | b'-' | b'_')
}

fn leading_digits(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

fn with_unit(text: &str, units: &[&str]) -> bool {
    let digits = leading_digits(text);
    digits > 0 && units.contains(&&text[digits..])
}

/// Decimal literal with optional sign, fraction and exponent.
fn is_numeric(text: &str) -> bool {
    let text = text.strip_prefix('-').unwrap_or(text);

    let int = leading_digits(text);
    if int == 0 {
        return false;
    }
    let mut rest = &text[int..];

    if let Some(fraction) = rest.strip_prefix('.') {
        let digits = leading_digits(fraction);
        if digits == 0 {
            return false;
        }
        rest = &fraction[digits..];
    }

    if let Some(exponent) = rest.strip_prefix(['e', 'E']) {
        let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        let digits = leading_digits(exponent);
        return digits > 0 && digits == exponent.len();
    }

    rest.is_empty()
}
