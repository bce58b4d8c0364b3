//! Core directives with typed arguments.

use ngx_errors::ErrorKind;
use ngx_syntax::SyntaxKind::*;
use ngx_syntax::{FieldName, SyntaxSet};
use ngx_tokenizer::LexMode;
use ngx_tokenizer::classify;

use super::{body, free_value, terminator, typed_value};
use crate::parser::Parser;

const BOOLEANS: SyntaxSet = SyntaxSet::new([BOOLEAN]);
const TIMES: SyntaxSet = SyntaxSet::new([TIME]);
const NUMBERS: SyntaxSet = SyntaxSet::new([NUMERIC_LITERAL]);
const FILES: SyntaxSet = SyntaxSet::new([FILE, QUOTED_STRING]);
const FILES_OR_MASKS: SyntaxSet = SyntaxSet::new([FILE, MASK, QUOTED_STRING]);
const PROCESSES: SyntaxSet = SyntaxSet::new([NUMERIC_LITERAL, AUTO]);
const DEBUG_POINTS: SyntaxSet = SyntaxSet::new([DEBUG_POINT]);
const METHODS: SyntaxSet = SyntaxSet::new([CONNECTION_METHOD]);
const SIZES: SyntaxSet = SyntaxSet::new([SIZE]);
const AFFINITY: SyntaxSet = SyntaxSet::new([AUTO, CPUMASK]);
const ENV_NAMES: SyntaxSet = SyntaxSet::new([ENV_NAME]);
const LEVELS: SyntaxSet = SyntaxSet::new([LEVEL]);
const WORDS: SyntaxSet = SyntaxSet::new([WORD]);

/// Argument shape of a typed directive.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Shape {
    /// Exactly one value.
    One(SyntaxSet, &'static str),
    /// One or more values.
    Many(SyntaxSet, &'static str),
    Raw,
    Return,
    Env,
    ErrorLog,
    ThreadPool,
    User,
    Events,
}

pub(crate) fn shape(name: &str) -> Option<Shape> {
    let shape = match name {
        "accept_mutex" | "daemon" | "master_process" | "multi_accept" | "pcre_jit" => {
            Shape::One(BOOLEANS, "`on` or `off`")
        }
        "accept_mutex_delay" | "worker_shutdown_timeout" | "timer_resolution" => {
            Shape::One(TIMES, "a time interval")
        }
        "worker_aio_requests" | "worker_connections" | "worker_priority" | "worker_rlimit_nofile" => {
            Shape::One(NUMBERS, "a number")
        }
        "load_module" | "lock_file" | "pid" | "working_directory" => {
            Shape::One(FILES, "a file path")
        }
        "include" => Shape::One(FILES_OR_MASKS, "a file path or mask"),
        "worker_processes" => Shape::One(PROCESSES, "a number or `auto`"),
        "debug_points" => Shape::One(DEBUG_POINTS, "`abort` or `stop`"),
        "use" => Shape::One(METHODS, "a connection method"),
        "worker_rlimit_core" => Shape::One(SIZES, "a size"),
        "worker_cpu_affinity" => Shape::Many(AFFINITY, "`auto` or a CPU mask"),
        "debug_connection" | "ssl_engine" => Shape::Raw,
        "return" => Shape::Return,
        "env" => Shape::Env,
        "error_log" => Shape::ErrorLog,
        "thread_pool" => Shape::ThreadPool,
        "user" => Shape::User,
        "events" => Shape::Events,
        _ => return None,
    };
    Some(shape)
}

pub(crate) fn directive(p: &mut Parser<'_>, shape: Shape) {
    let m = p.start();
    p.bump(KEYWORD, Some(FieldName::Keyword));

    match shape {
        Shape::One(accepted, expected) => {
            typed_value(p, LexMode::Statement, accepted, FieldName::Value, expected);
        }
        Shape::Many(accepted, expected) => {
            typed_value(p, LexMode::Statement, accepted, FieldName::Value, expected);
            while p.argument(LexMode::Statement).is_some() {
                typed_value(p, LexMode::Statement, accepted, FieldName::Value, expected);
            }
        }
        Shape::Raw => match p.argument(LexMode::Raw) {
            Some(RAW_VALUE) => p.bump(RAW_VALUE, Some(FieldName::Value)),
            _ => p.missing(ErrorKind::UnexpectedToken, "expected a value"),
        },
        Shape::Return => return_args(p),
        Shape::Env => env_args(p),
        Shape::ErrorLog => {
            typed_value(p, LexMode::Statement, FILES, FieldName::Value, "a file path");
            if p.argument(LexMode::Statement).is_some() {
                typed_value(p, LexMode::Statement, LEVELS, FieldName::Level, "a log level");
            }
        }
        Shape::ThreadPool => thread_pool_args(p),
        Shape::User => {
            typed_value(p, LexMode::Statement, WORDS, FieldName::Value, "a user name");
            if p.argument(LexMode::Statement).is_some() {
                typed_value(p, LexMode::Statement, WORDS, FieldName::Value, "a group name");
            }
        }
        Shape::Events => {
            body(p);
            m.complete(p, DIRECTIVE);
            return;
        }
    }

    terminator(p);
    m.complete(p, DIRECTIVE);
}

/// `return code [text];` or `return URL;`
fn return_args(p: &mut Parser<'_>) {
    match p.argument(LexMode::Statement) {
        Some(ATOM) if classify::matches(NUMERIC_LITERAL, p.text_in(LexMode::Statement)) => {
            p.bump(NUMERIC_LITERAL, Some(FieldName::Status));
            free_value(p);
        }
        Some(_) => {
            free_value(p);
        }
        None => p.missing(ErrorKind::UnexpectedToken, "expected a status code or URL"),
    }
}

/// `env NAME[=value];`
fn env_args(p: &mut Parser<'_>) {
    let name = typed_value(
        p,
        LexMode::KeyValue,
        ENV_NAMES,
        FieldName::Name,
        "an environment variable name",
    );
    if !name || p.peek_in(LexMode::KeyValue) != EQ {
        return;
    }

    p.bump(EQ, None);
    if !free_value(p) {
        p.missing(ErrorKind::UnexpectedToken, "expected a value");
    }
}

/// `thread_pool name threads=N [max_queue=N];`
fn thread_pool_args(p: &mut Parser<'_>) {
    typed_value(p, LexMode::Statement, WORDS, FieldName::Name, "a thread pool name");

    if p.argument(LexMode::KeyValue).is_some() {
        thread_pool_option(p);
    } else {
        p.missing(ErrorKind::UnexpectedToken, "expected `threads=` or `max_queue=`");
    }
    if p.argument(LexMode::KeyValue).is_some() {
        thread_pool_option(p);
    }
}

fn thread_pool_option(p: &mut Parser<'_>) {
    let m = p.start();
    let key = p.text_in(LexMode::KeyValue);

    if p.peek_in(LexMode::KeyValue) == ATOM && matches!(key, "threads" | "max_queue") {
        p.bump(WORD, Some(FieldName::Key));
        if p.peek_in(LexMode::KeyValue) == EQ {
            p.bump(EQ, None);
            typed_value(p, LexMode::Statement, NUMBERS, FieldName::Value, "a number");
        } else {
            p.missing(ErrorKind::UnexpectedToken, "expected `=`");
        }
        m.complete(p, THREAD_POOL_OPTION);
        return;
    }

    p.error(ErrorKind::UnexpectedToken, format!("expected `threads` or `max_queue`, found `{key}`"));
    p.bump_any();
    if p.peek_in(LexMode::KeyValue) == EQ {
        p.bump_any();
        if p.argument(LexMode::Statement).is_some() {
            p.bump_any();
        }
    }
    m.complete(p, ERROR);
}
