use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use expect_test::expect_file;
use ngx_errors::ErrorKind;
use ngx_syntax::SyntaxKind::{self, *};
use ngx_syntax::ast::{AstNode, SourceFile, Statement};
use ngx_syntax::{FieldName, NodeOrToken, SyntaxNode};
use text_size::{TextRange, TextSize};

use crate::{
    EditError, MAX_INPUT_LEN, ParseOptions, TextEdit, parse, parse_bytes, parse_incremental,
    parse_with,
};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "conf" {
                    let expected = path.with_extension("tree");
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

#[test]
fn snapshots() {
    let test_cases = TestCase::list();
    assert!(!test_cases.is_empty());

    for case in test_cases {
        let parse = parse(&case.text);
        let diagnostics = parse
            .diagnostics()
            .iter()
            .map(|d| format!("  {:?} {d}\n", d.kind()))
            .collect::<String>();

        let actual = format!("{}Errors:\n{diagnostics}", parse.tree().debug_tree());
        expect_file![&case.expected].assert_eq(&actual);
    }
}

fn statement(text: &str) -> (crate::Parse, usize) {
    let parse = parse(text);
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let count = parse.root().children().count();
    (parse, count)
}

fn value_kinds(node: SyntaxNode<'_>) -> Vec<SyntaxKind> {
    node.fields(FieldName::Value).map(|value| value.kind()).collect()
}

#[test]
fn classifies_by_production() {
    let cases = [
        ("worker_processes auto;", AUTO),
        ("worker_processes 4;", NUMERIC_LITERAL),
        ("worker_rlimit_core 100m;", SIZE),
        ("accept_mutex_delay 500ms;", TIME),
        ("include /etc/nginx/conf.d/*.conf;", MASK),
        ("include /etc/nginx/nginx.conf;", FILE),
        ("daemon on;", BOOLEAN),
        ("use epoll;", CONNECTION_METHOD),
        ("debug_points abort;", DEBUG_POINT),
        ("worker_priority -10;", NUMERIC_LITERAL),
        ("pid \"/run/nginx.pid\";", QUOTED_STRING),
    ];

    for (text, expected) in cases {
        let (parse, count) = statement(text);
        assert_eq!(count, 1);
        let directive = parse.root().children().next().unwrap();
        assert_eq!(directive.kind(), DIRECTIVE, "Input: '{text}'");
        assert_eq!(value_kinds(directive), [expected], "Input: '{text}'");
    }
}

#[test]
fn generic_attribute_values() {
    let (parse, _) = statement("proxy_buffer_size 10m;\nkeepalive_timeout 65s;\nsendfile on;\n");
    let kinds: Vec<_> = parse.root().children().map(|node| (node.kind(), value_kinds(node))).collect();
    assert_eq!(
        kinds,
        [(ATTRIBUTE, vec![SIZE]), (ATTRIBUTE, vec![TIME]), (ATTRIBUTE, vec![BOOLEAN])]
    );

    let (parse, _) = statement("log_format main '$remote_addr' $status-x a'b;");
    let attribute = parse.root().children().next().unwrap();
    assert_eq!(value_kinds(attribute), [STRING, QUOTED_STRING, STRING, RANDOM_VALUE]);
}

#[test]
fn attributes_without_values_or_with_blocks() {
    let (parse, _) = statement("internal;\nupstream backend { server 127.0.0.1:8080; }\n");
    let file = SourceFile::cast(parse.root()).unwrap();
    let statements: Vec<_> = file.statements().collect();
    assert_eq!(statements.len(), 2);

    let Statement::Attribute(internal) = statements[0] else { panic!("expected attribute") };
    assert_eq!(internal.keyword().unwrap().text_trimmed(), "internal");
    assert_eq!(internal.values().count(), 0);

    let Statement::Attribute(upstream) = statements[1] else { panic!("expected attribute") };
    assert_eq!(upstream.values().map(|v| v.text_trimmed()).collect::<Vec<_>>(), ["backend"]);
    let block = upstream.block().unwrap();
    assert_eq!(block.statements().next().and_then(Statement::keyword), Some("server"));
}

#[test]
fn nesting() {
    let (parse, _) = statement("events { worker_connections 1024; }");
    let file = SourceFile::cast(parse.root()).unwrap();
    let Some(Statement::Directive(events)) = file.statements().next() else {
        panic!("expected directive")
    };
    assert_eq!(events.name(), Some("events"));

    let block = events.block().unwrap();
    let inner: Vec<_> = block.statements().collect();
    assert_eq!(inner.len(), 1);
    let Statement::Directive(connections) = inner[0] else { panic!("expected directive") };
    assert_eq!(connections.name(), Some("worker_connections"));
    let value = connections.value().unwrap();
    assert_eq!((value.kind(), value.text_trimmed()), (NUMERIC_LITERAL, "1024"));
}

#[test]
fn location_modifiers() {
    let cases = [
        ("location ~* \\.php$ { }", Some("~*"), "\\.php$"),
        ("location = /50x.html { }", Some("="), "/50x.html"),
        ("location ^~ /static/ { }", Some("^~"), "/static/"),
        ("location / { }", None, "/"),
        ("location @fallback { }", None, "@fallback"),
    ];

    for (text, modifier, route) in cases {
        let (parse, _) = statement(text);
        let file = SourceFile::cast(parse.root()).unwrap();
        let Some(Statement::Location(location)) = file.statements().next() else {
            panic!("expected location in '{text}'")
        };
        assert_eq!(location.modifier().map(|m| m.text_trimmed()), modifier, "Input: '{text}'");
        assert_eq!(location.route().unwrap().text_trimmed(), route, "Input: '{text}'");
        assert!(location.block().is_some());
    }
}

#[test]
fn map_structure() {
    let (parse, _) =
        statement("map $http_upgrade $connection_upgrade { default upgrade; '' close; }");
    let file = SourceFile::cast(parse.root()).unwrap();
    let Some(Statement::Map(map)) = file.statements().next() else { panic!("expected map") };

    let variables: Vec<_> = map.variables().map(|v| v.text_trimmed()).collect();
    assert_eq!(variables, ["$http_upgrade", "$connection_upgrade"]);

    let entries: Vec<_> = map.block().unwrap().statements().collect();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| matches!(entry, Statement::Attribute(_))));
    assert_eq!(entries[1].keyword(), Some("''"));
}

#[test]
fn condition_balancing() {
    let (parse, _) = statement("if ($request_method = POST) { return 405; }");
    let file = SourceFile::cast(parse.root()).unwrap();
    let Some(Statement::If(if_)) = file.statements().next() else { panic!("expected if") };
    assert_eq!(if_.condition().unwrap().text_trimmed(), "($request_method = POST)");

    let Some(Statement::Directive(ret)) = if_.block().unwrap().statements().next() else {
        panic!("expected return")
    };
    assert_eq!(ret.name(), Some("return"));
    let status = ret.status().unwrap();
    assert_eq!((status.kind(), status.text_trimmed()), (NUMERIC_LITERAL, "405"));
}

#[test]
fn return_forms() {
    let (parse, _) = statement("return 301 https://$host$request_uri;\nreturn 200 \"ok\";\nreturn 444;\n");
    let forms: Vec<_> = parse
        .root()
        .children()
        .map(|node| {
            let status = node.field(FieldName::Status).map(|s| s.text_trimmed());
            (status, value_kinds(node))
        })
        .collect();
    assert_eq!(
        forms,
        [
            (Some("301"), vec![RANDOM_VALUE]),
            (Some("200"), vec![QUOTED_STRING]),
            (Some("444"), vec![]),
        ]
    );
}

#[test]
fn typed_accessors() {
    let text = "thread_pool default threads=32 max_queue=65536;
error_log /var/log/nginx/error.log warn;
env TZ=UTC;
events { }
";
    let (parse, _) = statement(text);
    let file = SourceFile::cast(parse.root()).unwrap();
    let directives: Vec<_> = file
        .statements()
        .filter_map(|statement| match statement {
            Statement::Directive(directive) => Some(directive),
            _ => None,
        })
        .collect();
    assert_eq!(directives.len(), 4);

    let pool = directives[0];
    assert_eq!(pool.target().unwrap().text_trimmed(), "default");
    let options: Vec<_> = pool
        .thread_pool_options()
        .map(|option| (option.key().unwrap().text_trimmed(), option.value().unwrap().text_trimmed()))
        .collect();
    assert_eq!(options, [("threads", "32"), ("max_queue", "65536")]);

    let log = directives[1];
    assert_eq!(log.value().unwrap().kind(), FILE);
    assert_eq!(log.level().unwrap().kind(), LEVEL);

    let env = directives[2];
    assert_eq!(env.target().unwrap().kind(), ENV_NAME);
    assert_eq!(env.value().unwrap().text_trimmed(), "UTC");

    let block = directives[3].block().unwrap();
    assert_eq!(block.l_brace().unwrap().text_trimmed(), "{");
    assert_eq!(block.r_brace().unwrap().text_trimmed(), "}");
}

#[test]
fn recovery_keeps_following_statements() {
    let text = "worker_processes auto;\nbad'keyword 1 2 { x; }\nuser nginx;\npid /run/nginx.pid;\n";
    let parse = parse(text);
    let file = SourceFile::cast(parse.root()).unwrap();

    let kinds: Vec<_> = file.statements().map(|s| s.syntax().kind()).collect();
    assert_eq!(kinds, [DIRECTIVE, ERROR, DIRECTIVE, DIRECTIVE]);
    assert_eq!(file.errors().count(), 1);

    let error = file.errors().next().unwrap().syntax();
    assert_eq!(error.text_trimmed(), "bad'keyword 1 2 { x; }");
    assert_eq!(parse.diagnostics().len(), 1);
    assert_eq!(parse.diagnostics()[0].kind(), ErrorKind::UnknownDirective);
}

#[test]
fn malformed_line_without_semicolon_is_one_error() {
    let cases = [
        ("pid\nworker_connections 512;\n", "expected a file path"),
        ("worker_processes many\nuser nginx;\n", "expected a number or `auto`, found `many`"),
        ("env\nuser nginx;\n", "expected an environment variable name"),
        ("pid /a /b\nuser nginx;\n", "unexpected argument"),
    ];

    for (text, message) in cases {
        let parse = parse(text);
        let errors = parse.root().descendants().filter(|n| n.kind() == ERROR).count();
        assert_eq!(errors, 1, "Input: '{text}'");
        assert_eq!(parse.diagnostics().len(), 1, "Input: '{text}'");
        assert_eq!(parse.diagnostics()[0].message(), message, "Input: '{text}'");
        assert_eq!(parse.root().children().count(), 2, "Input: '{text}'");
    }
}

#[test]
fn typed_directive_keeps_keyword_and_semicolon() {
    let parse = parse("worker_connections lots;\n");
    let directive = parse.root().children().next().unwrap();
    assert_eq!(directive.kind(), DIRECTIVE);

    let kinds: Vec<_> = directive.children_with_tokens().map(|child| child.kind()).collect();
    assert_eq!(kinds, [KEYWORD, ERROR, SEMICOLON]);
    assert_eq!(parse.diagnostics()[0].kind(), ErrorKind::UnexpectedToken);
}

#[test]
fn missing_semicolon_does_not_swallow_next_line() {
    let parse = parse("worker_processes 2\nuser nginx;\n");
    let nodes: Vec<_> = parse.root().children().collect();
    assert_eq!(nodes.len(), 2);

    let first = nodes[0];
    let error = first.children().find(|n| n.kind() == ERROR).unwrap();
    assert!(error.text_range().is_empty());
    assert_eq!(nodes[1].field(FieldName::Keyword).unwrap().text_trimmed(), "user");
    assert_eq!(parse.diagnostics().len(), 1);
}

#[test]
fn extra_arguments_are_one_error() {
    let parse = parse("pid /a /b /c;");
    let directive = parse.root().children().next().unwrap();
    let errors: Vec<_> = directive.children().filter(|n| n.kind() == ERROR).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].text_trimmed(), "/b /c");
}

#[test]
fn unterminated_condition() {
    let parse = parse("if ($a = b { return 403; }");
    let diagnostics: Vec<_> = parse.diagnostics().iter().map(|d| d.kind()).collect();
    assert_eq!(diagnostics, [ErrorKind::UnterminatedConstruct]);

    let if_ = parse.root().children().next().unwrap();
    assert_eq!(if_.kind(), IF);
    assert_eq!(if_.field(FieldName::Condition).unwrap().text_trimmed(), "($a = b");
    assert!(if_.field(FieldName::Body).is_some());
}

#[test]
fn condition_with_quantifier_braces() {
    let (parse, count) = statement("if ($uri ~ ^/a{2}) { return 404; }");
    assert_eq!(count, 1);
    let file = SourceFile::cast(parse.root()).unwrap();
    let Some(Statement::If(if_)) = file.statements().next() else { panic!("expected if") };
    assert_eq!(if_.condition().unwrap().text_trimmed(), "($uri ~ ^/a{2})");

    let Some(Statement::Directive(ret)) = if_.block().unwrap().statements().next() else {
        panic!("expected return")
    };
    assert_eq!(ret.status().unwrap().text_trimmed(), "404");
}

#[test]
fn nesting_limit() {
    let text = "a { b { c { d; } } }\ne;";
    let parse = parse_with(text, &ParseOptions { max_depth: 2 });
    assert_eq!(parse.text(), text);

    let too_deep: Vec<_> = parse.root().descendants().filter(|n| n.kind() == ERROR).collect();
    assert_eq!(too_deep.len(), 1);
    assert_eq!(too_deep[0].text_trimmed(), "{ d; }");
    assert_eq!(too_deep[0].field_name(), Some(FieldName::Body));
    assert_eq!(parse.diagnostics()[0].kind(), ErrorKind::NestingTooDeep);

    let last = parse.root().children().last().unwrap();
    assert_eq!(last.text_trimmed(), "e;");
}

#[test]
fn deep_input_does_not_overflow() {
    let text = "{".repeat(100_000);
    let parse = parse(&text);
    assert_eq!(parse.root().text_range(), TextRange::up_to(TextSize::of(text.as_str())));
    assert!(parse.diagnostics().iter().any(|d| d.kind() == ErrorKind::NestingTooDeep));
}

#[test]
fn spans_round_trip() {
    let text = "# head\nhttp {\n  server { listen 80; } # tail\n}\n\n  ";
    let parse = parse(text);

    let mut rebuilt = String::new();
    for token in parse.root().descendant_tokens() {
        rebuilt.push_str(token.text());
    }
    assert_eq!(rebuilt, text);
}

#[test]
fn covering_and_offsets() {
    let text = "events { worker_connections 1024; }";
    let parse = parse(text);
    let root = parse.root();

    let token = root.token_at_offset(30.into()).right_biased().unwrap();
    assert_eq!(token.text_trimmed(), "1024");
    assert_eq!(token.parent().kind(), DIRECTIVE);

    let range = TextRange::new(9.into(), 33.into());
    let NodeOrToken::Node(node) = root.covering_element(range) else { panic!("expected node") };
    assert_eq!(node.kind(), DIRECTIVE);

    let range = TextRange::new(7.into(), 35.into());
    let NodeOrToken::Node(node) = root.covering_element(range) else { panic!("expected node") };
    assert_eq!(node.kind(), BLOCK);
}

#[test]
fn empty_and_trivia_only_inputs() {
    for text in ["", "\n\n", "# only a comment", "   \t"] {
        let parse = parse(text);
        assert!(!parse.has_errors());
        assert_eq!(parse.root().children().count(), 0);
        assert_eq!(parse.root().text(), text);
    }
}

#[test]
fn input_limit_matches_text_size() {
    assert!(TextSize::try_from(MAX_INPUT_LEN).is_ok());
    assert!(TextSize::try_from(MAX_INPUT_LEN + 1).is_err());
}

#[test]
fn invalid_bytes_keep_offsets() {
    let bytes = b"user n\xffginx;\nserver_name a\xe2\x82b;";
    let parse = parse_bytes(bytes);
    assert_eq!(parse.text(), "user n\u{1a}ginx;\nserver_name a\u{1a}\u{1a}b;");
    assert_eq!(parse.root().text_range(), TextRange::up_to(TextSize::new(bytes.len() as u32)));

    let server_name = parse.root().children().nth(1).unwrap();
    let range = server_name.field(FieldName::Value).unwrap().trimmed_range();
    assert_eq!(&bytes[Range::<usize>::from(range)], b"a\xe2\x82b");
}

#[test]
fn incremental_equals_full_parse() {
    let before = parse("worker_processes 1;\nevents { worker_connections 512; }\n");
    let edits = [
        TextEdit::replace(TextRange::new(17.into(), 18.into()), "auto"),
        TextEdit::insert(54.into(), "\nuser nginx;"),
    ];

    let after = parse_incremental(&before, &edits).unwrap();
    let expected =
        parse("worker_processes auto;\nevents { worker_connections 512; }\nuser nginx;\n");
    assert_eq!(after, expected);
    assert_eq!(before.text(), "worker_processes 1;\nevents { worker_connections 512; }\n");
}

#[test]
fn rejects_bad_edits() {
    let before = parse("pid a;\u{e9}");

    let out_of_bounds = TextEdit::delete(TextRange::new(0.into(), 100.into()));
    assert!(matches!(
        parse_incremental(&before, &[out_of_bounds]),
        Err(EditError::OutOfBounds { .. })
    ));

    let split_char = TextEdit::insert(7.into(), "x");
    assert!(matches!(
        parse_incremental(&before, &[split_char]),
        Err(EditError::NotCharBoundary { .. })
    ));

    let overlapping = [
        TextEdit::delete(TextRange::new(0.into(), 3.into())),
        TextEdit::delete(TextRange::new(2.into(), 5.into())),
    ];
    assert!(matches!(
        parse_incremental(&before, &overlapping),
        Err(EditError::Overlapping { .. })
    ));
}
