use std::time::Duration;

use opc_lexer::LexErrorKind;
use pretty_assertions::assert_eq;

use crate::errors::{ErrorCategory, EvalError, ResourceErrorKind, SyntaxErrorKind, TypeErrorKind};
use crate::value::{KeyPath, Segment};
use crate::{load_from_string, LoadOptions, Scope};

fn load(text: &str) -> Result<Scope, EvalError> {
    load_from_string(text, &LoadOptions::default())
}

fn syntax_kind(text: &str) -> SyntaxErrorKind {
    match load(text) {
        Err(EvalError::Syntax { kind, .. }) => kind,
        other => panic!("expected a syntax error for {text:?}, got {other:?}"),
    }
}

#[test]
fn test_top_level_scalar_is_wrapped() {
    let root = load("42").unwrap();
    assert!(root.is_array());
    assert_eq!(root.len(), 1);
    assert_eq!(root.get_text(0usize).unwrap().as_deref(), Some("42"));
}

#[test]
fn test_top_level_array() {
    let root = load(r#"[1, "two", [3]]"#).unwrap();
    assert_eq!(root.len(), 3);
    assert_eq!(root.get_text(1usize).unwrap().as_deref(), Some("two"));
    let path = KeyPath::from([Segment::Index(2), Segment::Index(0)]);
    assert_eq!(root.get_text(path).unwrap().as_deref(), Some("3"));
}

#[test]
fn test_commas_are_optional() {
    let root = load("{a: 1 b: 2, c: [1 2 3]}").unwrap();
    assert_eq!(root.names().len(), 3);
    assert_eq!(root.get_text(["c", "2"]).unwrap(), None);
    let path = KeyPath::parse_dotted("c.2");
    assert_eq!(root.get_text(path).unwrap().as_deref(), Some("3"));
}

#[test]
fn test_comments_are_skipped() {
    let root = load("{\n  // line\n  a: /* inline */ 1,\n}").unwrap();
    assert_eq!(root.get_text("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_weights_from_markers() {
    let root = load("{a??: 1, b!!!: 2, c: 3}").unwrap();
    let weights: Vec<i32> = (0..3).map(|i| root.entry(i).unwrap().weight()).collect();
    assert_eq!(weights, vec![-2, 3, 0]);
}

#[test]
fn test_mixed_weight_markers_rejected() {
    assert_eq!(syntax_kind("{a?!: 1}"), SyntaxErrorKind::MixedWeight);
    assert_eq!(syntax_kind("{a!?: 1}"), SyntaxErrorKind::MixedWeight);
}

#[test]
fn test_compound_keys_share_scopes() {
    let root = load("{a.b: 1, a.c: 2, \"x y\".z: 3}").unwrap();
    assert_eq!(root.len(), 2);
    assert_eq!(root.get_text(["a", "b"]).unwrap().as_deref(), Some("1"));
    assert_eq!(root.get_text(["a", "c"]).unwrap().as_deref(), Some("2"));
    assert_eq!(root.get_text(["x y", "z"]).unwrap().as_deref(), Some("3"));
}

#[test]
fn test_compound_key_weight_applies_to_last_part() {
    let root = load("{a.b?: 1, a.b: 2}").unwrap();
    assert_eq!(root.get_text(["a", "b"]).unwrap().as_deref(), Some("2"));
}

#[test]
fn test_malformed_compound_key() {
    assert!(matches!(
        syntax_kind("{a.: 1}"),
        SyntaxErrorKind::MalformedKey(_)
    ));
    assert!(matches!(
        syntax_kind("{a.1: 1}"),
        SyntaxErrorKind::MalformedKey(_)
    ));
}

#[test]
fn test_reserved_keys_rejected() {
    for key in ["this", "parent", "env", "global", "\"this\""] {
        let text = format!("{{{key}: 1}}");
        assert!(
            matches!(syntax_kind(&text), SyntaxErrorKind::ReservedKey(_)),
            "{key} accepted"
        );
    }
    assert!(matches!(
        syntax_kind("{a.global: 1}"),
        SyntaxErrorKind::ReservedKey(_)
    ));
}

#[test]
fn test_lambda_parameter_must_be_plain_identifier() {
    for text in ["{f: a.b => 1}", "{f: 1 => 2}", "{f: this => 1}", "{f: {} => 1}", "{f: g(1) => 2}"] {
        assert!(
            matches!(
                syntax_kind(text),
                SyntaxErrorKind::InvalidLambdaParameter(_)
            ),
            "{text} accepted"
        );
    }
}

#[test]
fn test_nested_lambdas_are_right_associative() {
    let root = load("{k: a => b => a}").unwrap();
    let k = root.get("k").unwrap().unwrap();
    assert_eq!(k.as_lambda().unwrap().param().as_str(), "a");
}

#[test]
fn test_chain_number_segments_split() {
    let root = load("{m: [[0, [1, 2]]], v: m.0.1.1}").unwrap();
    assert_eq!(root.get_text("v").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_non_integer_chain_index_is_type_error() {
    for text in ["{a: [1], b: a.1e2}", "{a: [1], b: a.-1}"] {
        let err = load(text).unwrap_err();
        assert!(
            matches!(err, EvalError::Type(TypeErrorKind::NonIntegerIndex(_))),
            "{text}: {err:?}"
        );
    }
}

#[test]
fn test_quoted_chain_segment() {
    let root = load(r#"{"a b": {c: 1}, d: this."a b".c}"#).unwrap();
    assert_eq!(root.get_text("d").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_unexpected_tokens() {
    assert!(matches!(
        syntax_kind("{a 1}"),
        SyntaxErrorKind::Unexpected { expected: "`:`", .. }
    ));
    assert!(matches!(
        syntax_kind("{a: [1, 2}"),
        SyntaxErrorKind::Unexpected { .. }
    ));
    assert!(matches!(
        syntax_kind("{a: 1"),
        SyntaxErrorKind::Unexpected { .. }
    ));
    assert!(matches!(
        syntax_kind("{} {}"),
        SyntaxErrorKind::Unexpected {
            expected: "end of input",
            ..
        }
    ));
    assert!(matches!(
        syntax_kind("{a: f(1}"),
        SyntaxErrorKind::Unexpected { expected: "`)`", .. }
    ));
}

#[test]
fn test_syntax_error_span_points_at_token() {
    let err = load("{a: 1, b 2}").unwrap_err();
    let span = err.span().unwrap();
    assert_eq!(span.to_range(), 9..10);
}

#[test]
fn test_lex_errors_are_syntax_errors() {
    let err = load("{a: @}").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Syntax);
    assert!(matches!(
        err,
        EvalError::Syntax {
            kind: SyntaxErrorKind::Lex(LexErrorKind::UnrecognizedInput(_)),
            ..
        }
    ));
}

#[test]
fn test_literals_over_quota_fail_the_load() {
    let options = LoadOptions::default().with_quota(8);
    assert!(load_from_string(r#"["1234", "5678"]"#, &options).is_ok());
    let err = load_from_string(r#"["1234", "56789"]"#, &options).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Resource(ResourceErrorKind::Quota(_))
    ));
}

#[test]
fn test_expired_deadline_stops_building() {
    let options = LoadOptions::default().with_timeout(Duration::ZERO);
    let err = load_from_string("{a: {b: 1}}", &options).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Resource);
}

#[test]
fn test_deeply_nested_document_builds_and_drops() {
    let depth = 20_000;
    let text = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
    let root = load(&text).unwrap();
    assert_eq!(root.len(), 1);
    drop(root);
}

#[test]
fn test_deeply_nested_calls_and_lambdas_drop() {
    let depth = 20_000;
    let calls = format!("{{r: {}1{}}}", "f(".repeat(depth), ")".repeat(depth));
    drop(load(&calls).unwrap());

    let lambdas = format!("{{r: {}1}}", "x => ".repeat(depth));
    drop(load(&lambdas).unwrap());
}
