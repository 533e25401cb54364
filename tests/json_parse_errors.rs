//! Purpose: Regression coverage for parse-failure category mapping.
//! Exports: Integration tests only.
//! Role: Verify stable category labels used by JSON input diagnostics.
//! Invariants: Category mapping remains deterministic for representative errors.
//! Invariants: Tests avoid payload leakage; assertions target category/hint text only.

use std::error::Error as StdError;

use query_coerce::json::parse::{self, ParseFailureCategory};
use query_coerce::{ErrorKind, Policy};
use serde_json::Value;

fn raw_error<T: serde::de::DeserializeOwned + std::fmt::Debug>(input: &str) -> serde_json::Error {
    serde_json::from_str::<T>(input).unwrap_err()
}

#[test]
fn category_mapping_handles_syntax_eof_and_data_errors() {
    assert_eq!(
        parse::categorize_error(&raw_error::<Value>(r#"{"a":}"#)),
        ParseFailureCategory::Syntax
    );
    assert_eq!(
        parse::categorize_error(&raw_error::<Value>(r#"{"a":"#)),
        ParseFailureCategory::Eof
    );
    assert_eq!(
        parse::categorize_error(&raw_error::<Vec<u8>>(r#"{"a":1}"#)),
        ParseFailureCategory::Data
    );
}

#[test]
fn hint_contains_category_position_and_context() {
    let err = raw_error::<Value>("[1,\n  }");
    let hint = parse::hint_for_error(&err, "test.context");
    assert!(hint.contains("parse category: syntax"));
    assert!(hint.contains("line 2"));
    assert!(hint.contains("context: test.context"));
}

#[test]
fn from_str_maps_failures_to_usage_with_source() {
    let err = parse::from_str::<Value>("not json", "coerce --json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(err.message(), Some("invalid JSON input"));
    assert!(err.hint().expect("hint").contains("context: coerce --json"));
    let source = err
        .source()
        .and_then(|source| source.downcast_ref::<serde_json::Error>())
        .expect("serde_json source");
    assert_eq!(parse::categorize_error(source), ParseFailureCategory::Syntax);
}

#[test]
fn hints_never_echo_the_payload() {
    let err = parse::from_str::<Value>(r#"{"secret-token": nope}"#, "ctx").unwrap_err();
    assert!(!err.hint().expect("hint").contains("secret-token"));
}

#[test]
fn policy_documents_reject_unknown_fields() {
    let policy: Policy = parse::from_str(r#"{"parseNumber":false}"#, "policy").expect("policy");
    assert!(!policy.parse_number);
    assert!(policy.parse_boolean);

    let err = parse::from_str::<Policy>(r#"{"parseBool":true}"#, "policy").unwrap_err();
    assert!(err.hint().expect("hint").contains("parse category: data"));
}

#[test]
fn category_labels_are_stable() {
    assert_eq!(ParseFailureCategory::Syntax.label(), "syntax");
    assert_eq!(ParseFailureCategory::Eof.label(), "eof");
    assert_eq!(ParseFailureCategory::Data.label(), "data");
    assert_eq!(ParseFailureCategory::Io.label(), "io");
}
