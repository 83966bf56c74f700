//! Strictness and ordering of the engine output parsers.

use statchain::ParseError;
use statchain::engine::parse::{
    parse_bool, parse_bool_array, parse_number, parse_number_array, parse_string,
    parse_string_array,
};

#[test]
fn scalar_number_parses() {
    assert_eq!(parse_number("[1] 7.889\n").unwrap(), 7.889);
}

#[test]
fn scalar_rejects_multiple_values() {
    let err = parse_number("[1]  7.889 12.900\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::WrongArity {
            expected: "number",
            found: 2
        }
    ));
}

#[test]
fn scalar_rejects_empty_output() {
    assert!(matches!(parse_number("\n").unwrap_err(), ParseError::Empty));
    assert!(matches!(parse_number("").unwrap_err(), ParseError::Empty));
}

#[test]
fn array_concatenates_rows_in_stream_order() {
    let out = "[1]  7.889 12.900 89.902\n[2]  2.492 90.742\n";
    assert_eq!(
        parse_number_array(out).unwrap(),
        vec![7.889, 12.9, 89.902, 2.492, 90.742]
    );
}

#[test]
fn array_handles_negative_and_scientific_literals() {
    let out = "[1] -1.5 2e3 1.5e-3\n";
    assert_eq!(parse_number_array(out).unwrap(), vec![-1.5, 2000.0, 0.0015]);
}

#[test]
fn number_context_rejects_quoted_strings() {
    let err = parse_number("[1] \"7.889\"\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::TypeMismatch {
            expected: "number",
            ..
        }
    ));
}

#[test]
fn number_context_rejects_unknown_literals() {
    let err = parse_number_array("[1] 1.5 NA 2.5\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::BadLiteral {
            fragment: "NA".to_string()
        }
    );
}

#[test]
fn partial_results_are_discarded_on_failure() {
    // Parsing is all-or-nothing: a bad fragment after good values is
    // still a failure for the whole call.
    assert!(parse_number_array("[1] 1 2 3\n[4] oops\n").is_err());
}

#[test]
fn booleans_are_exact_literals() {
    assert!(parse_bool("[1] TRUE\n").unwrap());
    assert!(!parse_bool("[1] FALSE\n").unwrap());
    assert_eq!(
        parse_bool_array("[1] TRUE FALSE TRUE\n").unwrap(),
        vec![true, false, true]
    );
    assert!(parse_bool("[1] True\n").is_err());
}

#[test]
fn bool_context_rejects_numbers() {
    let err = parse_bool_array("[1] TRUE 1\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::TypeMismatch {
            expected: "boolean",
            ..
        }
    ));
}

#[test]
fn strings_unwrap_quotes_and_escapes() {
    assert_eq!(parse_string("[1] \"hello\"\n").unwrap(), "hello");
    assert_eq!(
        parse_string_array("[1] \"one two\" \"say \\\"hi\\\"\"\n").unwrap(),
        vec!["one two".to_string(), "say \"hi\"".to_string()]
    );
}

#[test]
fn string_context_rejects_bare_numbers() {
    let err = parse_string_array("[1] \"a\" 3\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::TypeMismatch {
            expected: "string",
            ..
        }
    ));
}

#[test]
fn wrapped_vectors_keep_ordering_across_marker_rows() {
    let out = "[1] 1 2 3\n[4] 4 5 6\n[7] 7\n";
    assert_eq!(
        parse_number_array(out).unwrap(),
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
    );
}

#[test]
fn parse_failures_name_the_offending_fragment() {
    match parse_number_array("[1] 12..5\n").unwrap_err() {
        ParseError::BadLiteral { fragment } => assert_eq!(fragment, "12..5"),
        other => panic!("expected BadLiteral, got {other:?}"),
    }
}
