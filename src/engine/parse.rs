//! Strict parsers for the engine's bracketed-index vector output.
//!
//! The engine prints every result in the same conventional shape: one or
//! more physical lines, each optionally led by a `[n]` row marker giving
//! the one-based index of the first value on that line, followed by
//! whitespace-separated literals:
//!
//! ```text
//! [1]  7.889 12.900 89.902
//! [4]  2.492 90.742
//! ```
//!
//! Row markers are structural — they are stripped and never affect value
//! ordering; values are produced strictly in stream order across all
//! lines, including lines that continue a wrapped row without a marker.
//!
//! Literals are doubles (decimal, optionally signed, optional scientific
//! exponent), the booleans `TRUE`/`FALSE`, and double-quoted strings with
//! backslash escapes. Anything else aborts the whole parse with a
//! [`ParseError`] naming the offending fragment: results are all-or-nothing
//! per call, so a partially valid vector is never returned.

use std::fmt;

use miette::Diagnostic;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    error::Error as NomError,
    sequence::{delimited, preceded, tuple},
};
use thiserror::Error;

/// Engine output did not match the expected type grammar.
///
/// Always local to one `execute`/parse pair; the engine session itself is
/// unaffected and the caller may retry with corrected input.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ParseError {
    /// A token matched none of the literal forms the engine emits.
    #[error("unrecognized literal {fragment:?} in engine output")]
    #[diagnostic(code(statchain::parse::bad_literal))]
    BadLiteral { fragment: String },

    /// A literal parsed, but not as the requested type.
    #[error("expected a {expected} but engine output contained {fragment}")]
    #[diagnostic(code(statchain::parse::type_mismatch))]
    TypeMismatch {
        expected: &'static str,
        fragment: String,
    },

    /// A scalar was requested but the output held zero or several values.
    #[error("expected exactly one {expected} value, engine output contained {found}")]
    #[diagnostic(code(statchain::parse::wrong_arity))]
    WrongArity {
        expected: &'static str,
        found: usize,
    },

    /// The output contained no values at all.
    #[error("engine output contained no values")]
    #[diagnostic(code(statchain::parse::empty))]
    Empty,
}

/// One literal lifted out of the output stream, type still undecided.
#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Bool(true) => write!(f, "TRUE"),
            RawValue::Bool(false) => write!(f, "FALSE"),
            RawValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Parse output holding exactly one number.
pub fn parse_number(output: &str) -> Result<f64, ParseError> {
    let values = parse_number_array(output)?;
    if values.len() != 1 {
        return Err(ParseError::WrongArity {
            expected: "number",
            found: values.len(),
        });
    }
    Ok(values[0])
}

/// Parse output holding exactly one boolean.
pub fn parse_bool(output: &str) -> Result<bool, ParseError> {
    let values = parse_bool_array(output)?;
    if values.len() != 1 {
        return Err(ParseError::WrongArity {
            expected: "boolean",
            found: values.len(),
        });
    }
    Ok(values[0])
}

/// Parse output holding exactly one string.
pub fn parse_string(output: &str) -> Result<String, ParseError> {
    let mut values = parse_string_array(output)?;
    if values.len() != 1 {
        return Err(ParseError::WrongArity {
            expected: "string",
            found: values.len(),
        });
    }
    Ok(values.pop().unwrap_or_default())
}

/// Parse output as an ordered vector of numbers.
///
/// ```
/// use statchain::engine::parse::parse_number_array;
///
/// let out = "[1]  7.889 12.900 89.902\n[2]  2.492 90.742\n";
/// assert_eq!(
///     parse_number_array(out).unwrap(),
///     vec![7.889, 12.9, 89.902, 2.492, 90.742],
/// );
/// ```
pub fn parse_number_array(output: &str) -> Result<Vec<f64>, ParseError> {
    scan(output)?
        .into_iter()
        .map(|raw| match raw {
            RawValue::Number(n) => Ok(n),
            other => Err(ParseError::TypeMismatch {
                expected: "number",
                fragment: other.to_string(),
            }),
        })
        .collect()
}

/// Parse output as an ordered vector of booleans.
pub fn parse_bool_array(output: &str) -> Result<Vec<bool>, ParseError> {
    scan(output)?
        .into_iter()
        .map(|raw| match raw {
            RawValue::Bool(b) => Ok(b),
            other => Err(ParseError::TypeMismatch {
                expected: "boolean",
                fragment: other.to_string(),
            }),
        })
        .collect()
}

/// Parse output as an ordered vector of strings.
pub fn parse_string_array(output: &str) -> Result<Vec<String>, ParseError> {
    scan(output)?
        .into_iter()
        .map(|raw| match raw {
            RawValue::Text(s) => Ok(s),
            other => Err(ParseError::TypeMismatch {
                expected: "string",
                fragment: other.to_string(),
            }),
        })
        .collect()
}

// ============================================================================
// Scanner
// ============================================================================

/// Lift every literal out of the output, stripping row markers.
///
/// Errors rather than returning an empty vector: a result that parses to
/// nothing means the caller asked for the wrong shape.
fn scan(output: &str) -> Result<Vec<RawValue>, ParseError> {
    let mut values = Vec::new();
    for line in output.lines() {
        for (position, token) in tokenize_line(line)?.into_iter().enumerate() {
            if token.starts_with('[') {
                // A marker is only structural at the start of a line.
                if position == 0 && all_consuming(row_marker)(token.as_str()).is_ok() {
                    continue;
                }
                return Err(ParseError::BadLiteral { fragment: token });
            }
            values.push(classify(&token)?);
        }
    }
    if values.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(values)
}

/// Split one physical line into whitespace-separated tokens, keeping
/// quoted strings (which may embed whitespace) intact.
fn tokenize_line(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut escaped = false;
            let mut close = None;
            for (i, ch) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == '"' {
                    close = Some(i);
                    break;
                }
            }
            let Some(end) = close else {
                return Err(ParseError::BadLiteral {
                    fragment: line[start..].to_string(),
                });
            };
            tokens.push(line[start..=end].to_string());
        } else {
            let mut end = line.len();
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_whitespace() {
                    end = i;
                    break;
                }
                chars.next();
            }
            tokens.push(line[start..end].to_string());
        }
    }
    Ok(tokens)
}

/// Decide what a single token is, strictly.
fn classify(token: &str) -> Result<RawValue, ParseError> {
    if let Some(inner) = token.strip_prefix('"') {
        let inner = inner.strip_suffix('"').ok_or_else(|| ParseError::BadLiteral {
            fragment: token.to_string(),
        })?;
        return Ok(RawValue::Text(unescape(inner)));
    }

    let parsed: Result<(&str, RawValue), nom::Err<NomError<&str>>> =
        all_consuming(alt((map(boolean, RawValue::Bool), map(number, RawValue::Number))))(token);
    match parsed {
        Ok((_, value)) => Ok(value),
        Err(_) => Err(ParseError::BadLiteral {
            fragment: token.to_string(),
        }),
    }
}

fn row_marker(input: &str) -> IResult<&str, &str> {
    delimited(char('['), digit1, char(']'))(input)
}

fn boolean(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("TRUE")), value(false, tag("FALSE"))))(input)
}

/// Signed decimal literal with optional fraction and scientific exponent.
/// Deliberately narrower than `f64::from_str`: `inf`, `nan` and bare
/// fractions are not things the engine prints as numbers.
fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            opt(preceded(char('.'), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        str::parse::<f64>,
    )(input)
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
