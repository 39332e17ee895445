//! `expect_that` / `assert_that`
//!
//! Values are compared through their `Debug` rendering. Without options the
//! comparison is typed: both sides must have the same type name and the same
//! rendering. Recognised options:
//!
//! * `not` or `!` inverts the result
//! * `contains` or `c` checks that the observed text contains the expected text
//! * `streq` or `==` compares the texts only
//! * `untyped` compares the texts only, taking precedence over the others
//! * `debug` prints a stack trace on failure
//!
//! Any other option is printed as a comment.

use common::debug::{pretty_stack_trace_string, MAX_STACK_TRACE_BYTES};
use std::any::type_name;
use std::fmt::Debug;
use std::panic::Location;
use std::path::Path;

/// Parsed assertion options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssertOptions {
    pub invert: bool,
    pub contains: bool,
    pub text_equal: bool,
    pub untyped: bool,
    pub debug: bool,
    pub comments: Vec<String>,
}

impl AssertOptions {
    pub fn parse(options: &[&str]) -> Self {
        let mut parsed = Self::default();
        for option in options {
            match *option {
                "not" | "!" => parsed.invert = true,
                "contains" | "c" => parsed.contains = true,
                "streq" | "==" => parsed.text_equal = true,
                "untyped" => parsed.untyped = true,
                "debug" => parsed.debug = true,
                comment => parsed.comments.push(comment.to_string()),
            }
        }
        parsed
    }
}

/// Compare `actual` with `expected`, reporting a mismatch on stderr
///
/// Returns whether the expectation held.
#[track_caller]
pub fn expect_that<A, E>(actual: &A, expected: &E, options: &[&str]) -> bool
where
    A: Debug + ?Sized,
    E: Debug + ?Sized,
{
    let location = caller_prefix(Location::caller());
    let parsed = AssertOptions::parse(options);

    for comment in &parsed.comments {
        eprintln!("{location}COMMENT: {comment}");
    }

    let observed = render(actual);
    let wanted = render(expected);

    let matched = if parsed.untyped {
        observed == wanted
    } else if parsed.contains {
        observed.contains(&wanted)
    } else if parsed.text_equal {
        observed == wanted
    } else {
        type_name::<A>() == type_name::<E>() && observed == wanted
    };

    if matched != parsed.invert {
        return true;
    }

    eprintln!("{location}Observed: {}", type_name::<A>());
    eprintln!("{location}Observed: {observed}");
    eprintln!("{location}Expected: {wanted}");
    eprintln!("{location}Expected: {}", type_name::<E>());
    eprintln!("{location}Options: {options:?}");
    if parsed.debug {
        eprintln!("{}", pretty_stack_trace_string(MAX_STACK_TRACE_BYTES));
    }

    false
}

/// Like [`expect_that`], panicking when the expectation does not hold
#[track_caller]
pub fn assert_that<A, E>(actual: &A, expected: &E, options: &[&str])
where
    A: Debug + ?Sized,
    E: Debug + ?Sized,
{
    if !expect_that(actual, expected, options) {
        panic!(
            "{}assertion failed: {:?} vs {:?} with options {:?}",
            caller_prefix(Location::caller()),
            actual,
            expected,
            options
        );
    }
}

/// `Debug` rendering without the quotes around strings
fn render<T: Debug + ?Sized>(value: &T) -> String {
    let text = format!("{value:?}");
    match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) => inner.to_string(),
        None => text,
    }
}

fn caller_prefix(location: &Location<'_>) -> String {
    let file = Path::new(location.file())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.file().to_string());
    format!("{file}:{} ", location.line())
}
