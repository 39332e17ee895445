//! Runtime type and call-site introspection
//!
//! Function names come from `std::any::type_name`, caller frames from a
//! captured `std::backtrace::Backtrace`. Frame resolution depends on debug
//! symbols being available; without them the lookups return `None`.

use std::any::type_name;
use std::backtrace::Backtrace;
use std::fmt;
use std::path::Path;

/// A resolved frame of the current call stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerFrame {
    /// Demangled function path, e.g. `my_crate::module::function`
    pub name: String,
    /// Source file, when debug info is available
    pub file: Option<String>,
    /// Source line, when debug info is available
    pub line: Option<u32>,
}

impl CallerFrame {
    /// `file:line name`, using only the base name of the file
    pub fn with_location(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => {
                let base = Path::new(file)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.clone());
                format!("{base}:{line} {}", self.name)
            }
            _ => self.name.clone(),
        }
    }
}

impl fmt::Display for CallerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fully-qualified name of a function item or closure
pub fn function_name<F: ?Sized>(_function: &F) -> &'static str {
    type_name::<F>()
}

/// Resolve the frame `depth` levels above the caller of this function
///
/// `depth = 0` is the function calling `function_at`. Returns `None` if the
/// stack is not that deep or symbols cannot be resolved.
#[inline(never)]
pub fn function_at(depth: usize) -> Option<CallerFrame> {
    let frames = capture_frames();
    let own = frames
        .iter()
        .position(|frame| frame.name.ends_with("rtti::function_at"))?;
    frames.into_iter().nth(own + 1 + depth)
}

/// Name of the frame `depth` levels above the caller, optionally prefixed
/// with `file:line`. Empty if the frame cannot be resolved.
#[inline(never)]
pub fn specific_function_name(depth: usize, with_location: bool) -> String {
    match function_at(depth + 1) {
        Some(frame) if with_location => frame.with_location(),
        Some(frame) => frame.name,
        None => String::new(),
    }
}

/// Name of the enclosing function, resolved at compile time
#[macro_export]
macro_rules! current_function_name {
    () => {{
        fn __here() {}
        fn __name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let mut name = __name_of(__here);
        name = name.strip_suffix("::__here").unwrap_or(name);
        while let Some(outer) = name.strip_suffix("::{{closure}}") {
            name = outer;
        }
        name
    }};
}

/// Classification of a possibly absent value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnderlyingValue {
    /// There is no value at all
    Missing = 0,
    /// The value equals its type's default (zero, empty)
    Empty = 1,
    /// The value carries content
    Valid = 2,
}

impl UnderlyingValue {
    /// Human readable description
    pub fn message(self) -> &'static str {
        match self {
            Self::Missing => "Has no underlying value",
            Self::Empty => "Has underlying nil or empty value",
            Self::Valid => "Has underlying value",
        }
    }
}

/// Classify `value` as missing, empty (equal to its default) or valid
pub fn underlying_value<T>(value: Option<&T>) -> UnderlyingValue
where
    T: Default + PartialEq,
{
    match value {
        None => UnderlyingValue::Missing,
        Some(inner) if *inner == T::default() => UnderlyingValue::Empty,
        Some(_) => UnderlyingValue::Valid,
    }
}

/// Parse the textual form of a forced backtrace into frames
fn capture_frames() -> Vec<CallerFrame> {
    let rendered = Backtrace::force_capture().to_string();
    let mut frames: Vec<CallerFrame> = Vec::new();

    for line in rendered.lines().map(str::trim) {
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                let (file, line_no) = split_location(location);
                frame.file = Some(file);
                frame.line = line_no;
            }
            continue;
        }

        let symbol = match line.split_once(": ") {
            Some((index, symbol)) if index.chars().all(|c| c.is_ascii_digit()) => symbol,
            _ => line,
        };
        if !symbol.is_empty() {
            frames.push(CallerFrame {
                name: symbol.to_string(),
                file: None,
                line: None,
            });
        }
    }

    frames
}

/// Split `path:line:column` into the path and line
fn split_location(location: &str) -> (String, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let _column = parts.next();
    let line = parts.next().and_then(|l| l.parse().ok());
    match parts.next() {
        Some(path) => (path.to_string(), line),
        None => (location.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_function() {}

    #[test]
    fn test_function_name() {
        assert_eq!(
            function_name(&sample_function),
            "common::rtti::tests::sample_function"
        );
    }

    #[test]
    fn test_current_function_name_macro() {
        assert_eq!(
            crate::current_function_name!(),
            "common::rtti::tests::test_current_function_name_macro"
        );
    }

    #[test]
    fn test_function_at_resolves_caller() {
        let frame = function_at(0).expect("caller frame");
        assert!(frame.name.contains("test_function_at_resolves_caller"));
    }

    #[test]
    fn test_function_at_out_of_range() {
        assert!(function_at(10_000).is_none());
        assert_eq!(specific_function_name(10_000, false), "");
    }

    #[test]
    fn test_specific_function_name_with_location() {
        let named = specific_function_name(0, true);
        assert!(named.contains("rtti.rs:"));
        assert!(named.ends_with("test_specific_function_name_with_location"));
    }

    #[test]
    fn test_split_location() {
        assert_eq!(
            split_location("/src/lib.rs:42:7"),
            ("/src/lib.rs".to_string(), Some(42))
        );
        assert_eq!(split_location("unknown"), ("unknown".to_string(), None));
    }

    #[test]
    fn test_underlying_value() {
        assert_eq!(underlying_value(Some(&"test")), UnderlyingValue::Valid);
        assert_eq!(underlying_value(Some(&"")), UnderlyingValue::Empty);
        assert_eq!(underlying_value::<u32>(None), UnderlyingValue::Missing);
        assert_eq!(
            UnderlyingValue::Missing.message(),
            "Has no underlying value"
        );
    }
}
