//! # Test Support
//!
//! Assertion helpers with option flags for inverted, substring and textual
//! comparisons. Failures report the observed and expected values with their
//! types and the caller's `file:line`.

pub mod assertions;

pub use assertions::{assert_that, expect_that, AssertOptions};
