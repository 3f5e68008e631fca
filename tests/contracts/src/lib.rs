//! Cross-store contract tests for the engine live in the tests
//! directory. This crate intentionally exports nothing.
