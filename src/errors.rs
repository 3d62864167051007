//! Error types with rich diagnostics using miette
//!
//! None of these cross the steady-state evaluation API: the style context
//! turns them into booleans and log lines. They exist so backends and parsers
//! can say *what* went wrong to whoever is listening.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::script::FunctionIndex;

// ============================================================================
// Script Errors
// ============================================================================

/// Errors reported by a scripting backend
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("failed to compile function {index}: {message}")]
    #[diagnostic(code(tilestyle::script::compile))]
    Compile { index: FunctionIndex, message: String },

    #[error("source does not evaluate to a function")]
    #[diagnostic(
        code(tilestyle::script::not_a_function),
        help("style functions are written as `function () ...` expressions")
    )]
    NotAFunction,

    #[error("no function registered at index {index}")]
    #[diagnostic(code(tilestyle::script::unknown_function))]
    UnknownFunction { index: FunctionIndex },

    #[error("script error: {message}")]
    #[diagnostic(code(tilestyle::script::runtime))]
    Runtime { message: String },
}

// ============================================================================
// Style Value Parse Errors
// ============================================================================

/// Errors from parsing style parameter strings
#[derive(Error, Diagnostic, Debug)]
pub enum StyleParseError {
    #[error("invalid {expected}")]
    #[diagnostic(code(tilestyle::parse::syntax))]
    Syntax {
        expected: &'static str,
        #[source_code]
        src: NamedSource<String>,
        #[label("could not parse this")]
        span: SourceSpan,
    },

    #[error("{what} out of range: {value}")]
    #[diagnostic(code(tilestyle::parse::out_of_range))]
    OutOfRange { what: &'static str, value: f64 },
}

impl StyleParseError {
    pub(crate) fn syntax(expected: &'static str, input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        StyleParseError::Syntax {
            expected,
            src: NamedSource::new("<style value>", input.to_string()),
            span: (offset, input.len() - offset).into(),
        }
    }
}

// ============================================================================
// Style Context Errors
// ============================================================================

/// Errors from constructing a style context
#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleContextError {
    #[error("no scripting backend compiled in")]
    #[diagnostic(
        code(tilestyle::context::no_backend),
        help("enable the `boa` or `rhai` cargo feature")
    )]
    NoBackend,
}
