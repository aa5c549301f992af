//! Rich error reporting with source spans.
//!
//! The front end itself accumulates plain [`Diagnostic`]s — a message and
//! the span it refers to — which is all the pipeline needs. The CLI wraps
//! them in [`CompileError`] so miette can render source context with an
//! underline.

use crate::token::Span;
use miette::SourceSpan;
use thiserror::Error;

/// A single front-end message, as logged by the lexer, parser, or resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            self.span.start, self.span.end, self.message
        )
    }
}

/// A compiler error with source attached, for terminal rendering.
#[derive(Error, Debug, miette::Diagnostic)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,

    #[source_code]
    pub src: String,

    #[label("{label}")]
    pub span: SourceSpan,

    pub label: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>, src: &str, span: Span, label: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            src: src.to_string(),
            span: (span.start, span.end.saturating_sub(span.start)).into(),
            label: label.into(),
        }
    }

    /// Attach source text to a front-end diagnostic.
    pub fn from_diagnostic(diag: &Diagnostic, src: &str) -> Self {
        Self::new(diag.message.clone(), src, diag.span, "here")
    }
}
