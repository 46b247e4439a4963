use thiserror::Error;

use crate::program::LineIndex;

/// The kind of thing that went wrong while preprocessing a Smali listing.
///
/// Every variant here is fatal: none of these can be recovered by the
/// emulated program itself (contrast with an emulated Java exception, which
/// `smali-vm` routes to a `.catch` block when one applies).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unterminated '.{0}' block")]
    UnterminatedBlock(&'static str),

    #[error("'.end {0}' with no matching '.{0}' block open")]
    UnmatchedEnd(&'static str),

    #[error("unknown directive '{0}'")]
    UnknownDirective(String),

    #[error("label '{0}' is referenced but never bound")]
    UnresolvedLabel(String),

    #[error("malformed integer literal '{0}'")]
    MalformedLiteral(String),

    #[error("malformed '.catch' directive")]
    MalformedCatch,

    #[error("malformed '.method' directive")]
    MalformedMethod,

    #[error("no executable method found in source")]
    NoEntryMethod,

    #[error("requested entry method '{0}' was not found")]
    EntryMethodNotFound(String),

    #[error("malformed string literal")]
    MalformedStringLiteral,

    #[error("'.{0}' block must be preceded by a label")]
    OrphanedBlock(&'static str),
}

/// A fatal parse error, naming the offending source line (spec.md §7: the
/// caller receives a diagnostic and no `Program`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} (line {line}: {text:?})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: LineIndex,
    pub text: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: LineIndex, text: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            text: text.into(),
        }
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
