//! Error type shared by both codecs.
//!
//! Every variant is fatal for the call that produced it. Unrecognized role
//! names are not errors; they are logged and the entry becomes roleless.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    /// A documented identifier or path resolves to no node of the signature.
    #[error("the documentation of operation \"{operation}\" could not be processed: \"{identifier}\" does not exist in its signature")]
    StructuralMismatch {
        operation: String,
        identifier: String,
    },

    /// The compact format was handed an entry it cannot express.
    #[error("compact documentation could not be generated: {reason}")]
    FormatInvariantViolation { reason: String },

    /// A continuation or sub tag without a preceding @param, @return or @throws.
    #[error("@{tag} at segment {position} has no preceding @param, @return or @throws tag")]
    UnresolvedReference { tag: String, position: usize },

    /// Malformed embedded table markup.
    #[error("malformed documentation markup at byte {offset}: {reason}")]
    Markup { offset: usize, reason: String },
}

/// Returned by the codec factory for a format name it does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown format: {0}. Use compact or rich")]
pub struct UnknownFormat(pub String);

impl ParsingError {
    pub(crate) fn mismatch(operation: &str, identifier: &str) -> Self {
        ParsingError::StructuralMismatch {
            operation: operation.to_string(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn markup(offset: usize, reason: impl Into<String>) -> Self {
        ParsingError::Markup {
            offset,
            reason: reason.into(),
        }
    }
}
