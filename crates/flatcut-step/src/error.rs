//! Error types for STEP reading.

use thiserror::Error;

/// Errors that can occur while reading a STEP file.
///
/// Every variant is fatal for the whole file: the reader never returns a
/// partial set of solids.
#[derive(Error, Debug)]
pub enum StepError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Lexer error: unexpected character or malformed token.
    #[error("lexer error at line {line}, column {col}: {message}")]
    Lexer {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Error message.
        message: String,
    },

    /// Parser error: unexpected token, malformed structure or bad argument.
    #[error("parser error{}: {message}", entity_id.map(|id| format!(" at entity #{id}")).unwrap_or_default())]
    Parser {
        /// Entity ID where the error occurred, if known.
        entity_id: Option<u64>,
        /// Error message.
        message: String,
    },

    /// A reference points at an entity that is not in the DATA section.
    #[error("missing entity reference: #{0}")]
    MissingEntity(u64),

    /// A reference points at an entity of the wrong type.
    #[error("entity #{id}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// ID of the offending entity.
        id: u64,
        /// Expected type name.
        expected: String,
        /// Actual type name.
        actual: String,
    },

    /// Invalid geometry (e.g., zero-length direction).
    #[error("invalid geometry at entity #{id}: {message}")]
    InvalidGeometry {
        /// ID of the offending entity.
        id: u64,
        /// Error message.
        message: String,
    },

    /// The DATA section contains no B-rep solids.
    #[error("no solids found in STEP file")]
    NoSolids,
}

impl StepError {
    /// Create a lexer error.
    pub fn lexer(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create a parser error.
    pub fn parser(entity_id: Option<u64>, message: impl Into<String>) -> Self {
        Self::Parser {
            entity_id,
            message: message.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(id: u64, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            id,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid geometry error.
    pub fn invalid_geometry(id: u64, message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            id,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            StepError::parser(Some(12), "bad").to_string(),
            "parser error at entity #12: bad"
        );
        assert_eq!(StepError::parser(None, "bad").to_string(), "parser error: bad");
        assert_eq!(
            StepError::type_mismatch(4, "EDGE_LOOP", "POLY_LOOP").to_string(),
            "entity #4: expected EDGE_LOOP, got POLY_LOOP"
        );
    }
}
