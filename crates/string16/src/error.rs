//! Error types shared by the index engine, the segmentation adapter and the subscript layer.

use thiserror::Error;

/// Errors produced while resolving, validating or applying boundary indices.
#[derive(Debug, Error)]
pub enum IndexError {
    /// An index or range bound is outside `[0, len]` or not on a grapheme boundary.
    #[error("invalid boundary at offset {offset} (buffer length {len})")]
    InvalidBoundary {
        /// Offending offset in code units.
        offset: usize,
        /// Buffer length in code units.
        len: usize,
    },

    /// Stepping ran past the start or end of the buffer before consuming every step.
    #[error("stepping {steps} boundaries from offset {offset} leaves the buffer (length {len})")]
    OutOfRange {
        /// Offset the walk started from.
        offset: usize,
        /// Requested signed step count.
        steps: i64,
        /// Buffer length in code units.
        len: usize,
    },

    /// A search-based expression (or every branch of an `either`) found no match.
    #[error("offset expression did not resolve to a position")]
    UnresolvedExpression,

    /// The segmentation service could not open or bind a session.
    #[error("no segmentation session available: {reason}")]
    NoSegmentationSession {
        /// Description reported by the service.
        reason: String,
    },

    /// A regex predicate failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A resolved range has its lower bound after its upper bound.
    #[error("inverted range {lower}..{upper}")]
    InvertedRange {
        /// Resolved lower offset.
        lower: usize,
        /// Resolved upper offset.
        upper: usize,
    },
}

impl IndexError {
    /// Returns `true` for failures no entry point may soften into an absent result.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::NoSegmentationSession { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = IndexError::InvalidBoundary { offset: 3, len: 2 };
        assert_eq!(
            err.to_string(),
            "invalid boundary at offset 3 (buffer length 2)"
        );

        let err = IndexError::OutOfRange {
            offset: 0,
            steps: -1,
            len: 5,
        };
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn test_only_session_failures_are_unrecoverable() {
        assert!(
            IndexError::NoSegmentationSession {
                reason: "closed".to_string()
            }
            .is_unrecoverable()
        );
        assert!(!IndexError::UnresolvedExpression.is_unrecoverable());
    }
}
