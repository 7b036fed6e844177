//! Boundary-aware positions into a [`String16`].

use std::fmt;

use crate::buffer::String16;
use crate::error::IndexError;
use crate::segmentation::{BoundarySession, SegmentationAdapter, SegmentationService};

/// A code-unit offset that sits on a grapheme boundary of some buffer.
///
/// Indices are plain values: they do not borrow the buffer, and stepping returns a new index.
/// An index is only meaningful for the buffer (and buffer contents) it was produced from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundaryIndex {
    offset: usize,
}

impl BoundaryIndex {
    /// The start of any buffer.
    pub const START: Self = Self { offset: 0 };

    /// Wrap a raw offset without checking it.
    ///
    /// Use [`Indexer::index_at`](crate::Indexer::index_at) to get debug-build validation, or
    /// [`BoundaryIndex::checked`] to always validate.
    pub fn new_unchecked(offset: usize) -> Self {
        Self { offset }
    }

    /// The end of `buffer`.
    pub fn end_of(buffer: &String16) -> Self {
        Self {
            offset: buffer.len(),
        }
    }

    /// Wrap `offset` after confirming it is a boundary of `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidBoundary`] if `offset` is past the end or inside a cluster,
    /// or [`IndexError::NoSegmentationSession`] if the boundary cannot be queried.
    pub fn checked<S: SegmentationService>(
        offset: usize,
        buffer: &String16,
        segmenter: &mut SegmentationAdapter<S>,
    ) -> Result<Self, IndexError> {
        let index = Self { offset };
        if index.is_valid_in(buffer, segmenter)? {
            Ok(index)
        } else {
            Err(IndexError::InvalidBoundary {
                offset,
                len: buffer.len(),
            })
        }
    }

    /// Code-unit offset.
    pub fn offset(self) -> usize {
        self.offset
    }

    /// Returns `true` if this index lies within `buffer` on a grapheme boundary.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NoSegmentationSession`] if the boundary cannot be queried.
    pub fn is_valid_in<S: SegmentationService>(
        self,
        buffer: &String16,
        segmenter: &mut SegmentationAdapter<S>,
    ) -> Result<bool, IndexError> {
        if self.offset > buffer.len() {
            return Ok(false);
        }
        segmenter.is_boundary(buffer, self.offset)
    }

    /// Move `steps` grapheme boundaries forward (positive) or backward (negative).
    ///
    /// The walk asks the segmenter for one boundary at a time and never skips by raw code
    /// units. Zero steps returns `self` only if it is already a boundary.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutOfRange`] if the walk reaches the start or end of the buffer
    /// before every step is consumed, [`IndexError::InvalidBoundary`] for a zero-step call on a
    /// non-boundary, or [`IndexError::NoSegmentationSession`].
    pub fn step_by<S: SegmentationService>(
        self,
        steps: i64,
        buffer: &String16,
        segmenter: &mut SegmentationAdapter<S>,
    ) -> Result<Self, IndexError> {
        self.step_within(steps, 0, buffer, segmenter)
    }

    /// Like [`BoundaryIndex::step_by`], but the walk may not go below `floor`.
    pub(crate) fn step_within<S: SegmentationService>(
        self,
        steps: i64,
        floor: usize,
        buffer: &String16,
        segmenter: &mut SegmentationAdapter<S>,
    ) -> Result<Self, IndexError> {
        let len = buffer.len();
        let out_of_range = IndexError::OutOfRange {
            offset: self.offset,
            steps,
            len,
        };
        if self.offset > len || self.offset < floor {
            return Err(out_of_range);
        }

        let landed = segmenter.with_session(buffer, |session| {
            if steps == 0 {
                return session.is_boundary(self.offset).then_some(self.offset);
            }
            let mut remaining = steps;
            let mut offset = self.offset;
            while remaining < 0 && offset > floor {
                offset = session.preceding(offset)?;
                remaining += 1;
            }
            while remaining > 0 && offset < len {
                offset = session.following(offset)?;
                remaining -= 1;
            }
            (remaining == 0 && offset >= floor).then_some(offset)
        })?;

        match landed {
            Some(offset) => Ok(Self { offset }),
            None if steps == 0 => Err(IndexError::InvalidBoundary {
                offset: self.offset,
                len,
            }),
            None => Err(out_of_range),
        }
    }
}

impl fmt::Display for BoundaryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.offset)
    }
}

impl From<BoundaryIndex> for usize {
    fn from(index: BoundaryIndex) -> Self {
        index.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> SegmentationAdapter {
        SegmentationAdapter::unicode("en_US")
    }

    #[test]
    fn test_step_over_ascii() {
        let buffer = String16::from("Hello");
        let mut seg = segmenter();
        let idx = BoundaryIndex::START.step_by(3, &buffer, &mut seg).unwrap();
        assert_eq!(idx.offset(), 3);
        let back = idx.step_by(-2, &buffer, &mut seg).unwrap();
        assert_eq!(back.offset(), 1);
    }

    #[test]
    fn test_step_over_clusters() {
        // "a👍🏽e\u{301}b": clusters at 0..1, 1..5, 5..7, 7..8.
        let buffer = String16::from("a👍🏽e\u{301}b");
        let mut seg = segmenter();
        let offsets: Vec<usize> = (0..=4)
            .map(|n| {
                BoundaryIndex::START
                    .step_by(n, &buffer, &mut seg)
                    .unwrap()
                    .offset()
            })
            .collect();
        assert_eq!(offsets, vec![0, 1, 5, 7, 8]);
    }

    #[test]
    fn test_step_past_ends_fails() {
        let buffer = String16::from("ab");
        let mut seg = segmenter();
        assert!(matches!(
            BoundaryIndex::START.step_by(-1, &buffer, &mut seg),
            Err(IndexError::OutOfRange { steps: -1, .. })
        ));
        let end = BoundaryIndex::end_of(&buffer);
        assert!(matches!(
            end.step_by(1, &buffer, &mut seg),
            Err(IndexError::OutOfRange { .. })
        ));
        assert!(BoundaryIndex::START.step_by(3, &buffer, &mut seg).is_err());
    }

    #[test]
    fn test_zero_steps_requires_boundary() {
        let buffer = String16::from("👋");
        let mut seg = segmenter();
        let inside = BoundaryIndex::new_unchecked(1);
        assert!(matches!(
            inside.step_by(0, &buffer, &mut seg),
            Err(IndexError::InvalidBoundary { offset: 1, .. })
        ));
        let end = BoundaryIndex::end_of(&buffer);
        assert_eq!(end.step_by(0, &buffer, &mut seg).unwrap(), end);
    }

    #[test]
    fn test_checked_construction() {
        let buffer = String16::from("a👋");
        let mut seg = segmenter();
        assert!(BoundaryIndex::checked(1, &buffer, &mut seg).is_ok());
        assert!(BoundaryIndex::checked(2, &buffer, &mut seg).is_err());
        assert!(BoundaryIndex::checked(3, &buffer, &mut seg).is_ok());
        assert!(BoundaryIndex::checked(4, &buffer, &mut seg).is_err());
    }

    #[test]
    fn test_step_within_respects_floor() {
        let buffer = String16::from("abcd");
        let mut seg = segmenter();
        let idx = BoundaryIndex::new_unchecked(2);
        assert!(idx.step_within(-1, 2, &buffer, &mut seg).is_err());
        assert_eq!(
            idx.step_within(-1, 1, &buffer, &mut seg).unwrap().offset(),
            1
        );
    }

    #[test]
    fn test_ordering_and_display() {
        let a = BoundaryIndex::new_unchecked(1);
        let b = BoundaryIndex::new_unchecked(4);
        assert!(a < b);
        assert_eq!(b.to_string(), "@4");
        assert_eq!(usize::from(b), 4);
    }
}
