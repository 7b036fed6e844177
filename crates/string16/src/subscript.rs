//! Validated reads and writes of substrings and single grapheme clusters.
//!
//! Both bounds of every range are checked before the buffer is touched: each must lie in
//! `[0, len]` on a grapheme boundary, and the lower bound may not exceed the upper.
//!
//! Writes are always validated fatally. Reads follow [`IndexConfig::read_validation`]: in debug
//! builds [`ReadValidation::LogOnly`] logs the problem and reads the clamped range instead.
//! Release builds ignore that setting, so nothing may rely on the lenient mode in production.
//!
//! A cluster is returned as a `String`, since a Rust `char` is a single scalar.
//!
//! [`IndexConfig::read_validation`]: crate::IndexConfig::read_validation
//! [`ReadValidation::LogOnly`]: crate::ReadValidation::LogOnly

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::buffer::String16;
use crate::error::IndexError;
use crate::index::BoundaryIndex;
use crate::indexer::Indexer;
use crate::offset::OffsetExpression;
use crate::segmentation::SegmentationService;

/// A range whose bounds are offset expressions.
///
/// Implemented for `a..b`, `..b`, `a..` and `..`; open ends mean the start and end of the
/// buffer.
pub trait ExpressionRange {
    /// Lower and upper bound expressions.
    fn into_bounds(self) -> (OffsetExpression, OffsetExpression);
}

impl ExpressionRange for Range<OffsetExpression> {
    fn into_bounds(self) -> (OffsetExpression, OffsetExpression) {
        (self.start, self.end)
    }
}

impl ExpressionRange for RangeTo<OffsetExpression> {
    fn into_bounds(self) -> (OffsetExpression, OffsetExpression) {
        (OffsetExpression::Start, self.end)
    }
}

impl ExpressionRange for RangeFrom<OffsetExpression> {
    fn into_bounds(self) -> (OffsetExpression, OffsetExpression) {
        (self.start, OffsetExpression::End)
    }
}

impl ExpressionRange for RangeFull {
    fn into_bounds(self) -> (OffsetExpression, OffsetExpression) {
        (OffsetExpression::Start, OffsetExpression::End)
    }
}

impl<S: SegmentationService> Indexer<S> {
    /// Check that both bounds of `range` are boundaries of `buffer` and in order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidBoundary`] or [`IndexError::InvertedRange`], or
    /// [`IndexError::NoSegmentationSession`] if boundaries cannot be queried.
    pub fn validate(
        &mut self,
        buffer: &String16,
        range: &Range<BoundaryIndex>,
    ) -> Result<(), IndexError> {
        for bound in [range.start, range.end] {
            if !bound.is_valid_in(buffer, &mut self.segmenter)? {
                return Err(IndexError::InvalidBoundary {
                    offset: bound.offset(),
                    len: buffer.len(),
                });
            }
        }
        if range.start > range.end {
            return Err(IndexError::InvertedRange {
                lower: range.start.offset(),
                upper: range.end.offset(),
            });
        }
        Ok(())
    }

    /// Decode the clusters in `range`.
    ///
    /// # Errors
    ///
    /// Returns the validation error unless lenient read validation is in effect.
    pub fn try_read(
        &mut self,
        buffer: &String16,
        range: Range<BoundaryIndex>,
    ) -> Result<String, IndexError> {
        match self.validate(buffer, &range) {
            Ok(()) => {}
            Err(err) if self.config.reads_log_only() && !err.is_unrecoverable() => {
                tracing::warn!(
                    lower = range.start.offset(),
                    upper = range.end.offset(),
                    error = %err,
                    "reading invalid range"
                );
            }
            Err(err) => return Err(err),
        }
        Ok(buffer.decode_range(range.start.offset()..range.end.offset()))
    }

    /// Decode the clusters in `range`, invoking the failure handler if it is invalid.
    pub fn read(&mut self, buffer: &String16, range: Range<BoundaryIndex>) -> String {
        let read = self.try_read(buffer, range);
        self.or_fail(read)
    }

    /// Replace the code units in `range` with the encoding of `value`.
    ///
    /// A zero-width range inserts; an empty `value` deletes.
    ///
    /// # Errors
    ///
    /// Returns the validation error; the buffer is left untouched.
    pub fn try_write(
        &mut self,
        buffer: &mut String16,
        range: Range<BoundaryIndex>,
        value: &str,
    ) -> Result<(), IndexError> {
        self.validate(buffer, &range)?;
        let replacement: Vec<u16> = value.encode_utf16().collect();
        buffer.replace_units(range.start.offset()..range.end.offset(), &replacement);
        Ok(())
    }

    /// Replace `range` with `value`, invoking the failure handler if `range` is invalid.
    pub fn write(&mut self, buffer: &mut String16, range: Range<BoundaryIndex>, value: &str) {
        let written = self.try_write(buffer, range, value);
        self.or_fail(written);
    }

    /// The cluster starting at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutOfRange`] at the end of the buffer, or a validation error.
    pub fn try_read_char(
        &mut self,
        buffer: &String16,
        at: BoundaryIndex,
    ) -> Result<String, IndexError> {
        let next = at.step_by(1, buffer, &mut self.segmenter)?;
        self.try_read(buffer, at..next)
    }

    /// The cluster starting at `at`, invoking the failure handler if there is none.
    pub fn read_char(&mut self, buffer: &String16, at: BoundaryIndex) -> String {
        let read = self.try_read_char(buffer, at);
        self.or_fail(read)
    }

    /// Replace the cluster starting at `at` with `value`; at the end of the buffer, append.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `at` is not a boundary of `buffer`.
    pub fn try_write_char(
        &mut self,
        buffer: &mut String16,
        at: BoundaryIndex,
        value: &str,
    ) -> Result<(), IndexError> {
        let end = BoundaryIndex::end_of(buffer);
        let upper = if at == end {
            at
        } else {
            at.step_by(1, buffer, &mut self.segmenter)?
        };
        self.try_write(buffer, at..upper, value)
    }

    /// Replace (or, at the end, append) one cluster, invoking the failure handler on error.
    pub fn write_char(&mut self, buffer: &mut String16, at: BoundaryIndex, value: &str) {
        let written = self.try_write_char(buffer, at, value);
        self.or_fail(written);
    }

    /// Resolve both bounds of an expression range.
    ///
    /// # Errors
    ///
    /// Returns the resolution error of either bound, or [`IndexError::InvertedRange`].
    pub fn try_range_of(
        &mut self,
        buffer: &String16,
        range: impl ExpressionRange,
    ) -> Result<Range<BoundaryIndex>, IndexError> {
        let (lower, upper) = range.into_bounds();
        let lower = self.try_index_of(buffer, &lower)?;
        let upper = self.try_index_of(buffer, &upper)?;
        if lower > upper {
            return Err(IndexError::InvertedRange {
                lower: lower.offset(),
                upper: upper.offset(),
            });
        }
        Ok(lower..upper)
    }

    /// Decode an expression range, invoking the failure handler if it does not resolve.
    pub fn get(&mut self, buffer: &String16, range: impl ExpressionRange) -> String {
        let read = self
            .try_range_of(buffer, range)
            .and_then(|range| self.try_read(buffer, range));
        self.or_fail(read)
    }

    /// Decode an expression range, or `None` if it does not resolve.
    pub fn safe_get(&mut self, buffer: &String16, range: impl ExpressionRange) -> Option<String> {
        let read = self
            .try_range_of(buffer, range)
            .and_then(|range| self.try_read(buffer, range));
        self.soften(read)
    }

    /// Replace an expression range with `value`.
    ///
    /// # Errors
    ///
    /// Returns the resolution or validation error; the buffer is left untouched.
    pub fn try_set(
        &mut self,
        buffer: &mut String16,
        range: impl ExpressionRange,
        value: &str,
    ) -> Result<(), IndexError> {
        let range = self.try_range_of(buffer, range)?;
        self.try_write(buffer, range, value)
    }

    /// Replace an expression range with `value`, invoking the failure handler on error.
    pub fn set(&mut self, buffer: &mut String16, range: impl ExpressionRange, value: &str) {
        let written = self.try_set(buffer, range, value);
        self.or_fail(written);
    }

    /// Replace an expression range with `value`; `false` if the range does not resolve or is
    /// not valid, in which case the buffer is untouched.
    pub fn safe_set(
        &mut self,
        buffer: &mut String16,
        range: impl ExpressionRange,
        value: &str,
    ) -> bool {
        let written = self.try_set(buffer, range, value);
        self.soften(written).is_some()
    }

    /// Insert `value` at `at`.
    pub fn insert(&mut self, buffer: &mut String16, at: &OffsetExpression, value: &str) {
        self.set(buffer, at.clone()..at.clone(), value);
    }

    /// Delete an expression range.
    pub fn remove(&mut self, buffer: &mut String16, range: impl ExpressionRange) {
        self.set(buffer, range, "");
    }

    /// The cluster at an expression, invoking the failure handler if there is none.
    pub fn char_at(&mut self, buffer: &String16, at: &OffsetExpression) -> String {
        let read = self
            .try_index_of(buffer, at)
            .and_then(|index| self.try_read_char(buffer, index));
        self.or_fail(read)
    }

    /// The cluster at an expression, or `None` if there is none.
    pub fn safe_char_at(&mut self, buffer: &String16, at: &OffsetExpression) -> Option<String> {
        let read = self
            .try_index_of(buffer, at)
            .and_then(|index| self.try_read_char(buffer, index));
        self.soften(read)
    }

    /// Replace the cluster at an expression (append at the end).
    ///
    /// # Errors
    ///
    /// Returns the resolution or validation error; the buffer is left untouched.
    pub fn try_set_char_at(
        &mut self,
        buffer: &mut String16,
        at: &OffsetExpression,
        value: &str,
    ) -> Result<(), IndexError> {
        let index = self.try_index_of(buffer, at)?;
        self.try_write_char(buffer, index, value)
    }

    /// Replace the cluster at an expression (append at the end), invoking the failure handler
    /// on error.
    pub fn set_char_at(&mut self, buffer: &mut String16, at: &OffsetExpression, value: &str) {
        let written = self.try_set_char_at(buffer, at, value);
        self.or_fail(written);
    }

    /// Replace the cluster at an expression (append at the end); `false` if there is none.
    pub fn safe_set_char_at(
        &mut self,
        buffer: &mut String16,
        at: &OffsetExpression,
        value: &str,
    ) -> bool {
        let written = self.try_set_char_at(buffer, at, value);
        self.soften(written).is_some()
    }
}
