//! The [`Indexer`]: configuration plus a segmentation session, and the entry points that turn
//! expressions and raw offsets into boundary indices.
//!
//! Entry points come in two flavours. Plain ones (`index_of`, `get`, `char_at`, ...) hand any
//! failure to the configured [`FailureHandler`](crate::FailureHandler), which by default panics.
//! `safe_` ones return `None` instead. `try_` ones return the [`IndexError`] to the caller.
//! A missing segmentation session is never softened.

use crate::buffer::String16;
use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::index::BoundaryIndex;
use crate::offset::OffsetExpression;
use crate::segmentation::{SegmentationAdapter, SegmentationService, UnicodeSegmenter};

/// Resolves positions and reads/writes [`String16`] buffers on grapheme boundaries.
///
/// An `Indexer` owns a segmentation session that is rebound to whichever buffer is passed in,
/// so one indexer can serve many buffers. It is not meant to be shared between threads; give
/// each worker its own.
#[derive(Debug)]
pub struct Indexer<S: SegmentationService = UnicodeSegmenter> {
    pub(crate) config: IndexConfig,
    pub(crate) segmenter: SegmentationAdapter<S>,
}

impl Indexer<UnicodeSegmenter> {
    /// Indexer backed by `unicode-segmentation`.
    pub fn new(config: IndexConfig) -> Self {
        Self::with_service(UnicodeSegmenter, config)
    }
}

impl Default for Indexer<UnicodeSegmenter> {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl<S: SegmentationService> Indexer<S> {
    /// Indexer backed by a custom segmentation service.
    pub fn with_service(service: S, config: IndexConfig) -> Self {
        let segmenter = SegmentationAdapter::new(service, config.locale.clone());
        Self { config, segmenter }
    }

    /// Active configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The segmentation adapter, for direct boundary queries.
    pub fn segmenter(&mut self) -> &mut SegmentationAdapter<S> {
        &mut self.segmenter
    }

    /// Resolve `expr` against `buffer`.
    ///
    /// # Errors
    ///
    /// See [`OffsetExpression::resolve`].
    pub fn try_index_of(
        &mut self,
        buffer: &String16,
        expr: &OffsetExpression,
    ) -> Result<BoundaryIndex, IndexError> {
        expr.resolve(buffer, &mut self.segmenter, self.config.nested_delta)
    }

    /// Resolve `expr`, or `None` if it has no position in `buffer`.
    pub fn safe_index_of(
        &mut self,
        buffer: &String16,
        expr: &OffsetExpression,
    ) -> Option<BoundaryIndex> {
        let resolved = self.try_index_of(buffer, expr);
        self.soften(resolved)
    }

    /// Resolve `expr`, invoking the failure handler if it has no position in `buffer`.
    pub fn index_of(&mut self, buffer: &String16, expr: &OffsetExpression) -> BoundaryIndex {
        let resolved = self.try_index_of(buffer, expr);
        self.or_fail(resolved)
    }

    /// Start of `buffer`.
    ///
    /// Always offset 0; the buffer is taken for symmetry with [`Indexer::end_index`].
    pub fn start_index(&self, _buffer: &String16) -> BoundaryIndex {
        BoundaryIndex::START
    }

    /// End of `buffer`.
    pub fn end_index(&self, buffer: &String16) -> BoundaryIndex {
        BoundaryIndex::end_of(buffer)
    }

    /// Wrap a raw offset.
    ///
    /// Release builds do not check the offset. Debug builds confirm it is a boundary and
    /// either log a warning or, with [`IndexConfig::strict_construction`], invoke the failure
    /// handler.
    pub fn index_at(&mut self, buffer: &String16, offset: usize) -> BoundaryIndex {
        let index = BoundaryIndex::new_unchecked(offset);
        if cfg!(debug_assertions) {
            match index.is_valid_in(buffer, &mut self.segmenter) {
                Ok(true) => {}
                Ok(false) => {
                    let err = IndexError::InvalidBoundary {
                        offset,
                        len: buffer.len(),
                    };
                    if self.config.strict_construction {
                        self.config.fail(&err);
                    }
                    tracing::warn!(offset, len = buffer.len(), "creating invalid index");
                }
                Err(err) => self.config.fail(&err),
            }
        }
        index
    }

    /// Returns `true` if `offset` is a grapheme boundary of `buffer`.
    pub fn is_boundary(&mut self, buffer: &String16, offset: usize) -> bool {
        let index = BoundaryIndex::new_unchecked(offset);
        let valid = index.is_valid_in(buffer, &mut self.segmenter);
        self.or_fail(valid)
    }

    /// Step `index` by `steps` clusters, or `None` if that leaves the buffer.
    pub fn step(
        &mut self,
        buffer: &String16,
        index: BoundaryIndex,
        steps: i64,
    ) -> Option<BoundaryIndex> {
        let stepped = index.step_by(steps, buffer, &mut self.segmenter);
        self.soften(stepped)
    }

    /// The boundary after `index`.
    ///
    /// At the end of the buffer this returns the end if
    /// [`IndexConfig::clamp_on_overflow`] is set and invokes the failure handler otherwise.
    pub fn index_after(&mut self, buffer: &String16, index: BoundaryIndex) -> BoundaryIndex {
        let stepped = index.step_by(1, buffer, &mut self.segmenter);
        self.clamped(stepped, BoundaryIndex::end_of(buffer))
    }

    /// The boundary before `index`; clamps to the start like [`Indexer::index_after`].
    pub fn index_before(&mut self, buffer: &String16, index: BoundaryIndex) -> BoundaryIndex {
        let stepped = index.step_by(-1, buffer, &mut self.segmenter);
        self.clamped(stepped, BoundaryIndex::START)
    }

    fn clamped(
        &self,
        stepped: Result<BoundaryIndex, IndexError>,
        limit: BoundaryIndex,
    ) -> BoundaryIndex {
        match stepped {
            Ok(index) => index,
            Err(err) if self.config.clamp_on_overflow && !err.is_unrecoverable() => limit,
            Err(err) => self.config.fail(&err),
        }
    }

    pub(crate) fn soften<T>(&self, result: Result<T, IndexError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) if err.is_unrecoverable() => self.config.fail(&err),
            Err(_) => None,
        }
    }

    pub(crate) fn or_fail<T>(&self, result: Result<T, IndexError>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.config.fail(&err),
        }
    }
}
