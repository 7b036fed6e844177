//! Lazy traversal of grapheme clusters.
//!
//! Each call to [`Indexer::ranges`], [`Indexer::ranges_rev`] or [`Indexer::graphemes`] starts a
//! fresh walk from the buffer's current start or end. The iterators borrow the buffer, so it
//! cannot be mutated through that reference during a walk; callers sharing a buffer across
//! threads must serialize mutation against open traversals themselves.

use std::ops::Range;

use crate::buffer::String16;
use crate::config::IndexConfig;
use crate::index::BoundaryIndex;
use crate::indexer::Indexer;
use crate::segmentation::{SegmentationAdapter, SegmentationService};

/// Direction of a [`BoundaryRanges`] walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

/// Iterator over the boundary range of each cluster.
#[derive(Debug)]
pub struct BoundaryRanges<'a, S: SegmentationService> {
    buffer: &'a String16,
    segmenter: &'a mut SegmentationAdapter<S>,
    config: &'a IndexConfig,
    cursor: usize,
    direction: Direction,
}

impl<S: SegmentationService> Iterator for BoundaryRanges<'_, S> {
    type Item = Range<BoundaryIndex>;

    fn next(&mut self) -> Option<Self::Item> {
        let buffer = self.buffer;
        let cursor = self.cursor;
        let queried = match self.direction {
            Direction::Forward => self.segmenter.following_boundary(buffer, cursor),
            Direction::Reverse => self.segmenter.preceding_boundary(buffer, cursor),
        };
        let next = match queried {
            Ok(next) => next?,
            Err(err) => self.config.fail(&err),
        };
        self.cursor = next;
        let (lower, upper) = match self.direction {
            Direction::Forward => (cursor, next),
            Direction::Reverse => (next, cursor),
        };
        Some(BoundaryIndex::new_unchecked(lower)..BoundaryIndex::new_unchecked(upper))
    }
}

/// Iterator over decoded clusters.
#[derive(Debug)]
pub struct Graphemes<'a, S: SegmentationService> {
    ranges: BoundaryRanges<'a, S>,
}

impl<S: SegmentationService> Iterator for Graphemes<'_, S> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let range = self.ranges.next()?;
        Some(
            self.ranges
                .buffer
                .decode_range(range.start.offset()..range.end.offset()),
        )
    }
}

impl<S: SegmentationService> Indexer<S> {
    /// Cluster ranges of `buffer` from start to end.
    pub fn ranges<'a>(&'a mut self, buffer: &'a String16) -> BoundaryRanges<'a, S> {
        BoundaryRanges {
            buffer,
            segmenter: &mut self.segmenter,
            config: &self.config,
            cursor: 0,
            direction: Direction::Forward,
        }
    }

    /// Cluster ranges of `buffer` from end to start.
    pub fn ranges_rev<'a>(&'a mut self, buffer: &'a String16) -> BoundaryRanges<'a, S> {
        BoundaryRanges {
            buffer,
            segmenter: &mut self.segmenter,
            config: &self.config,
            cursor: buffer.len(),
            direction: Direction::Reverse,
        }
    }

    /// Decoded clusters of `buffer` from start to end.
    pub fn graphemes<'a>(&'a mut self, buffer: &'a String16) -> Graphemes<'a, S> {
        Graphemes {
            ranges: self.ranges(buffer),
        }
    }

    /// Number of clusters in `buffer`.
    pub fn grapheme_count(&mut self, buffer: &String16) -> usize {
        self.ranges(buffer).count()
    }
}
