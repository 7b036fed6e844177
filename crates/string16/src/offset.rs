//! Symbolic positions.
//!
//! An [`OffsetExpression`] describes a position ("the start", "after the last `\w+` match",
//! "two clusters before the first space") without referring to any buffer. Resolving it
//! against a buffer yields a [`BoundaryIndex`], or fails if a search finds nothing or a step
//! leaves the buffer.
//!
//! Resolution happens inside a search window that begins at an origin offset (0 at the top
//! level). `start` is the origin, `end` is the buffer length, searches never report matches
//! before the origin and stepping never crosses it. The window only moves for expression-valued
//! deltas under [`NestedDelta::SearchFromBase`].

use std::fmt;

use crate::buffer::String16;
use crate::config::NestedDelta;
use crate::error::IndexError;
use crate::index::BoundaryIndex;
use crate::predicate::Predicate;
use crate::segmentation::{SegmentationAdapter, SegmentationService};

/// Which side of a match a search expression resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// The boundary immediately before the match.
    #[default]
    Leading,
    /// The boundary immediately after the match.
    Trailing,
}

/// Displacement applied by [`OffsetExpression::Offset`].
#[derive(Debug, Clone)]
pub enum Delta {
    /// Move this many grapheme boundaries (negative moves backward).
    Steps(i64),
    /// A nested expression, interpreted according to [`NestedDelta`].
    Expression(Box<OffsetExpression>),
}

/// A position described symbolically, resolved lazily against a buffer.
#[derive(Debug, Clone)]
pub enum OffsetExpression {
    /// Start of the search window (offset 0 at the top level).
    Start,
    /// End of the buffer.
    End,
    /// First match of a predicate.
    First {
        /// What to search for.
        predicate: Predicate,
        /// Side of the match to resolve to.
        anchor: Anchor,
    },
    /// Last match of a predicate.
    Last {
        /// What to search for.
        predicate: Predicate,
        /// Side of the match to resolve to.
        anchor: Anchor,
    },
    /// Ordered fallback: the first expression if it resolves, otherwise the second.
    Either(Box<OffsetExpression>, Box<OffsetExpression>),
    /// A base position moved by a delta.
    Offset {
        /// Position to move from.
        base: Box<OffsetExpression>,
        /// How far to move.
        delta: Delta,
    },
}

impl OffsetExpression {
    /// Start of the buffer.
    pub fn start() -> Self {
        Self::Start
    }

    /// End of the buffer.
    pub fn end() -> Self {
        Self::End
    }

    /// Boundary before the first match of `predicate`.
    pub fn first(predicate: Predicate) -> Self {
        Self::First {
            predicate,
            anchor: Anchor::Leading,
        }
    }

    /// Boundary after the first match of `predicate`.
    pub fn first_trailing(predicate: Predicate) -> Self {
        Self::First {
            predicate,
            anchor: Anchor::Trailing,
        }
    }

    /// Boundary before the last match of `predicate`.
    pub fn last(predicate: Predicate) -> Self {
        Self::Last {
            predicate,
            anchor: Anchor::Leading,
        }
    }

    /// Boundary after the last match of `predicate`.
    pub fn last_trailing(predicate: Predicate) -> Self {
        Self::Last {
            predicate,
            anchor: Anchor::Trailing,
        }
    }

    /// Boundary before the first cluster starting with `ch`.
    pub fn first_char(ch: char) -> Self {
        Self::first(Predicate::char(ch))
    }

    /// Boundary before the last cluster starting with `ch`.
    pub fn last_char(ch: char) -> Self {
        Self::last(Predicate::char(ch))
    }

    /// `primary` if it resolves, otherwise `fallback`.
    pub fn either(primary: Self, fallback: Self) -> Self {
        Self::Either(Box::new(primary), Box::new(fallback))
    }

    /// `self` if it resolves, otherwise `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self::either(self, fallback)
    }

    /// Move `steps` grapheme boundaries from `self`.
    pub fn offset(self, steps: i64) -> Self {
        Self::Offset {
            base: Box::new(self),
            delta: Delta::Steps(steps),
        }
    }

    /// Move from `self` by a nested expression.
    pub fn offset_by(self, delta: Self) -> Self {
        Self::Offset {
            base: Box::new(self),
            delta: Delta::Expression(Box::new(delta)),
        }
    }

    /// Resolve against `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnresolvedExpression`] if a search finds no match,
    /// [`IndexError::OutOfRange`] if a step leaves the buffer, or
    /// [`IndexError::NoSegmentationSession`].
    pub fn resolve<S: SegmentationService>(
        &self,
        buffer: &String16,
        segmenter: &mut SegmentationAdapter<S>,
        nested: NestedDelta,
    ) -> Result<BoundaryIndex, IndexError> {
        let resolved = Resolver {
            buffer,
            segmenter,
            nested,
        }
        .resolve(self, 0);
        if let Err(err) = &resolved {
            tracing::debug!(expression = %self, error = %err, "offset expression did not resolve");
        }
        resolved
    }
}

struct Resolver<'a, S: SegmentationService> {
    buffer: &'a String16,
    segmenter: &'a mut SegmentationAdapter<S>,
    nested: NestedDelta,
}

impl<S: SegmentationService> Resolver<'_, S> {
    fn resolve(
        &mut self,
        expr: &OffsetExpression,
        origin: usize,
    ) -> Result<BoundaryIndex, IndexError> {
        match expr {
            OffsetExpression::Start => Ok(BoundaryIndex::new_unchecked(origin)),
            OffsetExpression::End => Ok(BoundaryIndex::end_of(self.buffer)),
            OffsetExpression::First { predicate, anchor } => {
                self.search(origin, *anchor, |units, session| {
                    predicate.first_match(units, origin, session)
                })
            }
            OffsetExpression::Last { predicate, anchor } => {
                self.search(origin, *anchor, |units, session| {
                    predicate.last_match(units, origin, session)
                })
            }
            OffsetExpression::Either(primary, fallback) => match self.resolve(primary, origin) {
                Ok(index) => Ok(index),
                Err(err) if err.is_unrecoverable() => Err(err),
                Err(_) => self.resolve(fallback, origin),
            },
            OffsetExpression::Offset { base, delta } => {
                let base = self.resolve(base, origin)?;
                match delta {
                    Delta::Steps(steps) => {
                        base.step_within(*steps, origin, self.buffer, self.segmenter)
                    }
                    Delta::Expression(delta) => match self.nested {
                        NestedDelta::SearchFromBase => self.resolve(delta, base.offset()),
                        NestedDelta::AbsoluteSteps => {
                            let steps = self.resolve(delta, origin)?.offset();
                            let steps = i64::try_from(steps).map_err(|_| {
                                IndexError::OutOfRange {
                                    offset: base.offset(),
                                    steps: i64::MAX,
                                    len: self.buffer.len(),
                                }
                            })?;
                            base.step_within(steps, origin, self.buffer, self.segmenter)
                        }
                    },
                }
            }
        }
    }

    fn search(
        &mut self,
        origin: usize,
        anchor: Anchor,
        find: impl FnOnce(&[u16], &S::Session) -> Option<std::ops::Range<usize>>,
    ) -> Result<BoundaryIndex, IndexError> {
        let buffer = self.buffer;
        let units = buffer.as_units();
        if origin > units.len() {
            return Err(IndexError::UnresolvedExpression);
        }
        let found = self
            .segmenter
            .with_session(buffer, |session| find(units, session))?;
        let range = found.ok_or(IndexError::UnresolvedExpression)?;
        Ok(BoundaryIndex::new_unchecked(match anchor {
            Anchor::Leading => range.start,
            Anchor::Trailing => range.end,
        }))
    }
}

impl fmt::Display for OffsetExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, ".start"),
            Self::End => write!(f, ".end"),
            Self::First { predicate, anchor } => {
                write!(f, ".first({predicate}{})", anchor_suffix(*anchor))
            }
            Self::Last { predicate, anchor } => {
                write!(f, ".last({predicate}{})", anchor_suffix(*anchor))
            }
            Self::Either(primary, fallback) => write!(f, ".either({primary}, {fallback})"),
            Self::Offset { base, delta } => match delta {
                Delta::Steps(steps) if *steps < 0 => write!(f, "{base}{steps}"),
                Delta::Steps(steps) => write!(f, "{base}+{steps}"),
                Delta::Expression(delta) => write!(f, "{base}+({delta})"),
            },
        }
    }
}

fn anchor_suffix(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Leading => "",
        Anchor::Trailing => ", trailing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(expr: &OffsetExpression, text: &str) -> Result<usize, IndexError> {
        resolve_with(expr, text, NestedDelta::SearchFromBase)
    }

    fn resolve_with(
        expr: &OffsetExpression,
        text: &str,
        nested: NestedDelta,
    ) -> Result<usize, IndexError> {
        let buffer = String16::from(text);
        let mut seg = SegmentationAdapter::unicode("en_US");
        expr.resolve(&buffer, &mut seg, nested)
            .map(BoundaryIndex::offset)
    }

    #[test]
    fn test_start_and_end() {
        assert_eq!(resolve(&OffsetExpression::start(), "a👋b").unwrap(), 0);
        assert_eq!(resolve(&OffsetExpression::end(), "a👋b").unwrap(), 4);
        assert_eq!(resolve(&OffsetExpression::end(), "").unwrap(), 0);
    }

    #[test]
    fn test_first_and_last_chars() {
        let text = "Hello, World!";
        assert_eq!(resolve(&OffsetExpression::first_char('o'), text).unwrap(), 4);
        assert_eq!(resolve(&OffsetExpression::last_char('o'), text).unwrap(), 8);
        let trailing = OffsetExpression::first_trailing(Predicate::char('o'));
        assert_eq!(resolve(&trailing, text).unwrap(), 5);
        assert!(matches!(
            resolve(&OffsetExpression::first_char('z'), text),
            Err(IndexError::UnresolvedExpression)
        ));
    }

    #[test]
    fn test_either_is_ordered_fallback() {
        let text = "Hello, World!";
        let missing = OffsetExpression::first_char('z').or(OffsetExpression::first_char('W'));
        assert_eq!(resolve(&missing, text).unwrap(), 7);

        // Both branches match; only the first is used.
        let both = OffsetExpression::either(
            OffsetExpression::first_char('W'),
            OffsetExpression::first_char('H'),
        );
        assert_eq!(resolve(&both, text).unwrap(), 7);

        let neither = OffsetExpression::first_char('z').or(OffsetExpression::last_char('q'));
        assert!(resolve(&neither, text).is_err());
    }

    #[test]
    fn test_integer_offsets() {
        let text = "Hello";
        assert_eq!(resolve(&OffsetExpression::start().offset(2), text).unwrap(), 2);
        assert_eq!(resolve(&OffsetExpression::end().offset(-2), text).unwrap(), 3);
        assert!(resolve(&OffsetExpression::start().offset(-1), text).is_err());
        assert!(resolve(&OffsetExpression::end().offset(1), text).is_err());
        assert_eq!(
            resolve(&OffsetExpression::end().offset(0).offset(0), text).unwrap(),
            5
        );
    }

    #[test]
    fn test_offsets_count_clusters() {
        // "👍🏽" is one cluster of four units.
        let text = "a👍🏽b";
        assert_eq!(resolve(&OffsetExpression::start().offset(2), text).unwrap(), 5);
        assert_eq!(resolve(&OffsetExpression::end().offset(-2), text).unwrap(), 1);
    }

    #[test]
    fn test_nested_delta_searches_from_base() {
        // The second 'o' of "Hello, World?!" is found by searching from just past the first.
        let expr = OffsetExpression::first_char('o')
            .offset(1)
            .offset_by(OffsetExpression::first_char('o'));
        assert_eq!(resolve(&expr, "Hello, World?!").unwrap(), 8);

        let word_end = || OffsetExpression::first_trailing(Predicate::regex(r"\w+").unwrap());
        let second_word_end = word_end().offset_by(word_end());
        assert_eq!(resolve(&second_word_end, "Hi, World?!.").unwrap(), 9);
    }

    #[test]
    fn test_nested_delta_absolute_steps() {
        // first 'o' + 1 = 5, then step by the raw offset of the first 'o' (4) to 9.
        let expr = OffsetExpression::first_char('o')
            .offset(1)
            .offset_by(OffsetExpression::first_char('o'));
        assert_eq!(
            resolve_with(&expr, "Hello, World?!", NestedDelta::AbsoluteSteps).unwrap(),
            9
        );
    }

    #[test]
    fn test_window_start_is_base() {
        // Inside a nested delta, `start` is the base and stepping may not cross it.
        let expr = OffsetExpression::first_char(',').offset_by(OffsetExpression::start());
        assert_eq!(resolve(&expr, "ab,cd").unwrap(), 2);
        let before = OffsetExpression::first_char(',')
            .offset_by(OffsetExpression::start().offset(-1));
        assert!(resolve(&before, "ab,cd").is_err());
        // A last-match search inside the window ignores matches before the base.
        let expr = OffsetExpression::first_char('c').offset_by(OffsetExpression::last_char('a'));
        assert!(resolve(&expr, "abcab").is_ok());
        let expr = OffsetExpression::last_char('b').offset_by(OffsetExpression::last_char('a'));
        assert!(resolve(&expr, "abcab").is_err());
    }

    #[test]
    fn test_regex_anchors() {
        let text = "Hi, World?!.";
        let word = || Predicate::regex(r"\w+").unwrap();
        assert_eq!(resolve(&OffsetExpression::first(word()), text).unwrap(), 0);
        assert_eq!(
            resolve(&OffsetExpression::first_trailing(word()), text).unwrap(),
            2
        );
        assert_eq!(resolve(&OffsetExpression::last(word()), text).unwrap(), 4);
        assert_eq!(
            resolve(&OffsetExpression::last_trailing(word()), text).unwrap(),
            9
        );
    }

    #[test]
    fn test_display() {
        let expr = OffsetExpression::first_char('o')
            .offset(1)
            .offset_by(OffsetExpression::end().offset(-1));
        assert_eq!(expr.to_string(), ".first([o])+1+(.end-1)");
        let expr = OffsetExpression::either(
            OffsetExpression::start(),
            OffsetExpression::last_trailing(Predicate::literal("x")),
        );
        assert_eq!(expr.to_string(), ".either(.start, .last(\"x\", trailing))");
    }
}
