//! Grapheme boundary queries over UTF-16 text.
//!
//! The index engine never applies Unicode segmentation rules itself. It asks a
//! [`BoundarySession`] opened by a [`SegmentationService`]; the [`SegmentationAdapter`] owns one
//! such session, opens it lazily and rebinds it when a query names a buffer other than the one
//! it is bound to. Bindings are keyed on [`String16::revision`], so repeated queries against an
//! unchanged buffer cost no re-segmentation and no comparison of its contents.
//!
//! [`UnicodeSegmenter`] is the default service, backed by `unicode-segmentation`'s extended
//! grapheme clusters.

use std::fmt;

use unicode_segmentation::UnicodeSegmentation;

use crate::buffer::String16;
use crate::error::IndexError;

/// A live binding to a segmentation engine. Offsets are UTF-16 code units.
///
/// Dropping the session closes it.
pub trait BoundarySession {
    /// Re-point the session at `text`. The adapter calls this only when the bound buffer's
    /// contents may have changed; `text` is borrowed for the call and must not be retained.
    fn set_text(&mut self, text: &[u16]);

    /// Returns `true` if `offset` is the start, the end, or between two clusters.
    fn is_boundary(&self, offset: usize) -> bool;

    /// Last boundary strictly before `offset`; `None` at the start of the text.
    fn preceding(&self, offset: usize) -> Option<usize>;

    /// First boundary strictly after `offset`; `None` at or past the end of the text.
    fn following(&self, offset: usize) -> Option<usize>;
}

/// Factory for boundary sessions.
pub trait SegmentationService {
    /// Session type handed out by [`SegmentationService::open`].
    type Session: BoundarySession;

    /// Open a session for `locale` already bound to `text`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NoSegmentationSession`] if the engine cannot be opened.
    fn open(&self, locale: &str, text: &[u16]) -> Result<Self::Session, IndexError>;
}

/// Extended grapheme cluster segmentation backed by `unicode-segmentation`.
///
/// The rules are locale-independent; the locale passed to [`SegmentationService::open`] is
/// recorded on the session but does not change the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl SegmentationService for UnicodeSegmenter {
    type Session = GraphemeSession;

    fn open(&self, locale: &str, text: &[u16]) -> Result<GraphemeSession, IndexError> {
        let mut session = GraphemeSession {
            locale: locale.to_string(),
            boundaries: Vec::new(),
        };
        session.rebuild(text);
        Ok(session)
    }
}

/// Session of [`UnicodeSegmenter`]: the sorted list of boundaries of the bound text.
#[derive(Debug, Clone)]
pub struct GraphemeSession {
    locale: String,
    boundaries: Vec<usize>,
}

impl GraphemeSession {
    /// Locale the session was opened with.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn rebuild(&mut self, text: &[u16]) {
        self.boundaries.clear();

        // Lone surrogates decode to one U+FFFD each, which is also one UTF-16 unit, so
        // accumulated UTF-16 lengths of the decoded clusters are offsets into `text`.
        let decoded = String::from_utf16_lossy(text);
        let mut offset = 0;
        self.boundaries.push(0);
        for cluster in decoded.graphemes(true) {
            offset += cluster.encode_utf16().count();
            self.boundaries.push(offset);
        }
    }
}

impl BoundarySession for GraphemeSession {
    fn set_text(&mut self, text: &[u16]) {
        tracing::debug!(len = text.len(), "rebinding grapheme session");
        self.rebuild(text);
    }

    fn is_boundary(&self, offset: usize) -> bool {
        self.boundaries.binary_search(&offset).is_ok()
    }

    fn preceding(&self, offset: usize) -> Option<usize> {
        let idx = self.boundaries.partition_point(|&b| b < offset);
        idx.checked_sub(1).map(|i| self.boundaries[i])
    }

    fn following(&self, offset: usize) -> Option<usize> {
        let idx = self.boundaries.partition_point(|&b| b <= offset);
        self.boundaries.get(idx).copied()
    }
}

/// Owns one segmentation session and binds it to whichever buffer is being queried.
///
/// The adapter is the only place a raw view of a buffer's storage is handed to the
/// segmentation engine, and that view never outlives the call it was taken in. An adapter is
/// used by one execution context at a time; give each worker its own.
pub struct SegmentationAdapter<S: SegmentationService = UnicodeSegmenter> {
    service: S,
    locale: String,
    session: Option<S::Session>,
    /// Revision of the buffer the session is bound to.
    bound: Option<u64>,
}

impl<S: SegmentationService> fmt::Debug for SegmentationAdapter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentationAdapter")
            .field("locale", &self.locale)
            .field("has_session", &self.session.is_some())
            .field("bound", &self.bound)
            .finish()
    }
}

impl SegmentationAdapter<UnicodeSegmenter> {
    /// Adapter over the default `unicode-segmentation` service.
    pub fn unicode(locale: impl Into<String>) -> Self {
        Self::new(UnicodeSegmenter, locale)
    }
}

impl<S: SegmentationService> SegmentationAdapter<S> {
    /// Create an adapter; the session is opened on first use.
    pub fn new(service: S, locale: impl Into<String>) -> Self {
        Self {
            service,
            locale: locale.into(),
            session: None,
            bound: None,
        }
    }

    /// Locale used when opening the session.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Returns `true` once a session has been opened.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Bind the session to `buffer` and run `body` with it.
    ///
    /// The session is only re-pointed when `buffer` is not the revision it was last bound to.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NoSegmentationSession`] if a session cannot be opened.
    pub fn with_session<T>(
        &mut self,
        buffer: &String16,
        body: impl FnOnce(&S::Session) -> T,
    ) -> Result<T, IndexError> {
        let revision = buffer.revision();
        match self.session.as_mut() {
            Some(_) if self.bound == Some(revision) => {}
            Some(session) => session.set_text(buffer.as_units()),
            None => {
                tracing::debug!(locale = %self.locale, "opening segmentation session");
                self.session = Some(self.service.open(&self.locale, buffer.as_units())?);
            }
        }
        self.bound = Some(revision);
        let Some(session) = self.session.as_ref() else {
            return Err(IndexError::NoSegmentationSession {
                reason: "session was not retained".to_string(),
            });
        };
        Ok(body(session))
    }

    /// Returns `true` if `offset` is a grapheme boundary of `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NoSegmentationSession`] if a session cannot be opened.
    pub fn is_boundary(&mut self, buffer: &String16, offset: usize) -> Result<bool, IndexError> {
        self.with_session(buffer, |session| session.is_boundary(offset))
    }

    /// Boundary strictly before `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NoSegmentationSession`] if a session cannot be opened.
    pub fn preceding_boundary(
        &mut self,
        buffer: &String16,
        offset: usize,
    ) -> Result<Option<usize>, IndexError> {
        self.with_session(buffer, |session| session.preceding(offset))
    }

    /// Boundary strictly after `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NoSegmentationSession`] if a session cannot be opened.
    pub fn following_boundary(
        &mut self,
        buffer: &String16,
        offset: usize,
    ) -> Result<Option<usize>, IndexError> {
        self.with_session(buffer, |session| session.following(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(text: &str) -> Vec<u16> {
        text.encode_utf16().collect()
    }

    #[test]
    fn test_ascii_boundaries() {
        let text = units("abc");
        let session = UnicodeSegmenter.open("en_US", &text).unwrap();
        for offset in 0..=3 {
            assert!(session.is_boundary(offset));
        }
        assert!(!session.is_boundary(4));
        assert_eq!(session.preceding(0), None);
        assert_eq!(session.preceding(2), Some(1));
        assert_eq!(session.following(2), Some(3));
        assert_eq!(session.following(3), None);
    }

    #[test]
    fn test_surrogate_pair_is_one_cluster() {
        // "a👋b": the emoji occupies offsets 1..3.
        let text = units("a👋b");
        let session = UnicodeSegmenter.open("en_US", &text).unwrap();
        assert!(session.is_boundary(1));
        assert!(!session.is_boundary(2));
        assert!(session.is_boundary(3));
        assert_eq!(session.following(1), Some(3));
        assert_eq!(session.preceding(3), Some(1));
        // From inside the pair, both directions land on the pair's edges.
        assert_eq!(session.preceding(2), Some(1));
        assert_eq!(session.following(2), Some(3));
    }

    #[test]
    fn test_emoji_modifier_and_combining_mark() {
        // "👍🏽" is two scalars (four units) forming one cluster; "e\u{301}" is two units.
        let text = units("👍🏽e\u{301}");
        let session = UnicodeSegmenter.open("en_US", &text).unwrap();
        assert_eq!(session.following(0), Some(4));
        assert!(!session.is_boundary(2));
        assert_eq!(session.following(4), Some(6));
        assert!(!session.is_boundary(5));
    }

    #[test]
    fn test_empty_text() {
        let session = UnicodeSegmenter.open("en_US", &[]).unwrap();
        assert!(session.is_boundary(0));
        assert_eq!(session.following(0), None);
        assert_eq!(session.preceding(0), None);
    }

    #[test]
    fn test_adapter_rebinds_between_buffers() {
        let mut adapter = SegmentationAdapter::unicode("en_US");
        assert!(!adapter.has_session());

        let first = String16::from("ab");
        let second = String16::from("👋");
        assert!(adapter.is_boundary(&first, 1).unwrap());
        assert!(adapter.has_session());
        // Same offset, different buffer: the stale binding must not leak through.
        assert!(!adapter.is_boundary(&second, 1).unwrap());
        assert_eq!(adapter.following_boundary(&second, 0).unwrap(), Some(2));
        assert_eq!(adapter.preceding_boundary(&first, 2).unwrap(), Some(1));
    }

    #[test]
    fn test_adapter_follows_edits() {
        let mut adapter = SegmentationAdapter::unicode("en_US");
        let mut buffer = String16::from("ab");
        assert!(adapter.is_boundary(&buffer, 1).unwrap());

        // Same length, new contents: the binding must be refreshed.
        buffer.replace_units(0..2, &units("👋"));
        assert!(!adapter.is_boundary(&buffer, 1).unwrap());
        assert_eq!(adapter.following_boundary(&buffer, 0).unwrap(), Some(2));
    }

    struct BrokenService;

    impl SegmentationService for BrokenService {
        type Session = GraphemeSession;

        fn open(&self, _locale: &str, _text: &[u16]) -> Result<GraphemeSession, IndexError> {
            Err(IndexError::NoSegmentationSession {
                reason: "engine unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_open_failure_is_reported() {
        let mut adapter = SegmentationAdapter::new(BrokenService, "en_US");
        let err = adapter.is_boundary(&String16::from("a"), 0).unwrap_err();
        assert!(matches!(err, IndexError::NoSegmentationSession { .. }));
        assert!(!adapter.has_session());
    }
}
