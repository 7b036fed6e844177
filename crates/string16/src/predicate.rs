//! Search predicates used by `first`/`last` offset expressions.
//!
//! Character-set predicates walk the buffer one grapheme cluster at a time and test the
//! cluster's first scalar. Literal and regex predicates run over the decoded string and map the
//! match back to UTF-16 offsets, widened to the enclosing cluster boundaries.

use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::error::IndexError;
use crate::segmentation::BoundarySession;

/// What a search-based offset expression looks for.
#[derive(Clone)]
pub enum Predicate {
    /// A cluster whose first scalar is one of these characters (kept sorted, deduplicated).
    Chars(Vec<char>),
    /// An exact substring of the decoded text.
    Literal(String),
    /// A regular expression over the decoded text.
    Pattern(Regex),
}

impl Predicate {
    /// Match clusters starting with `ch`.
    pub fn char(ch: char) -> Self {
        Self::Chars(vec![ch])
    }

    /// Match clusters starting with any character of `set`.
    pub fn chars(set: impl IntoIterator<Item = char>) -> Self {
        let mut set: Vec<char> = set.into_iter().collect();
        set.sort_unstable();
        set.dedup();
        Self::Chars(set)
    }

    /// Match an exact substring. An empty literal never matches.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Match a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidPattern`] if `pattern` does not compile.
    pub fn regex(pattern: &str) -> Result<Self, IndexError> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// First match at or after `origin`, as a boundary-aligned range of code units.
    pub(crate) fn first_match<B: BoundarySession>(
        &self,
        units: &[u16],
        origin: usize,
        session: &B,
    ) -> Option<Range<usize>> {
        match self {
            Self::Chars(set) => {
                let mut offset = origin;
                while offset < units.len() {
                    let next = session.following(offset)?;
                    if cluster_starts_with(&units[offset..next], set) {
                        return Some(offset..next);
                    }
                    offset = next;
                }
                None
            }
            Self::Literal(needle) => {
                if needle.is_empty() {
                    return None;
                }
                let decoded = DecodedText::new(units);
                let from = decoded.utf16_to_byte(origin);
                let start = from + decoded.text[from..].find(needle.as_str())?;
                Some(decoded.aligned(start..start + needle.len(), session))
            }
            Self::Pattern(re) => {
                let decoded = DecodedText::new(units);
                let from = decoded.utf16_to_byte(origin);
                let m = first_non_empty_at(re, &decoded.text, from)?;
                Some(decoded.aligned(m.range(), session))
            }
        }
    }

    /// Last match starting at or after `origin`, as a boundary-aligned range of code units.
    pub(crate) fn last_match<B: BoundarySession>(
        &self,
        units: &[u16],
        origin: usize,
        session: &B,
    ) -> Option<Range<usize>> {
        match self {
            Self::Chars(set) => {
                let mut offset = units.len();
                while offset > origin {
                    let prev = session.preceding(offset)?;
                    if prev < origin {
                        break;
                    }
                    if cluster_starts_with(&units[prev..offset], set) {
                        return Some(prev..offset);
                    }
                    offset = prev;
                }
                None
            }
            Self::Literal(needle) => {
                if needle.is_empty() {
                    return None;
                }
                let decoded = DecodedText::new(units);
                let from = decoded.utf16_to_byte(origin);
                let start = from + decoded.text[from..].rfind(needle.as_str())?;
                Some(decoded.aligned(start..start + needle.len(), session))
            }
            Self::Pattern(re) => {
                // No reverse search: enumerate every match and keep the final one.
                let decoded = DecodedText::new(units);
                let from = decoded.utf16_to_byte(origin);
                let mut last = None;
                let mut at = from;
                while at <= decoded.text.len() {
                    let Some(m) = re.find_at(&decoded.text, at) else {
                        break;
                    };
                    if m.is_empty() {
                        at = next_char_boundary(&decoded.text, m.end());
                        continue;
                    }
                    last = Some(m.range());
                    at = m.end();
                }
                Some(decoded.aligned(last?, session))
            }
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chars(set) => f.debug_tuple("Chars").field(set).finish(),
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chars(set) => {
                write!(f, "[")?;
                for ch in set {
                    write!(f, "{}", ch.escape_debug())?;
                }
                write!(f, "]")
            }
            Self::Literal(text) => write!(f, "{:?}", text),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

fn cluster_starts_with(cluster: &[u16], set: &[char]) -> bool {
    char::decode_utf16(cluster.iter().copied())
        .next()
        .map(|ch| ch.unwrap_or(char::REPLACEMENT_CHARACTER))
        .is_some_and(|ch| set.binary_search(&ch).is_ok())
}

fn next_char_boundary(text: &str, byte: usize) -> usize {
    text[byte..]
        .chars()
        .next()
        .map_or(text.len() + 1, |ch| byte + ch.len_utf8())
}

fn first_non_empty_at<'t>(re: &Regex, text: &'t str, from: usize) -> Option<regex::Match<'t>> {
    let mut at = from;
    while at <= text.len() {
        let m = re.find_at(text, at)?;
        if !m.is_empty() {
            return Some(m);
        }
        at = next_char_boundary(text, m.end());
    }
    None
}

/// A decoded buffer plus the byte <-> UTF-16 offset mapping for each char start.
struct DecodedText {
    text: String,
    /// `(byte, utf16)` offset of every char start, followed by the end of the text.
    starts: Vec<(usize, usize)>,
}

impl DecodedText {
    fn new(units: &[u16]) -> Self {
        let text = String::from_utf16_lossy(units);
        let mut starts = Vec::with_capacity(text.len() + 1);
        let mut utf16 = 0;
        for (byte, ch) in text.char_indices() {
            starts.push((byte, utf16));
            utf16 += ch.len_utf16();
        }
        starts.push((text.len(), utf16));
        Self { text, starts }
    }

    fn byte_to_utf16(&self, byte: usize) -> usize {
        let idx = self.starts.partition_point(|&(b, _)| b < byte);
        self.starts
            .get(idx)
            .or(self.starts.last())
            .map_or(0, |&(_, u)| u)
    }

    fn utf16_to_byte(&self, utf16: usize) -> usize {
        let idx = self.starts.partition_point(|&(_, u)| u < utf16);
        self.starts
            .get(idx)
            .map_or(self.text.len(), |&(b, _)| b)
    }

    /// Convert a byte range to code units and widen it to cluster boundaries.
    fn aligned<B: BoundarySession>(&self, bytes: Range<usize>, session: &B) -> Range<usize> {
        let mut start = self.byte_to_utf16(bytes.start);
        let mut end = self.byte_to_utf16(bytes.end);
        if !session.is_boundary(start) {
            start = session.preceding(start).unwrap_or(0);
        }
        if !session.is_boundary(end) {
            end = session.following(end).unwrap_or(end);
        }
        start..end
    }
}
