//! UTF-16 code unit storage.
//!
//! [`String16`] is a plain growable array of `u16` code units. It knows nothing about grapheme
//! boundaries: the raw mutation primitives here are used by the subscript layer after it has
//! validated the range.
//!
//! Every buffer carries a revision stamp that changes whenever its contents do. Segmentation
//! sessions use it to skip re-segmenting a buffer they are already bound to.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// One 16-bit code unit: a BMP scalar or one half of a surrogate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodeUnit(u16);

impl CodeUnit {
    /// Wrap a raw code unit.
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    /// Raw numeric value.
    pub fn value(self) -> u16 {
        self.0
    }

    /// The scalar this unit encodes on its own, `None` for surrogate halves.
    pub fn unicode_scalar(self) -> Option<char> {
        char::from_u32(u32::from(self.0))
    }

    /// The scalar if it is ASCII.
    pub fn ascii_scalar(self) -> Option<char> {
        if self.0 < 128 {
            self.unicode_scalar()
        } else {
            None
        }
    }

    /// Returns `true` for either half of a surrogate pair.
    pub fn is_surrogate(self) -> bool {
        (0xD800..=0xDFFF).contains(&self.0)
    }
}

impl From<u16> for CodeUnit {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unicode_scalar() {
            Some(ch) => write!(f, "{}", ch),
            None => write!(f, "0x{:x}", self.0),
        }
    }
}

/// Owned UTF-16 buffer.
///
/// Offsets everywhere in this crate are measured in code units of this buffer.
///
/// Equality and hashing look at the code units only, never at the revision.
#[derive(Debug, Clone)]
pub struct String16 {
    units: Vec<u16>,
    revision: u64,
}

impl String16 {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::from_units(Vec::new())
    }

    /// Wrap raw code units; lone surrogates are kept as-is.
    pub fn from_units(units: Vec<u16>) -> Self {
        Self {
            units,
            revision: next_revision(),
        }
    }

    /// Stamp that changes on every mutation.
    ///
    /// Two buffers with the same revision hold the same code units: stamps are unique per
    /// construction or edit, and only a clone shares its source's stamp.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Length in code units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if the buffer holds no code units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Contiguous view of the storage.
    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    /// Code unit at `index`, if any.
    pub fn code_unit(&self, index: usize) -> Option<CodeUnit> {
        self.units.get(index).copied().map(CodeUnit)
    }

    /// Iterate over all code units.
    pub fn code_units(&self) -> impl Iterator<Item = CodeUnit> + '_ {
        self.units.iter().copied().map(CodeUnit)
    }

    /// Decode the whole buffer. Each unpaired surrogate becomes one U+FFFD, so UTF-16 offsets
    /// into the decoded string match offsets into the buffer.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }

    /// Decode the code units in `range` (clamped to the buffer).
    pub fn decode_range(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.units.len());
        let start = range.start.min(end);
        String::from_utf16_lossy(&self.units[start..end])
    }

    /// Append the UTF-16 encoding of `text`.
    pub fn push_str(&mut self, text: &str) {
        self.units.extend(text.encode_utf16());
        self.revision = next_revision();
    }

    /// Replace the code units in `range` with `replacement`.
    ///
    /// This is the raw storage primitive; it performs no boundary validation.
    ///
    /// # Panics
    ///
    /// Panics if `range` is inverted or extends past the end of the buffer.
    pub fn replace_units(&mut self, range: Range<usize>, replacement: &[u16]) {
        self.units.splice(range, replacement.iter().copied());
        self.revision = next_revision();
    }

    /// Consume the buffer, returning its code units.
    pub fn into_units(self) -> Vec<u16> {
        self.units
    }
}

impl Default for String16 {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for String16 {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units
    }
}

impl Eq for String16 {}

impl Hash for String16 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.units.hash(state);
    }
}

impl From<&str> for String16 {
    fn from(text: &str) -> Self {
        Self::from_units(text.encode_utf16().collect())
    }
}

impl From<String> for String16 {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<&String16> for String {
    fn from(buffer: &String16) -> Self {
        buffer.to_string_lossy()
    }
}

impl fmt::Display for String16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in char::decode_utf16(self.units.iter().copied()) {
            write!(f, "{}", ch.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl PartialEq<str> for String16 {
    fn eq(&self, other: &str) -> bool {
        self.units.iter().copied().eq(other.encode_utf16())
    }
}

impl PartialEq<&str> for String16 {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_decode() {
        let s = String16::from("Hello 👋");
        // The emoji is a surrogate pair.
        assert_eq!(s.len(), 8);
        assert_eq!(s.to_string_lossy(), "Hello 👋");
        assert_eq!(s, "Hello 👋");
    }

    #[test]
    fn test_code_unit_description() {
        let s = String16::from("a👋");
        assert_eq!(s.code_unit(0).map(|u| u.to_string()), Some("a".to_string()));
        assert_eq!(s.code_unit(1).map(|u| u.to_string()), Some("0xd83d".to_string()));
        assert!(s.code_unit(1).is_some_and(CodeUnit::is_surrogate));
        assert_eq!(s.code_unit(0).and_then(CodeUnit::ascii_scalar), Some('a'));
        assert_eq!(CodeUnit::new(0xE9).ascii_scalar(), None);
        assert_eq!(s.code_unit(3), None);
    }

    #[test]
    fn test_lone_surrogate_keeps_offsets() {
        let s = String16::from_units(vec![0x61, 0xD800, 0x62]);
        let decoded = s.to_string_lossy();
        assert_eq!(decoded.encode_utf16().count(), s.len());
        assert_eq!(s.to_string(), decoded);
    }

    #[test]
    fn test_replace_units() {
        let mut s = String16::from("Hello, World");
        let replacement: Vec<u16> = "Rust".encode_utf16().collect();
        s.replace_units(7..12, &replacement);
        assert_eq!(s, "Hello, Rust");

        s.replace_units(5..5, &[u16::from(b'!')]);
        assert_eq!(s, "Hello!, Rust");

        s.replace_units(0..7, &[]);
        assert_eq!(s, " Rust");
    }

    #[test]
    fn test_revision_tracks_edits() {
        let mut s = String16::from("abc");
        let copy = s.clone();
        assert_eq!(copy.revision(), s.revision());

        let before = s.revision();
        s.push_str("d");
        assert_ne!(s.revision(), before);
        let before = s.revision();
        s.replace_units(0..1, &[]);
        assert_ne!(s.revision(), before);

        // Same contents built separately: equal, but stamped independently.
        let other = String16::from("bcd");
        assert_eq!(other, s);
        assert_ne!(other.revision(), s.revision());
    }

    #[test]
    fn test_decode_range_clamps() {
        let s = String16::from("abc");
        assert_eq!(s.decode_range(1..10), "bc");
        assert_eq!(s.decode_range(5..10), "");
    }
}
