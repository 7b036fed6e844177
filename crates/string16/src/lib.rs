#![warn(missing_docs)]
//! String16 - Grapheme-Safe Offset Indexing over UTF-16 Buffers
//!
//! # Overview
//!
//! `string16` addresses substrings of a UTF-16 code unit buffer through symbolic positions
//! ("the start", "after the first `\w+` match", "one cluster before the last space") and
//! guarantees that every resolved position sits on a legal character boundary. No index ever
//! splits a surrogate pair or an extended grapheme cluster such as an emoji with a skin-tone
//! modifier or a letter with a combining accent.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Subscripts (get/set, char_at, iteration)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Offset Expressions (start/end/first/last)  │  ← Symbolic positions
//! ├─────────────────────────────────────────────┤
//! │  Boundary Index (stepping, validation)      │  ← Safe positions
//! ├─────────────────────────────────────────────┤
//! │  Segmentation Adapter (cached session)      │  ← Boundary queries
//! ├─────────────────────────────────────────────┤
//! │  String16 (UTF-16 code units)               │  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use string16::{Indexer, OffsetExpression as At, String16};
//!
//! let mut indexer = Indexer::default();
//! let mut text = String16::from("Hello, World!");
//!
//! // Insert before the last cluster.
//! indexer.insert(&mut text, &At::end().offset(-1), "?");
//! assert_eq!(text, "Hello, World?!");
//!
//! // The second 'o': search again from just past the first one.
//! let second_o = At::first_char('o').offset(1).offset_by(At::first_char('o'));
//! indexer.set_char_at(&mut text, &second_o, "a");
//! assert_eq!(text, "Hello, Warld?!");
//!
//! assert_eq!(indexer.get(&text, ..At::first_char(' ')), "Hello,");
//! assert_eq!(indexer.safe_char_at(&text, &At::end().offset(1)), None);
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - `String16` storage and UTF-16 bridging
//! - [`segmentation`] - boundary query traits, the `unicode-segmentation` service, the adapter
//! - [`index`] - `BoundaryIndex` and boundary-by-boundary stepping
//! - [`predicate`] - character set, literal and regex search predicates
//! - [`offset`] - the offset-expression algebra and its resolver
//! - [`config`] - `IndexConfig` (clamping, validation modes, failure handler)
//! - [`indexer`] - the `Indexer` entry points
//!
//! # Failure Model
//!
//! Plain entry points (`index_of`, `get`, `set`, `char_at`, ...) route every failure through
//! the configured [`FailureHandler`], which panics by default. `safe_` entry points return
//! `None` instead, and `try_` entry points return the [`IndexError`]. A segmentation session
//! that cannot be opened is always passed to the handler.

pub mod buffer;
pub mod config;
pub mod error;
pub mod index;
pub mod indexer;
pub mod iter;
pub mod offset;
pub mod predicate;
pub mod segmentation;
mod subscript;

pub use buffer::{CodeUnit, String16};
pub use config::{FailureHandler, IndexConfig, NestedDelta, ReadValidation};
pub use error::IndexError;
pub use index::BoundaryIndex;
pub use indexer::Indexer;
pub use iter::{BoundaryRanges, Graphemes};
pub use offset::{Anchor, Delta, OffsetExpression};
pub use predicate::Predicate;
pub use segmentation::{
    BoundarySession, GraphemeSession, SegmentationAdapter, SegmentationService, UnicodeSegmenter,
};
pub use subscript::ExpressionRange;
