//! Indexing configuration.
//!
//! Every behaviour switch lives in an [`IndexConfig`] value owned by an
//! [`Indexer`](crate::Indexer); there is no process-wide state.

use crate::error::IndexError;

/// Handler invoked when a plain (non-`safe_`) entry point hits an unrecoverable failure.
pub type FailureHandler = fn(&IndexError) -> !;

fn panic_on_failure(error: &IndexError) -> ! {
    panic!("string16: {error}")
}

/// How invalid bounds on the read path are treated.
///
/// Writes are always validated fatally; only reads may be relaxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadValidation {
    /// Route invalid read ranges through the failure handler.
    #[default]
    Fatal,
    /// Log a warning and read the clamped range anyway.
    ///
    /// Only honoured in debug builds; release builds behave as [`ReadValidation::Fatal`].
    LogOnly,
}

/// Resolution rule for an offset whose delta is itself an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedDelta {
    /// Resolve the delta expression with its search window starting at the base position;
    /// the delta's result is the final position.
    #[default]
    SearchFromBase,
    /// Resolve the delta expression against the enclosing window and step the base by its raw
    /// offset, counted in grapheme boundaries.
    AbsoluteSteps,
}

/// Options controlling resolution, validation and failure reporting.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Saturate `index_before`/`index_after` at the buffer ends instead of failing.
    pub clamp_on_overflow: bool,
    /// Read-path validation mode.
    pub read_validation: ReadValidation,
    /// In debug builds, treat a raw offset that is not a boundary as fatal rather than logging.
    pub strict_construction: bool,
    /// Rule for expression-valued deltas.
    pub nested_delta: NestedDelta,
    /// Locale handed to the segmentation service.
    pub locale: String,
    /// Called by plain entry points on failure.
    pub failure_handler: FailureHandler,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            clamp_on_overflow: false,
            read_validation: ReadValidation::Fatal,
            strict_construction: false,
            nested_delta: NestedDelta::SearchFromBase,
            locale: "en_US".to_string(),
            failure_handler: panic_on_failure,
        }
    }
}

impl IndexConfig {
    /// Set [`IndexConfig::clamp_on_overflow`].
    pub fn with_clamp_on_overflow(mut self, clamp: bool) -> Self {
        self.clamp_on_overflow = clamp;
        self
    }

    /// Set [`IndexConfig::read_validation`].
    pub fn with_read_validation(mut self, mode: ReadValidation) -> Self {
        self.read_validation = mode;
        self
    }

    /// Set [`IndexConfig::strict_construction`].
    pub fn with_strict_construction(mut self, strict: bool) -> Self {
        self.strict_construction = strict;
        self
    }

    /// Set [`IndexConfig::nested_delta`].
    pub fn with_nested_delta(mut self, rule: NestedDelta) -> Self {
        self.nested_delta = rule;
        self
    }

    /// Set [`IndexConfig::locale`].
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set [`IndexConfig::failure_handler`].
    pub fn with_failure_handler(mut self, handler: FailureHandler) -> Self {
        self.failure_handler = handler;
        self
    }

    /// Whether lenient read validation is in effect for this build.
    pub(crate) fn reads_log_only(&self) -> bool {
        cfg!(debug_assertions) && self.read_validation == ReadValidation::LogOnly
    }

    pub(crate) fn fail(&self, error: &IndexError) -> ! {
        (self.failure_handler)(error)
    }
}
