//! Error types for the V-gram engine stages.
//!
//! Errors are stage-specific to keep diagnostics precise and avoid a single
//! monolithic enum that grows unbounded. All enums are `#[non_exhaustive]` so
//! variants can be added without breaking callers; consumers should include a
//! fallback match arm.
//!
//! # Design Notes
//! - Parameter validation is eager: every error here is reported before any
//!   state is built, so a failed index build or statistics call leaves
//!   nothing behind.
//! - Internal algorithmic postconditions (table sort order, slot-index
//!   validity, presence after a lookup that must succeed) are not errors;
//!   they are debug assertions and their violation is a bug.

use std::fmt;

/// Maximum permitted gram length in characters for either bound.
pub const MAX_GRAM_CHARS: u32 = 10;

/// Errors from option validation and frequent-gram table construction.
///
/// These occur while compiling user-supplied index options or while
/// deserializing a packed table, before any extraction begins.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionsError {
    /// `min_q` or `max_q` is outside `[1, MAX_GRAM_CHARS]`.
    BoundsOutOfRange { min_q: u32, max_q: u32 },
    /// `min_q` exceeds `max_q`.
    BoundsInverted { min_q: u32, max_q: u32 },
    /// A frequent gram's character length is outside `[min_q, max_q]`.
    GramLength { index: usize, chars: u32, min_q: u32, max_q: u32 },
    /// A frequent gram contains a NUL byte, which the packed layout reserves
    /// as the payload terminator.
    EmbeddedNul { index: usize },
    /// Packed table is shorter than its fixed header or declared offsets.
    TruncatedTable { len: usize },
    /// Packed table declares a negative or impossible entry count.
    InvalidCount { count: i32 },
    /// A packed offset points outside the payload.
    OffsetOutOfBounds { index: usize, offset: i32 },
    /// A packed gram is missing its NUL terminator.
    UnterminatedGram { index: usize },
    /// Packed grams are not in strict ascending byte order.
    UnsortedGrams { index: usize },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundsOutOfRange { min_q, max_q } => write!(
                f,
                "gram bounds out of range: min_q={min_q}, max_q={max_q} (allowed 1..={MAX_GRAM_CHARS})"
            ),
            Self::BoundsInverted { min_q, max_q } => {
                write!(f, "gram bounds inverted: min_q={min_q} > max_q={max_q}")
            }
            Self::GramLength { index, chars, min_q, max_q } => write!(
                f,
                "frequent gram {index} has {chars} characters (expected {min_q}..={max_q})"
            ),
            Self::EmbeddedNul { index } => {
                write!(f, "frequent gram {index} contains an embedded NUL byte")
            }
            Self::TruncatedTable { len } => {
                write!(f, "packed gram table truncated: {len} bytes")
            }
            Self::InvalidCount { count } => {
                write!(f, "packed gram table declares invalid count {count}")
            }
            Self::OffsetOutOfBounds { index, offset } => {
                write!(f, "packed gram offset {index} out of bounds: {offset}")
            }
            Self::UnterminatedGram { index } => {
                write!(f, "packed gram {index} is not NUL-terminated")
            }
            Self::UnsortedGrams { index } => {
                write!(f, "packed grams out of order at index {index}")
            }
        }
    }
}

impl std::error::Error for OptionsError {}

/// Errors from the statistics collectors.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum StatsError {
    /// Frequency threshold is outside `[0, 1]`.
    ThresholdOutOfRange { value: f64 },
    /// The aggregate transition was invoked outside an aggregate context.
    NotInAggregate,
    /// Gram bounds failed validation.
    Options(OptionsError),
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdOutOfRange { value } => {
                write!(f, "frequency threshold out of range: {value} (allowed 0..=1)")
            }
            Self::NotInAggregate => {
                write!(f, "statistics transition called in non-aggregate context")
            }
            Self::Options(err) => write!(f, "invalid statistics options: {err}"),
        }
    }
}

impl std::error::Error for StatsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Options(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OptionsError> for StatsError {
    fn from(err: OptionsError) -> Self {
        Self::Options(err)
    }
}

/// Errors from query-side strategy resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryError {
    /// The index was probed with a strategy other than LIKE/ILIKE.
    UnsupportedStrategy { number: u16 },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedStrategy { number } => {
                write!(f, "unrecognized strategy number: {number}")
            }
        }
    }
}

impl std::error::Error for QueryError {}
