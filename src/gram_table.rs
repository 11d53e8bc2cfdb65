//! Frequent-gram table: packed, sorted, prefix-searchable.
//!
//! The table stores the grams judged too common to index. Layout is a single
//! contiguous buffer:
//!
//! ```text
//! i32  count                     (little endian)
//! i32  offsets[count]            byte offsets relative to the buffer start,
//!                                which is the start of the count field
//! u8   payload[]                 grams concatenated, each NUL-terminated,
//!                                in strict ascending byte order
//! ```
//!
//! # Design
//! - Arena + offset array: one allocation, cache-friendly probes, and the
//!   buffer doubles as the serialized form.
//! - Offsets include the header in their base deliberately; the base is the
//!   buffer start, not a struct member, so the layout survives any host-side
//!   framing.
//! - The prefix search returns narrowed bounds to its caller so a walker
//!   growing a gram one character at a time searches only the remaining
//!   candidate range.
//!
//! # Invariants
//! - Grams are unique and in strict ascending byte order.
//! - Every gram's character length lies in `[min_q, max_q]`.
//! - Grams contain no NUL byte; NUL is the payload terminator.

use std::cmp::Ordering;

use memchr::memchr;
use serde::{Deserialize, Serialize};

use crate::chars::char_count;
use crate::errors::{OptionsError, MAX_GRAM_CHARS};

/// Byte width of the count field and of each offset entry.
const FIELD_WIDTH: usize = 4;

/// Character-length bounds `[min_q, max_q]` for grams in a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GramBounds {
    pub min_q: u32,
    pub max_q: u32,
}

impl Default for GramBounds {
    fn default() -> Self {
        Self { min_q: 2, max_q: 2 }
    }
}

impl GramBounds {
    /// Creates bounds without validating them; call [`validate`](Self::validate).
    #[must_use]
    pub const fn new(min_q: u32, max_q: u32) -> Self {
        Self { min_q, max_q }
    }

    /// Checks `1 <= min_q <= max_q <= MAX_GRAM_CHARS`.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.min_q < 1
            || self.min_q > MAX_GRAM_CHARS
            || self.max_q < 1
            || self.max_q > MAX_GRAM_CHARS
        {
            return Err(OptionsError::BoundsOutOfRange {
                min_q: self.min_q,
                max_q: self.max_q,
            });
        }
        if self.min_q > self.max_q {
            return Err(OptionsError::BoundsInverted {
                min_q: self.min_q,
                max_q: self.max_q,
            });
        }
        Ok(())
    }

    /// Returns true when a gram of `chars` characters fits the bounds.
    #[inline]
    #[must_use]
    pub fn contains(&self, chars: usize) -> bool {
        chars >= self.min_q as usize && chars <= self.max_q as usize
    }
}

/// Inclusive binary-search window over table indexes.
///
/// Obtained from [`GramTable::full_range`] and narrowed in place by
/// [`GramTable::prefix_search`]; because the table is sorted, the window for
/// a prefix remains valid for any extension of that prefix.
#[derive(Clone, Copy, Debug)]
pub struct SearchRange {
    lower: isize,
    upper: isize,
}

/// Immutable frequent-gram table.
pub struct GramTable {
    raw: Vec<u8>,
    bounds: GramBounds,
    count: usize,
}

impl GramTable {
    /// Builds a table from user-supplied grams.
    ///
    /// Grams are validated (character length within bounds, no NUL bytes),
    /// then sorted and deduplicated, then packed. The resulting table is
    /// independent of the input order.
    pub fn build<T: AsRef<[u8]>>(grams: &[T], bounds: GramBounds) -> Result<Self, OptionsError> {
        bounds.validate()?;

        for (index, gram) in grams.iter().enumerate() {
            let gram = gram.as_ref();
            if memchr(0, gram).is_some() {
                return Err(OptionsError::EmbeddedNul { index });
            }
            let chars = char_count(gram);
            if !bounds.contains(chars) {
                return Err(OptionsError::GramLength {
                    index,
                    chars: chars as u32,
                    min_q: bounds.min_q,
                    max_q: bounds.max_q,
                });
            }
        }

        let mut sorted: Vec<&[u8]> = grams.iter().map(AsRef::as_ref).collect();
        sorted.sort_unstable();
        sorted.dedup();

        Ok(Self::pack(&sorted, bounds))
    }

    fn pack(sorted: &[&[u8]], bounds: GramBounds) -> Self {
        let count = sorted.len();
        let header = FIELD_WIDTH + FIELD_WIDTH * count;
        let payload: usize = sorted.iter().map(|g| g.len() + 1).sum();

        let mut raw = Vec::with_capacity(header + payload);
        raw.extend_from_slice(&(count as i32).to_le_bytes());
        let mut offset = header;
        for gram in sorted {
            raw.extend_from_slice(&(offset as i32).to_le_bytes());
            offset += gram.len() + 1;
        }
        for gram in sorted {
            raw.extend_from_slice(gram);
            raw.push(0);
        }
        debug_assert_eq!(raw.len(), header + payload);

        Self { raw, bounds, count }
    }

    /// Reconstructs a table from its packed form, validating the framing,
    /// ordering, and gram lengths.
    pub fn from_bytes(bytes: &[u8], bounds: GramBounds) -> Result<Self, OptionsError> {
        bounds.validate()?;
        if bytes.len() < FIELD_WIDTH {
            return Err(OptionsError::TruncatedTable { len: bytes.len() });
        }
        let count = i32::from_le_bytes(bytes[..FIELD_WIDTH].try_into().expect("field width"));
        if count < 0 {
            return Err(OptionsError::InvalidCount { count });
        }
        let count = count as usize;
        let header = FIELD_WIDTH + FIELD_WIDTH * count;
        if bytes.len() < header {
            return Err(OptionsError::TruncatedTable { len: bytes.len() });
        }

        let table = Self {
            raw: bytes.to_vec(),
            bounds,
            count,
        };

        let mut expected = header;
        for i in 0..count {
            let off = table.offset(i);
            if off < 0 || off as usize != expected {
                return Err(OptionsError::OffsetOutOfBounds { index: i, offset: off });
            }
            let start = off as usize;
            let end = table.gram_end(i);
            if end <= start || end > bytes.len() || bytes[end - 1] != 0 {
                return Err(OptionsError::UnterminatedGram { index: i });
            }
            let gram = &bytes[start..end - 1];
            if memchr(0, gram).is_some() {
                return Err(OptionsError::UnterminatedGram { index: i });
            }
            if !bounds.contains(char_count(gram)) {
                return Err(OptionsError::GramLength {
                    index: i,
                    chars: char_count(gram) as u32,
                    min_q: bounds.min_q,
                    max_q: bounds.max_q,
                });
            }
            if i > 0 && table.get(i - 1) >= gram {
                return Err(OptionsError::UnsortedGrams { index: i });
            }
            expected = end;
        }
        if expected != bytes.len() {
            return Err(OptionsError::TruncatedTable { len: bytes.len() });
        }

        Ok(table)
    }

    /// Packed form of the table; `from_bytes` round-trips it.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Character-length bounds the table was built with.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> GramBounds {
        self.bounds
    }

    /// Number of grams in the table.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true when the table holds no grams.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn offset(&self, i: usize) -> i32 {
        let at = FIELD_WIDTH + FIELD_WIDTH * i;
        i32::from_le_bytes(self.raw[at..at + FIELD_WIDTH].try_into().expect("field width"))
    }

    /// One past the NUL terminator of gram `i`.
    #[inline]
    fn gram_end(&self, i: usize) -> usize {
        if i + 1 < self.count {
            self.offset(i + 1) as usize
        } else {
            self.raw.len()
        }
    }

    /// Returns gram `i` without its NUL terminator.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> &[u8] {
        assert!(i < self.count, "gram index {i} out of range ({})", self.count);
        let start = self.offset(i) as usize;
        let end = self.gram_end(i);
        debug_assert!(start < end && end <= self.raw.len());
        debug_assert_eq!(self.raw[end - 1], 0);
        &self.raw[start..end - 1]
    }

    /// Iterates grams in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.count).map(move |i| self.get(i))
    }

    /// The search range covering the whole table.
    #[inline]
    #[must_use]
    pub fn full_range(&self) -> SearchRange {
        SearchRange {
            lower: 0,
            upper: self.count as isize - 1,
        }
    }

    /// Binary-searches for any gram having `prefix` as a byte prefix.
    ///
    /// `range` is narrowed in place; reusing it for a longer prefix restricts
    /// the search to the surviving window, which is what makes the walker's
    /// grow-by-one-character loop cheap.
    pub fn prefix_search(&self, prefix: &[u8], range: &mut SearchRange) -> Option<usize> {
        while range.lower <= range.upper {
            let mid = (range.lower + range.upper) / 2;
            debug_assert!(mid >= 0 && (mid as usize) < self.count);
            match prefix_compare(self.get(mid as usize), prefix) {
                Ordering::Less => range.lower = mid + 1,
                Ordering::Greater => range.upper = mid - 1,
                Ordering::Equal => return Some(mid as usize),
            }
        }
        None
    }

    /// One-shot prefix probe over the whole table.
    #[inline]
    #[must_use]
    pub fn contains_prefix(&self, prefix: &[u8]) -> bool {
        let mut range = self.full_range();
        self.prefix_search(prefix, &mut range).is_some()
    }
}

/// Compares a stored gram against a probe prefix with `strncmp` semantics:
/// only the first `prefix.len()` bytes participate, and a gram shorter than
/// the prefix orders below it (its terminator reads as NUL).
#[inline]
fn prefix_compare(gram: &[u8], prefix: &[u8]) -> Ordering {
    let k = gram.len().min(prefix.len());
    match gram[..k].cmp(&prefix[..k]) {
        Ordering::Equal => {
            if gram.len() >= prefix.len() {
                Ordering::Equal
            } else {
                Ordering::Less
            }
        }
        other => other,
    }
}
