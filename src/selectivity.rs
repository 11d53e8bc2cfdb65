//! Selectivity estimation for LIKE/ILIKE over analyzed columns.
//!
//! The analyze pass stores a most-common-element (MCELEM) table of short
//! grams with their per-row frequencies. At plan time each literal fragment
//! of the pattern is priced against that table:
//!
//! - fragments up to [`MAX_STAT_Q`] characters are looked up directly;
//! - longer fragments use a first-order Markov approximation over sliding
//!   trigrams, multiplying conditional probabilities
//!   `freq(trigram) / freq(overlap)` along the fragment. An overlap missing
//!   from the table widens by shortening from the left until something is
//!   found (or conditions on nothing).
//!
//! Grams absent from the table are priced below anything kept
//! (`min_freq * 0.5`). The pattern's selectivity is the product over its
//! fragments, scaled by the non-null fraction and clamped to `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::chars::{char_count, next_char};
use crate::pattern::WildcardTokenizer;
use crate::stats::lossy::TopGramCollector;

/// Longest gram tracked by the analyze pass and priced directly.
pub const MAX_STAT_Q: usize = 3;

/// Selectivity assumed for a LIKE predicate when no statistics exist.
pub const DEFAULT_LIKE_SEL: f32 = 0.05;

/// Most-common-element statistics slot.
///
/// Grams are byte-sorted with parallel frequencies so plan-time lookups are
/// a binary search; the extreme frequencies ride along so a miss can be
/// priced without rescanning the table.
///
/// # Invariants
/// - `grams` is strictly ascending; `freqs` is parallel to it.
/// - All frequencies are in `(0, 1]` and `min_freq <= max_freq`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McelemStats {
    grams: Vec<Box<[u8]>>,
    freqs: Vec<f32>,
    min_freq: f32,
    max_freq: f32,
}

impl McelemStats {
    /// Assembles a slot from byte-sorted grams and parallel frequencies.
    #[must_use]
    pub fn new(grams: Vec<Box<[u8]>>, freqs: Vec<f32>, min_freq: f32, max_freq: f32) -> Self {
        debug_assert_eq!(grams.len(), freqs.len());
        debug_assert!(grams.windows(2).all(|w| w[0] < w[1]), "grams not sorted");
        debug_assert!(min_freq <= max_freq);
        Self {
            grams,
            freqs,
            min_freq,
            max_freq,
        }
    }

    /// Number of tracked grams.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.grams.len()
    }

    /// Returns true when the slot tracks no grams.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }

    /// Lowest frequency among kept entries.
    #[inline]
    #[must_use]
    pub fn min_freq(&self) -> f32 {
        self.min_freq
    }

    /// Highest frequency among kept entries.
    #[inline]
    #[must_use]
    pub fn max_freq(&self) -> f32 {
        self.max_freq
    }

    /// Iterates `(gram, frequency)` entries in ascending byte order.
    pub fn entries(&self) -> impl Iterator<Item = (&[u8], f32)> + '_ {
        self.grams
            .iter()
            .zip(&self.freqs)
            .map(|(gram, &freq)| (gram.as_ref(), freq))
    }

    /// Binary-searches the slot for an exact gram.
    #[must_use]
    pub fn lookup(&self, gram: &[u8]) -> Option<f32> {
        self.grams
            .binary_search_by(|probe| probe.as_ref().cmp(gram))
            .ok()
            .map(|i| self.freqs[i])
    }

    /// Frequency of `gram`, or the below-any-kept floor when absent.
    #[inline]
    #[must_use]
    pub fn frequency_or_floor(&self, gram: &[u8]) -> f32 {
        self.lookup(gram).unwrap_or(self.min_freq * 0.5)
    }
}

/// Column-level statistics produced by one analyze pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Fraction of sampled rows that were NULL.
    pub null_frac: f32,
    /// Average byte width of non-null rows.
    pub avg_width: f32,
    /// MCELEM slot; absent when the sample had no usable rows.
    pub mcelem: Option<McelemStats>,
}

/// Analyzes a sample of rows into column statistics.
///
/// `statistics_target` follows the host convention: the MCELEM table keeps
/// up to ten times that many grams, on the grounds that element statistics
/// need more entries than scalar most-common-value lists.
pub fn analyze_column<'a, I>(rows: I, statistics_target: usize) -> ColumnStats
where
    I: IntoIterator<Item = Option<&'a [u8]>>,
{
    let mut collector = TopGramCollector::new(statistics_target.saturating_mul(10));
    for row in rows {
        collector.push_row(row);
    }
    collector.finish()
}

/// Estimates the selectivity of a LIKE/ILIKE `pattern` over an analyzed
/// column.
#[must_use]
pub fn estimate_like_selectivity(stats: &ColumnStats, pattern: &[u8], escape: u8) -> f32 {
    let Some(mcelem) = &stats.mcelem else {
        return DEFAULT_LIKE_SEL;
    };

    let mut selectivity = 1.0f32;
    let mut tokenizer = WildcardTokenizer::new(pattern, escape);
    while let Some(fragment) = tokenizer.next_fragment() {
        selectivity *= estimate_fragment_selectivity(mcelem, fragment);
    }
    selectivity *= 1.0 - stats.null_frac;
    selectivity.clamp(0.0, 1.0)
}

/// Prices one literal fragment against the MCELEM table.
#[must_use]
pub fn estimate_fragment_selectivity(mcelem: &McelemStats, fragment: &[u8]) -> f32 {
    if char_count(fragment) <= MAX_STAT_Q {
        return mcelem.frequency_or_floor(fragment);
    }

    // Markov chain over sliding trigrams: P(t1) * prod P(t_i | overlap_i).
    let mut q = 0usize;
    for _ in 0..MAX_STAT_Q {
        q = next_char(fragment, q);
    }
    let mut p = 0usize;
    let mut result = mcelem.frequency_or_floor(&fragment[..q]);

    while q < fragment.len() {
        p = next_char(fragment, p);

        // The conditioning overlap; shorten from the left until the table
        // knows it, conditioning on nothing as a last resort.
        let mut pp = p;
        let denominator = loop {
            if let Some(freq) = mcelem.lookup(&fragment[pp..q]) {
                break freq;
            }
            pp = next_char(fragment, pp);
            if pp >= q {
                debug_assert_eq!(pp, q);
                break 1.0;
            }
        };

        q = next_char(fragment, q);
        let numerator = mcelem.frequency_or_floor(&fragment[pp..q]);
        result *= numerator / denominator;
    }

    result
}
