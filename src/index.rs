//! Index operator-class surface: options, extraction callbacks, and the
//! consistency check.
//!
//! This is the seam between the core and the host's inverted index. The
//! host validates options at index build, calls
//! [`extract_index_value`] per indexed row and [`extract_index_query`] per
//! probe, ANDs the posting hits through [`consistent`], and always reruns
//! the literal predicate on candidates: the gram set is necessary for a
//! match, never sufficient.

use serde::{Deserialize, Serialize};

use crate::errors::{OptionsError, QueryError};
use crate::extract::{extract_vgrams, extract_word_vgrams_minimal, sort_unique};
use crate::gram_table::{GramBounds, GramTable};
use crate::pattern::WildcardTokenizer;
use crate::selectivity::McelemStats;

/// Host strategy number for case-sensitive LIKE.
pub const LIKE_STRATEGY_NUMBER: u16 = 3;
/// Host strategy number for case-insensitive LIKE.
pub const ILIKE_STRATEGY_NUMBER: u16 = 4;

/// Cap on query-side grams when statistics allow ranking them.
///
/// More grams shrink the candidate set but cost one posting scan each;
/// past a handful the scans dominate, so only the most selective survive.
pub const OPTIMAL_QUERY_VGRAMS: usize = 5;

/// Query strategies served by the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Like,
    ILike,
}

impl Strategy {
    /// Resolves a raw host strategy number.
    pub fn from_number(number: u16) -> Result<Self, QueryError> {
        match number {
            LIKE_STRATEGY_NUMBER => Ok(Self::Like),
            ILIKE_STRATEGY_NUMBER => Ok(Self::ILike),
            _ => Err(QueryError::UnsupportedStrategy { number }),
        }
    }

    /// The raw host strategy number.
    #[must_use]
    pub fn number(self) -> u16 {
        match self {
            Self::Like => LIKE_STRATEGY_NUMBER,
            Self::ILike => ILIKE_STRATEGY_NUMBER,
        }
    }
}

/// Operator-class options as supplied at index build.
///
/// `compile` validates everything eagerly; a build with invalid parameters
/// fails before any index state exists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Gram character-length bounds.
    #[serde(default)]
    pub bounds: GramBounds,
    /// Frequent grams excluded from posting keys.
    #[serde(default)]
    pub frequent: Vec<String>,
}

impl IndexOptions {
    /// Compiles the options into the immutable table both extraction paths
    /// share.
    pub fn compile(&self) -> Result<GramTable, OptionsError> {
        GramTable::build(&self.frequent, self.bounds)
    }
}

/// Gram set for one indexed value: byte-sorted, unique, minimal cover.
#[must_use]
pub fn extract_index_value(value: &[u8], table: &GramTable) -> Vec<Vec<u8>> {
    extract_vgrams(value, table)
}

/// How the host should drive the index for a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Probe the posting lists for every entry.
    Default,
    /// No entry constrains the search; scan everything.
    MatchAll,
}

/// Query-side extraction result.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryVgrams {
    /// Byte-sorted unique gram entries.
    pub entries: Vec<Vec<u8>>,
    pub search_mode: SearchMode,
}

/// Extracts the gram set for a LIKE/ILIKE probe.
///
/// With statistics available, candidates are ranked by estimated frequency
/// and only the [`OPTIMAL_QUERY_VGRAMS`] most selective are kept. An empty
/// set degrades the probe to a full scan; the recheck keeps it correct.
pub fn extract_index_query(
    pattern: &[u8],
    table: &GramTable,
    strategy_number: u16,
    escape: u8,
    stats: Option<&McelemStats>,
) -> Result<QueryVgrams, QueryError> {
    // LIKE and ILIKE share one extraction path; grams are lowercased on
    // both the value and the query side.
    Strategy::from_number(strategy_number)?;

    let mut entries: Vec<Vec<u8>> = Vec::new();
    let mut ranked: Vec<(Vec<u8>, f32)> = Vec::new();
    let mut tokenizer = WildcardTokenizer::new(pattern, escape);
    while let Some(fragment) = tokenizer.next_fragment() {
        extract_word_vgrams_minimal(fragment, table, &mut |gram| match stats {
            None => entries.push(gram.to_vec()),
            Some(stats) => rank_candidate(&mut ranked, gram, stats.frequency_or_floor(gram)),
        });
    }
    if stats.is_some() {
        entries.extend(ranked.into_iter().map(|(gram, _)| gram));
    }
    sort_unique(&mut entries);

    let search_mode = if entries.is_empty() {
        SearchMode::MatchAll
    } else {
        SearchMode::Default
    };
    Ok(QueryVgrams { entries, search_mode })
}

/// Keeps the lowest-frequency candidates, displacing the worst kept entry
/// when a better one arrives.
fn rank_candidate(kept: &mut Vec<(Vec<u8>, f32)>, gram: &[u8], frequency: f32) {
    if kept.iter().any(|(g, _)| g == gram) {
        return;
    }
    if kept.len() < OPTIMAL_QUERY_VGRAMS {
        kept.push((gram.to_vec(), frequency));
        return;
    }
    let (worst, worst_freq) = kept
        .iter()
        .enumerate()
        .map(|(i, &(_, f))| (i, f))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .expect("kept is non-empty");
    if frequency < worst_freq {
        kept[worst] = (gram.to_vec(), frequency);
    }
}

/// Consistency verdict for a candidate row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Consistency {
    /// All required entries were present.
    pub matches: bool,
    /// The literal predicate must rerun on this row; always true here.
    pub recheck: bool,
}

/// ANDs the per-entry posting hits for a candidate row.
///
/// All cases served by this index are inexact, so `recheck` is
/// unconditionally set.
pub fn consistent(present: &[bool], strategy_number: u16) -> Result<Consistency, QueryError> {
    Strategy::from_number(strategy_number)?;
    Ok(Consistency {
        matches: present.iter().all(|&hit| hit),
        recheck: true,
    })
}
