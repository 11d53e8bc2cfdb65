//! V-gram walkers: rare-gram extraction over segmented words.
//!
//! A candidate at position `p` is the shortest gram starting there, with
//! character length in `[min_q, max_q]`, that is not a byte prefix of any
//! frequent-gram table entry. Such a gram is rare enough to be a useful
//! posting-list key.
//!
//! Two walkers share that candidate scan:
//!
//! - [`extract_word_vgrams`] emits every candidate.
//! - [`extract_word_vgrams_minimal`] emits the minimal cover: a candidate is
//!   kept only when the next candidate's end strictly advances, so each kept
//!   gram extends coverage and nested candidates are dropped. Any window of
//!   the word wholly containing a candidate wholly contains a kept gram,
//!   which is the soundness condition the query side relies on.
//!
//! Candidates at one position reuse the narrowed table search range as the
//! gram grows by one character, so the per-position cost is a handful of
//! probes over a shrinking window.

use crate::chars::next_char;
use crate::errors::OptionsError;
use crate::gram_table::{GramBounds, GramTable};
use crate::words::extract_words;

/// Emits every rare gram of `word`, one per starting position at most.
///
/// `word` is a segmented word span including both sentinels. Emission order
/// is left to right.
pub fn extract_word_vgrams(word: &[u8], table: &GramTable, emit: &mut impl FnMut(&[u8])) {
    walk_candidates(word, table, &mut |start, end| emit(&word[start..end]));
}

/// Emits the minimal cover of rare grams of `word`.
///
/// A recorded candidate is emitted once a later candidate ends strictly
/// beyond it; the final candidate is always emitted. Candidates may share
/// bytes with their neighbors.
pub fn extract_word_vgrams_minimal(word: &[u8], table: &GramTable, emit: &mut impl FnMut(&[u8])) {
    let mut prev: Option<(usize, usize)> = None;
    walk_candidates(word, table, &mut |start, end| {
        if let Some((ps, pe)) = prev {
            if pe < end {
                emit(&word[ps..pe]);
            }
        }
        prev = Some((start, end));
    });
    if let Some((ps, pe)) = prev {
        emit(&word[ps..pe]);
    }
}

/// Candidate scan shared by both walkers.
///
/// `p` is the current start, `r` one past the current end; `len` tracks
/// `chars(r) - chars(p)` and goes negative transiently while `p` overtakes a
/// stalled `r`. `r` never moves backwards, so once it reaches the word end
/// the remaining positions cannot produce candidates.
fn walk_candidates(word: &[u8], table: &GramTable, on_candidate: &mut impl FnMut(usize, usize)) {
    let min_q = table.bounds().min_q as isize;
    let max_q = table.bounds().max_q as isize;
    let end = word.len();

    let mut p = 0usize;
    let mut r = 0usize;
    let mut len = 0isize;

    while p < end {
        let mut range = table.full_range();
        let mut first = true;

        while len < max_q && r < end {
            // After `p` advances, the previous candidate's suffix is still in
            // `[p, r)`; probe it before growing.
            if !first || r <= p {
                r = next_char(word, r);
                len += 1;
            }
            first = false;
            if len >= min_q && table.prefix_search(&word[p..r], &mut range).is_none() {
                on_candidate(p, r);
                break;
            }
        }

        p = next_char(word, p);
        len -= 1;
    }
}

/// Extracts the byte-sorted, deduplicated minimal-cover V-gram set of a
/// whole string: segmentation, per-word minimal walk, sort, dedup.
#[must_use]
pub fn extract_vgrams(input: &[u8], table: &GramTable) -> Vec<Vec<u8>> {
    let mut out: Vec<Vec<u8>> = Vec::new();
    extract_words(input, |word| {
        extract_word_vgrams_minimal(word, table, &mut |gram| out.push(gram.to_vec()));
    });
    sort_unique(&mut out);
    out
}

/// One-shot extraction from raw parameters: builds the table, then runs
/// [`extract_vgrams`]. Fails eagerly on invalid bounds or grams.
pub fn extract_vgrams_with<T: AsRef<[u8]>>(
    input: &[u8],
    bounds: GramBounds,
    frequent: &[T],
) -> Result<Vec<Vec<u8>>, OptionsError> {
    let table = GramTable::build(frequent, bounds)?;
    Ok(extract_vgrams(input, &table))
}

/// Byte-sorts and deduplicates an entry set in place.
pub(crate) fn sort_unique(entries: &mut Vec<Vec<u8>>) {
    entries.sort_unstable();
    entries.dedup();
}
