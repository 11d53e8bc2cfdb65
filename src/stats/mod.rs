//! Streaming q-gram statistics over document columns.
//!
//! Two collectors share the segmentation front end but differ in counting
//! discipline:
//!
//! - [`exact`] counts document frequency exactly against a user threshold and
//!   yields the frequent-gram set the index options are built from.
//! - [`lossy`] runs Lossy Counting over short grams (1..=3 characters) and
//!   yields the bounded most-common-element table the selectivity estimator
//!   consumes.
//!
//! Both deduplicate per document with a touched-slot list, so clearing the
//! per-document state costs O(grams touched), not O(table size).

pub mod exact;
pub mod lossy;

use crate::chars::char_boundaries;
use crate::words::extract_words;

/// Enumerates, per word of `doc`, every q-gram for `q` in
/// `min_q..=max_q`. Words include their sentinels. `boundaries` is caller
/// scratch reused across documents.
pub(crate) fn for_each_qgram(
    doc: &[u8],
    min_q: usize,
    max_q: usize,
    boundaries: &mut Vec<usize>,
    mut f: impl FnMut(&[u8]),
) {
    extract_words(doc, |word| {
        char_boundaries(word, boundaries);
        let chars = boundaries.len() - 1;
        for q in min_q..=max_q {
            if chars < q {
                break;
            }
            for k in 0..=chars - q {
                f(&word[boundaries[k]..boundaries[k + q]]);
            }
        }
    });
}
