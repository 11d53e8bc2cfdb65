//! Word segmentation with boundary sentinels.
//!
//! A word is a maximal run of extractable characters. Each run is lowercased
//! and delivered to the callback wrapped in the `$` sentinel, so that
//! word-initial and word-final grams are ordinary table entries downstream.
//!
//! # Invariants
//! - The callback buffer starts and ends with [`SENTINEL`] and never contains
//!   it anywhere else (the sentinel is not extractable, so it always splits a
//!   run).
//! - Runs are delivered left to right and never overlap.
//! - Multibyte characters are never part of a word; classification looks at
//!   the lead byte only.

use crate::chars::{is_extractable, next_char, push_lowercased};

/// Word-boundary marker surrounding every segmented word.
pub const SENTINEL: u8 = b'$';

/// Invokes `on_word` for each maximal extractable run in `input`.
///
/// The word buffer is reused between callbacks; callers that need to keep a
/// word must copy it.
pub fn extract_words(input: &[u8], mut on_word: impl FnMut(&[u8])) {
    let mut buf: Vec<u8> = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut i = 0usize;

    while i < input.len() {
        if is_extractable(input[i]) {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(start) = run_start.take() {
            emit_word(&mut buf, &input[start..i], &mut on_word);
        }
        i = next_char(input, i);
    }
    if let Some(start) = run_start {
        emit_word(&mut buf, &input[start..], &mut on_word);
    }
}

fn emit_word(buf: &mut Vec<u8>, run: &[u8], on_word: &mut impl FnMut(&[u8])) {
    debug_assert!(!run.is_empty());
    buf.clear();
    buf.push(SENTINEL);
    push_lowercased(buf, run);
    buf.push(SENTINEL);
    on_word(buf);
}
