//! LIKE/ILIKE wildcard pattern tokenizer.
//!
//! Splits a pattern into literal fragments bounded by the `%`/`_` wildcard
//! meta-characters, non-word characters, or the pattern ends, stripping
//! escapes along the way. Fragments are lowercased and carry the word
//! sentinel asymmetrically:
//!
//! - a side bounded by a wildcard gets no sentinel (it may fall anywhere
//!   inside a word of the indexed value);
//! - a side bounded by a non-word character or a pattern end gets one (it
//!   must sit at a word boundary in any matching value).
//!
//! The same table-driven walker then runs over each fragment, so query-side
//! grams are, for any matching value, a subset of the value-side grams.
//! That containment is the soundness contract of the index probe; the
//! always-on recheck only ever discards false positives.
//!
//! An escaped byte is literal: escaped word characters join the fragment,
//! anything else (including escaped metas) terminates it as a non-meta
//! boundary. An unterminated trailing escape ends tokenization at the
//! defect; the grams gathered so far remain sound.

use memchr::memchr3;

use crate::chars::{is_extractable, next_char, push_lowercased};
use crate::extract::{extract_word_vgrams_minimal, sort_unique};
use crate::gram_table::GramTable;
use crate::words::SENTINEL;

/// Default wildcard escape byte.
pub const DEFAULT_ESCAPE: u8 = b'\\';

/// Returns true for the LIKE wildcard meta-characters.
#[inline]
#[must_use]
pub const fn is_wildcard(b: u8) -> bool {
    matches!(b, b'%' | b'_')
}

/// Resumable fragment scanner over one pattern.
///
/// Each [`next_fragment`](Self::next_fragment) call yields the next literal
/// fragment, lowercased, with sentinels applied per the boundary rules
/// above. The fragment buffer is reused across calls.
pub struct WildcardTokenizer<'a> {
    pattern: &'a [u8],
    pos: usize,
    escape: u8,
    buf: Vec<u8>,
}

impl<'a> WildcardTokenizer<'a> {
    /// Creates a tokenizer over `pattern` with the given escape byte.
    #[must_use]
    pub fn new(pattern: &'a [u8], escape: u8) -> Self {
        Self {
            pattern,
            pos: 0,
            escape,
            buf: Vec::new(),
        }
    }

    /// Scans to the next literal fragment, or `None` at pattern end.
    pub fn next_fragment(&mut self) -> Option<&[u8]> {
        let pattern = self.pattern;

        // Find the first word character, remembering whether the character
        // immediately before it was a wildcard meta and whether the word
        // character itself was escaped.
        let mut in_meta = false;
        let mut in_escape = false;
        let mut first_escaped = false;
        let mut i = self.pos;
        while i < pattern.len() {
            let b = pattern[i];
            if in_escape {
                // The escape does not change the boundary kind; an escaped
                // word character starts the fragment under whatever boundary
                // preceded the escape, and an escaped anything-else is a
                // literal separator.
                in_escape = false;
                if is_extractable(b) {
                    first_escaped = true;
                    break;
                }
                in_meta = false;
            } else if b == self.escape {
                in_escape = true;
            } else if is_wildcard(b) {
                in_meta = true;
            } else if is_extractable(b) {
                break;
            } else {
                in_meta = false;
            }
            i = next_char(pattern, i);
        }
        if i >= pattern.len() {
            self.pos = pattern.len();
            return None;
        }

        self.buf.clear();
        if !in_meta {
            self.buf.push(SENTINEL);
        }

        // Copy word characters, stripping escapes, until a wildcard, a
        // non-word character, or the pattern end. The first character may
        // carry its escape over from the boundary scan; without that, an
        // alphanumeric escape byte would reescape itself here.
        in_meta = false;
        in_escape = first_escaped;
        while i < pattern.len() {
            let b = pattern[i];
            let step = next_char(pattern, i);
            if in_escape {
                in_escape = false;
                if !is_extractable(b) {
                    // Consume the escaped separator so the resumed scan
                    // cannot reinterpret it as an escape or a wildcard.
                    i = step;
                    break;
                }
                push_lowercased(&mut self.buf, &pattern[i..step]);
            } else if b == self.escape {
                in_escape = true;
            } else if is_wildcard(b) {
                in_meta = true;
                break;
            } else if is_extractable(b) {
                push_lowercased(&mut self.buf, &pattern[i..step]);
            } else {
                break;
            }
            i = step;
        }
        if !in_meta {
            self.buf.push(SENTINEL);
        }

        self.pos = i;
        Some(&self.buf)
    }
}

/// Returns true when `pattern` contains any wildcard or escape byte.
///
/// Metas and the escape are ASCII, so a byte scan is exact on multibyte
/// input. Useful to hosts that route plain-equality patterns elsewhere.
#[must_use]
pub fn has_wildcards(pattern: &[u8], escape: u8) -> bool {
    memchr3(b'%', b'_', escape, pattern).is_some()
}

/// Extracts the byte-sorted, deduplicated minimal-cover V-gram set of a
/// pattern's literal fragments.
///
/// An empty result means the pattern constrains nothing the index can see;
/// the caller must fall back to a full scan.
#[must_use]
pub fn extract_query_vgrams(pattern: &[u8], table: &GramTable, escape: u8) -> Vec<Vec<u8>> {
    let mut out: Vec<Vec<u8>> = Vec::new();
    let mut tokenizer = WildcardTokenizer::new(pattern, escape);
    while let Some(fragment) = tokenizer.next_fragment() {
        extract_word_vgrams_minimal(fragment, table, &mut |gram| out.push(gram.to_vec()));
    }
    sort_unique(&mut out);
    out
}
