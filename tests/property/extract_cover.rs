//! Soundness properties of the minimal-cover walker.
//!
//! The load-bearing invariant: for every position of a word that has a rare
//! gram at all, the emitted cover contains a gram nested inside that
//! position's candidate window. Any window of the word wholly containing a
//! candidate therefore wholly contains an emitted gram, which is what makes
//! value-side extraction complete for substring predicates longer than
//! `max_q`.

use proptest::prelude::*;
use vgram_rs::chars::char_count;
use vgram_rs::{
    extract_vgrams, extract_word_vgrams_minimal, extract_words, GramBounds, GramTable,
};

use crate::support::{bounds_strategy, corpus_strategy, corpus_table, doc_strategy, shortest_rare};

proptest! {
    /// Invariant: every candidate window contains an emitted gram
    /// (minimal-cover completeness, for threshold-built tables).
    #[test]
    fn cover_reaches_every_candidate_window(
        corpus in corpus_strategy(),
        doc in doc_strategy(),
        bounds in bounds_strategy(),
        threshold in 0.1f64..=0.9,
    ) {
        let table = corpus_table(&corpus, bounds, threshold);
        let mut word_list: Vec<Vec<u8>> = Vec::new();
        extract_words(&doc, |word| word_list.push(word.to_vec()));
        for word in &word_list {
            let mut emitted: Vec<(usize, usize)> = Vec::new();
            let base = word.as_ptr() as usize;
            extract_word_vgrams_minimal(word, &table, &mut |gram| {
                // The emitted gram borrows from `word`; recover its span.
                let start = gram.as_ptr() as usize - base;
                emitted.push((start, start + gram.len()));
            });
            for p in 0..word.len() {
                if let Some((cs, ce)) = shortest_rare(word, p, &table) {
                    let covered = emitted.iter().any(|&(es, ee)| cs <= es && ee <= ce);
                    prop_assert!(
                        covered,
                        "candidate {:?} at {}..{} of word {:?} has no emitted gram inside",
                        &word[cs..ce],
                        cs,
                        ce,
                        word,
                    );
                }
            }
        }
    }

    /// Invariants: emitted gram lengths lie in bounds and no emitted gram is
    /// prefix-present in the table (these hold for arbitrary tables).
    #[test]
    fn emitted_grams_are_rare_and_bounded(
        corpus in corpus_strategy(),
        doc in doc_strategy(),
        bounds in bounds_strategy(),
        threshold in 0.1f64..=0.9,
    ) {
        let table = corpus_table(&corpus, bounds, threshold);
        for gram in extract_vgrams(&doc, &table) {
            let chars = char_count(&gram) as u32;
            prop_assert!(chars >= bounds.min_q && chars <= bounds.max_q);
            prop_assert!(!table.contains_prefix(&gram), "emitted frequent gram {gram:?}");
        }
    }

    /// Invariant: extraction output is independent of table input order.
    #[test]
    fn extraction_is_stable_under_table_input_order(
        corpus in corpus_strategy(),
        doc in doc_strategy(),
        threshold in 0.1f64..=0.9,
    ) {
        let bounds = GramBounds::new(2, 3);
        let docs = corpus.iter().map(|d| Some(d.as_slice()));
        let mut frequent = vgram_rs::collect_frequent(docs, bounds, threshold).unwrap();
        let forward = GramTable::build(&frequent, bounds).unwrap();
        frequent.reverse();
        let reversed = GramTable::build(&frequent, bounds).unwrap();
        prop_assert_eq!(forward.as_bytes(), reversed.as_bytes());
        prop_assert_eq!(
            extract_vgrams(&doc, &forward),
            extract_vgrams(&doc, &reversed)
        );
    }

    /// Round-trip: the packed table deserializes to identical grams, and
    /// extraction is idempotent.
    #[test]
    fn packed_table_round_trips(
        corpus in corpus_strategy(),
        doc in doc_strategy(),
        bounds in bounds_strategy(),
        threshold in 0.1f64..=0.9,
    ) {
        let table = corpus_table(&corpus, bounds, threshold);
        let back = GramTable::from_bytes(table.as_bytes(), bounds).unwrap();
        prop_assert_eq!(back.as_bytes(), table.as_bytes());
        let a: Vec<&[u8]> = table.iter().collect();
        let b: Vec<&[u8]> = back.iter().collect();
        prop_assert_eq!(a, b);
        prop_assert_eq!(extract_vgrams(&doc, &table), extract_vgrams(&doc, &back));
    }
}
