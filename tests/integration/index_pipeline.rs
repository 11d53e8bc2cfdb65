//! Value/query extraction driven the way an index build and probe would.

use vgram_rs::{
    collect_frequent, consistent, extract_index_query, extract_index_value, extract_words,
    GramBounds, IndexOptions, SearchMode, DEFAULT_ESCAPE, ILIKE_STRATEGY_NUMBER,
    LIKE_STRATEGY_NUMBER,
};

fn options(frequent: &[&str], min_q: u32, max_q: u32) -> IndexOptions {
    IndexOptions {
        bounds: GramBounds::new(min_q, max_q),
        frequent: frequent.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn indexing_value_produces_the_expected_cover() {
    // A table where the short grams of `indexing` are frequent forces the
    // walker to stretch each candidate just past the frequent prefix.
    let opts = options(&["$in", "de", "ex", "in", "ing$", "nd"], 2, 4);
    let table = opts.compile().unwrap();
    let grams = extract_index_value(b"indexing", &table);
    assert_eq!(
        grams,
        vec![b"dex".to_vec(), b"ind".to_vec(), b"nde".to_vec(), b"xi".to_vec()]
    );
}

#[test]
fn multi_word_values_segment_before_extraction() {
    let opts = options(&["$in", "de", "ex", "in", "ing$", "nd"], 2, 4);
    let table = opts.compile().unwrap();

    let mut words = Vec::new();
    extract_words(b"i like it", |w| words.push(w.to_vec()));
    assert_eq!(
        words,
        vec![b"$i$".to_vec(), b"$like$".to_vec(), b"$it$".to_vec()]
    );

    let grams = extract_index_value(b"i like it", &table);
    // The one-character word yields only its sentinel-bracketed gram; no
    // plain two-character gram of `i` exists.
    assert!(grams.contains(&b"$i$".to_vec()));
    assert_eq!(
        grams,
        vec![
            b"$i$".to_vec(),
            b"$l".to_vec(),
            b"e$".to_vec(),
            b"ik".to_vec(),
            b"it".to_vec(),
            b"ke".to_vec(),
            b"li".to_vec(),
            b"t$".to_vec(),
        ]
    );
}

#[test]
fn rare_pattern_probe_selects_only_true_matches_after_recheck() {
    let rows: &[&[u8]] = &[
        b"pizza palace",
        b"fizzy drink",
        b"plain bread",
        b"jazz band",
        b"buzz",
    ];
    // Statistics come from a representative corpus in which `zz` never
    // reaches the frequency threshold.
    let stats_docs: &[&[u8]] = &[b"the plain place", b"the grain trade", b"a plain band"];
    let bounds = GramBounds::new(2, 4);
    let frequent =
        collect_frequent(stats_docs.iter().map(|d| Some(*d)), bounds, 0.5).unwrap();
    assert!(!frequent.contains(&b"zz".to_vec()));
    let table = IndexOptions {
        bounds,
        frequent: frequent
            .iter()
            .map(|g| String::from_utf8(g.clone()).unwrap())
            .collect(),
    }
    .compile()
    .unwrap();

    let q = extract_index_query(b"%zz%", &table, LIKE_STRATEGY_NUMBER, DEFAULT_ESCAPE, None)
        .unwrap();
    assert_eq!(q.entries, vec![b"zz".to_vec()]);
    assert_eq!(q.search_mode, SearchMode::Default);

    // Drive the probe: AND the posting hits per row, then recheck.
    let mut selected = Vec::new();
    for row in rows {
        let row_grams = extract_index_value(row, &table);
        let present: Vec<bool> = q
            .entries
            .iter()
            .map(|e| row_grams.binary_search(e).is_ok())
            .collect();
        let verdict = consistent(&present, LIKE_STRATEGY_NUMBER).unwrap();
        assert!(verdict.recheck);
        if verdict.matches {
            // Recheck with the literal predicate.
            if row.windows(2).any(|w| w == b"zz") {
                selected.push(*row);
            }
        }
    }
    assert_eq!(
        selected,
        vec![b"pizza palace".as_slice(), b"fizzy drink", b"jazz band", b"buzz"]
    );
}

#[test]
fn candidate_sets_never_miss_a_true_match() {
    let rows: &[&[u8]] = &[
        b"the indexing engine",
        b"an index of things",
        b"nothing here",
        b"INDEX IN CAPS",
    ];
    let bounds = GramBounds::new(2, 3);
    let frequent =
        collect_frequent(rows.iter().map(|r| Some(*r)), bounds, 0.6).unwrap();
    let table = vgram_rs::GramTable::build(&frequent, bounds).unwrap();

    for pattern in [b"%index%".as_slice(), b"%thing%", b"%ind%", b"%engine%"] {
        let q = extract_index_query(
            pattern,
            &table,
            ILIKE_STRATEGY_NUMBER,
            DEFAULT_ESCAPE,
            None,
        )
        .unwrap();
        let needle = &pattern[1..pattern.len() - 1];
        for row in rows {
            let lowered = row.to_ascii_lowercase();
            let truly_matches = lowered
                .windows(needle.len())
                .any(|w| w == needle);
            if !truly_matches {
                continue;
            }
            let row_grams = extract_index_value(row, &table);
            let present: Vec<bool> = q
                .entries
                .iter()
                .map(|e| row_grams.binary_search(e).is_ok())
                .collect();
            let verdict = consistent(&present, ILIKE_STRATEGY_NUMBER).unwrap();
            assert!(
                verdict.matches,
                "row {:?} matches {:?} but was filtered out (entries {:?})",
                row, pattern, q.entries
            );
        }
    }
}

#[test]
fn custom_escape_runs_the_extractor_on_the_literal_fragment() {
    let opts = options(&[], 2, 4);
    let table = opts.compile().unwrap();
    // With `$` as escape, `$$the$$` is the literal word `the` between
    // non-word bytes; the extractor sees the five-character `$the$`.
    let q = extract_index_query(b"$$the$$", &table, LIKE_STRATEGY_NUMBER, b'$', None).unwrap();
    assert_eq!(
        q.entries,
        vec![b"$t".to_vec(), b"e$".to_vec(), b"he".to_vec(), b"th".to_vec()]
    );
}

#[test]
fn wildcard_only_pattern_falls_back_to_full_scan() {
    let table = options(&[], 2, 2).compile().unwrap();
    let q = extract_index_query(b"%_%", &table, LIKE_STRATEGY_NUMBER, DEFAULT_ESCAPE, None)
        .unwrap();
    assert!(q.entries.is_empty());
    assert_eq!(q.search_mode, SearchMode::MatchAll);
    // An empty requirement set constrains nothing.
    let verdict = consistent(&[], LIKE_STRATEGY_NUMBER).unwrap();
    assert!(verdict.matches && verdict.recheck);
}
