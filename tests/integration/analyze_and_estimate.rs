//! Analyze-time statistics feeding plan-time selectivity estimation.

use vgram_rs::{
    analyze_column, collect_frequent, estimate_like_selectivity, GramBounds, DEFAULT_ESCAPE,
    DEFAULT_LIKE_SEL,
};

fn titles() -> Vec<Vec<u8>> {
    // A small title corpus with heavy stopwords; `zz` never appears.
    let base: &[&str] = &[
        "the art of indexing",
        "in the heart of the database",
        "of mice and queries",
        "the theory of search",
        "indexes in practice",
        "the index of everything",
        "a study of the planner",
        "in defense of statistics",
        "the cost of estimation",
        "of words and the grams between them",
    ];
    base.iter().map(|t| t.as_bytes().to_vec()).collect()
}

#[test]
fn frequent_aggregate_keeps_stopwords_and_drops_noise() {
    let docs = titles();
    let frequent = collect_frequent(
        docs.iter().map(|d| Some(d.as_slice())),
        GramBounds::new(2, 4),
        0.3,
    )
    .unwrap();

    assert!(frequent.contains(&b"the".to_vec()));
    assert!(frequent.contains(&b"in".to_vec()));
    assert!(frequent.contains(&b"of".to_vec()));
    assert!(!frequent.contains(&b"zz".to_vec()));
    // Output is byte-sorted for direct table construction.
    let mut sorted = frequent.clone();
    sorted.sort();
    assert_eq!(frequent, sorted);
}

#[test]
fn estimator_separates_common_from_rare_patterns() {
    let docs = titles();
    let rows = docs.iter().map(|d| Some(d.as_slice()));
    let stats = analyze_column(rows, 100);
    assert_eq!(stats.null_frac, 0.0);
    assert!(stats.mcelem.is_some());

    let common = estimate_like_selectivity(&stats, b"%the%", DEFAULT_ESCAPE);
    let rare = estimate_like_selectivity(&stats, b"%zz%", DEFAULT_ESCAPE);
    assert!(
        common > rare,
        "estimator failed to separate: common={common} rare={rare}"
    );
    assert!((0.0..=1.0).contains(&common));
    assert!((0.0..=1.0).contains(&rare));
}

#[test]
fn longer_fragments_price_through_the_markov_chain() {
    let docs = titles();
    let rows = docs.iter().map(|d| Some(d.as_slice()));
    let stats = analyze_column(rows, 100);

    // `index` is four+ characters, so it exercises the sliding-trigram
    // path; it appears in several titles and must price above noise of the
    // same length.
    let present = estimate_like_selectivity(&stats, b"%index%", DEFAULT_ESCAPE);
    let absent = estimate_like_selectivity(&stats, b"%zqxvw%", DEFAULT_ESCAPE);
    assert!(present > absent, "present={present} absent={absent}");
}

#[test]
fn null_rows_scale_every_estimate() {
    let docs = titles();
    let with_nulls: Vec<Option<&[u8]>> = docs
        .iter()
        .map(|d| Some(d.as_slice()))
        .chain(std::iter::repeat(None).take(docs.len()))
        .collect();
    let stats = analyze_column(with_nulls, 10);
    assert!((stats.null_frac - 0.5).abs() < 1e-6);

    let sel = estimate_like_selectivity(&stats, b"%the%", DEFAULT_ESCAPE);
    assert!(sel <= 0.5 + 1e-6, "null fraction must cap selectivity: {sel}");
}

#[test]
fn unanalyzed_columns_use_the_default_selectivity() {
    let empty: Vec<Option<&[u8]>> = vec![None, None];
    let stats = analyze_column(empty, 10);
    assert!(stats.mcelem.is_none());
    assert_eq!(
        estimate_like_selectivity(&stats, b"%the%", DEFAULT_ESCAPE),
        DEFAULT_LIKE_SEL
    );
}
