//! Variable-length n-gram (V-gram) text indexing core.
//!
//! Accelerates LIKE/ILIKE substring predicates over string columns by
//! choosing, per word position, the shortest gram whose prefix is not in a
//! precomputed frequent-gram table. Rare grams make selective posting-list
//! keys; common grams are skipped instead of bloating the index.
//!
//! High-level flow (one indexed value or query pattern):
//! 1) Segment into lowercased words with `$` boundary sentinels.
//! 2) Walk each word, probing the sorted frequent-gram table with a
//!    bound-reusing prefix search, and emit the minimal cover of rare grams.
//! 3) On the query side, split the pattern into literal fragments first,
//!    padding them with sentinels only where a word boundary is implied.
//! 4) AND the posting hits, then recheck candidates with the literal
//!    predicate; the gram set is necessary but never sufficient.
//!
//! Statistics run on the side: an exact-threshold aggregate builds the
//! frequent-gram set, and a Lossy-Counting collector builds the bounded
//! most-common-element table that prices pattern fragments at plan time.
//!
//! Everything here is single-threaded and synchronous; the compiled
//! [`GramTable`] and [`McelemStats`] are immutable and freely shareable.

pub mod chars;
pub mod errors;
pub mod extract;
pub mod gram_table;
pub mod index;
pub mod pattern;
pub mod selectivity;
pub mod stats;
pub mod words;

pub use errors::{OptionsError, QueryError, StatsError, MAX_GRAM_CHARS};
pub use extract::{
    extract_vgrams, extract_vgrams_with, extract_word_vgrams, extract_word_vgrams_minimal,
};
pub use gram_table::{GramBounds, GramTable, SearchRange};
pub use index::{
    consistent, extract_index_query, extract_index_value, Consistency, IndexOptions, QueryVgrams,
    SearchMode, Strategy, ILIKE_STRATEGY_NUMBER, LIKE_STRATEGY_NUMBER, OPTIMAL_QUERY_VGRAMS,
};
pub use pattern::{extract_query_vgrams, has_wildcards, WildcardTokenizer, DEFAULT_ESCAPE};
pub use selectivity::{
    analyze_column, estimate_fragment_selectivity, estimate_like_selectivity, ColumnStats,
    McelemStats, DEFAULT_LIKE_SEL, MAX_STAT_Q,
};
pub use stats::exact::{collect_frequent, transition, CallContext, FrequentGramCollector};
pub use stats::lossy::{LossyStats, TopGramCollector};
pub use words::{extract_words, SENTINEL};
